//! Parsing of ranking responses.
//!
//! Models wrap JSON in Markdown fences or add a sentence around it. The
//! parser strips fences, tries the whole text as a JSON array of
//! `{"id": ...}` objects, and falls back to the outermost `[...]` span.
//! Anything else is a typed [`ResponseError`].

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ResponseError {
    #[error("response was empty")]
    Empty,

    #[error("response is not a JSON array of {{\"id\"}} objects: {0}")]
    Invalid(String),

    #[error("response selected no mentors")]
    NoIds,
}

/// One selected entry. Bare strings are accepted alongside `{"id": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RankedEntry {
    Object { id: IdValue },
    Bare(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdValue {
    Text(String),
    Number(i64),
}

impl RankedEntry {
    fn into_id(self) -> String {
        match self {
            RankedEntry::Object {
                id: IdValue::Text(s),
            } => s,
            RankedEntry::Object {
                id: IdValue::Number(n),
            } => n.to_string(),
            RankedEntry::Bare(s) => s,
        }
    }
}

/// Remove Markdown code-fence markers (```` ```json ```` and ```` ``` ````) and trim.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse a ranking response into mentor IDs, in model order.
///
/// Blank IDs are skipped and repeated IDs keep their first position.
///
/// # Example
///
/// ```rust
/// use haven_match_core::response::parse_ranked_ids;
///
/// let ids = parse_ranked_ids("```json\n[{\"id\":\"m1\"}]\n```").unwrap();
/// assert_eq!(ids, vec!["m1".to_string()]);
/// ```
pub fn parse_ranked_ids(text: &str) -> Result<Vec<String>, ResponseError> {
    let cleaned = strip_code_fences(text);
    if cleaned.is_empty() {
        return Err(ResponseError::Empty);
    }

    let entries = match serde_json::from_str::<Vec<RankedEntry>>(&cleaned) {
        Ok(entries) => entries,
        Err(first_err) => match outer_array(&cleaned) {
            Some(span) => serde_json::from_str::<Vec<RankedEntry>>(span)
                .map_err(|e| ResponseError::Invalid(e.to_string()))?,
            None => return Err(ResponseError::Invalid(first_err.to_string())),
        },
    };

    let mut ids: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        let id = entry.into_id().trim().to_string();
        if !id.is_empty() && !ids.contains(&id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Err(ResponseError::NoIds);
    }
    Ok(ids)
}

fn outer_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    (end > start).then(|| &text[start..=end])
}
