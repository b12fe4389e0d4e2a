//! Corpus builder: one normalized text blob per mentor.
//!
//! The blob is what gets embedded and stored as `embedding_source_text`.
//! Layout:
//!
//! ```text
//! Name: <name> Bio: <bio> Style: <style> Topics: <a, b> Internships: <role at org, ...>
//! Struggles: <area: situation, ...> Groups: <g1, g2>
//! ```
//!
//! Missing or blank values are written as [`PLACEHOLDER`], and every
//! whitespace run is collapsed to a single space.

use crate::models::{Internship, Mentor, Struggle};

/// Written in place of any missing or blank field.
pub const PLACEHOLDER: &str = "N/A";

/// Build the normalized corpus text for a mentor.
///
/// # Example
///
/// ```rust
/// use haven_match_core::corpus::build_corpus;
/// use haven_match_core::models::Mentor;
///
/// let mentor: Mentor = serde_json::from_str(r#"{"id": "m1", "name": "Asha"}"#).unwrap();
/// assert_eq!(
///     build_corpus(&mentor),
///     "Name: Asha Bio: N/A Style: N/A Topics: N/A Internships: N/A Struggles: N/A Groups: N/A"
/// );
/// ```
pub fn build_corpus(mentor: &Mentor) -> String {
    let internships: Vec<String> = mentor
        .internships
        .iter()
        .filter_map(internship_sentence)
        .collect();
    let struggles: Vec<String> = mentor
        .struggles
        .iter()
        .filter_map(struggle_sentence)
        .collect();

    let sections = [
        ("Name", field(Some(&mentor.name))),
        ("Bio", field(mentor.bio.as_deref())),
        ("Style", field(mentor.mentoring_style.as_deref())),
        ("Topics", joined(&mentor.confident_queries)),
        ("Internships", joined(&internships)),
        ("Struggles", joined(&struggles)),
        ("Groups", joined(&mentor.groups)),
    ];

    let raw = sections
        .iter()
        .map(|(label, value)| format!("{}: {}", label, value))
        .collect::<Vec<_>>()
        .join(" ");

    normalize_whitespace(&raw)
}

/// `"<role> at <org>"`, or whichever side is present.
pub fn internship_sentence(internship: &Internship) -> Option<String> {
    let role = non_blank(internship.role_position.as_deref());
    let org = non_blank(internship.company_org.as_deref());
    match (role, org) {
        (Some(role), Some(org)) => Some(format!("{} at {}", role, org)),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => None,
    }
}

/// `"<area>: <situation>"`, or whichever side is present.
pub fn struggle_sentence(struggle: &Struggle) -> Option<String> {
    let area = non_blank(struggle.area.as_deref());
    let situation = non_blank(struggle.situation_description.as_deref());
    match (area, situation) {
        (Some(area), Some(situation)) => Some(format!("{}: {}", area, situation)),
        (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
        (None, None) => None,
    }
}

/// Collapse every whitespace run to one space and trim the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn field(value: Option<&str>) -> String {
    non_blank(value).unwrap_or(PLACEHOLDER).to_string()
}

fn joined<S: AsRef<str>>(values: &[S]) -> String {
    let parts: Vec<&str> = values
        .iter()
        .filter_map(|v| non_blank(Some(v.as_ref())))
        .collect();
    if parts.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        parts.join(", ")
    }
}
