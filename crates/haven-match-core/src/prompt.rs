//! Prompt construction for ranking and bio summaries.

use serde::Serialize;

use crate::corpus::{internship_sentence, struggle_sentence};
use crate::models::Mentor;

/// Compact view of a mentor sent to the model as ranking context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MentorSummary {
    pub id: String,
    pub name: String,
    pub role: String,
    pub bio: String,
    pub tags: Vec<String>,
    pub internship: String,
    pub struggles: String,
    pub groups: String,
}

const NONE: &str = "None";

impl MentorSummary {
    pub fn from_mentor(mentor: &Mentor) -> Self {
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
        let groups: Vec<&str> = mentor
            .groups
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .collect();

        Self {
            id: mentor.id.clone(),
            name: mentor.name.clone(),
            role: mentor
                .role
                .map(|r| r.as_str().to_string())
                .unwrap_or_else(|| NONE.to_string()),
            bio: or_none(mentor.bio.as_deref().unwrap_or_default().trim().to_string()),
            tags: mentor.confident_queries.clone(),
            internship: or_none(internships.join(", ")),
            struggles: or_none(struggles.join(", ")),
            groups: or_none(groups.join(", ")),
        }
    }
}

fn or_none(joined: String) -> String {
    if joined.is_empty() {
        NONE.to_string()
    } else {
        joined
    }
}

/// System instruction for the ranking call.
///
/// Rules are listed in priority order; the model is told to return only a
/// JSON array of `{"id": ...}` objects.
pub fn ranking_instruction(top_k: usize) -> String {
    let noun = if top_k == 1 { "mentor" } else { "mentors" };
    format!(
        r#"You are an expert Mentor Matchmaking AI for a university platform.
Your goal is to connect students with the top {top_k} most relevant {noun} from the provided list based on their query.

MATCHING RULES (in order of priority):
1. Club & Activity Match: if the user asks about a specific club, tech team, or student body (e.g. "Racing", "Enactus", "Design Club"), prioritize mentors who are explicitly part of those groups.
2. Topic & Career Match: if the user asks about a specific career or skill (e.g. "Consulting", "Google", "Research", "Coding"), prioritize mentors with that internship or tag.
3. Emotional Resonance: if the user expresses anxiety, loneliness, burnout, or failure, prioritize mentors who have listed similar struggles (e.g. "Academic Failure", "Isolation").
4. Role Match: if the user explicitly asks for an "alumni" or "professor", strictly filter for that role.

OUTPUT FORMAT:
Return ONLY a valid JSON array of objects with the "id" of the selected mentors.
Example: [{{"id": "uuid-1"}}, {{"id": "uuid-2"}}]"#
    )
}

/// User prompt for the ranking call: the quoted query plus the candidates as JSON.
pub fn build_ranking_prompt(query: &str, candidates: &[MentorSummary]) -> serde_json::Result<String> {
    let quoted = serde_json::to_string(query)?;
    let context = serde_json::to_string(candidates)?;
    Ok(format!(
        "USER QUERY: {}\n\nCANDIDATE MENTORS:\n{}",
        quoted, context
    ))
}

/// Prompt asking for a one-sentence summary of a bio.
pub fn build_bio_summary_prompt(bio: &str, max_words: usize) -> String {
    format!(
        "Read this mentor's bio: {:?}\n\
         Task: Summarize this into EXACTLY ONE catchy, professional sentence (under {} words).\n\
         Return ONLY the text.",
        bio, max_words
    )
}

/// Fallback summary: the first `max_chars` characters followed by `...`.
pub fn bio_fallback(bio: &str, max_chars: usize) -> String {
    format!("{}...", crate::embedding::truncate_chars(bio, max_chars))
}
