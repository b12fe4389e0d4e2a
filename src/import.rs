//! Load mentor profiles from a JSON file into the store.
//!
//! The file holds an array of mentor objects, in either the nested or the
//! flat export shape (see `haven_match_core::models::Mentor`).
//!
//! Mentors with an `id` are upserted under it. A mentor without one is
//! matched by name against the mentors already stored and reuses that ID,
//! so re-importing the same file updates rows instead of adding new ones.
//! Only unseen names get a fresh UUID.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

use haven_match_core::models::Mentor;
use haven_match_core::store::MentorStore;

/// Parse a JSON array of mentors. IDs are left as given.
pub fn parse_mentors(json: &str) -> Result<Vec<Mentor>> {
    serde_json::from_str(json).context("expected a JSON array of mentor objects")
}

fn name_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Upsert every mentor in `mentors`; returns how many were written.
pub async fn import_mentors(store: &dyn MentorStore, mentors: &[Mentor]) -> Result<usize> {
    let mut known_ids: HashMap<String, String> = store
        .list_mentors(None)
        .await
        .context("failed to list existing mentors")?
        .into_iter()
        .map(|m| (name_key(&m.name), m.id))
        .collect();

    for mentor in mentors {
        let mut mentor = mentor.clone();
        if mentor.id.trim().is_empty() {
            let existing_id = known_ids.get(&name_key(&mentor.name)).cloned();
            mentor.id = existing_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        }
        known_ids.insert(name_key(&mentor.name), mentor.id.clone());

        store
            .upsert_mentor(&mentor)
            .await
            .with_context(|| format!("failed to store mentor {} ({})", mentor.name, mentor.id))?;
        tracing::debug!(mentor_id = %mentor.id, "imported {}", mentor.name);
    }
    Ok(mentors.len())
}

pub async fn import_file(store: &dyn MentorStore, path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mentor file: {}", path.display()))?;
    let mentors = parse_mentors(&content)
        .with_context(|| format!("Failed to parse mentor file: {}", path.display()))?;
    import_mentors(store, &mentors).await
}
