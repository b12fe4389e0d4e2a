//! Turning model output back into mentor records.
//!
//! Two strategies produce an ordered shortlist:
//!
//! | Strategy | Input | Function |
//! |----------|-------|----------|
//! | Prompted ranking | IDs parsed from the model's reply | [`resolve_ranked`] |
//! | Embedding similarity | query vector + stored mentor vectors | [`rank_by_similarity`] |

use std::collections::HashMap;

use crate::embedding::cosine_similarity;
use crate::models::{Mentor, MentorEmbedding};

/// Resolve ranked IDs against the fetched candidate set.
///
/// IDs that are not candidates are dropped without error, so the result
/// only ever contains real records. At most `top_k` mentors are returned,
/// in the order the model gave.
pub fn resolve_ranked(ids: &[String], candidates: &[Mentor], top_k: usize) -> Vec<Mentor> {
    let by_id: HashMap<&str, &Mentor> = candidates.iter().map(|m| (m.id.as_str(), m)).collect();

    let mut resolved: Vec<Mentor> = Vec::with_capacity(top_k.min(ids.len()));
    for id in ids {
        if resolved.len() >= top_k {
            break;
        }
        if resolved.iter().any(|m| &m.id == id) {
            continue;
        }
        if let Some(mentor) = by_id.get(id.as_str()) {
            resolved.push((*mentor).clone());
        }
    }
    resolved
}

/// Rank candidates by cosine similarity between `query_vec` and their stored embedding.
///
/// Only embeddings written by `model` with the query's dimensionality are
/// comparable; candidates without one are skipped. Ties keep candidate order.
pub fn rank_by_similarity(
    query_vec: &[f32],
    model: &str,
    embeddings: &[MentorEmbedding],
    candidates: &[Mentor],
    top_k: usize,
) -> Vec<(Mentor, f32)> {
    let by_id: HashMap<&str, &MentorEmbedding> = embeddings
        .iter()
        .filter(|e| e.model == model && e.embedding.len() == query_vec.len())
        .map(|e| (e.mentor_id.as_str(), e))
        .collect();

    let mut scored: Vec<(Mentor, f32)> = candidates
        .iter()
        .filter_map(|m| {
            by_id
                .get(m.id.as_str())
                .map(|e| (m.clone(), cosine_similarity(query_vec, &e.embedding)))
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);
    scored
}
