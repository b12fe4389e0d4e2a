//! In-memory [`MentorStore`] implementation for tests and fixtures.
//!
//! Uses `BTreeMap`s behind `std::sync::RwLock`, so scans come back ordered
//! by ID just like the SQLite store.

use std::collections::BTreeMap;
use std::sync::RwLock;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Mentor, MentorEmbedding};

use super::MentorStore;

/// In-memory store for testing.
pub struct InMemoryStore {
    mentors: RwLock<BTreeMap<String, Mentor>>,
    embeddings: RwLock<BTreeMap<String, MentorEmbedding>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            mentors: RwLock::new(BTreeMap::new()),
            embeddings: RwLock::new(BTreeMap::new()),
        }
    }

    /// Build a store pre-populated with `mentors`.
    pub fn with_mentors(mentors: impl IntoIterator<Item = Mentor>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.mentors.write() {
            for m in mentors {
                map.insert(m.id.clone(), m);
            }
        }
        store
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> anyhow::Error {
    anyhow!("in-memory store lock poisoned")
}

#[async_trait]
impl MentorStore for InMemoryStore {
    async fn upsert_mentor(&self, mentor: &Mentor) -> Result<()> {
        let mut mentors = self.mentors.write().map_err(|_| poisoned())?;
        mentors.insert(mentor.id.clone(), mentor.clone());
        Ok(())
    }

    async fn get_mentor(&self, id: &str) -> Result<Option<Mentor>> {
        let mentors = self.mentors.read().map_err(|_| poisoned())?;
        Ok(mentors.get(id).cloned())
    }

    async fn list_mentors(&self, limit: Option<usize>) -> Result<Vec<Mentor>> {
        let mentors = self.mentors.read().map_err(|_| poisoned())?;
        Ok(mentors
            .values()
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn upsert_embedding(&self, embedding: &MentorEmbedding) -> Result<()> {
        let mut embeddings = self.embeddings.write().map_err(|_| poisoned())?;
        embeddings.insert(embedding.mentor_id.clone(), embedding.clone());
        Ok(())
    }

    async fn get_embedding(&self, mentor_id: &str) -> Result<Option<MentorEmbedding>> {
        let embeddings = self.embeddings.read().map_err(|_| poisoned())?;
        Ok(embeddings.get(mentor_id).cloned())
    }

    async fn list_embeddings(&self) -> Result<Vec<MentorEmbedding>> {
        let embeddings = self.embeddings.read().map_err(|_| poisoned())?;
        Ok(embeddings.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mentor(id: &str) -> Mentor {
        serde_json::from_value(serde_json::json!({ "id": id, "name": id })).unwrap()
    }

    fn embedding(id: &str, text: &str) -> MentorEmbedding {
        MentorEmbedding {
            mentor_id: id.to_string(),
            source_text: text.to_string(),
            embedding: vec![0.1, 0.2],
            model: "embedding-001".to_string(),
            source_hash: crate::embedding::hash_text(text),
            updated_at: 1,
        }
    }

    #[tokio::test]
    async fn test_upsert_embedding_replaces() {
        let store = InMemoryStore::new();
        store.upsert_embedding(&embedding("m1", "first")).await.unwrap();
        store.upsert_embedding(&embedding("m1", "second")).await.unwrap();

        let all = store.list_embeddings().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].source_text, "second");
    }

    #[tokio::test]
    async fn test_list_mentors_ordered_and_limited() {
        let store = InMemoryStore::with_mentors(vec![mentor("c"), mentor("a"), mentor("b")]);
        let all = store.list_mentors(None).await.unwrap();
        let ids: Vec<&str> = all.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(store.list_mentors(Some(2)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_mentor() {
        let store = InMemoryStore::new();
        assert!(store.get_mentor("nope").await.unwrap().is_none());
        assert!(store.get_embedding("nope").await.unwrap().is_none());
    }
}
