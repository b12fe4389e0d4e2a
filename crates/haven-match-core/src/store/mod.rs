//! Storage abstraction for mentors and their embeddings.
//!
//! The [`MentorStore`] trait covers every storage operation the pipeline
//! needs, so the matcher and the refresh job run unchanged against SQLite
//! or the in-memory store used in tests.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

pub use memory::InMemoryStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Mentor, MentorEmbedding};

/// Abstract storage backend.
///
/// # Operations
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`upsert_mentor`](MentorStore::upsert_mentor) | Insert or replace a mentor and its sub-records |
/// | [`get_mentor`](MentorStore::get_mentor) | Fetch one mentor with internships and struggles |
/// | [`list_mentors`](MentorStore::list_mentors) | Full scan, or a limited scan ordered by ID |
/// | [`upsert_embedding`](MentorStore::upsert_embedding) | Store a mentor's embedding, replacing any previous one |
/// | [`get_embedding`](MentorStore::get_embedding) | Fetch one mentor's embedding |
/// | [`list_embeddings`](MentorStore::list_embeddings) | All stored embeddings |
#[async_trait]
pub trait MentorStore: Send + Sync {
    /// Insert or replace a mentor. Sub-records are replaced wholesale.
    async fn upsert_mentor(&self, mentor: &Mentor) -> Result<()>;

    /// Retrieve one mentor by ID.
    async fn get_mentor(&self, id: &str) -> Result<Option<Mentor>>;

    /// Retrieve mentors ordered by ID, up to `limit` when given.
    async fn list_mentors(&self, limit: Option<usize>) -> Result<Vec<Mentor>>;

    /// Store an embedding keyed by `mentor_id`. Re-running overwrites; it never duplicates.
    async fn upsert_embedding(&self, embedding: &MentorEmbedding) -> Result<()>;

    /// Retrieve the embedding for one mentor.
    async fn get_embedding(&self, mentor_id: &str) -> Result<Option<MentorEmbedding>>;

    /// Retrieve every stored embedding, ordered by mentor ID.
    async fn list_embeddings(&self) -> Result<Vec<MentorEmbedding>>;
}
