//! Embedding refresh: corpus → embedding → upsert.
//!
//! - [`Refresher::update_mentor_embedding`] refreshes one mentor.
//! - [`Refresher::refresh_all`] walks every mentor in sequence.
//! - [`Refresher::refresh_pending`] walks only mentors whose stored
//!   embedding is missing or stale.
//!
//! Batches pause `refresh.delay_ms` between mentors to stay under the
//! model's rate limit. A failing mentor is logged and recorded in the
//! [`BatchReport`], and the batch moves on to the next one.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use haven_match_core::corpus::build_corpus;
use haven_match_core::embedding::{hash_text, truncate_chars};
use haven_match_core::model::GenerativeModel;
use haven_match_core::models::{Mentor, MentorEmbedding};
use haven_match_core::outcome::{MatchError, RefreshOutcome};
use haven_match_core::store::MentorStore;

use crate::config::{Config, RefreshConfig};

pub struct Refresher {
    store: Arc<dyn MentorStore>,
    model: Arc<dyn GenerativeModel>,
    config: RefreshConfig,
}

/// One mentor that could not be refreshed.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub mentor_id: String,
    pub name: String,
    pub error: String,
}

/// Summary of a batch refresh.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// `false` only when the batch could not start (e.g. the mentor scan failed).
    pub success: bool,
    pub processed: usize,
    pub succeeded: usize,
    pub failed: Vec<BatchFailure>,
    /// One line per mentor, in processing order.
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchReport {
    fn aborted(err: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            ..Self::default()
        }
    }
}

impl Refresher {
    pub fn new(
        store: Arc<dyn MentorStore>,
        model: Arc<dyn GenerativeModel>,
        config: RefreshConfig,
    ) -> Self {
        Self {
            store,
            model,
            config,
        }
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn MentorStore>,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        Self::new(store, model, config.refresh.clone())
    }

    /// The text that gets embedded for `mentor`: its corpus, cut to `max_input_chars`.
    pub fn source_text(&self, mentor: &Mentor) -> String {
        let corpus = build_corpus(mentor);
        truncate_chars(&corpus, self.config.max_input_chars).to_string()
    }

    /// Fetch one mentor, embed its corpus, and upsert the result.
    pub async fn update_mentor_embedding(&self, mentor_id: &str) -> RefreshOutcome {
        let result = self.try_update(mentor_id).await;
        if let Err(e) = &result {
            tracing::error!(mentor_id, code = e.code(), "embedding refresh failed: {}", e);
        }
        RefreshOutcome::from(result)
    }

    async fn try_update(&self, mentor_id: &str) -> Result<(), MatchError> {
        let mentor = self
            .store
            .get_mentor(mentor_id)
            .await
            .map_err(MatchError::store)?
            .ok_or_else(|| MatchError::MentorNotFound(mentor_id.to_string()))?;

        self.embed_mentor(&mentor).await
    }

    async fn embed_mentor(&self, mentor: &Mentor) -> Result<(), MatchError> {
        let text = self.source_text(mentor);
        let vector = self.model.embed(&text).await?;

        let record = MentorEmbedding {
            mentor_id: mentor.id.clone(),
            source_hash: hash_text(&text),
            source_text: text,
            embedding: vector,
            model: self.model.embedding_model().to_string(),
            updated_at: chrono::Utc::now().timestamp(),
        };

        self.store
            .upsert_embedding(&record)
            .await
            .map_err(MatchError::store)
    }

    /// Refresh every mentor, one at a time.
    pub async fn refresh_all(&self) -> BatchReport {
        let mentors = match self.store.list_mentors(None).await {
            Ok(m) => m,
            Err(e) => return BatchReport::aborted(MatchError::store(e)),
        };

        if mentors.is_empty() {
            return BatchReport::aborted(MatchError::NoCandidates);
        }

        self.run_batch(&mentors).await
    }

    /// Mentors whose embedding is missing, from another model, or built from different text.
    pub async fn find_pending(&self) -> anyhow::Result<Vec<Mentor>> {
        let mentors = self.store.list_mentors(None).await?;
        let model = self.model.embedding_model();

        let mut pending = Vec::new();
        for mentor in mentors {
            let current_hash = hash_text(&self.source_text(&mentor));
            let fresh = self
                .store
                .get_embedding(&mentor.id)
                .await?
                .map(|e| e.model == model && e.source_hash == current_hash)
                .unwrap_or(false);

            if !fresh {
                pending.push(mentor);
            }
        }
        Ok(pending)
    }

    /// Refresh only the mentors returned by [`find_pending`](Self::find_pending).
    pub async fn refresh_pending(&self) -> BatchReport {
        match self.find_pending().await {
            Ok(pending) => self.run_batch(&pending).await,
            Err(e) => BatchReport::aborted(MatchError::store(e)),
        }
    }

    async fn run_batch(&self, mentors: &[Mentor]) -> BatchReport {
        let delay = Duration::from_millis(self.config.delay_ms);
        let mut report = BatchReport {
            success: true,
            ..BatchReport::default()
        };

        for (i, mentor) in mentors.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            report.processed += 1;
            match self.embed_mentor(mentor).await {
                Ok(()) => {
                    tracing::info!(mentor_id = %mentor.id, "embedded {}", mentor.name);
                    report.succeeded += 1;
                    report.logs.push(format!("ok: {}", mentor.name));
                }
                Err(e) => {
                    tracing::warn!(mentor_id = %mentor.id, code = e.code(), "embedding failed for {}: {}", mentor.name, e);
                    report.logs.push(format!("failed: {} ({})", mentor.name, e));
                    report.failed.push(BatchFailure {
                        mentor_id: mentor.id.clone(),
                        name: mentor.name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        report
    }
}
