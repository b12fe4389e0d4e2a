//! Live matching: free-text query in, ranked mentors out.
//!
//! [`Matcher`] owns the shared store and model handles and exposes the two
//! caller-facing operations of the live path:
//!
//! - [`Matcher::find_best_mentor`] returns a [`MatchOutcome`] and never an `Err`.
//! - [`Matcher::generate_bio_summary`] returns a one-line summary, or a
//!   truncated fallback.
//!
//! # Flow (ranking strategy)
//!
//! ```text
//! query ─▶ length check ─▶ list_mentors(candidate_limit) ─▶ MentorSummary[]
//!       ─▶ ranking prompt ─▶ model.generate ─▶ parse_ranked_ids ─▶ resolve_ranked
//! ```
//!
//! With `matching.strategy = "embedding"` the prompt steps are replaced by
//! `model.embed(query)` and cosine ranking over the stored mentor embeddings
//! written by the same embedding model. Embeddings left over from another
//! model are ignored until `haven embed pending` rewrites them.

use std::sync::Arc;

use haven_match_core::corpus::normalize_whitespace;
use haven_match_core::matching::{rank_by_similarity, resolve_ranked};
use haven_match_core::model::GenerativeModel;
use haven_match_core::models::Mentor;
use haven_match_core::outcome::{MatchError, MatchOutcome};
use haven_match_core::prompt::{
    bio_fallback, build_bio_summary_prompt, build_ranking_prompt, ranking_instruction,
    MentorSummary,
};
use haven_match_core::response::parse_ranked_ids;
use haven_match_core::store::MentorStore;

use crate::config::{Config, MatchStrategy, MatchingConfig, SummaryConfig};

pub struct Matcher {
    store: Arc<dyn MentorStore>,
    model: Arc<dyn GenerativeModel>,
    matching: MatchingConfig,
    summary: SummaryConfig,
}

impl Matcher {
    pub fn new(
        store: Arc<dyn MentorStore>,
        model: Arc<dyn GenerativeModel>,
        matching: MatchingConfig,
        summary: SummaryConfig,
    ) -> Self {
        Self {
            store,
            model,
            matching,
            summary,
        }
    }

    pub fn from_config(
        config: &Config,
        store: Arc<dyn MentorStore>,
        model: Arc<dyn GenerativeModel>,
    ) -> Self {
        Self::new(
            store,
            model,
            config.matching.clone(),
            config.summary.clone(),
        )
    }

    /// Find the best mentors for a student's free-text query.
    ///
    /// Queries shorter than `matching.min_query_chars` (after trimming) are
    /// rejected before the store or model is touched.
    pub async fn find_best_mentor(&self, query: &str) -> MatchOutcome {
        let outcome = MatchOutcome::from(self.try_match(query).await);

        match &outcome {
            MatchOutcome::Matched(mentors) => {
                tracing::info!(count = mentors.len(), "matched mentors");
            }
            MatchOutcome::Failed(err @ MatchError::QueryTooShort { .. })
            | MatchOutcome::Failed(err @ MatchError::NoCandidates)
            | MatchOutcome::Failed(err @ MatchError::NoMatch) => {
                tracing::info!(code = err.code(), "no mentor match: {}", err);
            }
            MatchOutcome::Failed(err) => {
                tracing::error!(code = err.code(), "mentor match failed: {}", err);
            }
        }

        outcome
    }

    async fn try_match(&self, query: &str) -> Result<Vec<Mentor>, MatchError> {
        let query = query.trim();
        if query.chars().count() < self.matching.min_query_chars {
            return Err(MatchError::QueryTooShort {
                min: self.matching.min_query_chars,
            });
        }

        let candidates = self
            .store
            .list_mentors(self.matching.candidate_limit)
            .await
            .map_err(MatchError::store)?;

        if candidates.is_empty() {
            return Err(MatchError::NoCandidates);
        }

        match self.matching.strategy {
            MatchStrategy::Ranking => self.rank_with_prompt(query, &candidates).await,
            MatchStrategy::Embedding => self.rank_with_embeddings(query, &candidates).await,
        }
    }

    async fn rank_with_prompt(
        &self,
        query: &str,
        candidates: &[Mentor],
    ) -> Result<Vec<Mentor>, MatchError> {
        let summaries: Vec<MentorSummary> =
            candidates.iter().map(MentorSummary::from_mentor).collect();
        let prompt = build_ranking_prompt(query, &summaries)
            .map_err(|e| MatchError::Service(format!("could not encode ranking prompt: {}", e)))?;
        let instruction = ranking_instruction(self.matching.top_k);

        tracing::debug!(
            model = self.model.generation_model(),
            candidates = candidates.len(),
            "requesting mentor ranking"
        );
        let reply = self.model.generate(Some(&instruction), &prompt).await?;
        let ids = parse_ranked_ids(&reply)?;
        tracing::debug!(?ids, "model ranked mentors");

        Ok(resolve_ranked(&ids, candidates, self.matching.top_k))
    }

    async fn rank_with_embeddings(
        &self,
        query: &str,
        candidates: &[Mentor],
    ) -> Result<Vec<Mentor>, MatchError> {
        let query_vec = self.model.embed(query).await?;
        let embeddings = self
            .store
            .list_embeddings()
            .await
            .map_err(MatchError::store)?;

        let ranked = rank_by_similarity(
            &query_vec,
            self.model.embedding_model(),
            &embeddings,
            candidates,
            self.matching.top_k,
        );
        Ok(ranked
            .into_iter()
            .map(|(mentor, score)| {
                tracing::debug!(mentor_id = %mentor.id, score, "similarity match");
                mentor
            })
            .collect())
    }

    /// Compress a bio into one short sentence.
    ///
    /// Falls back to the first `summary.fallback_chars` characters plus
    /// `...` on any model failure or an empty reply. An empty bio yields an
    /// empty summary without calling the model.
    pub async fn generate_bio_summary(&self, bio: &str) -> String {
        let bio = bio.trim();
        if bio.is_empty() {
            return String::new();
        }

        let prompt = build_bio_summary_prompt(bio, self.summary.max_words);
        match self.model.generate(None, &prompt).await {
            Ok(reply) => {
                let line = normalize_whitespace(&reply);
                let line = line.trim_matches('"').trim();
                if line.is_empty() {
                    bio_fallback(bio, self.summary.fallback_chars)
                } else {
                    line.to_string()
                }
            }
            Err(e) => {
                tracing::warn!("bio summary failed, using fallback: {}", e);
                bio_fallback(bio, self.summary.fallback_chars)
            }
        }
    }
}
