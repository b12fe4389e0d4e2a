//! Result objects returned across the pipeline boundary.
//!
//! Public entry points never return `Err`: every failure becomes a
//! [`MatchError`] inside an outcome, serialized with `success: false`, a
//! machine-readable `code`, and a human-readable message.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::model::ModelError;
use crate::models::Mentor;
use crate::response::ResponseError;

/// Every way a match or refresh can fail.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("query must be at least {min} characters")]
    QueryTooShort { min: usize },

    #[error("missing configuration: {0}")]
    MissingConfig(String),

    #[error("mentor store error: {0}")]
    Store(String),

    #[error("model service error: {0}")]
    Service(String),

    #[error("could not read model response: {0}")]
    Response(#[from] ResponseError),

    #[error("no mentors available")]
    NoCandidates,

    #[error("mentor not found: {0}")]
    MentorNotFound(String),

    #[error("no suitable match found")]
    NoMatch,
}

impl MatchError {
    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::QueryTooShort { .. } => "query_too_short",
            MatchError::MissingConfig(_) => "missing_config",
            MatchError::Store(_) => "store_error",
            MatchError::Service(_) => "service_error",
            MatchError::Response(_) => "bad_response",
            MatchError::NoCandidates => "no_candidates",
            MatchError::MentorNotFound(_) => "not_found",
            MatchError::NoMatch => "no_match",
        }
    }

    /// Wrap a store failure, keeping the full `anyhow` context chain.
    pub fn store(err: anyhow::Error) -> Self {
        MatchError::Store(format!("{:#}", err))
    }
}

impl From<ModelError> for MatchError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::MissingConfig(what) => MatchError::MissingConfig(what),
            other => MatchError::Service(other.to_string()),
        }
    }
}

/// Outcome of `find_best_mentor`.
#[derive(Debug)]
pub enum MatchOutcome {
    /// Mentors in ranked order; never empty.
    Matched(Vec<Mentor>),
    Failed(MatchError),
}

impl MatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }

    pub fn mentors(&self) -> &[Mentor] {
        match self {
            MatchOutcome::Matched(mentors) => mentors,
            MatchOutcome::Failed(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&MatchError> {
        match self {
            MatchOutcome::Matched(_) => None,
            MatchOutcome::Failed(e) => Some(e),
        }
    }
}

impl From<Result<Vec<Mentor>, MatchError>> for MatchOutcome {
    fn from(result: Result<Vec<Mentor>, MatchError>) -> Self {
        match result {
            Ok(mentors) if mentors.is_empty() => MatchOutcome::Failed(MatchError::NoMatch),
            Ok(mentors) => MatchOutcome::Matched(mentors),
            Err(e) => MatchOutcome::Failed(e),
        }
    }
}

impl Serialize for MatchOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MatchOutcome::Matched(mentors) => {
                let mut s = serializer.serialize_struct("MatchOutcome", 2)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("mentors", mentors)?;
                s.end()
            }
            MatchOutcome::Failed(err) => {
                let mut s = serializer.serialize_struct("MatchOutcome", 3)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("code", err.code())?;
                s.serialize_field("message", &err.to_string())?;
                s.end()
            }
        }
    }
}

/// Outcome of refreshing one mentor's embedding.
#[derive(Debug)]
pub enum RefreshOutcome {
    Updated,
    Failed(MatchError),
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RefreshOutcome::Updated)
    }
}

impl From<Result<(), MatchError>> for RefreshOutcome {
    fn from(result: Result<(), MatchError>) -> Self {
        match result {
            Ok(()) => RefreshOutcome::Updated,
            Err(e) => RefreshOutcome::Failed(e),
        }
    }
}

impl Serialize for RefreshOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RefreshOutcome::Updated => {
                let mut s = serializer.serialize_struct("RefreshOutcome", 1)?;
                s.serialize_field("success", &true)?;
                s.end()
            }
            RefreshOutcome::Failed(err) => {
                let mut s = serializer.serialize_struct("RefreshOutcome", 3)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("code", err.code())?;
                s.serialize_field("error", &err.to_string())?;
                s.end()
            }
        }
    }
}
