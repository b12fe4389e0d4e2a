//! Generative-model abstraction.
//!
//! [`GenerativeModel`] covers both call shapes the pipeline needs:
//! embedding a corpus string, and generating text for a ranking or
//! summary prompt. Concrete clients (Gemini over HTTP, the disabled
//! stand-in) live in the `haven-match` app crate; tests supply scripted
//! implementations.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a model client can report.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Required configuration (usually the API key) is absent.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// The provider is configured as `disabled`.
    #[error("model provider is disabled")]
    Disabled,

    /// The service answered with a non-success status.
    #[error("model API error {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("model request failed: {0}")]
    Transport(String),

    /// The service answered, but not in the expected shape.
    #[error("malformed model response: {0}")]
    Malformed(String),
}

/// A hosted generative-language model.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Identifier of the embedding model (e.g. `"embedding-001"`).
    fn embedding_model(&self) -> &str;

    /// Identifier of the generation model (e.g. `"gemini-2.5-pro"`).
    fn generation_model(&self) -> &str;

    /// Embed one text into a fixed-length vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError>;

    /// Generate text for `prompt`, optionally steered by a system instruction.
    async fn generate(
        &self,
        system_instruction: Option<&str>,
        prompt: &str,
    ) -> Result<String, ModelError>;
}
