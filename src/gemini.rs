//! Generative-model clients.
//!
//! Implements [`GenerativeModel`] for:
//! - **[`GeminiClient`]**: the Gemini REST API (`embedContent` and `generateContent`).
//! - **[`DisabledModel`]**: returns [`ModelError::Disabled`]; used when `model.provider = "disabled"`.
//!
//! Use [`create_model`] to build the configured client once at startup and
//! share it behind an `Arc`.
//!
//! # Missing API key
//!
//! The key is read when the client is built, but its absence is only
//! reported when a call is made, as [`ModelError::MissingConfig`]. The CLI
//! and server can therefore start (and serve health checks, imports, and
//! short-query rejections) without a key.
//!
//! # Retry Strategy
//!
//! With `model.max_retries > 0`, transient errors are retried with
//! exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)
//!
//! The default is no retries; batch refreshes pace themselves with
//! `refresh.delay_ms` instead.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use haven_match_core::model::{GenerativeModel, ModelError};

use crate::config::ModelConfig;

// ============ Disabled ============

/// A model that refuses every call.
pub struct DisabledModel;

#[async_trait]
impl GenerativeModel for DisabledModel {
    fn embedding_model(&self) -> &str {
        "disabled"
    }

    fn generation_model(&self) -> &str {
        "disabled"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, ModelError> {
        Err(ModelError::Disabled)
    }

    async fn generate(
        &self,
        _system_instruction: Option<&str>,
        _prompt: &str,
    ) -> Result<String, ModelError> {
        Err(ModelError::Disabled)
    }
}

// ============ Gemini ============

/// Client for the Gemini REST API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    api_key_env: String,
    embedding_model: String,
    generation_model: String,
    dims: Option<usize>,
    max_retries: u32,
}

impl GeminiClient {
    pub fn new(config: &ModelConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key(),
            api_key_env: config.api_key_env.clone(),
            embedding_model: config.embedding_model.clone(),
            generation_model: config.generation_model.clone(),
            dims: config.dims,
            max_retries: config.max_retries,
        })
    }

    /// Use `key` instead of the one read from the environment.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn key(&self) -> Result<&str, ModelError> {
        self.api_key.as_deref().ok_or_else(|| {
            ModelError::MissingConfig(format!("{} is not set", self.api_key_env))
        })
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!("{}/models/{}:{}", self.api_base, model, method)
    }

    /// POST a JSON body with the configured retry policy and decode the reply.
    async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, ModelError>
    where
        B: Serialize + ?Sized + Sync,
        R: for<'de> Deserialize<'de>,
    {
        let key = self.key()?;
        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tracing::debug!(attempt, ?delay, "retrying model request");
                tokio::time::sleep(delay).await;
            }

            let resp = self
                .http
                .post(url)
                .header("x-goog-api-key", key)
                .json(body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let bytes = response
                            .bytes()
                            .await
                            .map_err(|e| ModelError::Transport(e.to_string()))?;
                        return serde_json::from_slice(&bytes)
                            .map_err(|e| ModelError::Malformed(e.to_string()));
                    }

                    let body_text = response.text().await.unwrap_or_default();
                    let err = ModelError::Http {
                        status: status.as_u16(),
                        body: body_text,
                    };

                    // 429 and 5xx are retryable
                    if status.as_u16() == 429 || status.is_server_error() {
                        last_err = Some(err);
                        continue;
                    }

                    return Err(err);
                }
                Err(e) => {
                    last_err = Some(ModelError::Transport(e.to_string()));
                    continue;
                }
            }
        }

        Err(last_err
            .unwrap_or_else(|| ModelError::Transport("request failed after retries".into())))
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: String,
    content: Content<'a>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    fn generation_model(&self) -> &str {
        &self.generation_model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        let url = self.endpoint(&self.embedding_model, "embedContent");
        let body = EmbedRequest {
            model: format!("models/{}", self.embedding_model),
            content: Content {
                role: None,
                parts: vec![Part { text }],
            },
        };

        let resp: EmbedResponse = self.post(&url, &body).await?;
        let values = resp.embedding.values;

        if values.is_empty() {
            return Err(ModelError::Malformed("embedding has no values".into()));
        }
        if let Some(dims) = self.dims {
            if values.len() != dims {
                return Err(ModelError::Malformed(format!(
                    "expected {} dimensions, got {}",
                    dims,
                    values.len()
                )));
            }
        }
        Ok(values)
    }

    async fn generate(
        &self,
        system_instruction: Option<&str>,
        prompt: &str,
    ) -> Result<String, ModelError> {
        let url = self.endpoint(&self.generation_model, "generateContent");
        let body = GenerateRequest {
            system_instruction: system_instruction.map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            }),
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp: GenerateResponse = self.post(&url, &body).await?;
        let candidate = resp
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Malformed("response has no candidates".into()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        Ok(text)
    }
}

/// Build the configured [`GenerativeModel`].
///
/// | Config Value | Client |
/// |-------------|--------|
/// | `"gemini"` | [`GeminiClient`] |
/// | `"disabled"` | [`DisabledModel`] |
pub fn create_model(config: &ModelConfig) -> anyhow::Result<Arc<dyn GenerativeModel>> {
    if !config.is_enabled() {
        return Ok(Arc::new(DisabledModel));
    }
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::new(config)?)),
        other => anyhow::bail!("Unknown model provider: {}", other),
    }
}
