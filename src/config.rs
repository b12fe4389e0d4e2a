//! TOML configuration parsing and validation.
//!
//! Every section except `[db]` has defaults, so a minimal file only needs
//! the database path:
//!
//! ```toml
//! [db]
//! path = "./data/haven.sqlite"
//! ```
//!
//! The API key is never written in the file; `[model].api_key_env` names
//! the environment variable it is read from (default `GEMINI_API_KEY`).

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub matching: MatchingConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_generation_model")]
    pub generation_model: String,
    /// Expected vector length; responses of any other length are rejected.
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub max_retries: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_base: default_api_base(),
            api_key_env: default_api_key_env(),
            embedding_model: default_embedding_model(),
            generation_model: default_generation_model(),
            dims: None,
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
        }
    }
}

impl ModelConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}
fn default_embedding_model() -> String {
    "embedding-001".to_string()
}
fn default_generation_model() -> String {
    "gemini-2.5-pro".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

/// How live matches are produced.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// The model reads the candidate list and returns ranked IDs.
    #[default]
    Ranking,
    /// Cosine similarity between the query embedding and stored mentor embeddings.
    Embedding,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatchingConfig {
    #[serde(default)]
    pub strategy: MatchStrategy,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,
    /// Cap on mentors fetched per query; unset means a full scan.
    #[serde(default)]
    pub candidate_limit: Option<usize>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            strategy: MatchStrategy::default(),
            top_k: default_top_k(),
            min_query_chars: default_min_query_chars(),
            candidate_limit: None,
        }
    }
}

fn default_top_k() -> usize {
    2
}
fn default_min_query_chars() -> usize {
    10
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshConfig {
    /// Pause between per-mentor calls in a batch refresh.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
    /// Corpus text is cut to this many characters before embedding.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

fn default_delay_ms() -> u64 {
    5000
}
fn default_max_input_chars() -> usize {
    8000
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummaryConfig {
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    #[serde(default = "default_fallback_chars")]
    pub fallback_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_words: default_max_words(),
            fallback_chars: default_fallback_chars(),
        }
    }
}

fn default_max_words() -> usize {
    15
}
fn default_fallback_chars() -> usize {
    50
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7341".to_string()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    match config.model.provider.as_str() {
        "gemini" | "disabled" => {}
        other => anyhow::bail!(
            "Unknown model provider: '{}'. Must be gemini or disabled.",
            other
        ),
    }

    if config.model.dims == Some(0) {
        anyhow::bail!("model.dims must be > 0 when set");
    }

    if config.matching.top_k == 0 {
        anyhow::bail!("matching.top_k must be >= 1");
    }

    if config.matching.min_query_chars == 0 {
        anyhow::bail!("matching.min_query_chars must be >= 1");
    }

    if config.matching.candidate_limit == Some(0) {
        anyhow::bail!("matching.candidate_limit must be >= 1 when set");
    }

    if config.refresh.max_input_chars == 0 {
        anyhow::bail!("refresh.max_input_chars must be > 0");
    }

    Ok(())
}
