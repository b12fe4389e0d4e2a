//! Shared fixtures for the integration suites.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use haven_match::config::{MatchStrategy, MatchingConfig, RefreshConfig, SummaryConfig};
use haven_match_core::model::{GenerativeModel, ModelError};
use haven_match_core::models::Mentor;

/// Words that get their own dimension in [`keyword_vector`].
pub const KEYWORDS: &[&str] = &["resume", "google", "robotics", "anxiety", "research"];

/// Deterministic bag-of-keywords embedding with a constant bias dimension.
pub fn keyword_vector(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut v: Vec<f32> = KEYWORDS
        .iter()
        .map(|k| lower.matches(k).count() as f32)
        .collect();
    v.push(1.0);
    v
}

/// A model whose replies are fixed up front. Counts every call.
#[derive(Default)]
pub struct ScriptedModel {
    /// Reply to `generate`; `None` answers with an HTTP 503.
    pub reply: Option<String>,
    /// Every call fails with a missing API key.
    pub missing_key: bool,
    /// `embed` fails for any text containing this marker.
    pub fail_embed_on: Option<String>,
    pub generate_calls: AtomicUsize,
    pub embed_calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn without_key() -> Self {
        Self {
            missing_key: true,
            ..Self::default()
        }
    }

    pub fn failing_embed_on(marker: &str) -> Self {
        Self {
            fail_embed_on: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn embed_calls(&self) -> usize {
        self.embed_calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    fn check_key(&self) -> Result<(), ModelError> {
        if self.missing_key {
            return Err(ModelError::MissingConfig("GEMINI_API_KEY is not set".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    fn embedding_model(&self) -> &str {
        "keyword-test"
    }

    fn generation_model(&self) -> &str {
        "scripted"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        self.embed_calls.fetch_add(1, Ordering::SeqCst);
        self.check_key()?;
        if let Some(marker) = &self.fail_embed_on {
            if text.contains(marker.as_str()) {
                return Err(ModelError::Http {
                    status: 500,
                    body: "internal error".into(),
                });
            }
        }
        Ok(keyword_vector(text))
    }

    async fn generate(
        &self,
        _system_instruction: Option<&str>,
        prompt: &str,
    ) -> Result<String, ModelError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.check_key()?;
        self.reply.clone().ok_or(ModelError::Http {
            status: 503,
            body: "unavailable".into(),
        })
    }
}

pub fn matching_config(strategy: MatchStrategy) -> MatchingConfig {
    MatchingConfig {
        strategy,
        ..MatchingConfig::default()
    }
}

pub fn summary_config() -> SummaryConfig {
    SummaryConfig::default()
}

pub fn refresh_config() -> RefreshConfig {
    RefreshConfig {
        delay_ms: 0,
        ..RefreshConfig::default()
    }
}

/// Three mentors with distinct strengths: Google resume help, robotics, exam anxiety.
pub fn mentors() -> Vec<Mentor> {
    serde_json::from_value(json!([
        {
            "id": "m1",
            "name": "Priya Sharma",
            "user_type": "senior",
            "bio_for_profile": "Final-year CS student, interned twice in big tech.",
            "mentoring_style": "Direct and practical",
            "confident_queries": ["Resume Review", "Interview prep"],
            "mentor_internships": [
                { "company_org": "Google", "role_position": "Software Engineering Intern" }
            ],
            "mentor_struggles": [
                { "area": "Imposter syndrome", "situation_description": "Felt behind everyone in first year" }
            ],
            "groups": ["Coding Club"]
        },
        {
            "id": "m2",
            "name": "Daniel Okafor",
            "user_type": "alumni",
            "bio_for_profile": "Led the college robotics team to nationals.",
            "confident_queries": ["Hardware projects"],
            "mentor_internships": [
                { "company_org": "Bosch", "role_position": "Embedded Intern" }
            ],
            "groups": ["Robotics Club"]
        },
        {
            "id": "m3",
            "name": "Dr. Mei Chen",
            "user_type": "professor",
            "bio_for_profile": "Teaches statistics and supervises undergraduate research.",
            "confident_queries": ["Research", "Grad school"],
            "mentor_struggles": [
                { "area": "Anxiety", "situation_description": "Exam stress during my own degree", "advice_to_junior": "Sleep first, revise second" }
            ]
        }
    ]))
    .unwrap()
}
