//! YAML configuration for the answer pipeline.
//!
//! One file describes matching policy, the embedding provider and the
//! fallback sink. Secrets are never expected in the file; they are applied
//! from the environment once at startup with [`FaqConfig::with_env_secrets`].
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "support widget"
//!
//! matching:
//!   threshold: 0.80
//!   fallback_message: "We'll follow up shortly."
//!   embed_timeout_ms: 15000
//!
//! embedding:
//!   provider: "openai"
//!   api_url: "https://api.openai.com/v1/embeddings"
//!   model: "text-embedding-3-small"
//!   timeout_ms: 10000
//!   connect_timeout_ms: 5000
//!   retry:
//!     max_retries: 2
//!     base_delay_ms: 100
//!     max_delay_ms: 2000
//!     jitter: true
//!
//! fallback_sink:
//!   enabled: true
//!   question_field: "Question"
//!   contact_field: "Email"
//!   timeout_ms: 10000
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use semantic::EmbeddingConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::answer::{
    AnswerPolicy, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_EMBED_TIMEOUT, DEFAULT_FALLBACK_MESSAGE,
};
use crate::sink::AirtableConfig;

/// Environment variable holding the embedding provider key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_AIRTABLE_API_KEY: &str = "AIRTABLE_API_KEY";
pub const ENV_AIRTABLE_BASE_ID: &str = "AIRTABLE_BASE_ID";
pub const ENV_AIRTABLE_TABLE: &str = "AIRTABLE_TABLE";

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FaqConfig {
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub fallback_sink: AirtableConfig,
}

impl FaqConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: FaqConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.matching.validate()?;
        self.embedding
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("embedding: {e}")))?;
        self.fallback_sink
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("fallback_sink: {e}")))?;
        Ok(())
    }

    /// Apply secrets from the process environment.
    pub fn with_env_secrets(self) -> Self {
        self.with_secrets_from(|key| std::env::var(key).ok())
    }

    /// Apply secrets from `lookup`. Blank values are ignored; present values
    /// override anything the file set.
    pub fn with_secrets_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_OPENAI_API_KEY) {
            self.embedding = self.embedding.with_api_key(key.trim());
        }
        if let Some(key) = get(ENV_AIRTABLE_API_KEY) {
            self.fallback_sink.api_key = Some(key);
        }
        if let Some(base_id) = get(ENV_AIRTABLE_BASE_ID) {
            self.fallback_sink.base_id = Some(base_id);
        }
        if let Some(table) = get(ENV_AIRTABLE_TABLE) {
            self.fallback_sink.table = Some(table);
        }
        self
    }

    pub fn answer_policy(&self) -> AnswerPolicy {
        self.matching.to_policy()
    }
}

impl Default for FaqConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            matching: MatchingConfig::default(),
            embedding: EmbeddingConfig::default(),
            fallback_sink: AirtableConfig::default(),
        }
    }
}

/// Threshold policy YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchingConfig {
    #[serde(default = "default_threshold")]
    pub threshold: f32,

    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,

    #[serde(default = "default_embed_timeout_ms")]
    pub embed_timeout_ms: u64,
}

impl MatchingConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        // Also keeps the zero-vector sentinel (-1.0) from ever matching.
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(ConfigLoadError::Validation(format!(
                "matching.threshold must be in (0, 1], got {}",
                self.threshold
            )));
        }
        if self.fallback_message.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "matching.fallback_message must not be empty".to_string(),
            ));
        }
        if self.embed_timeout_ms == 0 {
            return Err(ConfigLoadError::Validation(
                "matching.embed_timeout_ms must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_policy(&self) -> AnswerPolicy {
        AnswerPolicy {
            threshold: self.threshold,
            fallback_message: self.fallback_message.clone(),
            embed_timeout: Duration::from_millis(self.embed_timeout_ms),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            fallback_message: default_fallback_message(),
            embed_timeout_ms: default_embed_timeout_ms(),
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}
fn default_fallback_message() -> String {
    DEFAULT_FALLBACK_MESSAGE.to_string()
}
fn default_embed_timeout_ms() -> u64 {
    DEFAULT_EMBED_TIMEOUT.as_millis() as u64
}
