//! Where unanswered questions go.
//!
//! The answer path hands every question that misses the confidence threshold
//! to a [`FallbackSink`]. Recording is best-effort: callers spawn it, log a
//! failure and move on.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use thiserror::Error;

/// Airtable's public REST endpoint.
pub const DEFAULT_AIRTABLE_API_BASE: &str = "https://api.airtable.com";

const MAX_ERROR_BODY_CHARS: usize = 512;

/// Errors from recording an unanswered question.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("invalid fallback sink config: {0}")]
    InvalidConfig(String),

    #[error("fallback sink request failed: {0}")]
    Transport(String),

    #[error("fallback sink returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Durable store for questions the catalog could not answer.
#[async_trait]
pub trait FallbackSink: Send + Sync {
    async fn record(&self, question: &str, contact: Option<&str>) -> Result<(), SinkError>;
}

/// Sink that only emits a log event. Used when no backend is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlySink;

#[async_trait]
impl FallbackSink for LogOnlySink {
    async fn record(&self, question: &str, contact: Option<&str>) -> Result<(), SinkError> {
        tracing::info!(
            question,
            contact = contact.unwrap_or_default(),
            "unanswered question"
        );
        Ok(())
    }
}

/// Settings for the Airtable-backed sink.
///
/// `base_id`, `table` and `api_key` usually come from the environment
/// (`AIRTABLE_BASE_ID`, `AIRTABLE_TABLE`, `AIRTABLE_API_KEY`) rather than the
/// config file.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AirtableConfig {
    pub enabled: bool,
    pub api_base: String,
    pub base_id: Option<String>,
    pub table: Option<String>,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Column that receives the question text.
    pub question_field: String,
    /// Column that receives the contact, empty when none was given.
    pub contact_field: String,
    pub timeout_ms: u64,
}

impl Default for AirtableConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: DEFAULT_AIRTABLE_API_BASE.into(),
            base_id: None,
            table: None,
            api_key: None,
            question_field: "Question".into(),
            contact_field: "Email".into(),
            timeout_ms: 10_000,
        }
    }
}

impl fmt::Debug for AirtableConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableConfig")
            .field("enabled", &self.enabled)
            .field("api_base", &self.api_base)
            .field("base_id", &self.base_id)
            .field("table", &self.table)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("question_field", &self.question_field)
            .field("contact_field", &self.contact_field)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}

impl AirtableConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Enabled and every credential present.
    pub fn is_complete(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        self.enabled && present(&self.base_id) && present(&self.table) && present(&self.api_key)
    }

    pub fn validate(&self) -> Result<(), SinkError> {
        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(SinkError::InvalidConfig(format!(
                "api_base must be an http(s) URL, got '{}'",
                self.api_base
            )));
        }
        if self.question_field.trim().is_empty() || self.contact_field.trim().is_empty() {
            return Err(SinkError::InvalidConfig(
                "question_field and contact_field must not be empty".into(),
            ));
        }
        if self.timeout_ms == 0 {
            return Err(SinkError::InvalidConfig(
                "timeout_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Appends one row per unanswered question to an Airtable table.
pub struct AirtableSink {
    client: Client,
    endpoint: Url,
    auth_header: String,
    question_field: String,
    contact_field: String,
}

impl fmt::Debug for AirtableSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AirtableSink")
            .field("endpoint", &self.endpoint.as_str())
            .field("question_field", &self.question_field)
            .field("contact_field", &self.contact_field)
            .finish_non_exhaustive()
    }
}

impl AirtableSink {
    pub fn new(cfg: &AirtableConfig) -> Result<Self, SinkError> {
        cfg.validate()?;

        let require = |value: &Option<String>, name: &str| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .ok_or_else(|| SinkError::InvalidConfig(format!("{name} is required")))
        };
        let base_id = require(&cfg.base_id, "base_id")?;
        let table = require(&cfg.table, "table")?;
        let api_key = require(&cfg.api_key, "api_key")?;

        let mut endpoint = Url::parse(&cfg.api_base)
            .map_err(|e| SinkError::InvalidConfig(format!("api_base: {e}")))?;
        endpoint
            .path_segments_mut()
            .map_err(|()| SinkError::InvalidConfig("api_base cannot carry a path".into()))?
            .pop_if_empty()
            .extend(["v0", base_id.as_str(), table.as_str()]);

        let client = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| SinkError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            auth_header: format!("Bearer {api_key}"),
            question_field: cfg.question_field.clone(),
            contact_field: cfg.contact_field.clone(),
        })
    }

    /// Full URL rows are posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl FallbackSink for AirtableSink {
    async fn record(&self, question: &str, contact: Option<&str>) -> Result<(), SinkError> {
        let mut fields = Map::new();
        fields.insert(self.question_field.clone(), Value::from(question));
        fields.insert(
            self.contact_field.clone(),
            Value::from(contact.unwrap_or_default()),
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, &self.auth_header)
            .json(&json!({ "fields": fields }))
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        tracing::debug!(endpoint = %self.endpoint, "recorded unanswered question");
        Ok(())
    }
}

/// Pick the sink for `cfg`: Airtable when enabled and fully configured,
/// otherwise [`LogOnlySink`].
pub fn build_fallback_sink(cfg: &AirtableConfig) -> Result<Arc<dyn FallbackSink>, SinkError> {
    if !cfg.enabled {
        tracing::info!("fallback sink disabled; unanswered questions are only logged");
        return Ok(Arc::new(LogOnlySink));
    }
    if !cfg.is_complete() {
        tracing::warn!(
            "fallback sink enabled but AIRTABLE_API_KEY, AIRTABLE_BASE_ID or AIRTABLE_TABLE is missing; \
             unanswered questions are only logged"
        );
        return Ok(Arc::new(LogOnlySink));
    }
    let sink = AirtableSink::new(cfg)?;
    tracing::info!(endpoint = %sink.endpoint(), "recording unanswered questions to Airtable");
    Ok(Arc::new(sink))
}
