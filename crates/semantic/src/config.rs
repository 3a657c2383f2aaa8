use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;
use crate::EmbeddingError;

/// OpenAI's embeddings endpoint, the provider the bundled catalog was embedded with.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/embeddings";
/// Model the bundled catalog was embedded with. Queries must use the same model.
pub const DEFAULT_MODEL: &str = "text-embedding-3-small";

/// Request/response shape spoken by the embeddings endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    /// `{"input", "model"}` -> `{"data": [{"embedding": [...]}]}`
    #[default]
    #[serde(alias = "gpt")]
    OpenAi,
    /// `{"inputs"}` -> `[[...]]` or `[...]`
    #[serde(alias = "hf")]
    HuggingFace,
    /// `{"text"}` -> `{"embedding": [...]}` or `{"embeddings": [[...]]}`
    Custom,
}

/// Runtime configuration for [`ApiEmbedder`](crate::ApiEmbedder).
///
/// Assembled once at startup; the embedder never reads the environment itself.
///
/// ```
/// use semantic::{ApiProvider, EmbeddingConfig};
///
/// let cfg = EmbeddingConfig {
///     provider: ApiProvider::HuggingFace,
///     api_url: "https://router.huggingface.co/hf-inference/models/BAAI/bge-small-en-v1.5".into(),
///     ..Default::default()
/// }
/// .with_api_key("hf_xxx");
///
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: ApiProvider,
    /// Full URL of the embeddings endpoint.
    pub api_url: String,
    /// Model name sent to providers that take one in the payload.
    pub model: String,
    /// Value of the `Authorization` header, e.g. `"Bearer sk-..."`.
    #[serde(skip_serializing)]
    pub api_auth_header: Option<String>,
    /// Per-request timeout enforced by the HTTP client.
    #[serde(with = "crate::serde_millis", rename = "timeout_ms")]
    pub timeout: Duration,
    /// TCP/TLS connect timeout.
    #[serde(with = "crate::serde_millis", rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,
    pub retry: RetryConfig,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ApiProvider::OpenAi,
            api_url: DEFAULT_API_URL.into(),
            model: DEFAULT_MODEL.into(),
            api_auth_header: None,
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            retry: RetryConfig::default(),
        }
    }
}

impl fmt::Debug for EmbeddingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingConfig")
            .field("provider", &self.provider)
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field(
                "api_auth_header",
                &self.api_auth_header.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl EmbeddingConfig {
    /// Set a bearer token as the `Authorization` header.
    pub fn with_api_key(mut self, key: impl AsRef<str>) -> Self {
        self.api_auth_header = Some(format!("Bearer {}", key.as_ref()));
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(EmbeddingError::InvalidConfig(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        if self.provider == ApiProvider::OpenAi && self.model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig(
                "model is required for the openai provider".into(),
            ));
        }
        if self.timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(EmbeddingError::InvalidConfig(
                "timeouts must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
