use std::time::Duration;
use thiserror::Error;

/// Failure to compare two embedding vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimilarityError {
    /// The vectors come from models with different output dimensions.
    #[error("embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
}

/// Errors surfaced by an [`Embedder`](crate::Embedder).
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// Configuration is unusable (missing URL, zero timeout, ...).
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),
    /// The request never produced an HTTP response.
    #[error("embedding request failed: {0}")]
    Transport(String),
    /// No response within the configured bound.
    #[error("embedding request timed out after {0:?}")]
    Timeout(Duration),
    /// The provider answered with a non-success status.
    #[error("embedding provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The provider answered 2xx but the body is not an embedding payload.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),
    /// The provider answered with zero embeddings (or an empty vector).
    #[error("embedding provider returned no embeddings")]
    EmptyResult,
}

impl EmbeddingError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            EmbeddingError::Transport(_) | EmbeddingError::Timeout(_) => true,
            EmbeddingError::Status { status, .. } => {
                matches!(status, 408 | 429) || (500..=599).contains(status)
            }
            EmbeddingError::InvalidConfig(_)
            | EmbeddingError::MalformedResponse(_)
            | EmbeddingError::EmptyResult => false,
        }
    }

    /// Short, stable tag for operator-facing diagnostics. Never includes
    /// provider payloads.
    pub fn cause_tag(&self) -> &'static str {
        match self {
            EmbeddingError::InvalidConfig(_) => "invalid_config",
            EmbeddingError::Transport(_) => "transport",
            EmbeddingError::Timeout(_) => "timeout",
            EmbeddingError::Status { .. } => "provider_status",
            EmbeddingError::MalformedResponse(_) => "malformed_response",
            EmbeddingError::EmptyResult => "empty_result",
        }
    }
}
