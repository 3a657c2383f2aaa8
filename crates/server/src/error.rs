use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use faqmatch::{AnswerError, CatalogError, ConfigLoadError, MatchError, SinkError};
use semantic::{EmbeddingError, SimilarityError};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("No question provided")]
    InvalidInput,

    #[error("Embedding unavailable: {0}")]
    EmbeddingUnavailable(#[source] EmbeddingError),

    #[error("Match failed: {0}")]
    Match(#[from] MatchError),

    #[error("Not found")]
    NotFound,

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Pipeline config error: {0}")]
    PipelineConfig(#[from] ConfigLoadError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::InvalidInput => StatusCode::BAD_REQUEST,
            ServerError::NotFound => StatusCode::NOT_FOUND,
            ServerError::EmbeddingUnavailable(_)
            | ServerError::Match(_)
            | ServerError::Catalog(_)
            | ServerError::PipelineConfig(_)
            | ServerError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error kind string
    pub fn kind(&self) -> &'static str {
        match self {
            ServerError::InvalidInput => "invalid_input",
            ServerError::EmbeddingUnavailable(_) => "embedding_unavailable",
            ServerError::Match(_) => "match_failed",
            ServerError::NotFound => "not_found",
            ServerError::Catalog(_) | ServerError::PipelineConfig(_) | ServerError::Config(_) => {
                "config_error"
            }
        }
    }

    /// Message shown to callers. Server-side failures never echo their cause.
    fn public_message(&self) -> &'static str {
        match self {
            ServerError::InvalidInput => "No question provided",
            ServerError::NotFound => "Not found",
            _ => "Failed to process request",
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ServerError::EmbeddingUnavailable(err) => Some(json!({ "cause": err.cause_tag() })),
            ServerError::Match(MatchError::Similarity {
                source: SimilarityError::DimensionMismatch { .. },
                ..
            }) => Some(json!({ "cause": "dimension_mismatch" })),
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %self, "request failed");
        }

        let body = ErrorResponse {
            error: self.public_message().to_string(),
            kind: self.kind().to_string(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<AnswerError> for ServerError {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::InvalidInput => ServerError::InvalidInput,
            AnswerError::EmbeddingUnavailable(cause) => ServerError::EmbeddingUnavailable(cause),
            AnswerError::Match(err) => ServerError::Match(err),
        }
    }
}

impl From<SinkError> for ServerError {
    fn from(err: SinkError) -> Self {
        ServerError::Config(format!("fallback sink: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: ServerError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn invalid_input_body() {
        let (status, body) = body_json(ServerError::InvalidInput).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "error": "No question provided", "kind": "invalid_input" })
        );
    }

    #[tokio::test]
    async fn embedding_failure_hides_provider_details() {
        let err = ServerError::EmbeddingUnavailable(EmbeddingError::Status {
            status: 401,
            body: "invalid api key sk-abc".into(),
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to process request");
        assert_eq!(body["kind"], "embedding_unavailable");
        assert_eq!(body["details"]["cause"], "provider_status");
        assert!(!body.to_string().contains("sk-abc"));
    }

    #[tokio::test]
    async fn match_failure_body() {
        let err = ServerError::Match(MatchError::Similarity {
            index: 0,
            source: SimilarityError::DimensionMismatch {
                left: 3,
                right: 2,
            },
        });
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["kind"], "match_failed");
        assert_eq!(body["details"]["cause"], "dimension_mismatch");
    }

    #[tokio::test]
    async fn not_found_body() {
        let (status, body) = body_json(ServerError::NotFound).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Not found", "kind": "not_found" }));
    }

    #[tokio::test]
    async fn startup_failures_are_config_errors() {
        let catalog = ServerError::from(CatalogError::EmptyAnswer { index: 2 });
        let sink = ServerError::from(SinkError::InvalidConfig("missing base id".into()));
        for err in [catalog, sink] {
            let (status, body) = body_json(err).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                body,
                json!({ "error": "Failed to process request", "kind": "config_error" })
            );
        }
    }

    #[test]
    fn answer_errors_map_one_to_one() {
        assert!(matches!(
            ServerError::from(AnswerError::InvalidInput),
            ServerError::InvalidInput
        ));
        assert!(matches!(
            ServerError::from(AnswerError::EmbeddingUnavailable(EmbeddingError::EmptyResult)),
            ServerError::EmbeddingUnavailable(EmbeddingError::EmptyResult)
        ));
    }
}
