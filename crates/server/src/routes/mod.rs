//! API route handlers
//!
//! - `faq`: question answering
//! - `health`: liveness and Prometheus metrics

pub mod faq;
pub mod health;

use crate::error::ServerError;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Liveness probe (GET /)
pub async fn root() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
