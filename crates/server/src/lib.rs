//! faq-server - HTTP API for faqmatch
//!
//! Serves one question-answering endpoint for a chat widget or similar
//! client, plus the probes a deployment needs.
//!
//! # Features
//!
//! - **Middleware**: Compression, CORS, request ID tracking, structured logging
//! - **Configuration**: Environment variable and file-based configuration
//! - **Error Handling**: Stable JSON error bodies with a machine-readable `kind`
//! - **Graceful Shutdown**: Proper signal handling for production deployments
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /faq` - `{ "question": "...", "contact"?: "..." }` to `{ "answer": "..." }`
//! - `GET /` - Liveness probe
//! - `GET /health` - Liveness with uptime and catalog size
//! - `GET /metrics` - Prometheus metrics (when enabled)
//!
//! Errors look like `{ "error": "...", "kind": "...", "details"?: {...} }`:
//! `400 invalid_input`, `404 not_found`, `500 embedding_unavailable`,
//! `500 match_failed`.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, install_metrics_recorder, start_server};
pub use state::ServerState;
