//! faqmatch Semantic Layer
//!
//! Everything in faqmatch that touches embedding vectors lives here:
//!
//! - [`cosine_similarity`] - the one similarity metric the matcher scores with.
//! - [`Embedder`] - the seam between the answer pipeline and whatever turns
//!   text into vectors. Production uses [`ApiEmbedder`]; tests plug in fakes.
//! - [`ApiEmbedder`] - calls a remote embeddings endpoint (OpenAI by default,
//!   Hugging Face and a plain custom shape are supported too) with bounded
//!   timeouts and retries on transient failures.
//!
//! ## Quick example
//!
//! ```no_run
//! use semantic::{cosine_similarity, ApiEmbedder, Embedder, EmbeddingConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = EmbeddingConfig::default().with_api_key("sk-...");
//!     let embedder = ApiEmbedder::new(cfg)?;
//!
//!     let a = embedder.embed("How long does shipping take?").await?;
//!     let b = embedder.embed("When will my order arrive?").await?;
//!     println!("similarity = {}", cosine_similarity(&a, &b)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Zero vectors
//!
//! Cosine similarity is undefined when either side has zero length. Rather
//! than letting a NaN leak into threshold comparisons we return
//! [`UNDEFINED_SIMILARITY`] (`-1.0`), which no valid confidence threshold
//! accepts.

pub mod config;
pub mod error;
pub mod retry;
mod serde_millis;

mod api;
mod embedder;
mod similarity;

pub use crate::api::ApiEmbedder;
pub use crate::config::{ApiProvider, EmbeddingConfig};
pub use crate::embedder::Embedder;
pub use crate::error::{EmbeddingError, SimilarityError};
pub use crate::retry::{execute_with_retry_async, RetryConfig, RetryResult};
pub use crate::similarity::{cosine_similarity, UNDEFINED_SIMILARITY};
