//! Workspace umbrella crate for faqmatch.
//!
//! faqmatch answers free-text questions from a fixed catalog of pre-embedded
//! question/answer pairs. This crate wires the member crates into one
//! [`AnswerService`]:
//!
//! 1. the question is embedded through a [`semantic::Embedder`],
//! 2. [`matcher::find_best`] picks the closest [`catalog::CatalogEntry`],
//! 3. a best score at or above the [`AnswerPolicy`] threshold answers,
//!    anything lower returns the fallback message and hands the question to a
//!    [`FallbackSink`] in the background.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use faqmatch::{AnswerService, FaqConfig, Query, build_fallback_sink};
//! use faqmatch::{ApiEmbedder, Catalog};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FaqConfig::from_file("faqmatch.yaml")?.with_env_secrets();
//!     let catalog = Arc::new(Catalog::load("data/faq.json")?);
//!     let embedder = Arc::new(ApiEmbedder::new(config.embedding.clone())?);
//!     let sink = build_fallback_sink(&config.fallback_sink)?;
//!
//!     let service = AnswerService::new(catalog, embedder, sink, config.answer_policy());
//!     let answer = service.answer(Query::new("How long does shipping take?")).await?;
//!     println!("{}", answer.text);
//!     Ok(())
//! }
//! ```

pub mod config;

mod answer;
mod sink;

pub use catalog::{Catalog, CatalogEntry, CatalogError};
pub use matcher::{MatchError, MatchResult, Matcher, NO_MATCH_SCORE, find_best};
pub use semantic::{
    ApiEmbedder, ApiProvider, Embedder, EmbeddingConfig, EmbeddingError, RetryConfig,
    SimilarityError, UNDEFINED_SIMILARITY, cosine_similarity,
};

pub use crate::answer::{
    Answer, AnswerError, AnswerPolicy, AnswerService, DEFAULT_CONFIDENCE_THRESHOLD,
    DEFAULT_EMBED_TIMEOUT, DEFAULT_FALLBACK_MESSAGE, Outcome, Query,
};
pub use crate::config::{ConfigLoadError, FaqConfig, MatchingConfig};
pub use crate::sink::{
    AirtableConfig, AirtableSink, DEFAULT_AIRTABLE_API_BASE, FallbackSink, LogOnlySink, SinkError,
    build_fallback_sink,
};
