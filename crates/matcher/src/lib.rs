//! # faqmatch Matcher (`matcher`)
//!
//! ## Purpose
//!
//! `matcher` picks the catalog entry whose stored embedding is closest to a
//! query embedding. It knows nothing about thresholds or fallbacks; the
//! caller decides whether the best score is good enough to answer with.
//!
//! ## Core Types
//!
//! - [`find_best`]: one linear pass over the catalog using
//!   [`semantic::cosine_similarity`].
//! - [`Matcher`]: owns a shared [`catalog::Catalog`] and forwards to
//!   [`find_best`].
//! - [`MatchResult`]: the winning entry (if any), its position, and its score.
//! - [`MatchError`]: raised when the query and an entry disagree on dimension.
//!
//! ## Selection rules
//!
//! - A candidate replaces the current best only when its score is strictly
//!   greater, so ties go to the entry that appears first in the catalog.
//! - An empty catalog yields no entry and a score of [`NO_MATCH_SCORE`]
//!   (negative infinity), which can never clear a threshold.
//! - Zero-norm vectors score [`semantic::UNDEFINED_SIMILARITY`] like any
//!   other low score; they are not an error.
//!
//! ## Example Usage
//!
//! ```
//! use catalog::{Catalog, CatalogEntry};
//! use matcher::find_best;
//!
//! let catalog = Catalog::from_entries(vec![
//!     CatalogEntry::new("Ship in 3 days", vec![1.0, 0.0]),
//!     CatalogEntry::new("Returns within 30 days", vec![0.0, 1.0]),
//! ])
//! .unwrap();
//!
//! let best = find_best(&[0.9, 0.1], &catalog).unwrap();
//! assert_eq!(best.index, Some(0));
//! assert_eq!(best.answer(), Some("Ship in 3 days"));
//! ```

mod engine;
mod types;

pub use engine::{find_best, Matcher};
pub use types::{MatchError, MatchResult, NO_MATCH_SCORE};
