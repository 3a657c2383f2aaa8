use catalog::CatalogEntry;
use semantic::SimilarityError;
use thiserror::Error;

/// Score reported when there was nothing to compare against.
pub const NO_MATCH_SCORE: f32 = f32::NEG_INFINITY;

/// Outcome of a best-match scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult<'a> {
    /// Winning entry, `None` only for an empty catalog.
    pub entry: Option<&'a CatalogEntry>,
    /// Position of the winning entry in the catalog.
    pub index: Option<usize>,
    pub score: f32,
}

impl<'a> MatchResult<'a> {
    pub(crate) fn empty() -> Self {
        Self {
            entry: None,
            index: None,
            score: NO_MATCH_SCORE,
        }
    }

    pub fn answer(&self) -> Option<&'a str> {
        self.entry.map(|entry| entry.answer.as_str())
    }

    /// True when the score reaches `threshold` (inclusive) and an entry exists.
    pub fn meets(&self, threshold: f32) -> bool {
        self.entry.is_some() && self.score >= threshold
    }
}

/// Errors produced by the matching layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MatchError {
    /// Query and catalog embeddings come from different models or settings.
    #[error("catalog entry {index}: {source}")]
    Similarity {
        index: usize,
        #[source]
        source: SimilarityError,
    },
}

impl MatchError {
    /// Position of the catalog entry that could not be compared.
    pub fn index(&self) -> usize {
        match self {
            MatchError::Similarity { index, .. } => *index,
        }
    }
}
