use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems found while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The document is not a JSON array of entries, or an entry is missing a field.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog entry {index} has an empty answer")]
    EmptyAnswer { index: usize },

    #[error("catalog entry {index} has an empty embedding")]
    EmptyEmbedding { index: usize },

    #[error("catalog entry {index} has a non-finite embedding value at position {position}")]
    NonFiniteValue { index: usize, position: usize },

    #[error("catalog entry {index} has embedding dimension {found}, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}
