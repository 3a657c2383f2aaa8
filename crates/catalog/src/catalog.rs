use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::CatalogError;

/// One known answer and the embedding it is matched by.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CatalogEntry {
    /// Text returned to the caller when this entry wins.
    pub answer: String,
    /// Pre-computed embedding, same model and dimension as query embeddings.
    pub embedding: Vec<f32>,
    /// Canonical question the embedding was computed from, if the source has it.
    #[serde(default)]
    pub question: Option<String>,
}

impl CatalogEntry {
    pub fn new(answer: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            answer: answer.into(),
            embedding,
            question: None,
        }
    }

    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }
}

/// Validated, immutable, ordered collection of [`CatalogEntry`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
    dimension: Option<usize>,
}

impl Catalog {
    /// Read and validate a catalog from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_reader(BufReader::new(file))?;
        tracing::info!(
            path = %path.display(),
            entries = catalog.len(),
            dimension = ?catalog.dimension(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_reader(reader)?;
        Self::from_entries(entries)
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Self::from_entries(entries)
    }

    /// Validate already-built entries. An empty list is accepted; every
    /// query against it falls through to the unanswered path.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Result<Self, CatalogError> {
        let mut dimension = None;

        for (index, entry) in entries.iter().enumerate() {
            if entry.answer.trim().is_empty() {
                return Err(CatalogError::EmptyAnswer { index });
            }
            if entry.embedding.is_empty() {
                return Err(CatalogError::EmptyEmbedding { index });
            }
            if let Some(position) = entry.embedding.iter().position(|v| !v.is_finite()) {
                return Err(CatalogError::NonFiniteValue { index, position });
            }

            let found = entry.embedding.len();
            match dimension {
                None => dimension = Some(found),
                Some(expected) if expected != found => {
                    return Err(CatalogError::DimensionMismatch {
                        index,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
        }

        if entries.is_empty() {
            tracing::warn!("catalog is empty; every question will take the fallback path");
        }

        Ok(Self { entries, dimension })
    }

    /// Entries in source order. Order matters: the matcher breaks ties in
    /// favour of the earlier entry.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Shared embedding dimension, `None` for an empty catalog.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }
}
