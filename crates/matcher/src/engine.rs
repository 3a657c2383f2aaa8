use std::sync::Arc;

use catalog::Catalog;
use semantic::cosine_similarity;

use crate::types::{MatchError, MatchResult};

/// Scan `catalog` once and return the entry most similar to `query`.
///
/// Ties keep the earlier entry. A dimension mismatch between the query and
/// any entry aborts the scan.
pub fn find_best<'a>(query: &[f32], catalog: &'a Catalog) -> Result<MatchResult<'a>, MatchError> {
    let mut best = MatchResult::empty();

    for (index, entry) in catalog.entries().iter().enumerate() {
        let score = cosine_similarity(query, &entry.embedding)
            .map_err(|source| MatchError::Similarity { index, source })?;

        if best.entry.is_none() || score > best.score {
            best = MatchResult {
                entry: Some(entry),
                index: Some(index),
                score,
            };
        }
    }

    Ok(best)
}

/// Matcher bound to one shared, read-only catalog.
#[derive(Debug, Clone)]
pub struct Matcher {
    catalog: Arc<Catalog>,
}

impl Matcher {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn find_best(&self, query: &[f32]) -> Result<MatchResult<'_>, MatchError> {
        find_best(query, &self.catalog)
    }
}
