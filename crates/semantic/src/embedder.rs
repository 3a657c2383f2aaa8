use async_trait::async_trait;

use crate::EmbeddingError;

/// Turns text into an embedding vector.
///
/// Implementations own their transport, credentials and retry policy. A
/// successful call always yields one non-empty vector; "no embedding" is an
/// error ([`EmbeddingError::EmptyResult`]), never an empty `Vec`.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}
