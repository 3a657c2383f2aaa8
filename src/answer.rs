use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use catalog::Catalog;
use matcher::{MatchError, Matcher};
use semantic::{Embedder, EmbeddingError};
use thiserror::Error;

use crate::sink::FallbackSink;

/// Minimum cosine similarity for a catalog answer to be returned.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.80;
/// Reply sent when no catalog entry is similar enough.
pub const DEFAULT_FALLBACK_MESSAGE: &str = "We'll follow up shortly.";
/// Upper bound on one embedding call, retries included.
pub const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(15);

/// Threshold and fallback behaviour of an [`AnswerService`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerPolicy {
    /// Inclusive: a best score equal to the threshold answers. Lies in
    /// `(0, 1]`; [`AnswerService::new`] clamps anything outside that range.
    pub threshold: f32,
    pub fallback_message: String,
    pub embed_timeout: Duration,
}

impl Default for AnswerPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.into(),
            embed_timeout: DEFAULT_EMBED_TIMEOUT,
        }
    }
}

impl AnswerPolicy {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_fallback_message(mut self, message: impl Into<String>) -> Self {
        self.fallback_message = message.into();
        self
    }

    pub fn with_embed_timeout(mut self, timeout: Duration) -> Self {
        self.embed_timeout = timeout;
        self
    }

    /// Keep the threshold in `(0, 1]` so the undefined-similarity score of
    /// `-1.0` can never match. NaN falls back to the default.
    fn clamped(mut self) -> Self {
        let threshold = if self.threshold.is_nan() {
            DEFAULT_CONFIDENCE_THRESHOLD
        } else {
            self.threshold.clamp(f32::MIN_POSITIVE, 1.0)
        };
        if threshold != self.threshold {
            tracing::warn!(
                requested = self.threshold,
                threshold,
                "confidence threshold outside (0, 1]; clamped"
            );
            self.threshold = threshold;
        }
        self
    }
}

/// A question as received from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub question: String,
    /// How to reach the asker if the question goes unanswered.
    pub contact: Option<String>,
}

impl Query {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            contact: None,
        }
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = Some(contact.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A catalog answer cleared the threshold.
    Matched,
    /// The fallback message was returned and the question handed to the sink.
    Fallback,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Matched => "matched",
            Outcome::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub outcome: Outcome,
    /// Best similarity seen, `None` when the catalog is empty.
    pub score: Option<f32>,
    /// Catalog position of the best entry, matched or not.
    pub index: Option<usize>,
}

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("no question provided")]
    InvalidInput,

    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(#[source] EmbeddingError),

    #[error("matching failed: {0}")]
    Match(#[from] MatchError),
}

impl AnswerError {
    /// Stable machine-readable tag for responses and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AnswerError::InvalidInput => "invalid_input",
            AnswerError::EmbeddingUnavailable(_) => "embedding_unavailable",
            AnswerError::Match(_) => "match_failed",
        }
    }
}

/// Answers questions from a fixed catalog.
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct AnswerService {
    matcher: Matcher,
    embedder: Arc<dyn Embedder>,
    sink: Arc<dyn FallbackSink>,
    policy: AnswerPolicy,
}

impl fmt::Debug for AnswerService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnswerService")
            .field("catalog_entries", &self.matcher.catalog().len())
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl AnswerService {
    pub fn new(
        catalog: Arc<Catalog>,
        embedder: Arc<dyn Embedder>,
        sink: Arc<dyn FallbackSink>,
        policy: AnswerPolicy,
    ) -> Self {
        Self {
            matcher: Matcher::new(catalog),
            embedder,
            sink,
            policy: policy.clamped(),
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        self.matcher.catalog()
    }

    pub fn policy(&self) -> &AnswerPolicy {
        &self.policy
    }

    /// Embed the question, pick the closest catalog entry and either answer
    /// with it or fall back.
    ///
    /// The fallback path spawns the sink call and returns without waiting
    /// for it, so this must run inside a tokio runtime.
    pub async fn answer(&self, query: Query) -> Result<Answer, AnswerError> {
        if query.question.trim().is_empty() {
            return Err(AnswerError::InvalidInput);
        }

        let vector = self.embed(&query.question).await?;

        let best = self.matcher.find_best(&vector).map_err(|err| {
            tracing::error!(
                error = %err,
                query_dimension = vector.len(),
                catalog_dimension = ?self.catalog().dimension(),
                "query embedding does not match catalog"
            );
            AnswerError::Match(err)
        })?;
        let score = best.entry.map(|_| best.score);

        if let Some(text) = best.answer().filter(|_| best.meets(self.policy.threshold)) {
            tracing::debug!(index = ?best.index, score = best.score, "matched catalog entry");
            return Ok(Answer {
                text: text.to_owned(),
                outcome: Outcome::Matched,
                score,
                index: best.index,
            });
        }

        tracing::info!(
            score = ?score,
            threshold = self.policy.threshold,
            "no confident match; falling back"
        );
        let index = best.index;
        self.record_unanswered(query);

        Ok(Answer {
            text: self.policy.fallback_message.clone(),
            outcome: Outcome::Fallback,
            score,
            index,
        })
    }

    async fn embed(&self, question: &str) -> Result<Vec<f32>, AnswerError> {
        let timeout = self.policy.embed_timeout;
        let result = match tokio::time::timeout(timeout, self.embedder.embed(question)).await {
            Ok(Ok(vector)) if vector.is_empty() => Err(EmbeddingError::EmptyResult),
            Ok(result) => result,
            Err(_) => Err(EmbeddingError::Timeout(timeout)),
        };

        result.map_err(|err| {
            tracing::warn!(error = %err, cause = err.cause_tag(), "embedding failed");
            AnswerError::EmbeddingUnavailable(err)
        })
    }

    fn record_unanswered(&self, query: Query) {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(err) = sink.record(&query.question, query.contact.as_deref()).await {
                tracing::warn!(error = %err, "failed to record unanswered question");
            }
        });
    }
}
