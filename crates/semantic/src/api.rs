use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde_json::{json, Value};

use crate::config::{ApiProvider, EmbeddingConfig};
use crate::embedder::Embedder;
use crate::retry::execute_with_retry_async;
use crate::EmbeddingError;

/// Provider error bodies are kept for operator logs only; cap them so a
/// misbehaving endpoint cannot flood the log pipeline.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// [`Embedder`] backed by a remote HTTP embeddings endpoint.
///
/// Owns its own connection pool; clone the `Arc` around it rather than
/// building one per request.
pub struct ApiEmbedder {
    client: reqwest::Client,
    cfg: EmbeddingConfig,
}

impl ApiEmbedder {
    pub fn new(cfg: EmbeddingConfig) -> Result<Self, EmbeddingError> {
        cfg.validate()?;
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .connect_timeout(cfg.connect_timeout)
            .pool_max_idle_per_host(32)
            .build()
            .map_err(|e| EmbeddingError::InvalidConfig(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, cfg })
    }

    async fn send_request(&self, payload: &Value) -> Result<Value, EmbeddingError> {
        let mut request = self.client.post(&self.cfg.api_url).json(payload);
        if let Some(header) = self.cfg.api_auth_header.as_deref() {
            request = request.header(AUTHORIZATION, header);
        }

        let response = request
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                EmbeddingError::Timeout(self.cfg.timeout)
            } else {
                EmbeddingError::MalformedResponse(format!("invalid JSON response: {e}"))
            }
        })
    }

    fn transport_error(&self, err: reqwest::Error) -> EmbeddingError {
        if err.is_timeout() {
            EmbeddingError::Timeout(self.cfg.timeout)
        } else {
            EmbeddingError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Embedder for ApiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let payload = build_api_payload(self.cfg.provider, text, &self.cfg.model);
        let payload = &payload;
        let provider = self.cfg.provider;

        let outcome = execute_with_retry_async(
            &self.cfg.retry,
            EmbeddingError::is_retryable,
            |attempt| async move {
                if attempt > 0 {
                    tracing::debug!(
                        attempt,
                        ?provider,
                        "retrying embedding request"
                    );
                }
                self.send_request(payload).await
            },
        )
        .await;

        let attempts = outcome.attempts;
        let elapsed_ms = outcome.total_duration.as_millis() as u64;
        let response = outcome.into_result().inspect_err(|err| {
            tracing::debug!(attempts, elapsed_ms, error = %err, "embedding request failed");
        })?;

        first_embedding(response)
    }
}

fn build_api_payload(provider: ApiProvider, text: &str, model: &str) -> Value {
    match provider {
        ApiProvider::OpenAi => json!({ "input": text, "model": model }),
        ApiProvider::HuggingFace => json!({ "inputs": text }),
        ApiProvider::Custom => json!({ "text": text }),
    }
}

/// Pull the first embedding out of a provider response.
fn first_embedding(response: Value) -> Result<Vec<f32>, EmbeddingError> {
    let vector = parse_embeddings_from_value(response)?
        .into_iter()
        .next()
        .ok_or(EmbeddingError::EmptyResult)?;
    if vector.is_empty() {
        return Err(EmbeddingError::EmptyResult);
    }
    Ok(vector)
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embedding) = map.remove("embedding") {
                return parse_embedding_collection(embedding);
            }

            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(data) = map.remove("data") {
                let Value::Array(items) = data else {
                    return Err(EmbeddingError::MalformedResponse(
                        "`data` must be an array".into(),
                    ));
                };
                let mut vectors = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Object(mut obj) => match obj.remove("embedding") {
                            Some(embedding) => vectors.push(parse_embedding_vector(embedding)?),
                            None => {
                                return Err(EmbeddingError::MalformedResponse(
                                    "missing `embedding` field in data item".into(),
                                ))
                            }
                        },
                        _ => {
                            return Err(EmbeddingError::MalformedResponse(
                                "unexpected entry inside `data` array".into(),
                            ))
                        }
                    }
                }
                return Ok(vectors);
            }

            Err(EmbeddingError::MalformedResponse(
                "unsupported API response shape".into(),
            ))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                Ok(Vec::new())
            } else if items.iter().all(|item| matches!(item, Value::Array(_))) {
                items.into_iter().map(parse_embedding_vector).collect()
            } else {
                parse_embedding_vector(Value::Array(items)).map(|vec| vec![vec])
            }
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, EmbeddingError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .filter(|f| f.is_finite())
                    .ok_or_else(|| {
                        EmbeddingError::MalformedResponse("non-finite embedding value".into())
                    }),
                other => Err(EmbeddingError::MalformedResponse(format!(
                    "embedding entries must be numbers, got {other}"
                ))),
            })
            .collect(),
        other => Err(EmbeddingError::MalformedResponse(format!(
            "embedding vector must be an array, got {other}"
        ))),
    }
}
