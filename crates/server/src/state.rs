use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use faqmatch::{build_fallback_sink, AnswerService, Catalog, FaqConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use semantic::{ApiEmbedder, ApiProvider};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Answer pipeline (catalog, embedder, fallback sink, policy)
    pub service: AnswerService,

    /// Prometheus render handle, `None` when metrics are disabled
    pub metrics: Option<PrometheusHandle>,

    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl ServerState {
    /// Create new server state from already-built parts
    pub fn new(
        config: ServerConfig,
        service: AnswerService,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            service,
            metrics,
            started_at: Instant::now(),
        }
    }

    /// Load the catalog and pipeline config named by `config` and wire up the
    /// production embedder and fallback sink.
    ///
    /// Fails if the catalog or pipeline config cannot be loaded; the server
    /// must not start without them.
    pub fn from_config(
        config: ServerConfig,
        metrics: Option<PrometheusHandle>,
    ) -> ServerResult<Self> {
        let pipeline = match &config.pipeline_config {
            Some(path) => FaqConfig::from_file(path)?,
            None => FaqConfig::default(),
        }
        .with_env_secrets();

        if pipeline.embedding.provider == ApiProvider::OpenAi
            && pipeline.embedding.api_auth_header.is_none()
        {
            tracing::warn!("OPENAI_API_KEY is not set; embedding requests will be rejected");
        }

        let catalog = Arc::new(Catalog::load(&config.catalog_path)?);
        let embedder = ApiEmbedder::new(pipeline.embedding.clone())
            .map_err(|e| ServerError::Config(format!("embedding provider: {e}")))?;
        let sink = build_fallback_sink(&pipeline.fallback_sink)?;

        let policy = pipeline.answer_policy();
        tracing::info!(
            catalog_entries = catalog.len(),
            threshold = policy.threshold,
            embed_timeout_ms = policy.embed_timeout.as_millis() as u64,
            provider = ?pipeline.embedding.provider,
            model = %pipeline.embedding.model,
            "answer pipeline ready"
        );

        let service = AnswerService::new(catalog, Arc::new(embedder), sink, policy);
        Ok(Self::new(config, service, metrics))
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
