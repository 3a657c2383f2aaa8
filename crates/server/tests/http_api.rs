//! End-to-end tests for the HTTP surface, driving the router in-process.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use faqmatch::{
    AnswerPolicy, AnswerService, Catalog, CatalogEntry, Embedder, EmbeddingError, FallbackSink,
    SinkError,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerError, ServerState};
use tokio::sync::mpsc;
use tower::ServiceExt;

struct TableEmbedder(HashMap<&'static str, Vec<f32>>);

#[async_trait]
impl Embedder for TableEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self.0.get(text) {
            // an empty row stands for a provider that answered with no vectors
            Some(vector) if vector.is_empty() => Err(EmbeddingError::EmptyResult),
            Some(vector) => Ok(vector.clone()),
            None => Err(EmbeddingError::Status {
                status: 401,
                body: "Incorrect API key provided: sk-***".into(),
            }),
        }
    }
}

type Recorded = (String, Option<String>);

struct ChannelSink {
    tx: mpsc::UnboundedSender<Recorded>,
    fail: bool,
}

#[async_trait]
impl FallbackSink for ChannelSink {
    async fn record(&self, question: &str, contact: Option<&str>) -> Result<(), SinkError> {
        let _ = self
            .tx
            .send((question.to_string(), contact.map(str::to_string)));
        if self.fail {
            return Err(SinkError::Status {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(())
    }
}

struct TestApp {
    router: Router,
    recorded: mpsc::UnboundedReceiver<Recorded>,
}

fn test_app_with(config: ServerConfig, sink_fails: bool, metrics: bool) -> TestApp {
    let catalog = Catalog::from_entries(vec![
        CatalogEntry::new("Ship in 3 days", vec![1.0, 0.0])
            .with_question("How long does shipping take?"),
    ])
    .unwrap();
    let embedder = TableEmbedder(HashMap::from([
        ("How long does shipping take?", vec![1.0, 0.0]),
        ("Do you sell gift cards?", vec![0.0, 1.0]),
        ("three dimensions", vec![1.0, 0.0, 0.0]),
        ("nothing comes back", vec![]),
    ]));
    let (tx, recorded) = mpsc::unbounded_channel();
    let sink = ChannelSink {
        tx,
        fail: sink_fails,
    };

    let service = AnswerService::new(
        Arc::new(catalog),
        Arc::new(embedder),
        Arc::new(sink),
        AnswerPolicy::default(),
    );
    let handle = metrics.then(|| PrometheusBuilder::new().build_recorder().handle());
    let state = Arc::new(ServerState::new(config, service, handle));

    TestApp {
        router: build_router(state),
        recorded,
    }
}

fn test_app() -> TestApp {
    test_app_with(ServerConfig::default(), false, false)
}

fn post_faq(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/faq")
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn next_record(app: &mut TestApp) -> Recorded {
    tokio::time::timeout(Duration::from_secs(2), app.recorded.recv())
        .await
        .expect("fallback sink was not called")
        .expect("sink channel closed")
}

#[tokio::test]
async fn root_reports_ok() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn health_reports_catalog() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "faq-server");
    assert_eq!(body["catalog"]["entries"], 1);
    assert_eq!(body["catalog"]["dimension"], 2);
    assert!(body["uptime_seconds"].is_u64());
}

#[tokio::test]
async fn confident_question_gets_catalog_answer() {
    let mut app = test_app();
    let (status, body) = send(
        &app.router,
        post_faq(json!({ "question": "How long does shipping take?" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "answer": "Ship in 3 days" }));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(app.recorded.try_recv().is_err());
}

#[tokio::test]
async fn unknown_question_falls_back_and_is_recorded() {
    let mut app = test_app();
    let (status, body) = send(
        &app.router,
        post_faq(json!({ "question": "Do you sell gift cards?", "email": "a@b.co" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "answer": "We'll follow up shortly." }));

    let (question, contact) = next_record(&mut app).await;
    assert_eq!(question, "Do you sell gift cards?");
    assert_eq!(contact.as_deref(), Some("a@b.co"));
}

#[tokio::test]
async fn sink_failure_keeps_fallback_response() {
    let mut app = test_app_with(ServerConfig::default(), true, false);
    let (status, body) = send(
        &app.router,
        post_faq(json!({ "question": "Do you sell gift cards?" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "We'll follow up shortly.");
    assert_eq!(next_record(&mut app).await.1, None);
}

#[tokio::test]
async fn missing_or_blank_question_is_bad_request() {
    let app = test_app();
    let expected = json!({ "error": "No question provided", "kind": "invalid_input" });

    for body in [
        json!({}).to_string(),
        json!({ "question": "" }).to_string(),
        json!({ "question": "   " }).to_string(),
        json!({ "question": 7 }).to_string(),
        json!({ "email": "a@b.co" }).to_string(),
        "this is not json".to_string(),
    ] {
        let (status, response) = send(&app.router, post_faq(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(response, expected, "body: {body}");
    }
}

#[tokio::test]
async fn embedding_failure_is_opaque_server_error() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_faq(json!({ "question": "something the provider rejects" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "error": "Failed to process request",
            "kind": "embedding_unavailable",
            "details": { "cause": "provider_status" }
        })
    );
}

#[tokio::test]
async fn empty_provider_result_is_server_error() {
    let mut app = test_app();
    let (status, body) = send(
        &app.router,
        post_faq(json!({ "question": "nothing comes back" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "error": "Failed to process request",
            "kind": "embedding_unavailable",
            "details": { "cause": "empty_result" }
        })
    );

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(app.recorded.try_recv().is_err());
}

#[tokio::test]
async fn dimension_mismatch_is_match_failed() {
    let app = test_app();
    let (status, body) = send(
        &app.router,
        post_faq(json!({ "question": "three dimensions" }).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to process request");
    assert_eq!(body["kind"], "match_failed");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = test_app();
    let (status, body) = send(&app.router, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Not found", "kind": "not_found" }));
}

#[tokio::test]
async fn get_on_faq_is_not_allowed() {
    let app = test_app();
    let response = app.router.clone().oneshot(get("/faq")).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn request_id_is_generated_or_echoed() {
    let app = test_app();

    let response = app.router.clone().oneshot(get("/")).await.unwrap();
    let generated = response
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert_eq!(generated.len(), 36);

    let request = Request::builder()
        .uri("/")
        .header("x-request-id", "widget-42")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "widget-42");
}

#[tokio::test]
async fn metrics_endpoint_follows_config() {
    let app = test_app_with(ServerConfig::default(), false, true);
    let response = app.router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));

    let app = test_app();
    let (status, body) = send(&app.router, get("/metrics")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], "not_found");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let config = ServerConfig {
        max_body_size_kb: 1,
        ..Default::default()
    };
    let app = test_app_with(config, false, false);
    let question = "x".repeat(4096);
    let response = app
        .router
        .clone()
        .oneshot(post_faq(json!({ "question": question }).to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[test]
fn startup_fails_without_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        catalog_path: dir.path().join("missing.json"),
        ..Default::default()
    };

    let err = ServerState::from_config(config, None).err().unwrap();
    assert!(matches!(err, ServerError::Catalog(_)));
}

#[test]
fn startup_fails_on_invalid_pipeline_config() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = dir.path().join("faqmatch.yaml");
    std::fs::write(&pipeline, "version: \"1.0\"\nmatching:\n  threshold: 2.0\n").unwrap();

    let config = ServerConfig {
        pipeline_config: Some(pipeline),
        ..Default::default()
    };

    let err = ServerState::from_config(config, None).err().unwrap();
    assert!(matches!(err, ServerError::PipelineConfig(_)));
}

#[test]
fn startup_loads_catalog_from_disk() {
    let mut catalog = tempfile::NamedTempFile::new().unwrap();
    write!(
        catalog,
        r#"[{{ "answer": "Ship in 3 days", "embedding": [1.0, 0.0] }}]"#
    )
    .unwrap();

    let config = ServerConfig {
        catalog_path: catalog.path().to_path_buf(),
        ..Default::default()
    };

    let state = ServerState::from_config(config, None).unwrap();
    assert_eq!(state.service.catalog().len(), 1);
    assert_eq!(state.service.policy().threshold, 0.80);
}
