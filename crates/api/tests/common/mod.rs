//! Shared helpers for the API integration tests.
//!
//! The application is assembled with the in-memory backends from
//! `todo_core::memory`, so these tests need no Postgres, Redis or S3.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use todo_api::config::ServerConfig;
use todo_api::router::build_app_router;
use todo_api::state::AppState;
use todo_core::memory::{InMemoryFileStorage, InMemoryTodoStore, RecordingPublisher};
use todo_core::ports::HealthProbe;
use todo_core::usecases::{FileUseCase, TodoUseCase};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

pub const BOUNDARY: &str = "todo-test-boundary";

/// The router plus handles on every backend it talks to.
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryTodoStore,
    pub publisher: RecordingPublisher,
    pub storage: InMemoryFileStorage,
    pub shutdown: CancellationToken,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        workflow_timeout_secs: 5,
        shutdown_timeout_secs: 30,
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config(), RecordingPublisher::new())
}

/// Build the full application router over fresh in-memory backends.
///
/// Uses [`build_app_router`], the same function `main.rs` calls, so the
/// middleware stack is identical to production.
pub fn build_test_app_with(config: ServerConfig, publisher: RecordingPublisher) -> TestApp {
    let store = InMemoryTodoStore::new();
    let storage = InMemoryFileStorage::new();
    let shutdown = CancellationToken::new();

    let probes: Vec<Arc<dyn HealthProbe>> = vec![
        Arc::new(store.clone()) as Arc<dyn HealthProbe>,
        Arc::new(publisher.clone()) as Arc<dyn HealthProbe>,
    ];

    let state = AppState {
        config: Arc::new(config.clone()),
        todos: Arc::new(TodoUseCase::new(
            Arc::new(store.clone()),
            Arc::new(publisher.clone()),
        )),
        files: Arc::new(FileUseCase::new(Arc::new(storage.clone()))),
        probes: probes.into(),
        shutdown: shutdown.clone(),
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        publisher,
        storage,
        shutdown,
    }
}

pub async fn get(app: &TestApp, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response {
    post_raw_json(app, uri, body.to_string()).await
}

pub async fn post_raw_json(app: &TestApp, uri: &str, body: String) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

/// Encode a single-part multipart body.
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: &TestApp, uri: &str, body: Vec<u8>) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn upload(
    app: &TestApp,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> Response {
    post_multipart(
        app,
        "/api/v1/upload",
        multipart_body("file", file_name, content_type, data),
    )
    .await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
