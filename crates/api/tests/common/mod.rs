#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use dus_api::config::AppConfig;
use dus_api::reports::ReportStore;
use dus_api::router::build_app_router;
use dus_api::state::AppState;

/// Host and port advertised in report URLs during tests.
pub const TEST_HOST: &str = "127.0.0.1";
pub const TEST_PORT: u16 = 8080;

/// A router wired to a test pool plus the temporary reports directory
/// backing it. The directory is removed when this value is dropped.
pub struct TestApp {
    pub router: Router,
    pub reports_dir: TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build a test `AppConfig` with safe defaults.
pub fn test_config(reports_dir: &std::path::Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.host = TEST_HOST.to_string();
    config.server.port = TEST_PORT;
    config.reports.dir = reports_dir.to_path_buf();
    config
}

/// Build the full application router, using the given database pool.
///
/// Goes through the same `build_app_router` as `main.rs` so tests exercise
/// the production middleware stack.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let reports_dir = tempfile::tempdir().expect("create reports dir");
    let config = test_config(reports_dir.path());

    let state = AppState {
        pool,
        reports: Arc::new(ReportStore::new(config.reports.dir.clone())),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config.server),
        reports_dir,
    }
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::POST, uri, body.to_string()).await
}

pub async fn delete_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send_json(app, Method::DELETE, uri, body.to_string()).await
}

/// Send a raw body with a JSON content type (for malformed-body tests).
pub async fn send_json(app: Router, method: Method, uri: &str, body: String) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
