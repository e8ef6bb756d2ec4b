#![allow(dead_code)]

use std::sync::Arc;

use ai_info_core::Classifier;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use ai_info_backend::config::QuizConfig;
use ai_info_backend::db::config::DbConfig;
use ai_info_backend::db::Database;
use ai_info_backend::state::AppState;

/// Keeps the temporary database directory alive for the app's lifetime.
pub struct TestApp {
    pub router: Router,
    pub db: Arc<Database>,
    _dir: TempDir,
}

pub async fn create_test_db() -> (Arc<Database>, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::connect(DbConfig::for_path(dir.path().join("test.db")))
        .await
        .unwrap();
    (Arc::new(db), dir)
}

pub async fn create_test_app() -> TestApp {
    let (db, dir) = create_test_db().await;
    let state = AppState::new(
        Some(Arc::clone(&db)),
        Arc::new(Classifier::default()),
        QuizConfig::default(),
    );
    TestApp {
        router: ai_info_backend::create_app_with_state(state),
        db,
        _dir: dir,
    }
}

/// App without storage; every storage-backed endpoint answers 503.
pub fn create_app_without_db() -> Router {
    let state = AppState::new(None, Arc::new(Classifier::default()), QuizConfig::default());
    ai_info_backend::create_app_with_state(state)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None).await
}
