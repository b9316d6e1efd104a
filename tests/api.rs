use async_trait::async_trait;
use axum::body::Body;
use axum::http::StatusCode;
use data_encoding::BASE64;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use scanwarden::alert::AlertSink;
use scanwarden::api::{build_router, AppState};
use scanwarden::config::Config;
use scanwarden::errors::WardenError;
use scanwarden::event::Processor;
use scanwarden::executor::{ExecutionStatus, JobExecutor, ScanJobSpec};
use scanwarden::models::ScanRecord;
use scanwarden::store::ResultStore;

/// Executor that immediately completes every job with clean output.
struct InstantExecutor;

#[async_trait]
impl JobExecutor for InstantExecutor {
    async fn create_job(&self, _spec: &ScanJobSpec) -> Result<(), WardenError> {
        Ok(())
    }

    async fn run_job(&self, job_name: &str) -> Result<String, WardenError> {
        Ok(job_name.to_string())
    }

    async fn execution_status(&self, _execution: &str) -> Result<ExecutionStatus, WardenError> {
        Ok(ExecutionStatus { completed: true, succeeded: 1, failed: 0 })
    }

    async fn fetch_logs(&self, _execution: &str) -> Result<String, WardenError> {
        Ok(json!({"vulnerabilities": []}).to_string())
    }

    async fn delete_job(&self, _job_name: &str) -> Result<(), WardenError> {
        Ok(())
    }
}

struct NullSink;

#[async_trait]
impl AlertSink for NullSink {
    async fn publish(&self, _record: &ScanRecord) -> Result<(), WardenError> {
        Ok(())
    }
}

fn create_test_state(dir: &tempfile::TempDir) -> AppState {
    let config = Arc::new(Config {
        results_dir: dir.path().to_str().unwrap().to_string(),
        poll_interval: Duration::from_millis(1),
        scan_timeout: Duration::from_millis(50),
        ..Config::default()
    });
    let store = ResultStore::in_memory(dir.path().to_str().unwrap(), 24).unwrap();
    let processor = Arc::new(Processor::new(
        config,
        store.clone(),
        Arc::new(InstantExecutor),
        Arc::new(NullSink),
    ));
    AppState { processor, store }
}

fn make_request(method: &str, uri: &str, body: Option<Value>) -> axum::http::Request<Body> {
    let builder = axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");

    match body {
        Some(b) => builder.body(Body::from(serde_json::to_string(&b).unwrap())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn response_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("JSON parse error: {}. Body: {:?}", e, String::from_utf8_lossy(&bytes)))
}

fn event_body(method: &str, images: &[&str]) -> Value {
    let entry = json!({
        "protoPayload": {
            "methodName": method,
            "request": {
                "template": {
                    "containers": images.iter().map(|i| json!({"image": i})).collect::<Vec<_>>()
                }
            }
        },
        "resource": {"labels": {"project_id": "p", "service_name": "svc", "location": "us"}}
    });
    json!({
        "message": {
            "data": BASE64.encode(entry.to_string().as_bytes()),
            "messageId": "m-1"
        },
        "subscription": "projects/p/subscriptions/deploys"
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let state = create_test_state(&dir);
    let response = build_router(state)
        .oneshot(make_request("GET", "/api/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "scanwarden");
}

#[tokio::test]
async fn test_receive_event_processes_images() {
    let dir = tempfile::tempdir().unwrap();
    let state = create_test_state(&dir);

    let body = event_body("google.cloud.run.v2.Services.CreateService", &["nginx"]);
    let response = build_router(state.clone())
        .oneshot(make_request("POST", "/events", Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["processed"], 1);

    // The record is visible through the scans endpoint.
    let response = build_router(state)
        .oneshot(make_request("GET", "/api/scans?limit=5", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["scans"][0]["image"], "docker.io/library/nginx:latest");
}

#[tokio::test]
async fn test_receive_event_ignores_other_methods() {
    let dir = tempfile::tempdir().unwrap();
    let state = create_test_state(&dir);

    let body = event_body("google.cloud.run.v2.Services.DeleteService", &["nginx"]);
    let response = build_router(state)
        .oneshot(make_request("POST", "/events", Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response_json(response).await["processed"], 0);
}

#[tokio::test]
async fn test_receive_event_bad_payload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = create_test_state(&dir);

    let body = json!({"message": {"data": "!!! not base64 !!!", "messageId": "m-2"}});
    let response = build_router(state)
        .oneshot(make_request("POST", "/events", Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_scans_empty() {
    let dir = tempfile::tempdir().unwrap();
    let state = create_test_state(&dir);

    let response = build_router(state)
        .oneshot(make_request("GET", "/api/scans", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["total"], 0);
}
