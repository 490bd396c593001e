use std::sync::Arc;

use arena_sync::adapter::inbound::http::{router, TriggerState};
use arena_sync::domain::{Category, CategoryReport, CategoryStatus, JobRun, SyncSummary};
use arena_sync::error::Result;
use arena_sync::port::{SyncRequest, SyncTrigger};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use tower::ServiceExt;

/// Trigger that records every request and reports each category as synced.
#[derive(Default)]
struct RecordingTrigger {
    requests: Mutex<Vec<SyncRequest>>,
}

impl RecordingTrigger {
    fn requests(&self) -> Vec<SyncRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl SyncTrigger for RecordingTrigger {
    async fn run(&self, request: SyncRequest) -> Result<SyncSummary> {
        let now = Utc::now();
        let reports = request
            .resolved_categories()
            .into_iter()
            .map(|category| {
                let mut report = CategoryReport::new(category);
                report.status = CategoryStatus::Succeeded;
                report.synced = 1;
                report
            })
            .collect();
        self.requests.lock().push(request);
        Ok(SyncSummary::from_reports(now, now, reports))
    }

    async fn status(&self) -> Result<Vec<JobRun>> {
        Ok(vec![JobRun {
            category: Category::Prices,
            last_run: Utc::now(),
            status: CategoryStatus::Succeeded,
            synced: 2,
        }])
    }
}

fn app(trigger: Arc<RecordingTrigger>, secret: Option<&str>) -> Router {
    router(TriggerState::new(trigger, secret.map(str::to_string)))
}

fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn missing_secret_is_a_server_error() {
    let trigger = Arc::new(RecordingTrigger::default());
    let response = app(trigger.clone(), None)
        .oneshot(request(Method::POST, "/api/sync", Some("anything")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(trigger.requests().is_empty());
}

#[tokio::test]
async fn wrong_or_missing_token_is_rejected_before_running() {
    let trigger = Arc::new(RecordingTrigger::default());

    let response = app(trigger.clone(), Some("s3cret"))
        .oneshot(request(Method::POST, "/api/sync", Some("guess")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "unauthorized");

    let response = app(trigger.clone(), Some("s3cret"))
        .oneshot(request(Method::GET, "/api/sync", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(trigger.requests().is_empty());
}

#[tokio::test]
async fn valid_token_runs_sync_and_returns_summary() {
    let trigger = Arc::new(RecordingTrigger::default());
    let response = app(trigger.clone(), Some("s3cret"))
        .oneshot(request(
            Method::GET,
            "/api/sync?categories=trades,prices&force=true",
            Some("s3cret"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["totals"]["synced"], 2);
    assert_eq!(body["categories"].as_array().unwrap().len(), 2);

    let requests = trigger.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].force);
    assert_eq!(requests[0].categories, vec![Category::Trades, Category::Prices]);
}

#[tokio::test]
async fn unknown_category_is_a_bad_request() {
    let trigger = Arc::new(RecordingTrigger::default());
    let response = app(trigger.clone(), Some("s3cret"))
        .oneshot(request(Method::POST, "/api/sync?categories=positions", Some("s3cret")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(trigger.requests().is_empty());
}

#[tokio::test]
async fn status_lists_recorded_jobs() {
    let trigger = Arc::new(RecordingTrigger::default());
    let response = app(trigger, Some("s3cret"))
        .oneshot(request(Method::GET, "/api/sync/status", Some("s3cret")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["jobs"].as_array().unwrap().len(), 1);
    assert_eq!(body["jobs"][0]["synced"], 2);
}

#[tokio::test]
async fn health_needs_no_token() {
    let response = app(Arc::new(RecordingTrigger::default()), None)
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}
