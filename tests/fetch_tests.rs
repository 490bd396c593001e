mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arena_sync::adapter::outbound::upstream::{RetryPolicy, UpstreamClient, UpstreamConfig};
use arena_sync::domain::Category;
use arena_sync::error::{Error, FetchError, SyncError};
use arena_sync::port::UpstreamSource;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use support::server::LocalServer;

#[derive(Clone, Default)]
struct Hits(Arc<AtomicUsize>);

impl Hits {
    fn bump(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

fn client(server: &LocalServer, timeout_ms: u64, attempts: u32) -> UpstreamClient {
    UpstreamClient::from_config(&UpstreamConfig {
        base_url: server.url("/api"),
        timeout_ms,
        ..UpstreamConfig::default()
    })
    .unwrap()
    .with_retry(RetryPolicy::immediate(attempts))
}

async fn flaky_leaderboard(State(hits): State<Hits>) -> Response {
    if hits.bump() == 1 {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(json!({"leaderboard": []})).into_response()
}

async fn always_unavailable(State(hits): State<Hits>) -> StatusCode {
    hits.bump();
    StatusCode::SERVICE_UNAVAILABLE
}

async fn slow_prices(State(hits): State<Hits>) -> Json<serde_json::Value> {
    hits.bump();
    tokio::time::sleep(Duration::from_secs(5)).await;
    Json(json!({"prices": {}}))
}

#[tokio::test]
async fn retries_after_a_server_error() {
    let hits = Hits::default();
    let server = LocalServer::start(
        Router::new()
            .route("/api/leaderboard", get(flaky_leaderboard))
            .with_state(hits.clone()),
    )
    .await;

    let body = client(&server, 2_000, 3)
        .fetch(Category::Leaderboard)
        .await
        .unwrap();

    assert_eq!(body, json!({"leaderboard": []}));
    assert_eq!(hits.get(), 2);
}

#[tokio::test]
async fn exhausted_retries_report_last_status() {
    let hits = Hits::default();
    let server = LocalServer::start(
        Router::new()
            .route("/api/trades", get(always_unavailable))
            .with_state(hits.clone()),
    )
    .await;

    let err = client(&server, 2_000, 3)
        .fetch(Category::Trades)
        .await
        .unwrap_err();

    match err {
        Error::Sync(SyncError::UpstreamUnavailable { url, attempts, last }) => {
            assert!(url.ends_with("/api/trades"), "{url}");
            assert_eq!(attempts, 3);
            assert!(matches!(last, FetchError::Status { status: 503 }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(hits.get(), 3);
}

#[tokio::test]
async fn slow_response_times_out() {
    let hits = Hits::default();
    let server = LocalServer::start(
        Router::new()
            .route("/api/crypto-prices", get(slow_prices))
            .with_state(hits.clone()),
    )
    .await;

    let err = client(&server, 100, 2)
        .fetch(Category::Prices)
        .await
        .unwrap_err();

    match err {
        Error::Sync(SyncError::UpstreamUnavailable { attempts, last, .. }) => {
            assert_eq!(attempts, 2);
            assert!(matches!(last, FetchError::Timeout { after_ms: 100 }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(hits.get(), 2);
}

#[tokio::test]
async fn invalid_json_body_is_a_fetch_failure() {
    let server = LocalServer::start(Router::new().route(
        "/api/analytics",
        get(|| async { "<html>maintenance</html>" }),
    ))
    .await;

    let err = client(&server, 2_000, 1)
        .fetch(Category::Analytics)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Sync(SyncError::UpstreamUnavailable {
            attempts: 1,
            last: FetchError::Decode(_),
            ..
        })
    ));
}

#[tokio::test]
async fn model_analytics_are_fetched_per_model() {
    let server = LocalServer::start(Router::new().route(
        "/api/analytics/:model",
        get(|Path(model): Path<String>| async move { Json(json!({"model": model})) }),
    ))
    .await;

    let body = client(&server, 2_000, 1)
        .fetch_model_analytics("deepseek-chat-v3.1")
        .await
        .unwrap();

    assert_eq!(body, json!({"model": "deepseek-chat-v3.1"}));
}
