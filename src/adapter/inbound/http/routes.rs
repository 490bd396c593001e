//! Trigger routes.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use super::auth::require_bearer;
use crate::domain::Category;
use crate::port::{SyncRequest, SyncTrigger};

/// Shared state for trigger handlers.
#[derive(Clone)]
pub struct TriggerState {
    pub trigger: Arc<dyn SyncTrigger>,
    /// Expected bearer token. `None` rejects every sync request with 500.
    pub secret: Option<Arc<str>>,
}

impl TriggerState {
    pub fn new(trigger: Arc<dyn SyncTrigger>, secret: Option<String>) -> Self {
        Self {
            trigger,
            secret: secret.map(Arc::from),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// `?categories=trades,prices&force=true`
#[derive(Debug, Default, Deserialize)]
pub struct SyncParams {
    #[serde(default)]
    pub categories: Option<String>,
    #[serde(default)]
    pub force: Option<bool>,
}

impl SyncParams {
    fn into_request(self) -> Result<SyncRequest, String> {
        let categories = self
            .categories
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse::<Category>)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SyncRequest {
            categories,
            force: self.force.unwrap_or(false),
        })
    }
}

async fn run_sync(State(state): State<TriggerState>, Query(params): Query<SyncParams>) -> Response {
    let request = match params.into_request() {
        Ok(request) => request,
        Err(reason) => return (StatusCode::BAD_REQUEST, Json(ErrorBody::new(reason))).into_response(),
    };

    match state.trigger.run(request).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => {
            error!(error = %e, "Sync could not start");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(e.to_string()))).into_response()
        }
    }
}

async fn sync_status(State(state): State<TriggerState>) -> Response {
    match state.trigger.status().await {
        Ok(runs) => Json(serde_json::json!({ "success": true, "jobs": runs })).into_response(),
        Err(e) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody::new(e.to_string()))).into_response()
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Build the trigger router. `/health` is the only unauthenticated route.
pub fn router(state: TriggerState) -> Router {
    Router::new()
        .route("/api/sync", get(run_sync).post(run_sync))
        .route("/api/sync/status", get(sync_status))
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .route("/health", get(health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_parse_category_list() {
        let params = SyncParams {
            categories: Some("prices, trades,,prices".into()),
            force: Some(true),
        };
        let request = params.into_request().unwrap();
        assert_eq!(
            request.categories,
            vec![Category::Prices, Category::Trades, Category::Prices]
        );
        assert!(request.force);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let params = SyncParams {
            categories: Some("positions".into()),
            force: None,
        };
        assert!(params.into_request().unwrap_err().contains("positions"));
    }

    #[test]
    fn no_categories_means_all() {
        let request = SyncParams::default().into_request().unwrap();
        assert!(request.categories.is_empty());
        assert!(!request.force);
    }
}
