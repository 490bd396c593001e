//! Bearer-token gate in front of the sync routes.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;
use tracing::{error, warn};

use super::routes::{ErrorBody, TriggerState};
use crate::error::SyncError;

fn token_matches(token: &str, expected: &str) -> bool {
    token.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn bearer(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

/// Reject the request before any sync work starts.
///
/// A missing server-side secret is a deployment error (500); a missing or
/// wrong token is the caller's (401).
pub async fn require_bearer(
    State(state): State<TriggerState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.secret.as_deref() else {
        error!("Sync secret is not configured; refusing trigger");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new("sync secret is not configured")),
        )
            .into_response();
    };

    match bearer(&request) {
        Some(token) if token_matches(token, expected) => {
            next.run(request).await
        }
        provided => {
            warn!(
                path = %request.uri().path(),
                token_present = provided.is_some(),
                "Rejected unauthorized sync trigger"
            );
            (
                StatusCode::UNAUTHORIZED,
                Json(ErrorBody::new(SyncError::Unauthorized.to_string())),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_matches_only_identical_secret() {
        assert!(token_matches("s3cret", "s3cret"));
        assert!(!token_matches("s3cret", "s3creT"));
        assert!(!token_matches("s3cret", "s3cret!"));
        assert!(!token_matches("", "s3cret"));
    }
}
