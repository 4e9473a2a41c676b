//! Bearer-token guard for administrative routes.

use crate::error::ApiError;
use crate::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::warn;

pub(crate) async fn require_admin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| tokens_match(token.trim(), &state.admin_token));

    if !authorized {
        warn!("Rejected admin request to {}", request.uri().path());
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

fn tokens_match(presented: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}
