//! services/api/src/web/middleware.rs
//!
//! Request logging and bearer-token authentication for protected routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

/// Middleware that validates the bearer token and extracts the caller's identity.
///
/// If valid, inserts an `AuthUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract the Authorization header
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    // 2. Verify signature, issuer, audience and lifetime
    let user = state.auth.verify(token)?;

    // 3. Make the identity available to handlers
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Logs every request on the way in and its status and duration on the way out.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    info!(%request_id, %method, %path, at = %Utc::now(), "Incoming request");

    let response = next.run(req).await;

    info!(
        %request_id,
        %method,
        %path,
        status = response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "Response"
    );
    response
}
