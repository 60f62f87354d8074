//! Request authentication middleware
//!
//! Study routes require `Authorization: Bearer <token>` and, outside
//! development, an `X-API-Key` header. A missing or wrong bearer token is
//! 401, a wrong API key 403. `/health` is mounted outside this layer and
//! needs neither.

use super::server::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::warn;

pub async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let settings = &state.settings;

    if settings.require_bearer() {
        let authorized = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token == settings.auth.bearer_token)
            .unwrap_or(false);
        if !authorized {
            warn!("Rejected request to {} without valid bearer token", request.uri().path());
            return Err(StatusCode::UNAUTHORIZED);
        }
    }

    if settings.require_api_key() {
        let keyed = request
            .headers()
            .get("X-API-Key")
            .and_then(|value| value.to_str().ok())
            .map(|key| key == settings.auth.api_key)
            .unwrap_or(false);
        if !keyed {
            warn!("Rejected request to {} without valid API key", request.uri().path());
            return Err(StatusCode::FORBIDDEN);
        }
    }

    Ok(next.run(request).await)
}
