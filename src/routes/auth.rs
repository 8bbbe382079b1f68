//! Bearer token guard applied to every data route.
//!
//! Token verification proper belongs to the identity provider in front of the
//! service. When `api_tokens` is configured the token must match one of them;
//! otherwise any non-empty bearer token is let through.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::{error::AppError, state::SharedState};

const BEARER_PREFIX: &str = "Bearer ";

/// Reject requests lacking a valid `Authorization: Bearer <token>` header.
pub async fn require_bearer(
    State(state): State<SharedState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            warn!("authentication failed: missing authorization header");
            AppError::Unauthorized("missing authorization header".into())
        })?;

    let token = header_value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!("authentication failed: malformed authorization header");
            AppError::Unauthorized("authorization header must use the Bearer scheme".into())
        })?;

    let accepted = state.config().api_tokens();
    if !accepted.is_empty() && !accepted.iter().any(|expected| token_eq(token, expected)) {
        warn!("authentication failed: unknown bearer token");
        return Err(AppError::Unauthorized("invalid bearer token".into()));
    }

    Ok(next.run(req).await)
}

/// Compare tokens without leaking the matching prefix through timing.
///
/// Slices of different lengths compare unequal.
fn token_eq(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
