//! HTTP Basic authentication middleware
//!
//! Gates every non-health route behind the single username/password pair
//! from the configuration. When the pair is not configured the gate is
//! disabled (development mode) with a warning; otherwise requests must carry
//! a matching `Authorization: Basic` header or receive a 401 challenge.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use subtle::ConstantTimeEq;

use crate::errors::auth_error::AuthError;
use crate::state::AppState;

/// Decodes the `Basic` credential from an Authorization header value into a
/// `(username, password)` pair
fn decode_basic(header_value: &str) -> Result<(String, String), AuthError> {
    let encoded = header_value
        .strip_prefix("Basic ")
        .ok_or(AuthError::InvalidAuthHeader)?;
    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|_| AuthError::InvalidAuthHeader)?;
    let credentials =
        String::from_utf8(decoded).map_err(|_| AuthError::InvalidAuthHeader)?;
    let (username, password) = credentials
        .split_once(':')
        .ok_or(AuthError::InvalidAuthHeader)?;
    Ok((username.to_string(), password.to_string()))
}

/// Constant-time equality over the full credential pair. `ct_eq` already
/// rejects length mismatches without early exit.
fn credentials_match(supplied: &(String, String), expected_user: &str, expected_pass: &str) -> bool {
    let user_ok = supplied.0.as_bytes().ct_eq(expected_user.as_bytes());
    let pass_ok = supplied.1.as_bytes().ct_eq(expected_pass.as_bytes());
    (user_ok & pass_ok).into()
}

/// Basic-auth middleware applied to all gated routes
pub async fn basic_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Gate disabled when no credential pair is configured
    let (Some(expected_user), Some(expected_pass)) = (
        state.config.auth_username.as_deref(),
        state.config.auth_password.as_deref(),
    ) else {
        tracing::warn!("AUTH_USERNAME or AUTH_PASSWORD not set - authentication disabled");
        return Ok(next.run(request).await);
    };

    let header_value = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let supplied = decode_basic(header_value)?;
    if credentials_match(&supplied, expected_user, expected_pass) {
        tracing::debug!(path = %request.uri().path(), "basic auth accepted");
        return Ok(next.run(request).await);
    }

    tracing::warn!(path = %request.uri().path(), "basic auth rejected");
    Err(AuthError::InvalidCredentials)
}
