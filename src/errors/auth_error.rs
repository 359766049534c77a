//! Authentication error types for the HTTP Basic gate

use axum::Json;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Realm announced in the `WWW-Authenticate` challenge
pub const BASIC_REALM: &str = "convo-gateway";

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors produced by the basic-auth middleware
#[derive(Error, Debug)]
pub enum AuthError {
    /// No `Authorization` header on a gated route
    #[error("Authentication required")]
    MissingCredentials,

    /// Header present but not a decodable `Basic` credential
    #[error("Invalid authorization header")]
    InvalidAuthHeader,

    /// Username/password pair did not match the configured credentials
    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (
            StatusCode::UNAUTHORIZED,
            [(
                header::WWW_AUTHENTICATE,
                format!("Basic realm=\"{BASIC_REALM}\""),
            )],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_variants_respond_with_challenge() {
        for err in [
            AuthError::MissingCredentials,
            AuthError::InvalidAuthHeader,
            AuthError::InvalidCredentials,
        ] {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            let challenge = response
                .headers()
                .get(header::WWW_AUTHENTICATE)
                .expect("challenge header present");
            assert!(challenge.to_str().unwrap().starts_with("Basic realm="));
        }
    }
}
