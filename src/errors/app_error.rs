//! Application error types
//!
//! Centralized error handling for token construction, request validation and
//! remote agent-service calls. Every variant maps to an HTTP status and a
//! JSON body at the axum boundary.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Result type for application operations
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed request field, or invalid token-builder input
    #[error("{0}")]
    InvalidArgument(String),

    /// Token construction cannot coerce an input to the representation a
    /// service grant requires (e.g. non-numeric RTC uid)
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Remote agent-hosting API rejected the call or could not be reached.
    /// Carries the remote error payload for diagnosis.
    #[error("remote agent service call failed")]
    RemoteUnavailable { details: serde_json::Value },

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Remote-call failure from a transport error (no response body)
    pub fn remote_transport(err: &reqwest::Error) -> Self {
        AppError::RemoteUnavailable {
            details: json!(err.to_string()),
        }
    }

    /// Remote-call failure from a non-2xx response body
    pub fn remote_rejected(status: StatusCode, body: String) -> Self {
        // Remote errors are usually JSON; fall back to the raw text
        let details = serde_json::from_str(&body)
            .unwrap_or_else(|_| json!({ "status": status.as_u16(), "body": body }));
        AppError::RemoteUnavailable { details }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) | AppError::Encoding(_) => StatusCode::BAD_REQUEST,
            AppError::RemoteUnavailable { .. } | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            AppError::RemoteUnavailable { details } => json!({
                "error": "Failed to start conversation",
                "details": details,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_maps_to_400() {
        let err = AppError::InvalidArgument("channel is required".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn encoding_error_maps_to_400() {
        let err = AppError::Encoding("uid is not numeric".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn remote_failure_maps_to_500_with_details() {
        let err = AppError::remote_rejected(
            StatusCode::FORBIDDEN,
            r#"{"reason":"invalid credentials"}"#.to_string(),
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        match err {
            AppError::RemoteUnavailable { details } => {
                assert_eq!(details["reason"], "invalid credentials");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn remote_failure_keeps_non_json_body() {
        let err = AppError::remote_rejected(StatusCode::BAD_GATEWAY, "upstream down".to_string());
        match err {
            AppError::RemoteUnavailable { details } => {
                assert_eq!(details["status"], 502);
                assert_eq!(details["body"], "upstream down");
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
