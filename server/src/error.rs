//! Error types for the Sparks HTTP API.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use errors::{CaptureError, NormalizeError, StoreError};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub type Result<T> = std::result::Result<T, ApiError>;

pub const RATE_LIMIT_MESSAGE: &str =
    "The AI service is rate limited right now. Please wait a moment and try again.";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Unparsable body, bad query value or malformed path.
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Server error: {0}")]
    Server(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// Error response body for HTTP endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut retry_after = None;

        let (status, code, message, details) = match &self {
            Self::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                msg.clone(),
                None,
            ),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Unauthorized".to_string(),
                None,
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            Self::Capture(CaptureError::Validation { .. }) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                self.to_string(),
                None,
            ),
            Self::Capture(CaptureError::Normalize(e)) if e.is_rate_limited() => {
                if let NormalizeError::Upstream(upstream) = e {
                    retry_after = upstream.retry_after();
                }
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "RATE_LIMITED",
                    RATE_LIMIT_MESSAGE.to_string(),
                    retry_after.map(|s| format!("Retry after {s} seconds")),
                )
            }
            Self::Capture(CaptureError::Normalize(
                e @ NormalizeError::MalformedResponse { .. },
            )) => {
                tracing::warn!(error = %e, "Completion output was not usable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "MALFORMED_COMPLETION",
                    "Failed to process idea".to_string(),
                    Some(e.to_string()),
                )
            }
            Self::Capture(CaptureError::Normalize(e)) => {
                tracing::error!(error = %e, "Completion service error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "COMPLETION_ERROR",
                    "Failed to process idea".to_string(),
                    Some(e.to_string()),
                )
            }
            Self::Capture(CaptureError::Store(e @ StoreError::NotFound { .. })) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                e.to_string(),
                None,
            ),
            Self::Capture(CaptureError::Store(e)) => {
                tracing::error!(error = %e, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A database error occurred".to_string(),
                    None,
                )
            }
            Self::Configuration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                msg.clone(),
                None,
            ),
            Self::Server(msg) => {
                tracing::error!(message = %msg, "Server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use errors::CompletionError;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_of(CaptureError::validation("title").into()),
            StatusCode::BAD_REQUEST,
        );
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(
                CaptureError::from(StoreError::NotFound {
                    kind: "idea",
                    id: "x".to_string(),
                })
                .into(),
            ),
            StatusCode::NOT_FOUND,
        );
        assert_eq!(
            status_of(CaptureError::from(StoreError::backend("down")).into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        );
        assert_eq!(
            status_of(CaptureError::from(NormalizeError::malformed("nope")).into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        );
    }

    #[test]
    fn test_rate_limit_sets_retry_after() {
        let err: ApiError = CaptureError::from(NormalizeError::from(CompletionError::RateLimited {
            retry_after: Some(20),
            message: "busy".to_string(),
        }))
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(RETRY_AFTER).unwrap(), "20");
    }

    #[test]
    fn test_error_response_without_details() {
        let resp = ErrorResponse {
            error: "test error".to_string(),
            code: "TEST_ERROR".to_string(),
            details: None,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("details"));
    }
}
