//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! A validation failure is answered with the bare error map so clients see
//! exactly the per-field tree the binder produced. Every other failure uses
//! the `{"error": {"code", "message"}}` envelope. Internal details are never
//! returned to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oasv_binder::BindError;
use oasv_core::ErrorMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Envelope for non-validation failures.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `"UNSUPPORTED_MEDIA_TYPE"`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Application-level error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request failed validation (400). The body is the error map itself.
    #[error("request validation failed for {} field(s)", .0.len())]
    Validation(ErrorMap),

    /// Request media type not declared for the operation (415).
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// Request body could not be read (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::UnsupportedMediaType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE")
            }
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl From<BindError> for AppError {
    fn from(error: BindError) -> Self {
        match error {
            BindError::Invalid(errors) => Self::Validation(errors),
            BindError::UnsupportedMediaType(media_type) => Self::UnsupportedMediaType(media_type),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            Self::Validation(errors) => return (status, Json(errors)).into_response(),
            Self::Internal(detail) => {
                tracing::error!(detail = %detail, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}
