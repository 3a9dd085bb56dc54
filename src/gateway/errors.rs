//! # Gateway Errors
//!
//! Per-request error taxonomy. Every variant renders as `{"error": "..."}`
//! with the status from [`GatewayError::status_code`]; none are fatal.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::store::DataError;

/// Result type for request handling
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Per-request errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Body is not valid JSON
    #[error("invalid JSON")]
    Parse,

    /// Well-formed input that violates the statement allow-list or row shape
    #[error("{0}")]
    Validation(String),

    /// Method/path or body shape matches no route
    #[error("invalid request")]
    Unrecognized,

    /// Request body is larger than the configured limit
    #[error("request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    /// Request body could not be read off the connection
    #[error("failed to read request body")]
    BodyRead,

    /// Statement execution failed in the database
    #[error("{0}")]
    Data(#[from] DataError),
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        GatewayError::Validation(message.into())
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::Parse => StatusCode::BAD_REQUEST,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Unrecognized => StatusCode::NOT_FOUND,
            GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::BodyRead => StatusCode::BAD_REQUEST,
            GatewayError::Data(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<GatewayError> for ErrorResponse {
    fn from(err: GatewayError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
