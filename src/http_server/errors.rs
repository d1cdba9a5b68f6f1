//! # HTTP API Errors
//!
//! Error types returned by route handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::query::QueryError;

/// Result type for route handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Route handler errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Query string could not be parsed
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// A parameter failed validation
    #[error("Invalid parameter '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// A required parameter was not supplied
    #[error("Missing required parameter: {0}")]
    MissingParam(String),

    /// Nothing matched the request
    #[error("{0}")]
    NotFound(String),

    // ==================
    // Upstream Errors
    // ==================
    /// An external service answered with a failure status
    #[error("ERROR: Something went wrong.")]
    Upstream(StatusCode),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// The store failed to execute a statement
    #[error("Query failed: {0}")]
    Query(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ApiError::MissingParam(_) => StatusCode::BAD_REQUEST,

            // 422 Unprocessable Entity
            ApiError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            // 404 Not Found
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,

            // Passed through from the upstream service
            ApiError::Upstream(status) => *status,

            // 500 Internal Server Error
            ApiError::Query(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::MissingParameter(name) => ApiError::MissingParam(name),
            QueryError::UndeclaredFilter(key) => ApiError::validation(key, "not a filterable column"),
            other @ QueryError::UnknownSlot { .. } => ApiError::Internal(other.to_string()),
            other => ApiError::Query(other.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            code: err.status_code().as_u16(),
            error: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "request failed");
        }
        let body = Json(ErrorResponse::from(self));
        (status, body).into_response()
    }
}
