//! # HTTP API Errors
//!
//! Every failure a handler can produce, with its status code and the JSON
//! envelope clients expect for it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::schema::SchemaError;
use crate::storage::StorageError;

/// Message for 500s when error details must not leak.
pub const HIDDEN_INTERNAL_MESSAGE: &str = "Internal server error";

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Which collection operation a store failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Save,
    Retrieve,
    Clear,
}

impl StoreOperation {
    /// Client-facing failure message
    pub fn failure_message(&self) -> &'static str {
        match self {
            StoreOperation::Save => "Error saving game data",
            StoreOperation::Retrieve => "Error retrieving game data",
            StoreOperation::Clear => "Error clearing game data",
        }
    }
}

/// HTTP API errors
#[derive(Debug, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// One or more fields failed validation
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Body is not parseable JSON
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Route exists but not for this method
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    /// No route matches
    #[error("Not found")]
    NotFound,

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store not connected, or the operation timed out
    #[error("{}: {source}", .operation.failure_message())]
    StoreUnavailable {
        operation: StoreOperation,
        source: StorageError,
    },

    /// Store reached but the call failed
    #[error("{}: {source}", .operation.failure_message())]
    StoreOperationFailure {
        operation: StoreOperation,
        source: StorageError,
    },

    /// Unexpected failure (panics, bugs)
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Classifies a storage failure for `operation`.
    pub fn from_storage(operation: StoreOperation, source: StorageError) -> Self {
        if source.is_unavailable() {
            ApiError::StoreUnavailable { operation, source }
        } else {
            ApiError::StoreOperationFailure { operation, source }
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::StoreUnavailable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::StoreOperationFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Renders the response body.
    pub fn body(&self) -> serde_json::Value {
        let status = self.status_code().as_u16();
        match self {
            ApiError::Validation(details) => json!({
                "error": "Validation failed",
                "details": details,
            }),
            ApiError::MalformedBody(message) => json!({
                "error": { "message": message, "status": status },
            }),
            ApiError::MethodNotAllowed => json!({ "error": "Method Not Allowed" }),
            ApiError::NotFound => json!({
                "error": { "message": "Not found", "status": status },
            }),
            ApiError::StoreUnavailable { operation, source }
            | ApiError::StoreOperationFailure { operation, source } => json!({
                "success": false,
                "message": operation.failure_message(),
                "error": source.message(),
            }),
            ApiError::Internal(message) => json!({
                "error": { "message": message, "status": status },
            }),
        }
    }
}

impl From<SchemaError> for ApiError {
    fn from(err: SchemaError) -> Self {
        if !err.is_rejection() {
            ApiError::Internal(err.to_string())
        } else if err.details().is_empty() {
            ApiError::Validation(vec![err.message().to_string()])
        } else {
            ApiError::Validation(err.detail_messages())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
