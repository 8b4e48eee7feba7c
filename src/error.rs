// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
///
/// Every failure condition of the data layer maps to its own variant so
/// callers can tell a rejected input apart from a broken backend.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A required field is empty or a reference does not resolve.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A bulk import is missing required columns.
    #[error("Import is missing required columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// The storage medium could not be reached or is misconfigured.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A row failed mid-batch; rows before it may or may not be stored.
    #[error("Import failed at row {row}: {message}")]
    Import { row: usize, message: String },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Short machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::Schema { .. } => "schema_error",
            AppError::StorageUnavailable(_) => "storage_unavailable",
            AppError::Import { .. } => "import_error",
            AppError::NotFound(_) => "not_found",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::StorageUnavailable(format!("SQLite: {}", err))
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, Some(msg.clone())),
            AppError::Schema { .. } => (StatusCode::UNPROCESSABLE_ENTITY, Some(self.to_string())),
            AppError::Import { .. } => (StatusCode::UNPROCESSABLE_ENTITY, Some(self.to_string())),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, Some(msg.clone())),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Some(msg.clone())),
            AppError::StorageUnavailable(msg) => {
                tracing::error!(error = %msg, "Storage unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
        };

        let body = ErrorResponse {
            error: self.code().to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
