//! Error handling module
//!
//! Provides unified error types and handling for the entire application.

use crate::diagnostics::Diagnostics;
use crate::version::VersionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unknown version: {0}")]
    UnknownVersion(String),

    #[error("Version range is inverted: '{first}' comes after '{last}'")]
    InvertedRange { first: String, last: String },

    #[error("No schema capture is mapped for version {0}")]
    MissingSchemaMapping(String),

    #[error("Capture '{schema}' for version {version} is not loaded")]
    MissingSnapshot { version: String, schema: String },

    #[error("Invalid version: {0}")]
    InvalidVersion(#[from] VersionError),

    #[error("Schema annotations are incomplete:\n{0}")]
    Incomplete(Diagnostics),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::UnknownVersion(_)
            | AppError::InvertedRange { .. }
            | AppError::InvalidVersion(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Incomplete(_)
            | AppError::MissingSchemaMapping(_)
            | AppError::MissingSnapshot { .. }
            | AppError::Io(_)
            | AppError::Json(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnknownVersion(_) => "UNKNOWN_VERSION",
            AppError::InvertedRange { .. } => "INVERTED_RANGE",
            AppError::MissingSchemaMapping(_) => "MISSING_SCHEMA_MAPPING",
            AppError::MissingSnapshot { .. } => "MISSING_SNAPSHOT",
            AppError::InvalidVersion(_) => "INVALID_VERSION",
            AppError::Incomplete(_) => "INCOMPLETE_ANNOTATIONS",
            AppError::Io(_) => "IO_ERROR",
            AppError::Json(_) => "JSON_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details, diagnostics) = match self {
            AppError::Incomplete(diagnostics) => {
                warn!("Report refused: {} diagnostics", diagnostics.len());
                (
                    "Schema annotations are incomplete".to_string(),
                    Some(diagnostics.joined("\n")),
                    Some(diagnostics),
                )
            }
            AppError::Io(_) | AppError::Json(_) | AppError::Config(_) | AppError::Internal(_) => {
                error!("{}", self);
                ("An internal error occurred".to_string(), Some(self.to_string()), None)
            }
            AppError::MissingSchemaMapping(_) | AppError::MissingSnapshot { .. } => {
                error!("{}", self);
                (self.to_string(), None, None)
            }
            other => (other.to_string(), None, None),
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(code.to_string()),
            diagnostics,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a not found error
pub fn not_found_error(msg: impl Into<String>) -> AppError {
    AppError::NotFound(msg.into())
}
