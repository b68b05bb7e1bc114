use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Message returned to the caller for every failed submission.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to process assessment";

/// Application-specific error types.
#[derive(Debug)]
pub enum AppError {
    /// Contact store failure (connectivity, constraint violation, serialization).
    StoreFault(String),
    /// Crime data provider failure (network, HTTP status, parse).
    ProviderUnavailable(String),
    /// Alerting channel failure.
    NotifyFault(String),
    /// Request body could not be decoded into a submission.
    InvalidSubmission(String),
    /// Internal server error.
    InternalError(String),
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StoreFault(msg) => write!(f, "Contact store error: {}", msg),
            AppError::ProviderUnavailable(msg) => write!(f, "Crime data unavailable: {}", msg),
            AppError::NotifyFault(msg) => write!(f, "Alert delivery failed: {}", msg),
            AppError::InvalidSubmission(msg) => write!(f, "Invalid submission: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Every variant becomes the same 500 body, with the underlying message as `details`.
    fn into_response(self) -> Response {
        match &self {
            AppError::StoreFault(msg) => tracing::error!("Contact store error: {}", msg),
            AppError::InvalidSubmission(msg) => tracing::warn!("Rejected submission: {}", msg),
            other => tracing::error!("Submission error: {}", other),
        }

        let body = Json(json!({
            "success": false,
            "error": GENERIC_FAILURE_MESSAGE,
            "details": self.to_string(),
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    /// Converts a `sqlx::Error` into an `AppError`.
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreFault(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        AppError::ProviderUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization failed: {}", err))
    }
}
