//! Error handling module for the LiteLLM admin backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and response envelopes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const MISSING_CONFIG: &str = "MISSING_CONFIG";
    pub const UPSTREAM_UNREACHABLE: &str = "UPSTREAM_UNREACHABLE";
    pub const UPSTREAM_STATUS: &str = "UPSTREAM_STATUS";
    pub const UPSTREAM_PARSE: &str = "UPSTREAM_PARSE";
    pub const PARTIAL_RECONCILE: &str = "PARTIAL_RECONCILE";
    pub const SETTINGS_ERROR: &str = "SETTINGS_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Authentication required
    Unauthorized(String),
    /// Client-side validation failure (bad duration, missing field)
    Validation(String),
    /// Malformed request
    BadRequest(String),
    /// API key or base URL not configured
    MissingConfig(String),
    /// Upstream could not be reached
    UpstreamUnreachable(String),
    /// Upstream answered with a non-2xx status
    UpstreamStatus { status: u16, body: String },
    /// Upstream body was not JSON
    UpstreamParse(String),
    /// Member reconciliation stopped part-way
    PartialReconcile {
        message: String,
        log: serde_json::Value,
    },
    /// Settings store could not be read or written
    Settings(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingConfig(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UpstreamUnreachable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamStatus { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UpstreamParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PartialReconcile { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Settings(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::MissingConfig(_) => codes::MISSING_CONFIG,
            AppError::UpstreamUnreachable(_) => codes::UPSTREAM_UNREACHABLE,
            AppError::UpstreamStatus { .. } => codes::UPSTREAM_STATUS,
            AppError::UpstreamParse(_) => codes::UPSTREAM_PARSE,
            AppError::PartialReconcile { .. } => codes::PARTIAL_RECONCILE,
            AppError::Settings(_) => codes::SETTINGS_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::BadRequest(msg) => msg.clone(),
            AppError::MissingConfig(msg) => msg.clone(),
            AppError::UpstreamUnreachable(msg) => msg.clone(),
            AppError::UpstreamStatus { status, body } => {
                format!("Upstream returned status {}: {}", status, body)
            }
            AppError::UpstreamParse(msg) => msg.clone(),
            AppError::PartialReconcile { message, .. } => message.clone(),
            AppError::Settings(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Upstream request error: {:?}", err);
        AppError::UpstreamUnreachable(format!("Upstream unreachable: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Settings store I/O error: {:?}", err);
        AppError::Settings(format!("Settings store error: {}", err))
    }
}

/// Error response body sent to the dashboard.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What the route was trying to do, e.g. "Failed to create team"
    pub error: String,
    pub code: String,
    pub details: serde_json::Value,
}

impl ErrorResponse {
    pub fn new(context: &str, error: &AppError) -> Self {
        let details = match error {
            AppError::PartialReconcile { message, log } => serde_json::json!({
                "message": message,
                "mutations": log,
            }),
            _ => serde_json::Value::String(error.message()),
        };

        Self {
            error: context.to_string(),
            code: error.error_code().to_string(),
            details,
        }
    }
}

/// Wrapper type for errors that carry the route's context message.
#[derive(Debug)]
pub struct ApiFailure {
    pub context: &'static str,
    pub error: AppError,
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let status = self.error.status_code();
        if status.is_server_error() {
            tracing::error!("{}: {}", self.context, self.error);
        } else {
            tracing::warn!("{}: {}", self.context, self.error);
        }
        let body = ErrorResponse::new(self.context, &self.error);
        (status, Json(body)).into_response()
    }
}
