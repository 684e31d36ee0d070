use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Unified error type for the WXR proxy
#[derive(Error, Debug)]
pub enum WxrError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    // Request errors
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    // Upstream errors
    #[error("Invalid target URL: {0}")]
    InvalidTarget(String),

    #[error("Upstream request failed: {0}")]
    UpstreamFailed(String),

    #[error("Upstream request timed out")]
    Timeout,

    // I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for WXR operations
pub type Result<T> = std::result::Result<T, WxrError>;

/// Body returned for every failed upstream fetch. Detail stays in the logs.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Error fetching the URL";

impl WxrError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            WxrError::InvalidRequest(_) | WxrError::InvalidConfig(_) => StatusCode::BAD_REQUEST,

            // 413 Payload Too Large
            WxrError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,

            // 500 Internal Server Error, upstream failures included
            WxrError::InvalidTarget(_)
            | WxrError::UpstreamFailed(_)
            | WxrError::Timeout
            | WxrError::Io(_)
            | WxrError::MissingEnvVar(_)
            | WxrError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Check if this is a client error (4xx)
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Check if this is a server error (5xx)
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Message safe to show to the browser.
    pub fn public_message(&self) -> String {
        match self {
            WxrError::InvalidTarget(_) | WxrError::UpstreamFailed(_) | WxrError::Timeout => {
                UPSTREAM_FAILURE_MESSAGE.to_string()
            }
            e if e.is_server_error() => "Internal server error".to_string(),
            e => e.to_string(),
        }
    }
}

// Implement IntoResponse for API error responses
impl IntoResponse for WxrError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.public_message(),
        });

        (status, Json(body)).into_response()
    }
}

// Convert from upstream client errors
impl From<reqwest::Error> for WxrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WxrError::Timeout
        } else {
            WxrError::UpstreamFailed(err.to_string())
        }
    }
}

// Convert from URL parse errors
impl From<url::ParseError> for WxrError {
    fn from(err: url::ParseError) -> Self {
        WxrError::InvalidTarget(err.to_string())
    }
}
