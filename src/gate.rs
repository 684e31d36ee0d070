//! Access gate
//!
//! Compares a submitted access key against the configured secret and issues
//! an opaque session token on match. Tokens are not recorded anywhere and are
//! never checked again.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::GateConfig;

/// Shortest key accepted for comparison.
pub const MIN_KEY_LENGTH: usize = 8;

/// Field-level detail attached to validation failures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Access gate error types
#[derive(Debug)]
pub enum GateError {
    /// Input rejected before comparison
    Validation(Vec<FieldError>),
    /// Well-formed key that does not match
    InvalidKey,
    /// Unexpected fault while handling the request
    Internal(String),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        match self {
            GateError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "success": false,
                    "message": "Validation failed",
                    "errors": errors,
                })),
            )
                .into_response(),
            GateError::InvalidKey => (
                StatusCode::FORBIDDEN,
                Json(json!({
                    "success": false,
                    "message": "Invalid access key",
                })),
            )
                .into_response(),
            GateError::Internal(detail) => {
                warn!("Access gate fault: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "An error occurred while processing your request",
                    })),
                )
                    .into_response()
            }
        }
    }
}

/// Opaque session token handed to the browser after a successful check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    /// Build the token for `key` as of `issued_at`.
    pub fn issue(key: &str, issued_at: DateTime<Utc>) -> Self {
        Self(format!("token_{}_{}", key, issued_at.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-secret access gate
#[derive(Clone)]
pub struct AccessGate {
    secret: String,
}

impl AccessGate {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(config.access_key.clone())
    }

    /// Validate the key format, then compare it with the secret.
    pub fn check(&self, key: &str) -> Result<SessionToken, GateError> {
        validate_key_format(key)?;

        if key != self.secret {
            debug!("Access key rejected");
            return Err(GateError::InvalidKey);
        }

        Ok(SessionToken::issue(key, Utc::now()))
    }
}

fn validate_key_format(key: &str) -> Result<(), GateError> {
    if key.chars().count() < MIN_KEY_LENGTH {
        return Err(GateError::Validation(vec![FieldError::new(
            "key",
            format!("Access key must be at least {} characters", MIN_KEY_LENGTH),
        )]));
    }
    Ok(())
}
