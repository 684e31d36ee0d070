//! Access key validation handler

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::server::AppState;
use crate::gate::{FieldError, GateError, SessionToken};

/// Validate-key request
#[derive(Debug, Deserialize)]
pub struct ValidateKeyRequest {
    pub key: String,
}

/// Validate-key response
#[derive(Debug, Serialize)]
pub struct ValidateKeyResponse {
    pub success: bool,
    pub token: SessionToken,
    pub message: &'static str,
}

impl From<JsonRejection> for GateError {
    fn from(rejection: JsonRejection) -> Self {
        let field = match rejection {
            JsonRejection::JsonDataError(_) => "key",
            _ => "body",
        };
        GateError::Validation(vec![FieldError::new(field, rejection.body_text())])
    }
}

/// Handle an access key submission
pub async fn validate_key(
    State(state): State<AppState>,
    payload: Result<Json<ValidateKeyRequest>, JsonRejection>,
) -> Result<impl IntoResponse, GateError> {
    let Json(req) = payload?;

    let token = state.gate.check(&req.key).map_err(|e| {
        match &e {
            GateError::Validation(_) => warn!("Access key failed validation"),
            GateError::InvalidKey => warn!("Invalid access key submitted"),
            GateError::Internal(_) => {}
        }
        e
    })?;

    info!("Access granted");

    Ok((
        StatusCode::OK,
        Json(ValidateKeyResponse {
            success: true,
            token,
            message: "Access granted",
        }),
    ))
}
