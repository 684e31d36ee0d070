//! Health check endpoints

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::api::server::AppState;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "wxr-proxy"
        })),
    )
}

/// Runtime status
pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "default_target": state.config.forward.default_target,
    }))
}
