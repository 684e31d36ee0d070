//! API route definitions

use axum::routing::{any, get, post};
use axum::Router;

use crate::proxy::PROXY_PATH;

use super::handlers;
use super::middleware::cors_layer;
use super::server::AppState;

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Access gate and status
        .nest("/api", api_routes().layer(cors))
        // Forwarding pipeline; any suffix after the mount point is discarded
        .route(PROXY_PATH, any(handlers::proxy::forward))
        .route(&format!("{}/*rest", PROXY_PATH), any(handlers::proxy::forward))
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/status", get(handlers::health::status))
        .route("/validate-key", post(handlers::auth::validate_key))
}
