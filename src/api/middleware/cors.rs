//! CORS middleware configuration for the `/api` routes
//!
//! The forwarding pipeline sets its own `Access-Control-*` headers and is not
//! wrapped by this layer.

use axum::http::header;
use axum::http::{HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::debug;

const LOCAL_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5000",
    "http://127.0.0.1:5000",
];

/// Create a CORS layer with the specified allowed origins
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = if allowed_origins.is_empty() {
        debug!("CORS: No origins specified, allowing localhost only");
        LOCAL_ORIGINS
            .iter()
            .map(|o| HeaderValue::from_static(*o))
            .collect()
    } else {
        debug!("CORS: Allowing origins: {:?}", allowed_origins);
        allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect()
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
