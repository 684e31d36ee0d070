//! Request logging middleware

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use tracing::{debug, debug_span, info, warn, Span};

/// Request logging middleware
pub struct RequestLogging;

impl RequestLogging {
    /// Span for `TraceLayer`. Records the path only; the query string of a
    /// forwarded request carries the session token.
    pub fn make_span(req: &Request<Body>) -> Span {
        debug_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            version = ?req.version(),
        )
    }

    /// Log request details. The query string is left out since it carries
    /// the session token.
    pub async fn log_request(req: Request<Body>, next: Next) -> Response {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let start = Instant::now();

        debug!("{} {} - started", method, path);

        let response = next.run(req).await;

        let duration = start.elapsed();
        let status = response.status();

        if status.is_server_error() {
            warn!("{} {} - {} in {:?}", method, path, status, duration);
        } else {
            info!("{} {} - {} in {:?}", method, path, status, duration);
        }

        response
    }
}
