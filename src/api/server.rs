//! HTTP server using Axum
//!
//! Serves the access gate API and the forwarding pipeline on one listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::middleware::from_fn;
use axum::Router;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::{Result, WxrError};
use crate::gate::AccessGate;
use crate::proxy::{ProxyHandler, ProxyHandlerConfig};

use super::middleware::RequestLogging;
use super::routes;

/// Shared state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gate: AccessGate,
    pub proxy: Arc<ProxyHandler>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let gate = AccessGate::from_config(&config.gate);
        let proxy = Arc::new(ProxyHandler::new(ProxyHandlerConfig::from(&config.forward))?);

        Ok(Self {
            config,
            gate,
            proxy,
            started_at: Instant::now(),
        })
    }
}

/// API server
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// Create a new API server
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config)?,
        })
    }

    /// Build the router
    pub fn build_router(&self) -> Router {
        routes::create_router(self.state.clone())
            .layer(from_fn(RequestLogging::log_request))
            .layer(TraceLayer::new_for_http().make_span_with(RequestLogging::make_span))
    }

    /// Run the API server
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(self.state.config.server_addr()).await?;
        let addr: SocketAddr = listener.local_addr()?;
        info!("Server listening on {}", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.changed().await;
            })
            .await
            .map_err(|e| WxrError::Internal(e.to_string()))?;

        info!("Server shut down");
        Ok(())
    }
}
