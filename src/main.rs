//! WXR Proxy Server - Entry Point
//!
//! Starts the HTTP server with graceful shutdown support.

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wxr_proxy::api::ApiServer;
use wxr_proxy::config::{Config, LogConfig};
use wxr_proxy::error;

#[tokio::main]
async fn main() -> error::Result<()> {
    // Load configuration
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    init_tracing(&config.log);

    info!("Starting WXR Proxy Server");
    info!(
        default_target = %config.forward.default_target,
        upstream_timeout_secs = config.forward.upstream_timeout,
        "Configuration loaded"
    );

    let server = ApiServer::new(config.clone())?;

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server_task = tokio::spawn(async move {
        if let Err(e) = server.run(shutdown_rx).await {
            error!("Server error: {}", e);
        }
    });

    info!("Server started on {}", config.server_addr());

    // Wait for shutdown signal
    shutdown_signal().await;
    info!("Shutdown signal received");

    let _ = shutdown_tx.send(true);
    let _ = server_task.await;

    info!("WXR Proxy Server stopped");
    Ok(())
}

/// Initialize tracing. `RUST_LOG` wins over `LOG_LEVEL`.
fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("wxr_proxy={},tower_http=debug", log.level).into()
    });

    let registry = tracing_subscriber::registry().with(filter);

    if log.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
