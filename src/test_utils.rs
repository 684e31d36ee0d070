//! Test utilities and shared configuration.

use axum::Router;

use crate::api::ApiServer;
use crate::config::{Config, ForwardConfig, GateConfig, LogConfig, ServerConfig};

/// Access key accepted by [`create_test_config`]
pub const TEST_ACCESS_KEY: &str = "Y?24V/^SeGgwedg";

/// Creates a standard configuration for testing purposes.
pub fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
            cors_origins: vec![],
        },
        gate: GateConfig {
            access_key: TEST_ACCESS_KEY.to_string(),
        },
        forward: ForwardConfig::default(),
        log: LogConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
    }
}

/// Full application router built from [`create_test_config`]
pub fn create_test_router() -> Router {
    ApiServer::new(create_test_config())
        .expect("test server")
        .build_router()
}
