use crate::error::{Result, WxrError};
use crate::gate::MIN_KEY_LENGTH;
use std::env;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Access gate configuration
    pub gate: GateConfig,
    /// Forwarding pipeline configuration
    pub forward: ForwardConfig,
    /// Logging configuration
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on (default: 5000)
    pub port: u16,
    /// Host to bind to (default: 0.0.0.0)
    pub host: String,
    /// Allowed CORS origins for `/api` (comma-separated, empty = localhost only)
    pub cors_origins: Vec<String>,
}

#[derive(Clone)]
pub struct GateConfig {
    /// The single accepted access key
    pub access_key: String,
}

// Keeps the key out of startup logs.
impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("access_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ForwardConfig {
    /// Target used when the request carries no `url` parameter
    pub default_target: String,
    /// Upstream request timeout in seconds
    pub upstream_timeout: u64,
    /// Maximum inbound body size buffered for forwarding
    pub max_body_bytes: usize,
    /// Skip TLS certificate verification towards upstreams
    pub accept_invalid_certs: bool,
}

impl ForwardConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout)
    }
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            default_target: "https://example.com".to_string(),
            upstream_timeout: 5,
            max_body_bytes: 10 * 1024 * 1024,
            accept_invalid_certs: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level (debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty)
    pub format: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let access_key = env::var("WXR_ACCESS_KEY")
            .map_err(|_| WxrError::MissingEnvVar("WXR_ACCESS_KEY".into()))?;
        if access_key.chars().count() < MIN_KEY_LENGTH {
            return Err(WxrError::InvalidConfig(format!(
                "WXR_ACCESS_KEY must be at least {} characters",
                MIN_KEY_LENGTH
            )));
        }

        let default_target = get_env_or("WXR_DEFAULT_TARGET", "https://example.com");
        validate_default_target(&default_target)?;

        let format = get_env_or("LOG_FORMAT", "pretty").to_lowercase();
        if format != "json" && format != "pretty" {
            return Err(WxrError::InvalidConfig(
                "LOG_FORMAT must be one of: json, pretty".into(),
            ));
        }

        Ok(Config {
            server: ServerConfig {
                port: get_env_or("PORT", "5000").parse().map_err(|_| {
                    WxrError::InvalidConfig("PORT must be a valid port number".into())
                })?,
                host: get_env_or("HOST", "0.0.0.0"),
                cors_origins: get_env_or("CORS_ORIGINS", "")
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
            gate: GateConfig { access_key },
            forward: ForwardConfig {
                default_target,
                upstream_timeout: get_env_or("WXR_UPSTREAM_TIMEOUT", "5")
                    .parse()
                    .map_err(|_| {
                        WxrError::InvalidConfig(
                            "WXR_UPSTREAM_TIMEOUT must be a number of seconds".into(),
                        )
                    })?,
                max_body_bytes: get_env_or("WXR_MAX_BODY_BYTES", "10485760")
                    .parse()
                    .map_err(|_| {
                        WxrError::InvalidConfig("WXR_MAX_BODY_BYTES must be a valid number".into())
                    })?,
                accept_invalid_certs: get_env_or("WXR_ACCEPT_INVALID_CERTS", "false")
                    .parse()
                    .map_err(|_| {
                        WxrError::InvalidConfig(
                            "WXR_ACCEPT_INVALID_CERTS must be true or false".into(),
                        )
                    })?,
            },
            log: LogConfig {
                level: get_env_or("LOG_LEVEL", "info"),
                format,
            },
        })
    }

    /// Get the listening address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn validate_default_target(raw: &str) -> Result<()> {
    let url = Url::parse(raw).map_err(|e| {
        WxrError::InvalidConfig(format!("WXR_DEFAULT_TARGET must be a valid URL: {}", e))
    })?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(WxrError::InvalidConfig(format!(
            "WXR_DEFAULT_TARGET has unsupported scheme: {}",
            other
        ))),
    }
}

/// Get environment variable with a default value
fn get_env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
