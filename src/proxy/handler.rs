//! Forwarding request handler
//!
//! Resolves the target from the query string, forwards the inbound request
//! with the outbound header policy applied, and sanitizes the upstream
//! response so it can be displayed inside an iframe. Inbound bodies are
//! buffered up to a limit, upstream bodies are streamed back.

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::header::{HeaderValue, AUTHORIZATION, CONTENT_LENGTH, LOCATION};
use axum::http::{HeaderMap, Request, Response};
use bytes::Bytes;
use reqwest::redirect::Policy;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::config::ForwardConfig;
use crate::error::{Result, WxrError};
use crate::proxy::cookies::rewrite_set_cookie_headers;
use crate::proxy::headers::HeaderPolicy;
use crate::proxy::redirect::rewrite_location;
use crate::proxy::target::Target;

/// Configuration for proxy handler
#[derive(Debug, Clone)]
pub struct ProxyHandlerConfig {
    /// Target used when the request has no `url` parameter
    pub default_target: String,
    /// Timeout for the whole upstream exchange
    pub request_timeout: Duration,
    /// Largest inbound body that will be buffered and forwarded
    pub max_body_bytes: usize,
    /// Skip TLS certificate verification towards upstreams
    pub accept_invalid_certs: bool,
}

impl Default for ProxyHandlerConfig {
    fn default() -> Self {
        Self::from(&ForwardConfig::default())
    }
}

impl From<&ForwardConfig> for ProxyHandlerConfig {
    fn from(config: &ForwardConfig) -> Self {
        Self {
            default_target: config.default_target.clone(),
            request_timeout: config.upstream_timeout(),
            max_body_bytes: config.max_body_bytes,
            accept_invalid_certs: config.accept_invalid_certs,
        }
    }
}

/// Query parameters understood by the pipeline
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForwardParams {
    pub url: Option<String>,
    pub token: Option<String>,
}

impl ForwardParams {
    /// Session token, if a non-empty one was supplied
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Proxy request handler
pub struct ProxyHandler {
    client: reqwest::Client,
    config: ProxyHandlerConfig,
    outbound: HeaderPolicy,
    inbound: HeaderPolicy,
}

impl ProxyHandler {
    pub fn new(config: ProxyHandlerConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| WxrError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        if config.accept_invalid_certs {
            warn!("Upstream TLS certificate verification is disabled");
        }

        Ok(Self {
            client,
            config,
            outbound: HeaderPolicy::outbound(),
            inbound: HeaderPolicy::inbound(),
        })
    }

    /// Forward one request and return the sanitized upstream response
    #[instrument(skip(self, params, req), fields(method = %req.method()))]
    pub async fn handle(&self, params: &ForwardParams, req: Request<Body>) -> Result<Response<Body>> {
        let start = Instant::now();
        let target = Target::resolve(params.url.as_deref(), &self.config.default_target);
        let upstream_url = target.upstream_url()?;
        let token = params.token();

        let (parts, body) = req.into_parts();
        let body = self.read_body(&parts.headers, body).await?;

        let mut headers = parts.headers;
        self.outbound.apply(&mut headers);
        if let Some(token) = token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => debug!("Token is not a valid header value, not forwarding it"),
            }
        }

        debug!(upstream = %upstream_url, "Forwarding request");

        let mut upstream = self
            .client
            .request(parts.method, upstream_url.clone())
            .headers(headers);
        if !body.is_empty() {
            upstream = upstream.body(body);
        }

        let response = upstream.send().await?;
        let status = response.status();
        let mut headers = response.headers().clone();

        self.sanitize_response_headers(&mut headers, &target, token);

        info!(
            upstream = %upstream_url,
            status = status.as_u16(),
            content_length = response.content_length(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Forwarded request"
        );

        // Relayed chunk by chunk; the client timeout still bounds the transfer.
        let mut response = Response::new(Body::from_stream(response.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }

    /// Apply the inbound policy, strip cookie domains and keep redirects
    /// inside the proxy.
    pub fn sanitize_response_headers(
        &self,
        headers: &mut HeaderMap,
        target: &Target,
        token: Option<&str>,
    ) {
        self.inbound.apply(headers);
        rewrite_set_cookie_headers(headers);

        let location = headers
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        if let Some(location) = location {
            if let Some(rewritten) = rewrite_location(&location, target, token) {
                match HeaderValue::from_str(&rewritten) {
                    Ok(value) => {
                        headers.insert(LOCATION, value);
                    }
                    Err(e) => warn!(error = %e, "Rewritten location is not a valid header"),
                }
            }
        }
    }

    async fn read_body(&self, headers: &HeaderMap, body: Body) -> Result<Bytes> {
        let limit = self.config.max_body_bytes;

        let declared = headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<usize>().ok());
        if declared.is_some_and(|len| len > limit) {
            return Err(WxrError::PayloadTooLarge { limit });
        }

        axum::body::to_bytes(body, limit)
            .await
            .map_err(|e| WxrError::InvalidRequest(format!("Failed to read body: {}", e)))
    }
}
