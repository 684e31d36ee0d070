//! Header policies applied on each side of the forwarding pipeline
//!
//! Every header the pipeline drops or forces is listed here. The inbound
//! policy deliberately removes the headers that stop a page from being framed
//! by a third party, so auditing that trade-off means reading this file only.

use http::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, CONNECTION, CONTENT_LENGTH,
    CONTENT_SECURITY_POLICY, HOST, ORIGIN, REFERER, USER_AGENT, X_FRAME_OPTIONS,
};
use tracing::trace;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

pub const PERMISSIVE_CSP: &str = "default-src * 'unsafe-inline' 'unsafe-eval' data: blob:;";
pub const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "X-Requested-With, Content-Type, Accept, Authorization";

/// A named header transform: drop hop-by-hop headers, drop every denied
/// header, then force every override.
#[derive(Debug, Clone)]
pub struct HeaderPolicy {
    name: &'static str,
    deny: Vec<HeaderName>,
    overrides: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderPolicy {
    /// Policy for requests sent to the upstream
    pub fn outbound() -> Self {
        Self {
            name: "outbound",
            deny: vec![HOST, CONTENT_LENGTH, ORIGIN, REFERER],
            overrides: vec![
                (USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT)),
                (ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT)),
                (
                    ACCEPT_LANGUAGE,
                    HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
                ),
            ],
        }
    }

    /// Policy for responses returned to the browser
    pub fn inbound() -> Self {
        Self {
            name: "inbound",
            deny: vec![X_FRAME_OPTIONS, CONTENT_SECURITY_POLICY, CONTENT_LENGTH],
            overrides: vec![
                (ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
                (
                    ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static(ALLOWED_METHODS),
                ),
                (
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(ALLOWED_HEADERS),
                ),
                (CONTENT_SECURITY_POLICY, HeaderValue::from_static(PERMISSIVE_CSP)),
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn denies(&self, name: &HeaderName) -> bool {
        self.deny.contains(name)
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        strip_hop_by_hop(headers);

        for name in &self.deny {
            if headers.remove(name).is_some() {
                trace!(policy = self.name, header = %name, "Removed header");
            }
        }

        for (name, value) in &self.overrides {
            headers.insert(name.clone(), value.clone());
        }
    }
}

/// Remove hop-by-hop headers, including any the `Connection` header names.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(&name);
    }

    let hop_by_hop: Vec<HeaderName> = headers
        .keys()
        .filter(|name| is_hop_by_hop_header(name.as_str()))
        .cloned()
        .collect();

    for name in hop_by_hop {
        headers.remove(&name);
    }
}

/// Check if a header is a hop-by-hop header that should not be forwarded
fn is_hop_by_hop_header(name: &str) -> bool {
    matches!(
        name.to_lowercase().as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailers"
            | "transfer-encoding"
            | "upgrade"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{AUTHORIZATION, COOKIE, SET_COOKIE, TRANSFER_ENCODING};

    fn header_map(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in pairs {
            headers.append(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn test_outbound_policy_rewrites_browser_headers() {
        let mut headers = header_map(&[
            ("user-agent", "curl/8.0"),
            ("accept", "*/*"),
            ("origin", "http://localhost:5000"),
            ("referer", "http://localhost:5000/proxy"),
            ("host", "localhost:5000"),
            ("cookie", "sid=1"),
            ("authorization", "Bearer abc"),
        ]);

        HeaderPolicy::outbound().apply(&mut headers);

        assert_eq!(headers[USER_AGENT], BROWSER_USER_AGENT);
        assert_eq!(headers[ACCEPT], BROWSER_ACCEPT);
        assert_eq!(headers[ACCEPT_LANGUAGE], BROWSER_ACCEPT_LANGUAGE);
        assert!(headers.get(ORIGIN).is_none());
        assert!(headers.get(REFERER).is_none());
        assert!(headers.get(HOST).is_none());
        assert_eq!(headers[COOKIE], "sid=1");
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
    }

    #[test]
    fn test_inbound_policy_allows_framing() {
        let mut headers = header_map(&[
            ("x-frame-options", "DENY"),
            ("content-security-policy", "frame-ancestors 'none'"),
            ("content-security-policy", "default-src 'self'"),
            ("access-control-allow-origin", "https://only.example"),
            ("content-type", "text/html"),
            ("set-cookie", "a=1"),
        ]);

        HeaderPolicy::inbound().apply(&mut headers);

        assert!(headers.get(X_FRAME_OPTIONS).is_none());
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS);

        let csp: Vec<_> = headers.get_all(CONTENT_SECURITY_POLICY).iter().collect();
        assert_eq!(csp, vec![PERMISSIVE_CSP]);

        assert_eq!(headers["content-type"], "text/html");
        assert_eq!(headers[SET_COOKIE], "a=1");
    }

    #[test]
    fn test_inbound_policy_sets_headers_when_upstream_sent_none() {
        let mut headers = HeaderMap::new();
        HeaderPolicy::inbound().apply(&mut headers);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[CONTENT_SECURITY_POLICY], PERMISSIVE_CSP);
    }

    #[test]
    fn test_policy_is_idempotent() {
        let policy = HeaderPolicy::inbound();
        let mut once = header_map(&[("x-frame-options", "SAMEORIGIN"), ("etag", "\"v1\"")]);
        policy.apply(&mut once);
        let mut twice = once.clone();
        policy.apply(&mut twice);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_hop_by_hop_headers_are_stripped() {
        let mut headers = header_map(&[
            ("connection", "keep-alive, x-session-hint"),
            ("keep-alive", "timeout=5"),
            ("transfer-encoding", "chunked"),
            ("x-session-hint", "abc"),
            ("proxy-authorization", "Basic Zm9vOmJhcg=="),
            ("content-type", "text/plain"),
        ]);

        strip_hop_by_hop(&mut headers);

        assert!(headers.get(CONNECTION).is_none());
        assert!(headers.get("keep-alive").is_none());
        assert!(headers.get(TRANSFER_ENCODING).is_none());
        assert!(headers.get("x-session-hint").is_none());
        assert!(headers.get("proxy-authorization").is_none());
        assert_eq!(headers["content-type"], "text/plain");
    }

    #[test]
    fn test_policy_names_and_deny_lists() {
        let outbound = HeaderPolicy::outbound();
        let inbound = HeaderPolicy::inbound();
        assert_eq!(outbound.name(), "outbound");
        assert_eq!(inbound.name(), "inbound");
        assert!(outbound.denies(&REFERER));
        assert!(!outbound.denies(&X_FRAME_OPTIONS));
        assert!(inbound.denies(&X_FRAME_OPTIONS));
        assert!(inbound.denies(&CONTENT_SECURITY_POLICY));
    }
}
