//! Target resolution and outbound path construction

use tracing::warn;
use url::Url;

use crate::error::{Result, WxrError};

/// Scheme prepended to targets that arrive without one.
pub const DEFAULT_SCHEME: &str = "https";

/// The upstream a single forward request points at.
///
/// Built from the `url` query parameter on every request; nothing is carried
/// over between requests.
#[derive(Debug, Clone)]
pub struct Target {
    href: String,
    url: Option<Url>,
}

impl Target {
    /// Resolve the raw `url` parameter, falling back to `default_target`
    /// when it is missing or blank.
    pub fn resolve(raw: Option<&str>, default_target: &str) -> Self {
        let href = match raw.map(str::trim).filter(|s| !s.is_empty()) {
            None => default_target.to_string(),
            Some(raw) if has_http_scheme(raw) => raw.to_string(),
            Some(raw) => format!("{}://{}", DEFAULT_SCHEME, raw),
        };

        let url = match Url::parse(&href) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(target_url = %href, error = %e, "Target URL failed to parse");
                None
            }
        };

        Self { href, url }
    }

    /// Scheme-defaulted target as the browser asked for it
    pub fn href(&self) -> &str {
        &self.href
    }

    pub fn scheme(&self) -> Option<&str> {
        self.url.as_ref().map(Url::scheme)
    }

    /// `scheme://host[:port]` of the target, if it has one
    pub fn origin(&self) -> Option<String> {
        let origin = self.url.as_ref()?.origin();
        origin.is_tuple().then(|| origin.ascii_serialization())
    }

    /// Path and query sent upstream. The inbound proxy path never appears
    /// here; an unparseable target falls back to `/`.
    pub fn path_and_query(&self) -> String {
        match &self.url {
            Some(url) => match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            },
            None => "/".to_string(),
        }
    }

    /// Full URL of the outbound request
    pub fn upstream_url(&self) -> Result<Url> {
        let origin = self
            .origin()
            .ok_or_else(|| WxrError::InvalidTarget(self.href.clone()))?;
        Ok(Url::parse(&format!("{}{}", origin, self.path_and_query()))?)
    }
}

fn has_http_scheme(raw: &str) -> bool {
    let head = raw.get(..8).unwrap_or(raw).to_ascii_lowercase();
    head.starts_with("http://") || head.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: &str = "https://example.com";

    #[test]
    fn test_missing_scheme_defaults_to_https() {
        let target = Target::resolve(Some("example.org/page"), DEFAULT);
        assert_eq!(target.href(), "https://example.org/page");
        assert_eq!(
            target.upstream_url().unwrap().as_str(),
            "https://example.org/page"
        );
    }

    #[test]
    fn test_explicit_scheme_is_kept() {
        let target = Target::resolve(Some("http://example.org:8080/a"), DEFAULT);
        assert_eq!(target.scheme(), Some("http"));
        assert_eq!(target.origin().as_deref(), Some("http://example.org:8080"));

        let target = Target::resolve(Some("HTTPS://Example.org/"), DEFAULT);
        assert_eq!(target.href(), "HTTPS://Example.org/");
        assert_eq!(target.origin().as_deref(), Some("https://example.org"));
    }

    #[test]
    fn test_absent_or_blank_falls_back_to_default() {
        let target = Target::resolve(None, DEFAULT);
        assert_eq!(target.href(), DEFAULT);
        assert_eq!(target.path_and_query(), "/");

        let target = Target::resolve(Some("   "), DEFAULT);
        assert_eq!(target.href(), DEFAULT);
    }

    #[test]
    fn test_path_and_query_come_from_target() {
        let target = Target::resolve(Some("https://example.org/search?q=rust&page=2#top"), DEFAULT);
        assert_eq!(target.path_and_query(), "/search?q=rust&page=2");
        assert_eq!(
            target.upstream_url().unwrap().as_str(),
            "https://example.org/search?q=rust&page=2"
        );
    }

    #[test]
    fn test_userinfo_is_not_forwarded() {
        let target = Target::resolve(Some("https://user:pw@example.org/x"), DEFAULT);
        assert_eq!(
            target.upstream_url().unwrap().as_str(),
            "https://example.org/x"
        );
    }

    #[test]
    fn test_unparseable_target_falls_back_to_root_path() {
        let target = Target::resolve(Some("exa mple.org/deep/path"), DEFAULT);
        assert_eq!(target.href(), "https://exa mple.org/deep/path");
        assert_eq!(target.path_and_query(), "/");
        assert!(target.origin().is_none());
        assert!(matches!(
            target.upstream_url(),
            Err(WxrError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_host_only_lookalike_gets_scheme() {
        // Starts with "http" but carries no scheme
        let target = Target::resolve(Some("httpbin.org/get"), DEFAULT);
        assert_eq!(target.href(), "https://httpbin.org/get");
        assert_eq!(target.path_and_query(), "/get");
    }
}
