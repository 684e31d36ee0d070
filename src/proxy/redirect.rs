//! Redirect rewriting
//!
//! Upstream `Location` headers are pointed back at `/proxy` so the iframe
//! never navigates straight to the third-party site.

use tracing::{debug, warn};
use url::form_urlencoded;

use super::target::Target;

/// Path the pipeline is mounted on
pub const PROXY_PATH: &str = "/proxy";

/// Shape of a `Location` header value. Each variant has exactly one rule in
/// [`LocationKind::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind<'a> {
    /// `http://...` or `https://...`, used as-is
    Absolute(&'a str),
    /// `//host/path`, takes the target's scheme
    SchemeRelative(&'a str),
    /// `/path`, appended to the target's origin
    RootRelative(&'a str),
    /// Anything else, appended to the origin after a `/`
    Relative(&'a str),
}

impl<'a> LocationKind<'a> {
    pub fn classify(location: &'a str) -> Self {
        let head = location.get(..8).unwrap_or(location).to_ascii_lowercase();
        if head.starts_with("http://") || head.starts_with("https://") {
            LocationKind::Absolute(location)
        } else if location.starts_with("//") {
            LocationKind::SchemeRelative(location)
        } else if location.starts_with('/') {
            LocationKind::RootRelative(location)
        } else {
            LocationKind::Relative(location)
        }
    }

    /// Absolute URL this location refers to, or `None` when the target has
    /// no usable origin to resolve against.
    pub fn resolve(&self, target: &Target) -> Option<String> {
        match *self {
            LocationKind::Absolute(url) => Some(url.to_string()),
            LocationKind::SchemeRelative(rest) => {
                target.scheme().map(|scheme| format!("{}:{}", scheme, rest))
            }
            LocationKind::RootRelative(path) => {
                target.origin().map(|origin| format!("{}{}", origin, path))
            }
            LocationKind::Relative(path) => {
                target.origin().map(|origin| format!("{}/{}", origin, path))
            }
        }
    }
}

/// `/proxy?url=<url>[&token=<token>]` with both values form-encoded
pub fn proxy_href(url: &str, token: Option<&str>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("url", url);
    if let Some(token) = token {
        query.append_pair("token", token);
    }
    format!("{}?{}", PROXY_PATH, query.finish())
}

/// Rewrite an upstream `Location` value. Returns `None` when it cannot be
/// resolved; the caller keeps the upstream value in that case.
pub fn rewrite_location(location: &str, target: &Target, token: Option<&str>) -> Option<String> {
    let kind = LocationKind::classify(location);
    match kind.resolve(target) {
        Some(absolute) => {
            let rewritten = proxy_href(&absolute, token);
            debug!(from = %location, to = %rewritten, "Rewrote redirect location");
            Some(rewritten)
        }
        None => {
            warn!(
                location = %location,
                target_url = %target.href(),
                "Cannot resolve redirect without a target origin"
            );
            None
        }
    }
}
