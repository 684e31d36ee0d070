//! Set-Cookie domain stripping

use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use tracing::debug;

/// Drop the `Domain` attribute so the browser scopes the cookie to the
/// proxy's own host.
pub fn strip_cookie_domain(set_cookie: &str) -> String {
    let mut parts = set_cookie.split(';');
    let pair = parts.next().unwrap_or_default().trim();

    let attributes = parts.map(str::trim).filter(|attr| {
        let name = attr.split('=').next().unwrap_or_default().trim();
        !attr.is_empty() && !name.eq_ignore_ascii_case("domain")
    });

    std::iter::once(pair)
        .chain(attributes)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Rewrite every `Set-Cookie` header in place. Values that are not valid
/// UTF-8 pass through untouched.
pub fn rewrite_set_cookie_headers(headers: &mut HeaderMap) {
    if !headers.contains_key(SET_COOKIE) {
        return;
    }

    let values: Vec<HeaderValue> = headers.get_all(SET_COOKIE).iter().cloned().collect();
    headers.remove(SET_COOKIE);

    for value in values {
        let rewritten = value
            .to_str()
            .ok()
            .map(strip_cookie_domain)
            .and_then(|cookie| HeaderValue::from_str(&cookie).ok())
            .unwrap_or(value);
        headers.append(SET_COOKIE, rewritten);
    }

    debug!("Stripped cookie domains");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_attribute_is_removed() {
        assert_eq!(
            strip_cookie_domain("sid=abc; Domain=.example.org; Path=/; HttpOnly"),
            "sid=abc; Path=/; HttpOnly"
        );
        assert_eq!(
            strip_cookie_domain("sid=abc;path=/;DOMAIN=example.org"),
            "sid=abc; path=/"
        );
    }

    #[test]
    fn test_cookie_without_domain_is_normalised_only() {
        assert_eq!(strip_cookie_domain("theme=dark"), "theme=dark");
        assert_eq!(
            strip_cookie_domain("theme=dark;  Max-Age=60 ; Secure"),
            "theme=dark; Max-Age=60; Secure"
        );
    }

    #[test]
    fn test_value_containing_domain_text_is_kept() {
        assert_eq!(
            strip_cookie_domain("pref=domain=x; Domain=example.org"),
            "pref=domain=x"
        );
    }

    #[test]
    fn test_rewrite_keeps_every_set_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(
            SET_COOKIE,
            HeaderValue::from_static("a=1; Domain=example.org"),
        );
        headers.append(SET_COOKIE, HeaderValue::from_static("b=2; Path=/"));

        rewrite_set_cookie_headers(&mut headers);

        let cookies: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(cookies, vec!["a=1".to_string(), "b=2; Path=/".to_string()]);
    }
}
