//! WXR - iframe URL proxy
//!
//! Relays third-party pages so they can be displayed inside an iframe.
//!
//! ## Features
//!
//! - Single-key access gate issuing opaque session tokens
//! - Forwarding of any request to the target named by the `url` query parameter
//! - Browser-like outbound headers, `Origin`/`Referer` removed
//! - Framing headers stripped and a permissive CSP applied to responses
//! - Redirects and cookies rewritten so navigation stays inside the proxy

pub mod api;
pub mod config;
pub mod error;
pub mod gate;
pub mod proxy;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use error::{Result, WxrError};
