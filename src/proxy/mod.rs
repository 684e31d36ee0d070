//! Forwarding pipeline
//!
//! This module provides the request/response rewriting pipeline:
//! - Target resolution from the `url` query parameter
//! - Outbound and inbound header policies
//! - Redirect rewriting back through `/proxy`
//! - Set-Cookie domain stripping

pub mod cookies;
pub mod handler;
pub mod headers;
pub mod redirect;
pub mod target;

pub use handler::{ForwardParams, ProxyHandler, ProxyHandlerConfig};
pub use headers::HeaderPolicy;
pub use redirect::{LocationKind, PROXY_PATH};
pub use target::Target;
