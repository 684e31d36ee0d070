//! HTTP surface
//!
//! Provides the access gate endpoint, the forwarding pipeline route and the
//! health endpoints.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use server::{ApiServer, AppState};
