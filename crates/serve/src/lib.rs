//! StoryHunt Serve Library
//!
//! HTTP surface of the StoryHunt query gateway: the `/query`,
//! `/autocomplete`, `/test` and `/health` endpoints, the shared result
//! cache and the server bootstrap.

pub mod api;
pub mod cache;
pub mod handlers;
pub mod search;
pub mod server;

#[cfg(test)]
pub(crate) mod test_support;

pub use handlers::{AppState, HealthResponse};
pub use server::{GatewayServer, ServerBuilder};

/// Server version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
