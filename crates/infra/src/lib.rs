//! StoryHunt Infrastructure Library
//!
//! Infrastructure components for the StoryHunt query gateway: the HTTP
//! client for the search engine and logging setup.

pub mod backend;
pub mod logger;

pub use backend::{HttpBackendConfig, HttpSearchBackend};
pub use logger::{init_logger, init_test_logger, logger_config_from_env, LogFormat, LoggerConfig};

/// Infrastructure version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
