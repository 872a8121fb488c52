//! Configuration types for the StoryHunt gateway
//!
//! Settings are layered: built-in defaults, then an optional YAML/TOML/JSON
//! file, then `STORYHUNT__<SECTION>__<KEY>` environment variables. The
//! binary applies command-line arguments on top.

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "STORYHUNT";

/// Default lifetime of a cached result set, in seconds
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 600;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerSettings,
    /// Search backend settings
    #[serde(default)]
    pub backend: BackendSettings,
    /// Result cache settings
    #[serde(default)]
    pub cache: CacheSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allow cross-origin GET requests from any origin
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// Maximum request body size in bytes
    #[serde(default = "default_max_request_size")]
    pub max_request_size: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: true,
            max_request_size: default_max_request_size(),
        }
    }
}

impl ServerSettings {
    /// `host:port` string suitable for binding
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Search backend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the search engine API
    #[serde(default = "default_backend_url")]
    pub url: String,
    /// Upper bound for a single backend call in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_seconds: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            timeout_seconds: default_backend_timeout(),
        }
    }
}

impl BackendSettings {
    /// Builds the backend URL from a host and port pair
    pub fn url_from_host_port(host: &str, port: u16) -> String {
        if host.contains(':') && !host.starts_with('[') {
            format!("http://[{}]:{}", host, port)
        } else {
            format!("http://{}:{}", host, port)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Result cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Time to live for cached result sets in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of cached result sets
    #[serde(default = "default_cache_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl(),
            max_capacity: default_cache_capacity(),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format (pretty, compact, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from defaults, an optional file and the environment
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` if the file cannot be read or a value
    /// has the wrong type
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_environment(path, environment())
    }

    fn load_with_environment(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            tracing::debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let settings = builder.add_source(env).build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(GatewayError::config("Server host cannot be empty"));
        }
        if self.server.port == 0 {
            return Err(GatewayError::config("Server port cannot be 0"));
        }

        let url = Url::parse(&self.backend.url).map_err(|e| {
            GatewayError::config(format!("Invalid backend URL '{}': {}", self.backend.url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(GatewayError::config(
                "Backend URL must use http or https scheme",
            ));
        }
        if self.backend.timeout_seconds == 0 {
            return Err(GatewayError::config("Backend timeout must be greater than 0"));
        }

        if self.cache.ttl_seconds == 0 {
            return Err(GatewayError::config("Cache TTL must be greater than 0"));
        }
        if self.cache.max_capacity == 0 {
            return Err(GatewayError::config("Cache capacity must be greater than 0"));
        }

        if !matches!(self.logging.format.as_str(), "pretty" | "compact" | "json") {
            return Err(GatewayError::config(format!(
                "Unknown log format: {}",
                self.logging.format
            )));
        }

        Ok(())
    }
}

/// `STORYHUNT__SECTION__KEY` variables, e.g. `STORYHUNT__CACHE__TTL_SECONDS`
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_max_request_size() -> usize {
    64 * 1024
}
fn default_backend_url() -> String {
    "http://127.0.0.1:8001".to_string()
}
fn default_backend_timeout() -> u64 {
    30
}
fn default_cache_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECONDS
}
fn default_cache_capacity() -> u64 {
    10_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}
