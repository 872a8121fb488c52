//! StoryHunt - query gateway for the story search engine
//!
//! Validates search requests from the web frontend, caches full result sets
//! from the search engine and serves them page by page.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use storyhunt_core::config::BackendSettings;
use storyhunt_core::GatewayConfig;
use storyhunt_infra::{
    init_logger, logger_config_from_env, HttpBackendConfig, HttpSearchBackend, LoggerConfig,
};
use storyhunt_serve::ServerBuilder;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "storyhunt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "StoryHunt query gateway - validated, cached and paginated story search")]
struct Cli {
    /// Address to listen on
    host: String,

    /// Port to listen on
    port: u16,

    /// Search engine host
    backend_host: String,

    /// Search engine port
    backend_port: u16,

    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Result cache lifetime in seconds
    #[arg(long)]
    cache_ttl: Option<u64>,

    /// Maximum number of cached result sets
    #[arg(long)]
    cache_capacity: Option<u64>,

    /// Search engine request timeout in seconds
    #[arg(long)]
    backend_timeout: Option<u64>,

    /// Log level or filter directive
    #[arg(long)]
    log_level: Option<String>,

    /// Log format (pretty, compact, json)
    #[arg(long)]
    log_format: Option<String>,

    /// Disable CORS headers
    #[arg(long)]
    no_cors: bool,
}

impl Cli {
    /// Applies command line values on top of the loaded configuration
    fn apply(&self, config: &mut GatewayConfig) {
        config.server.host = self.host.clone();
        config.server.port = self.port;
        config.backend.url = BackendSettings::url_from_host_port(&self.backend_host, self.backend_port);

        if let Some(ttl) = self.cache_ttl {
            config.cache.ttl_seconds = ttl;
        }
        if let Some(capacity) = self.cache_capacity {
            config.cache.max_capacity = capacity;
        }
        if let Some(timeout) = self.backend_timeout {
            config.backend.timeout_seconds = timeout;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.to_lowercase();
        }
        if self.no_cors {
            config.server.cors_enabled = false;
        }
    }

    /// Builds the logger configuration from the merged settings
    ///
    /// Environment variables override the file, command line flags override both.
    fn logger_config(&self, config: &GatewayConfig) -> Result<LoggerConfig> {
        let mut logger_config = logger_config_from_env(LoggerConfig::from_settings(&config.logging)?);
        if self.log_level.is_some() {
            logger_config.level = config.logging.level.clone();
        }
        if self.log_format.is_some() {
            logger_config.format = config.logging.format.parse()?;
        }
        Ok(logger_config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = GatewayConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    init_logger(cli.logger_config(&config)?).context("Failed to initialize logging")?;

    info!("Starting {}", storyhunt_core::version_info());

    let backend = HttpSearchBackend::new(HttpBackendConfig {
        base_url: config.backend.url.clone(),
        timeout: config.backend.timeout(),
        ..Default::default()
    })
    .context("Failed to create search engine client")?;

    let server = ServerBuilder::with_config(config)
        .backend(Arc::new(backend))
        .build()
        .context("Failed to build server")?;

    server.start().await.context("Server failed")?;

    Ok(())
}
