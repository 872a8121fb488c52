//! Logging infrastructure for StoryHunt
//!
//! This module provides centralized logging configuration using the
//! tracing ecosystem.

use std::str::FromStr;
use storyhunt_core::config::LoggingSettings;
use storyhunt_core::{GatewayError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(GatewayError::config(format!("Unknown log format: {}", s))),
        }
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Log level or filter directive (e.g. `info`, `storyhunt_serve=debug`)
    pub level: String,
    pub format: LogFormat,
    /// Whether to include timestamps
    pub with_timestamps: bool,
    /// Whether to include file/line information
    pub with_file_info: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_timestamps: true,
            with_file_info: false,
        }
    }
}

impl LoggerConfig {
    /// Builds a logger configuration from the gateway's logging section
    pub fn from_settings(settings: &LoggingSettings) -> Result<Self> {
        Ok(Self {
            level: settings.level.clone(),
            format: settings.format.parse()?,
            ..Default::default()
        })
    }
}

/// Initialize the global logger with the given configuration
pub fn init_logger(config: LoggerConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level)
        .map_err(|e| GatewayError::config(format!("Invalid log level '{}': {}", config.level, e)))?
        .add_directive(directive("hyper=warn")?)
        .add_directive(directive("reqwest=warn")?)
        .add_directive(directive("h2=warn")?);

    let fmt_layer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_file(config.with_file_info)
            .with_line_number(config.with_file_info)
            .boxed(),
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_target(true)
                .with_file(config.with_file_info)
                .with_line_number(config.with_file_info);
            if config.with_timestamps {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_target(true)
                .with_file(config.with_file_info)
                .with_line_number(config.with_file_info);
            if config.with_timestamps {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            }
        }
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| GatewayError::config(format!("Failed to initialize logger: {}", e)))?;

    tracing::info!("Logger initialized with level: {}", config.level);
    Ok(())
}

/// Initialize logger for testing (reduces noise)
pub fn init_test_logger() -> Result<()> {
    let config = LoggerConfig {
        level: "warn".to_string(),
        format: LogFormat::Compact,
        with_timestamps: false,
        with_file_info: false,
    };

    // Ignore errors if already initialized
    let _ = init_logger(config);
    Ok(())
}

/// Applies `STORYHUNT_LOG_LEVEL` and `STORYHUNT_LOG_JSON` on top of `base`
pub fn logger_config_from_env(base: LoggerConfig) -> LoggerConfig {
    apply_env_overrides(base, |name| std::env::var(name).ok())
}

fn apply_env_overrides<F>(base: LoggerConfig, lookup: F) -> LoggerConfig
where
    F: Fn(&str) -> Option<String>,
{
    let level = lookup("STORYHUNT_LOG_LEVEL").unwrap_or(base.level);
    let format = match lookup("STORYHUNT_LOG_JSON").map(|v| v.parse::<bool>()) {
        Some(Ok(true)) => LogFormat::Json,
        _ => base.format,
    };

    LoggerConfig {
        level,
        format,
        ..base
    }
}

fn directive(raw: &str) -> Result<tracing_subscriber::filter::Directive> {
    raw.parse()
        .map_err(|e| GatewayError::config(format!("Invalid log directive '{}': {}", raw, e)))
}
