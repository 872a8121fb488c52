//! Server module for the StoryHunt serve crate

use crate::api::create_routes;
use crate::handlers::AppState;
use axum::{http::Method, Router};
use std::sync::Arc;
use storyhunt_core::config::ServerSettings;
use storyhunt_core::{GatewayConfig, GatewayError, Result, SearchBackend};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

/// StoryHunt HTTP server
pub struct GatewayServer {
    config: Arc<GatewayConfig>,
    app: Router,
}

impl GatewayServer {
    /// Create a new server instance
    pub fn new(config: GatewayConfig, backend: Arc<dyn SearchBackend>) -> Self {
        let config = Arc::new(config);
        let state = AppState::new(backend, config.clone());
        let app = create_app(&config, state);

        Self { config, app }
    }

    /// Start the server and run until Ctrl-C
    pub async fn start(self) -> Result<()> {
        let listener = bind_listener(&self.config.server).await?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| GatewayError::network(format!("Failed to read bound address: {}", e)))?;

        tracing::info!(
            "StoryHunt gateway listening on {} (backend {})",
            local_addr,
            self.config.backend.url
        );

        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::network(format!("Server error: {}", e)))?;

        tracing::info!("StoryHunt gateway stopped");
        Ok(())
    }

    /// Get the server configuration
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Get the application router
    pub fn router(&self) -> Router {
        self.app.clone()
    }
}

/// Create the Axum application with middleware
fn create_app(config: &GatewayConfig, state: AppState) -> Router {
    let mut app = create_routes().with_state(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(RequestBodyLimitLayer::new(config.server.max_request_size)),
    );

    if config.server.cors_enabled {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET])
            .allow_headers(Any);

        app = app.layer(cors);
    }

    app
}

/// Binds the listener, resolving host names and accepting bracketed or bare IPv6 hosts
async fn bind_listener(settings: &ServerSettings) -> Result<TcpListener> {
    let host = settings.host.trim_start_matches('[').trim_end_matches(']');

    TcpListener::bind((host, settings.port)).await.map_err(|e| {
        GatewayError::network(format!(
            "Failed to bind to {}: {}",
            settings.bind_address(),
            e
        ))
    })
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }
}

/// Server builder for configuration
pub struct ServerBuilder {
    config: GatewayConfig,
    backend: Option<Arc<dyn SearchBackend>>,
}

impl ServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: GatewayConfig::default(),
            backend: None,
        }
    }

    /// Start from an existing configuration
    pub fn with_config(config: GatewayConfig) -> Self {
        Self {
            config,
            backend: None,
        }
    }

    /// Set the host address
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set the search backend
    pub fn backend(mut self, backend: Arc<dyn SearchBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Enable or disable CORS
    pub fn cors(mut self, enabled: bool) -> Self {
        self.config.server.cors_enabled = enabled;
        self
    }

    /// Set maximum request size
    pub fn max_request_size(mut self, size: usize) -> Self {
        self.config.server.max_request_size = size;
        self
    }

    /// Set the result cache lifetime in seconds
    pub fn cache_ttl_seconds(mut self, seconds: u64) -> Self {
        self.config.cache.ttl_seconds = seconds;
        self
    }

    /// Build the server
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` if no backend was set or the
    /// configuration is invalid
    pub fn build(self) -> Result<GatewayServer> {
        let backend = self
            .backend
            .ok_or_else(|| GatewayError::config("No search backend configured"))?;
        self.config.validate()?;

        Ok(GatewayServer::new(self.config, backend))
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
