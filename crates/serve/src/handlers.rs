//! Shared application state and service handlers

use crate::cache::{create_shared_cache, ResultCacheConfig};
use crate::search::service::QueryService;
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use storyhunt_core::{GatewayConfig, SearchBackend};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub query_service: QueryService,
    pub config: Arc<GatewayConfig>,
}

impl AppState {
    /// Builds the state with a fresh result cache sized from `config`
    pub fn new(backend: Arc<dyn SearchBackend>, config: Arc<GatewayConfig>) -> Self {
        let cache = create_shared_cache(ResultCacheConfig::from_settings(&config.cache));
        let query_service = QueryService::new(backend, cache, config.backend.timeout());

        Self {
            query_service,
            config,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Backend reachability: `up` or `down`
    pub backend: String,
    pub cache_entries: u64,
    pub timestamp: DateTime<Utc>,
}

/// Health check handler
///
/// Always answers 200; a down backend shows up as `degraded`.
pub async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend_up = state.query_service.backend_healthy().await;

    Json(HealthResponse {
        status: if backend_up { "healthy" } else { "degraded" }.to_string(),
        version: crate::VERSION.to_string(),
        backend: if backend_up { "up" } else { "down" }.to_string(),
        cache_entries: state.query_service.cache().entry_count(),
        timestamp: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubBackend;
    use std::time::Duration;

    #[test]
    fn test_app_state_uses_cache_settings() {
        let mut config = GatewayConfig::default();
        config.cache.max_capacity = 42;
        config.cache.ttl_seconds = 5;

        let state = AppState::new(Arc::new(StubBackend::with_records(0)), Arc::new(config));

        let cache_config = state.query_service.cache().config();
        assert_eq!(cache_config.max_capacity, 42);
        assert_eq!(cache_config.ttl, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_handle_health() {
        let state = AppState::new(
            Arc::new(StubBackend::with_records(0)),
            Arc::new(GatewayConfig::default()),
        );

        let Json(health) = handle_health(State(state)).await;
        assert_eq!(health.status, "healthy");
        assert_eq!(health.backend, "up");
        assert_eq!(health.cache_entries, 0);
    }
}
