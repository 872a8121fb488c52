//! Query service
//!
//! Ties the result cache, the search backend and pagination together. One
//! instance lives in the axum state and is cloned into every request.

use crate::cache::{CacheKey, CacheStatus, SharedResultCache};
use std::sync::Arc;
use std::time::Duration;
use storyhunt_core::{
    paginate, GatewayError, QueryRequest, Result, ResultRecord, ResultSet, SearchBackend,
    SearchQuery,
};
use tracing::{debug, error, info, warn};

/// One page of results and where the full set came from
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub records: Vec<ResultRecord>,
    /// Size of the unpaginated result set
    pub total: usize,
    pub cache: CacheStatus,
}

/// Serves validated queries from the cache or the backend
#[derive(Clone)]
pub struct QueryService {
    backend: Arc<dyn SearchBackend>,
    cache: SharedResultCache,
    backend_timeout: Duration,
}

impl QueryService {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        cache: SharedResultCache,
        backend_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            cache,
            backend_timeout,
        }
    }

    /// Runs a search and returns the requested page
    ///
    /// The full result set is looked up by the query's cache key. On a miss
    /// the backend is called once and its answer stored; concurrent misses
    /// for the same key wait on that single call. Backend failures are
    /// returned as-is and never cached.
    ///
    /// # Errors
    ///
    /// Returns `BackendUnavailable`, `Backend` or `Timeout` when the result
    /// set has to be fetched and the backend call fails
    pub async fn search(&self, request: &QueryRequest) -> Result<SearchOutcome> {
        let (records, cache) = self.fetch_results(&request.query).await?;

        let page = paginate(records.as_slice(), &request.page).to_vec();
        info!(
            query = %request.query.text,
            page = request.page.page,
            limit = request.page.limit,
            total = records.len(),
            returned = page.len(),
            cache = cache.as_str(),
            "Served query"
        );

        Ok(SearchOutcome {
            records: page,
            total: records.len(),
            cache,
        })
    }

    /// Returns the full result set for a query
    pub async fn fetch_results(&self, query: &SearchQuery) -> Result<(Arc<ResultSet>, CacheStatus)> {
        self.fetch_with_key(query, CacheKey::build(query)).await
    }

    /// Serves through the cache, or straight from the backend when no key could be built
    async fn fetch_with_key(
        &self,
        query: &SearchQuery,
        key: Result<CacheKey>,
    ) -> Result<(Arc<ResultSet>, CacheStatus)> {
        let key = match key {
            Ok(key) => key,
            Err(e) => {
                warn!("Bypassing result cache: {}", e);
                let records = self.query_backend(query).await?;
                return Ok((Arc::new(records), CacheStatus::Bypass));
            }
        };

        let (cached, status) = self
            .cache
            .get_or_fetch(key.clone(), query.text.clone(), self.query_backend(query))
            .await?;

        debug!(key = %key, status = status.as_str(), records = cached.len(), "Result cache lookup");
        Ok((cached.records, status))
    }

    /// Calls the backend, bounded by the configured timeout
    async fn query_backend(&self, query: &SearchQuery) -> Result<ResultSet> {
        let result = tokio::time::timeout(self.backend_timeout, self.backend.query(query))
            .await
            .unwrap_or_else(|_| Err(GatewayError::timeout(format!("{} query", self.backend.name()))));

        if let Err(e) = &result {
            error!("Search backend '{}' failed: {}", self.backend.name(), e);
        }
        result
    }

    /// Passes a prefix straight to the backend's autocomplete
    pub async fn autocomplete(&self, prefix: &str) -> Result<serde_json::Value> {
        debug!("Autocomplete for prefix '{}'", prefix);

        tokio::time::timeout(self.backend_timeout, self.backend.autocomplete(prefix))
            .await
            .unwrap_or_else(|_| {
                Err(GatewayError::timeout(format!(
                    "{} autocomplete",
                    self.backend.name()
                )))
            })
    }

    /// Reports whether the backend answers its health probe in time
    pub async fn backend_healthy(&self) -> bool {
        matches!(
            tokio::time::timeout(self.backend_timeout, self.backend.health_check()).await,
            Ok(Ok(true))
        )
    }

    pub fn cache(&self) -> &SharedResultCache {
        &self.cache
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{create_shared_cache, ResultCacheConfig};
    use crate::test_support::StubBackend;
    use std::collections::HashMap;

    fn request(pairs: &[(&str, &str)]) -> QueryRequest {
        let raw: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        QueryRequest::from_raw(&raw).unwrap()
    }

    fn service_with(backend: Arc<StubBackend>, ttl: Duration) -> QueryService {
        let cache = create_shared_cache(ResultCacheConfig::new(100, ttl));
        QueryService::new(backend, cache, Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_first_page_from_backend_then_cache() {
        let backend = Arc::new(StubBackend::with_records(25));
        let service = service_with(backend.clone(), Duration::from_secs(600));

        let first = service
            .search(&request(&[("q", "harry"), ("p", "1"), ("l", "10")]))
            .await
            .unwrap();
        assert_eq!(first.cache, CacheStatus::Miss);
        assert_eq!(first.total, 25);
        assert_eq!(first.records.len(), 10);
        assert_eq!(first.records[0]["id"], 0);

        let third = service
            .search(&request(&[("q", "harry"), ("p", "3"), ("l", "10")]))
            .await
            .unwrap();
        assert_eq!(third.cache, CacheStatus::Hit);
        assert_eq!(third.records.len(), 5);
        assert_eq!(third.records[0]["id"], 20);

        assert_eq!(backend.query_calls(), 1);
    }

    #[tokio::test]
    async fn test_page_past_end_is_empty() {
        let backend = Arc::new(StubBackend::with_records(25));
        let service = service_with(backend, Duration::from_secs(600));

        let outcome = service
            .search(&request(&[("q", "harry"), ("p", "4"), ("l", "10")]))
            .await
            .unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.total, 25);
    }

    #[tokio::test]
    async fn test_different_filters_are_separate_entries() {
        let backend = Arc::new(StubBackend::with_records(3));
        let service = service_with(backend.clone(), Duration::from_secs(600));

        service
            .search(&request(&[("q", "harry"), ("p", "1"), ("l", "10")]))
            .await
            .unwrap();
        service
            .search(&request(&[
                ("q", "harry"),
                ("p", "1"),
                ("l", "10"),
                ("kudosCountFrom", "300"),
            ]))
            .await
            .unwrap();

        assert_eq!(backend.query_calls(), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let backend = Arc::new(StubBackend::with_records(3));
        let service = service_with(backend.clone(), Duration::from_millis(150));
        let req = request(&[("q", "harry"), ("p", "1"), ("l", "10")]);

        service.search(&req).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        let outcome = service.search(&req).await.unwrap();

        assert_eq!(outcome.cache, CacheStatus::Miss);
        assert_eq!(backend.query_calls(), 2);
    }

    #[tokio::test]
    async fn test_backend_failure_not_cached() {
        let backend = Arc::new(StubBackend::with_records(3));
        backend.fail_with(Some(GatewayError::backend_unavailable("connection refused")));
        let service = service_with(backend.clone(), Duration::from_secs(600));
        let req = request(&[("q", "harry"), ("p", "1"), ("l", "10")]);

        let result = service.search(&req).await;
        assert!(matches!(result, Err(GatewayError::BackendUnavailable { .. })));

        backend.fail_with(None);
        let outcome = service.search(&req).await.unwrap();
        assert_eq!(outcome.records.len(), 3);
        assert_eq!(backend.query_calls(), 2);
    }

    #[tokio::test]
    async fn test_slow_backend_times_out() {
        let backend = Arc::new(StubBackend::with_records(3).with_delay(Duration::from_millis(500)));
        let cache = create_shared_cache(ResultCacheConfig::default());
        let service = QueryService::new(backend, cache, Duration::from_millis(50));

        let result = service
            .search(&request(&[("q", "harry"), ("p", "1"), ("l", "10")]))
            .await;
        assert!(matches!(result, Err(GatewayError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_missing_cache_key_bypasses_cache() {
        let backend = Arc::new(StubBackend::with_records(4));
        let service = service_with(backend.clone(), Duration::from_secs(600));
        let query = request(&[("q", "harry"), ("p", "1"), ("l", "10")]).query;

        for _ in 0..2 {
            let (records, status) = service
                .fetch_with_key(&query, Err(GatewayError::serialization("unserializable")))
                .await
                .unwrap();
            assert_eq!(status, CacheStatus::Bypass);
            assert_eq!(records.len(), 4);
        }

        service.cache().sync().await;
        assert_eq!(service.cache().entry_count(), 0);
        assert_eq!(backend.query_calls(), 2);
    }

    #[tokio::test]
    async fn test_bypass_propagates_backend_error() {
        let backend = Arc::new(StubBackend::with_records(4));
        backend.fail_with(Some(GatewayError::backend("status 500")));
        let service = service_with(backend, Duration::from_secs(600));
        let query = request(&[("q", "harry"), ("p", "1"), ("l", "10")]).query;

        let result = service
            .fetch_with_key(&query, Err(GatewayError::serialization("unserializable")))
            .await;
        assert!(matches!(result, Err(GatewayError::Backend { .. })));
    }

    #[tokio::test]
    async fn test_autocomplete_passes_prefix() {
        let backend = Arc::new(StubBackend::with_records(0));
        let service = service_with(backend, Duration::from_secs(600));

        let value = service.autocomplete("ha").await.unwrap();
        assert_eq!(value["prefix"], "ha");
    }

    #[tokio::test]
    async fn test_backend_healthy() {
        let backend = Arc::new(StubBackend::with_records(0));
        let service = service_with(backend, Duration::from_secs(600));
        assert!(service.backend_healthy().await);
        assert_eq!(service.backend_name(), "stub");
    }
}
