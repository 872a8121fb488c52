//! Search result caching implementation
//!
//! Keeps full backend result sets in memory, keyed by the search identity
//! (query text, tags and filters) and independent of pagination, so every
//! page of one search is served from a single backend call.

use chrono::{DateTime, Utc};
use moka::future::Cache;
use sha2::{Digest, Sha256};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use storyhunt_core::config::CacheSettings;
use storyhunt_core::{GatewayError, Result, ResultSet, SearchQuery};

/// Cache key for a search query
///
/// The hex SHA-256 digest of the query's canonical JSON form. Filters
/// serialize in field order and tags in request order, so structurally
/// equal queries always map to the same key.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Builds the key for a search query
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Serialization` if the query cannot be
    /// serialized
    ///
    /// # Examples
    ///
    /// ```
    /// use storyhunt_core::{FilterCriteria, SearchQuery, TagSet};
    /// use storyhunt_serve::cache::CacheKey;
    ///
    /// let query = SearchQuery::new("harry", TagSet::from(vec!["het"]), FilterCriteria::new());
    /// let key = CacheKey::build(&query).unwrap();
    /// assert_eq!(key.as_str().len(), 64);
    /// assert_eq!(key, CacheKey::build(&query.clone()).unwrap());
    /// ```
    pub fn build(query: &SearchQuery) -> Result<Self> {
        let canonical = serde_json::to_vec(query)?;
        let digest = Sha256::digest(&canonical);
        Ok(Self(format!("{:x}", digest)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cached backend response
#[derive(Debug, Clone)]
pub struct CachedResultSet {
    /// Query text that produced this response
    pub query: String,
    /// Full, unpaginated result set
    pub records: Arc<ResultSet>,
    /// Cache timestamp
    pub cached_at: DateTime<Utc>,
}

impl CachedResultSet {
    /// Creates a new cached result set stamped with the current time
    pub fn new(query: impl Into<String>, records: ResultSet) -> Self {
        Self {
            query: query.into(),
            records: Arc::new(records),
            cached_at: Utc::now(),
        }
    }

    /// Checks if the cached response is younger than `max_age`
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use storyhunt_serve::cache::CachedResultSet;
    ///
    /// let cached = CachedResultSet::new("harry", vec![]);
    /// assert!(cached.is_fresh(Duration::from_secs(600)));
    /// assert!(!cached.is_fresh(Duration::ZERO));
    /// ```
    pub fn is_fresh(&self, max_age: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => age < max_age,
            Err(_) => true,
        }
    }

    /// Number of records in the full result set
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// How a result set was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from the cache
    Hit,
    /// Fetched from the backend and stored
    Miss,
    /// Fetched from the backend without touching the cache
    Bypass,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Bypass => "BYPASS",
        }
    }
}

/// Result cache configuration
#[derive(Debug, Clone)]
pub struct ResultCacheConfig {
    /// Maximum number of entries in cache
    pub max_capacity: u64,
    /// Time to live for cache entries
    pub ttl: Duration,
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            ttl: Duration::from_secs(storyhunt_core::config::DEFAULT_CACHE_TTL_SECONDS),
        }
    }
}

impl ResultCacheConfig {
    /// Creates a new cache configuration
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use storyhunt_serve::cache::ResultCacheConfig;
    ///
    /// let config = ResultCacheConfig::new(1000, Duration::from_secs(60));
    /// assert_eq!(config.max_capacity, 1000);
    /// assert_eq!(config.ttl, Duration::from_secs(60));
    /// ```
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self { max_capacity, ttl }
    }

    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self::new(settings.max_capacity, settings.ttl())
    }
}

/// Bounded, TTL-expiring store of backend result sets
///
/// Safe to share between request tasks. Entries past their TTL are never
/// returned; once capacity is reached, moka evicts the least valuable
/// entries.
pub struct ResultCache {
    cache: Cache<CacheKey, CachedResultSet>,
    config: ResultCacheConfig,
}

impl ResultCache {
    /// Creates a new result cache
    pub fn new(config: ResultCacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.ttl)
            .build();

        tracing::debug!(
            "Created result cache with capacity {} and TTL {}s",
            config.max_capacity,
            config.ttl.as_secs()
        );

        Self { cache, config }
    }

    /// Gets a cached result set
    ///
    /// Returns `None` when no entry exists or the entry has outlived the TTL.
    ///
    /// # Examples
    ///
    /// ```
    /// use storyhunt_core::SearchQuery;
    /// use storyhunt_serve::cache::{CacheKey, ResultCache, ResultCacheConfig};
    ///
    /// # tokio_test::block_on(async {
    /// let cache = ResultCache::new(ResultCacheConfig::default());
    /// let key = CacheKey::build(&SearchQuery::default()).unwrap();
    /// assert!(cache.get(&key).await.is_none());
    /// # });
    /// ```
    pub async fn get(&self, key: &CacheKey) -> Option<CachedResultSet> {
        self.cache
            .get(key)
            .await
            .filter(|entry| entry.is_fresh(self.config.ttl))
    }

    /// Stores a result set, replacing any previous entry for the key
    pub async fn put(&self, key: CacheKey, query: impl Into<String>, records: ResultSet) {
        self.cache
            .insert(key, CachedResultSet::new(query, records))
            .await;
    }

    /// Returns the cached result set or fetches and stores it
    ///
    /// Concurrent callers missing on the same key share a single `fetch`;
    /// the others wait for its result. A failed fetch is returned to every
    /// waiter and nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `fetch`
    pub async fn get_or_fetch<F>(
        &self,
        key: CacheKey,
        query: impl Into<String>,
        fetch: F,
    ) -> Result<(CachedResultSet, CacheStatus)>
    where
        F: Future<Output = Result<ResultSet>>,
    {
        let query = query.into();
        let entry = self
            .cache
            .entry(key)
            .or_try_insert_with(async move {
                let records = fetch.await?;
                Ok::<_, GatewayError>(CachedResultSet::new(query, records))
            })
            .await
            .map_err(|err: Arc<GatewayError>| (*err).clone())?;

        let status = if entry.is_fresh() {
            CacheStatus::Miss
        } else {
            CacheStatus::Hit
        };

        Ok((entry.into_value(), status))
    }

    /// Invalidates a cache entry
    pub async fn invalidate(&self, key: &CacheKey) {
        self.cache.invalidate(key).await;
    }

    /// Invalidates all cache entries
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    /// Gets the cache entry count
    ///
    /// The count is approximate until pending maintenance has run.
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Runs pending eviction and bookkeeping work
    pub async fn sync(&self) {
        self.cache.run_pending_tasks().await;
    }

    /// Gets the cache configuration
    pub fn config(&self) -> &ResultCacheConfig {
        &self.config
    }
}

/// Thread-safe shared result cache
pub type SharedResultCache = Arc<ResultCache>;

/// Creates a new shared result cache
pub fn create_shared_cache(config: ResultCacheConfig) -> SharedResultCache {
    Arc::new(ResultCache::new(config))
}
