//! Caching module for the StoryHunt serve crate
//!
//! Holds full backend result sets so that paging through a search does not
//! hit the search engine again.

pub mod result_cache;

pub use result_cache::{
    create_shared_cache, CacheKey, CacheStatus, CachedResultSet, ResultCache, ResultCacheConfig,
    SharedResultCache,
};
