//! Search backend abstraction
//!
//! The gateway never ranks or indexes anything itself. All matching and
//! completion is delegated to an implementation of [`SearchBackend`], which
//! is injected into the query service so tests can substitute a stub.

use crate::error::Result;
use crate::types::{ResultSet, SearchQuery};
use async_trait::async_trait;

/// Narrow contract to the external search engine
///
/// Implementations report an unreachable engine as
/// `GatewayError::BackendUnavailable` and any other failure as
/// `GatewayError::Backend`. They must not retry on their own.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Runs a search and returns every matching record in ranked order
    async fn query(&self, query: &SearchQuery) -> Result<ResultSet>;

    /// Returns prefix completions in whatever shape the engine produces
    async fn autocomplete(&self, prefix: &str) -> Result<serde_json::Value>;

    /// Reports whether the engine is reachable
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    /// Short name used in logs
    fn name(&self) -> &str {
        "backend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GatewayError;

    struct EchoBackend;

    #[async_trait]
    impl SearchBackend for EchoBackend {
        async fn query(&self, query: &SearchQuery) -> Result<ResultSet> {
            if query.text.is_empty() {
                return Err(GatewayError::backend("empty query"));
            }
            Ok(vec![serde_json::json!({ "title": query.text })])
        }

        async fn autocomplete(&self, prefix: &str) -> Result<serde_json::Value> {
            Ok(serde_json::json!([prefix]))
        }
    }

    #[test]
    fn test_default_methods() {
        let backend = EchoBackend;
        assert_eq!(backend.name(), "backend");
        assert!(tokio_test::block_on(backend.health_check()).unwrap());
    }

    #[test]
    fn test_usable_as_trait_object() {
        let backend: Box<dyn SearchBackend> = Box::new(EchoBackend);
        let query = SearchQuery::new("harry", Default::default(), Default::default());

        let results = tokio_test::block_on(backend.query(&query)).unwrap();
        assert_eq!(results[0]["title"], "harry");

        let empty = SearchQuery::default();
        assert!(tokio_test::block_on(backend.query(&empty)).is_err());
    }
}
