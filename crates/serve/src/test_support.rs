//! In-process search backend for unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use storyhunt_core::{GatewayError, Result, ResultSet, SearchBackend, SearchQuery};

/// Backend returning `count` numbered records and counting its calls
pub(crate) struct StubBackend {
    count: usize,
    delay: Option<Duration>,
    failure: Mutex<Option<GatewayError>>,
    query_calls: AtomicUsize,
}

impl StubBackend {
    pub(crate) fn with_records(count: usize) -> Self {
        Self {
            count,
            delay: None,
            failure: Mutex::new(None),
            query_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes every following query fail with `error`, or succeed again on `None`
    pub(crate) fn fail_with(&self, error: Option<GatewayError>) {
        *self.failure.lock() = error;
    }

    pub(crate) fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for StubBackend {
    async fn query(&self, query: &SearchQuery) -> Result<ResultSet> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }

        Ok((0..self.count)
            .map(|i| json!({ "id": i, "query": query.text }))
            .collect())
    }

    async fn autocomplete(&self, prefix: &str) -> Result<serde_json::Value> {
        Ok(json!({ "prefix": prefix, "completions": [format!("{}rry", prefix)] }))
    }

    fn name(&self) -> &str {
        "stub"
    }
}
