//! Shared fixtures for serve integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use storyhunt_core::{GatewayConfig, GatewayError, Result, ResultSet, SearchBackend, SearchQuery};
use storyhunt_serve::ServerBuilder;

/// Backend serving numbered records and recording every query it receives
pub struct RecordingBackend {
    count: usize,
    delay: Duration,
    failure: Mutex<Option<GatewayError>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<SearchQuery>>,
}

impl RecordingBackend {
    pub fn new(count: usize) -> Arc<Self> {
        Self::with_delay(count, Duration::ZERO)
    }

    pub fn with_delay(count: usize, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            count,
            delay,
            failure: Mutex::new(None),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn fail_with(&self, error: Option<GatewayError>) {
        *self.failure.lock() = error;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<SearchQuery> {
        self.queries.lock().last().cloned()
    }
}

#[async_trait]
impl SearchBackend for RecordingBackend {
    async fn query(&self, query: &SearchQuery) -> Result<ResultSet> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().push(query.clone());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(error) = self.failure.lock().clone() {
            return Err(error);
        }

        Ok((0..self.count).map(|i| json!({ "id": i + 1 })).collect())
    }

    async fn autocomplete(&self, prefix: &str) -> Result<serde_json::Value> {
        Ok(json!([format!("{}rry potter", prefix), format!("{}rmione", prefix)]))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Builds the full application router, middleware included
pub fn app_with(backend: Arc<RecordingBackend>, config: GatewayConfig) -> Router {
    ServerBuilder::with_config(config)
        .backend(backend)
        .build()
        .unwrap()
        .router()
}

pub fn app(backend: Arc<RecordingBackend>) -> Router {
    app_with(backend, GatewayConfig::default())
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
