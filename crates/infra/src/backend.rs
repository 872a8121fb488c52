//! HTTP client for the StoryHunt search engine
//!
//! Wire contract:
//!
//! - `POST {base}/query` with `{"query", "tags", "filters"}`, answered by a
//!   JSON array of records in ranked order
//! - `POST {base}/autocomplete` with `{"prefix"}`, answered by any JSON value
//! - `GET {base}/health`, where a success status means healthy

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use storyhunt_core::{GatewayError, Result, ResultSet, SearchBackend, SearchQuery};
use url::Url;

/// Search engine client configuration
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    pub base_url: String,
    /// Timeout for establishing a connection
    pub connect_timeout: Duration,
    /// Timeout for a whole request
    pub timeout: Duration,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8001".to_string(),
            connect_timeout: Duration::from_secs(5),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Search engine client speaking JSON over HTTP
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpSearchBackend {
    /// Create a new search engine client
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Config` if the base URL is invalid or the HTTP
    /// client cannot be built
    pub fn new(config: HttpBackendConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            GatewayError::config(format!("Invalid backend URL '{}': {}", config.base_url, e))
        })?;
        // Url::join replaces the last segment unless the path ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| GatewayError::config(format!("Invalid backend path '{}': {}", path, e)))
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response> {
        let url = self.endpoint(path)?;
        tracing::debug!("POST {}", url);

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| map_send_error(path, e))?;

        if !response.status().is_success() {
            return Err(GatewayError::backend(format!(
                "Search engine returned {} for /{}",
                response.status(),
                path
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn query(&self, query: &SearchQuery) -> Result<ResultSet> {
        let response = self.post_json("query", query).await?;

        response.json::<ResultSet>().await.map_err(|e| {
            GatewayError::backend(format!("Failed to parse search engine results: {}", e))
        })
    }

    async fn autocomplete(&self, prefix: &str) -> Result<serde_json::Value> {
        let response = self
            .post_json("autocomplete", &AutocompleteRequest { prefix })
            .await?;

        response.json::<serde_json::Value>().await.map_err(|e| {
            GatewayError::backend(format!("Failed to parse autocomplete response: {}", e))
        })
    }

    async fn health_check(&self) -> Result<bool> {
        let url = self.endpoint("health")?;

        match self.client.get(url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::warn!("Search engine health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Autocomplete request payload
#[derive(Debug, Serialize)]
struct AutocompleteRequest<'a> {
    prefix: &'a str,
}

fn map_send_error(path: &str, err: reqwest::Error) -> GatewayError {
    if err.is_connect() {
        GatewayError::backend_unavailable(format!("Cannot reach search engine: {}", err))
    } else if err.is_timeout() {
        GatewayError::timeout(format!("search engine /{}", path))
    } else {
        GatewayError::backend(format!("Request to search engine failed: {}", err))
    }
}
