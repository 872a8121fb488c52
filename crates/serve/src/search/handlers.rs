//! Query API handlers
//!
//! # Endpoints
//!
//! - `GET /query?q=&p=&l=&tags=&<filter>=` - Paginated search
//! - `GET /autocomplete?prefix=` - Backend completions, passed through
//! - `GET /test` - Liveness greeting
//!
//! # Examples
//!
//! ```rust,no_run
//! use axum::Router;
//! use storyhunt_serve::search::handlers::search_routes;
//!
//! # fn example(state: storyhunt_serve::AppState) {
//! let app: Router = search_routes().with_state(state);
//! # }
//! ```

use crate::handlers::AppState;
use crate::search::types::ApiError;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header::HeaderName, HeaderValue},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use storyhunt_core::{QueryRequest, RawRequest};
use tracing::info;

/// Header telling whether the result set came from the cache
pub const CACHE_STATUS_HEADER: HeaderName = HeaderName::from_static("x-cache");

/// Header carrying the size of the unpaginated result set
pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");

/// Greeting returned by `/test`
pub const TEST_GREETING: &str = "Hello world from frontend api";

/// Query parameters for the autocomplete endpoint
#[derive(Debug, Deserialize)]
pub struct AutocompleteParams {
    pub prefix: String,
}

/// Creates the query routes
pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/query", get(handle_query))
        .route("/autocomplete", get(handle_autocomplete))
        .route("/test", get(handle_test))
}

/// Paginated search handler
///
/// Validates the raw query string, serves the full result set from the
/// cache or the backend, and returns the requested page as a JSON array.
pub async fn handle_query(
    State(state): State<AppState>,
    params: Result<Query<RawRequest>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(raw) = params?;
    let request = QueryRequest::from_raw(&raw)?;

    let outcome = state.query_service.search(&request).await?;

    Ok((
        [
            (
                CACHE_STATUS_HEADER,
                HeaderValue::from_static(outcome.cache.as_str()),
            ),
            (TOTAL_COUNT_HEADER, HeaderValue::from(outcome.total)),
        ],
        Json(outcome.records),
    )
        .into_response())
}

/// Autocomplete handler
///
/// The prefix goes to the backend untouched; an empty prefix is allowed.
pub async fn handle_autocomplete(
    State(state): State<AppState>,
    params: Result<Query<AutocompleteParams>, QueryRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let Query(params) = params?;
    info!("Autocomplete request for prefix '{}'", params.prefix);

    let completions = state.query_service.autocomplete(&params.prefix).await?;
    Ok(Json(completions))
}

/// Liveness greeting
pub async fn handle_test() -> Json<&'static str> {
    Json(TEST_GREETING)
}
