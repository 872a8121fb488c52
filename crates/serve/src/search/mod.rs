//! Query API
//!
//! Request validation, cache-backed search, pagination and the HTTP
//! handlers exposing them.

pub mod handlers;
pub mod service;
pub mod types;

pub use handlers::{search_routes, AutocompleteParams, CACHE_STATUS_HEADER, TOTAL_COUNT_HEADER};
pub use service::{QueryService, SearchOutcome};
pub use types::{ApiError, ErrorResponse};
