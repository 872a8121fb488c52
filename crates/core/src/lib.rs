//! StoryHunt Core Library
//!
//! The request pipeline of the StoryHunt query gateway: validating raw
//! query-string parameters, coercing filters, parsing tag lists and slicing
//! result sets into pages. The search engine itself sits behind the
//! [`SearchBackend`] trait.

pub mod backend;
pub mod config;
pub mod error;
pub mod filters;
pub mod pagination;
pub mod request;
pub mod tags;
pub mod types;

// Re-export commonly used types
pub use backend::SearchBackend;
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use filters::{normalize_filters, FilterCriteria, FilterField, FilterKind, FilterValue};
pub use pagination::{paginate, paginate_owned};
pub use request::QueryRequest;
pub use tags::parse_tags;
pub use types::{PageRequest, RawRequest, ResultRecord, ResultSet, SearchQuery, TagSet};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get version info as a formatted string
pub fn version_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
