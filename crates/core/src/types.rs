//! Core types for the StoryHunt gateway

use crate::error::{GatewayError, Result};
use crate::filters::FilterCriteria;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Query-string parameters exactly as received at the HTTP boundary
pub type RawRequest = HashMap<String, String>;

/// A single backend record; its shape is owned by the search engine
pub type ResultRecord = serde_json::Value;

/// Backend-ordered sequence of records for one search query
pub type ResultSet = Vec<ResultRecord>;

/// Ordered, non-empty tag tokens taken from a comma-delimited parameter
///
/// Duplicates are kept as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    /// Create an empty tag set
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for TagSet {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}

impl From<Vec<&str>> for TagSet {
    fn from(tags: Vec<&str>) -> Self {
        Self(tags.into_iter().map(str::to_string).collect())
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The identity of a search: text, tags and filters, without pagination
///
/// Two requests with equal `SearchQuery` values share one cache entry and
/// one backend call. This is also the JSON body sent to the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text query
    #[serde(rename = "query")]
    pub text: String,
    /// Tag restrictions
    #[serde(default)]
    pub tags: TagSet,
    /// Structured filters
    #[serde(default)]
    pub filters: FilterCriteria,
}

impl SearchQuery {
    pub fn new<S: Into<String>>(text: S, tags: TagSet, filters: FilterCriteria) -> Self {
        Self {
            text: text.into(),
            tags,
            filters,
        }
    }
}

/// One-based page number and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: usize,
    pub limit: usize,
}

impl PageRequest {
    /// Creates a page request, rejecting zero or negative values
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Validation` if `page` or `limit` is below 1
    pub fn new(page: i64, limit: i64) -> Result<Self> {
        if page < 1 {
            return Err(GatewayError::validation(format!(
                "p must be at least 1, got {}",
                page
            )));
        }
        if limit < 1 {
            return Err(GatewayError::validation(format!(
                "l must be at least 1, got {}",
                limit
            )));
        }

        let page = usize::try_from(page)
            .map_err(|_| GatewayError::validation(format!("p is out of range: {}", page)))?;
        let limit = usize::try_from(limit)
            .map_err(|_| GatewayError::validation(format!("l is out of range: {}", limit)))?;

        Ok(Self { page, limit })
    }

    /// Index of the first record on this page, `None` on overflow
    pub fn start(&self) -> Option<usize> {
        self.end().map(|end| end.saturating_sub(self.limit))
    }

    /// Index one past the last record on this page, `None` on overflow
    pub fn end(&self) -> Option<usize> {
        self.page.checked_mul(self.limit)
    }
}
