//! Filter normalization
//!
//! Converts raw query-string parameters into typed [`FilterCriteria`].
//! Only the enumerated [`FilterField`] names are recognized. Numeric range
//! fields are coerced to integers; passthrough fields are kept as given.
//!
//! A raw value that is empty, `0` or `false` means "not requested" and is
//! left out of the criteria entirely. This also drops filters whose intended
//! value really is zero, e.g. `wordCountFrom=0`.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashMap;
//! use storyhunt_core::filters::{normalize_filters, FilterField, FilterValue};
//!
//! let mut raw = HashMap::new();
//! raw.insert("kudosCountFrom".to_string(), "300".to_string());
//! raw.insert("wordCountFrom".to_string(), "0".to_string());
//!
//! let filters = normalize_filters(&raw).unwrap();
//! assert_eq!(filters.len(), 1);
//! assert_eq!(
//!     filters.get(FilterField::KudosCountFrom),
//!     Some(&FilterValue::Integer(300))
//! );
//! ```

use crate::error::{GatewayError, Result};
use crate::types::RawRequest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Parameter names that are not filters
pub const RESERVED_KEYS: [&str; 4] = ["q", "p", "l", "tags"];

/// How a filter's raw value is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Integer bound, coerced from its string form
    Range,
    /// Opaque value forwarded to the backend as-is
    Passthrough,
}

/// Recognized filter names
///
/// The derived ordering is the canonical ordering used when criteria are
/// serialized, so it must not depend on request order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterField {
    WordCountFrom,
    WordCountTo,
    HitCountFrom,
    HitCountTo,
    KudosCountFrom,
    KudosCountTo,
    CommentCountFrom,
    CommentCountTo,
    BookmarkCountFrom,
    BookmarkCountTo,
    SingleChapter,
    CompletionStatus,
    LastUpdatedFrom,
    LastUpdatedTo,
}

impl FilterField {
    /// Every recognized filter
    pub const ALL: [FilterField; 14] = [
        Self::WordCountFrom,
        Self::WordCountTo,
        Self::HitCountFrom,
        Self::HitCountTo,
        Self::KudosCountFrom,
        Self::KudosCountTo,
        Self::CommentCountFrom,
        Self::CommentCountTo,
        Self::BookmarkCountFrom,
        Self::BookmarkCountTo,
        Self::SingleChapter,
        Self::CompletionStatus,
        Self::LastUpdatedFrom,
        Self::LastUpdatedTo,
    ];

    /// Query-string name of the filter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WordCountFrom => "wordCountFrom",
            Self::WordCountTo => "wordCountTo",
            Self::HitCountFrom => "hitCountFrom",
            Self::HitCountTo => "hitCountTo",
            Self::KudosCountFrom => "kudosCountFrom",
            Self::KudosCountTo => "kudosCountTo",
            Self::CommentCountFrom => "commentCountFrom",
            Self::CommentCountTo => "commentCountTo",
            Self::BookmarkCountFrom => "bookmarkCountFrom",
            Self::BookmarkCountTo => "bookmarkCountTo",
            Self::SingleChapter => "singleChapter",
            Self::CompletionStatus => "completionStatus",
            Self::LastUpdatedFrom => "lastUpdatedFrom",
            Self::LastUpdatedTo => "lastUpdatedTo",
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            Self::SingleChapter
            | Self::CompletionStatus
            | Self::LastUpdatedFrom
            | Self::LastUpdatedTo => FilterKind::Passthrough,
            _ => FilterKind::Range,
        }
    }

    /// Whether `name` is a recognized filter
    pub fn is_recognized(name: &str) -> bool {
        name.parse::<FilterField>().is_ok()
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| GatewayError::validation(format!("Unknown filter: {}", s)))
    }
}

/// Typed filter value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Integer(i64),
    Flag(bool),
    Text(String),
}

/// Normalized filters keyed by field, in canonical order
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCriteria(BTreeMap<FilterField, FilterValue>);

impl FilterCriteria {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts or replaces a filter value
    pub fn insert(&mut self, field: FilterField, value: FilterValue) -> Option<FilterValue> {
        self.0.insert(field, value)
    }

    pub fn get(&self, field: FilterField) -> Option<&FilterValue> {
        self.0.get(&field)
    }

    pub fn contains(&self, field: FilterField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterField, &FilterValue)> {
        self.0.iter()
    }
}

impl FromIterator<(FilterField, FilterValue)> for FilterCriteria {
    fn from_iter<I: IntoIterator<Item = (FilterField, FilterValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds filter criteria from raw request parameters
///
/// Reserved keys (`q`, `p`, `l`, `tags`) and unrecognized keys are skipped;
/// rejecting unknown keys is the job of request validation.
///
/// # Errors
///
/// Returns `GatewayError::Validation` if a range field holds a value that
/// is not an integer
pub fn normalize_filters(raw: &RawRequest) -> Result<FilterCriteria> {
    let mut criteria = FilterCriteria::new();

    for (key, value) in raw {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }
        let Ok(field) = key.parse::<FilterField>() else {
            continue;
        };
        if let Some(value) = coerce(field, value)? {
            criteria.insert(field, value);
        }
    }

    tracing::trace!("Normalized {} filter(s)", criteria.len());
    Ok(criteria)
}

/// Converts one raw value, returning `None` when the value means "unset"
fn coerce(field: FilterField, raw: &str) -> Result<Option<FilterValue>> {
    if is_falsy(raw) {
        return Ok(None);
    }

    match field.kind() {
        FilterKind::Range => {
            let number = raw.trim().parse::<i64>().map_err(|_| {
                GatewayError::validation(format!(
                    "{} must be an integer, got '{}'",
                    field, raw
                ))
            })?;
            Ok((number != 0).then_some(FilterValue::Integer(number)))
        }
        FilterKind::Passthrough if field == FilterField::SingleChapter => {
            Ok(match parse_flag(raw) {
                Some(true) => Some(FilterValue::Flag(true)),
                Some(false) => None,
                None => Some(FilterValue::Text(raw.to_string())),
            })
        }
        FilterKind::Passthrough => Ok(Some(FilterValue::Text(raw.to_string()))),
    }
}

fn is_falsy(raw: &str) -> bool {
    raw.is_empty() || raw == "0" || raw.eq_ignore_ascii_case("false")
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}
