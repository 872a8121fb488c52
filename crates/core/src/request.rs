//! Query request validation
//!
//! Turns the raw query string of a `/query` call into a [`QueryRequest`]:
//! a [`SearchQuery`] (the cache and backend identity) plus the
//! [`PageRequest`] applied afterwards.

use crate::error::{GatewayError, Result};
use crate::filters::{normalize_filters, FilterField, RESERVED_KEYS};
use crate::tags::parse_tags;
use crate::types::{PageRequest, RawRequest, SearchQuery};

/// A validated search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: SearchQuery,
    pub page: PageRequest,
}

impl QueryRequest {
    /// Validates raw parameters and builds the request
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Validation` when:
    /// - a parameter is neither reserved nor a recognized filter
    /// - `q`, `p` or `l` is missing
    /// - `p` or `l` is not an integer, or is below 1
    /// - a numeric filter holds a non-integer value
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::collections::HashMap;
    /// use storyhunt_core::QueryRequest;
    ///
    /// let raw: HashMap<String, String> = [("q", "harry"), ("p", "1"), ("l", "10")]
    ///     .into_iter()
    ///     .map(|(k, v)| (k.to_string(), v.to_string()))
    ///     .collect();
    ///
    /// let request = QueryRequest::from_raw(&raw).unwrap();
    /// assert_eq!(request.query.text, "harry");
    /// assert_eq!(request.page.limit, 10);
    /// ```
    pub fn from_raw(raw: &RawRequest) -> Result<Self> {
        let mut unknown: Vec<&str> = raw
            .keys()
            .map(String::as_str)
            .filter(|key| !RESERVED_KEYS.contains(key) && !FilterField::is_recognized(key))
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(GatewayError::validation(format!(
                "Unknown parameter(s): {}",
                unknown.join(", ")
            )));
        }

        let text = required(raw, "q")?;
        let page = parse_integer(required(raw, "p")?, "p")?;
        let limit = parse_integer(required(raw, "l")?, "l")?;
        let page = PageRequest::new(page, limit)?;

        let tags = parse_tags(raw.get("tags").map(String::as_str));
        let filters = normalize_filters(raw)?;

        Ok(Self {
            query: SearchQuery::new(text, tags, filters),
            page,
        })
    }
}

fn required<'a>(raw: &'a RawRequest, key: &str) -> Result<&'a str> {
    raw.get(key)
        .map(String::as_str)
        .ok_or_else(|| GatewayError::validation(format!("Missing required parameter: {}", key)))
}

fn parse_integer(value: &str, key: &str) -> Result<i64> {
    value.trim().parse::<i64>().map_err(|_| {
        GatewayError::validation(format!("{} must be an integer, got '{}'", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterValue;
    use crate::types::TagSet;
    use assert_matches::assert_matches;

    fn raw(pairs: &[(&str, &str)]) -> RawRequest {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_request() {
        let request = QueryRequest::from_raw(&raw(&[
            ("q", "harry potter"),
            ("p", "1"),
            ("l", "10"),
            ("tags", "het,angst"),
            ("kudosCountFrom", "300"),
        ]))
        .unwrap();

        assert_eq!(request.query.text, "harry potter");
        assert_eq!(request.query.tags, TagSet::from(vec!["het", "angst"]));
        assert_eq!(
            request.query.filters.get(FilterField::KudosCountFrom),
            Some(&FilterValue::Integer(300))
        );
        assert_eq!(request.page, PageRequest { page: 1, limit: 10 });
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let result = QueryRequest::from_raw(&raw(&[
            ("q", "x"),
            ("p", "1"),
            ("l", "10"),
            ("language", "en"),
        ]));

        match result {
            Err(GatewayError::Validation { message }) => assert!(message.contains("language")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_parameters() {
        assert_matches!(
            QueryRequest::from_raw(&raw(&[("p", "1"), ("l", "10")])),
            Err(GatewayError::Validation { .. })
        );
        assert_matches!(
            QueryRequest::from_raw(&raw(&[("q", "x"), ("l", "10")])),
            Err(GatewayError::Validation { .. })
        );
        assert_matches!(
            QueryRequest::from_raw(&raw(&[("q", "x"), ("p", "1")])),
            Err(GatewayError::Validation { .. })
        );
    }

    #[test]
    fn test_malformed_pagination_rejected() {
        assert_matches!(
            QueryRequest::from_raw(&raw(&[("q", "x"), ("p", "one"), ("l", "10")])),
            Err(GatewayError::Validation { .. })
        );
        assert_matches!(
            QueryRequest::from_raw(&raw(&[("q", "x"), ("p", "0"), ("l", "10")])),
            Err(GatewayError::Validation { .. })
        );
        assert_matches!(
            QueryRequest::from_raw(&raw(&[("q", "x"), ("p", "1"), ("l", "-3")])),
            Err(GatewayError::Validation { .. })
        );
    }

    #[test]
    fn test_bad_filter_rejected() {
        assert_matches!(
            QueryRequest::from_raw(&raw(&[
                ("q", "x"),
                ("p", "1"),
                ("l", "10"),
                ("hitCountTo", "many")
            ])),
            Err(GatewayError::Validation { .. })
        );
    }

    #[test]
    fn test_empty_query_text_allowed() {
        let request =
            QueryRequest::from_raw(&raw(&[("q", ""), ("p", "2"), ("l", "5"), ("tags", "")]))
                .unwrap();
        assert_eq!(request.query.text, "");
        assert!(request.query.tags.is_empty());
        assert!(request.query.filters.is_empty());
    }
}
