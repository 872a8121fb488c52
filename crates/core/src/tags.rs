//! Tag list parsing

use crate::types::TagSet;

/// Splits a comma-delimited tag parameter into non-empty tokens
///
/// Tokens are not trimmed and duplicates are kept.
///
/// # Examples
///
/// ```rust
/// use storyhunt_core::tags::parse_tags;
///
/// let tags = parse_tags(Some("a,,b,"));
/// assert_eq!(tags.as_slice(), &["a".to_string(), "b".to_string()]);
/// assert!(parse_tags(None).is_empty());
/// ```
pub fn parse_tags(raw: Option<&str>) -> TagSet {
    match raw {
        Some(raw) => raw
            .split(',')
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
            .into(),
        None => TagSet::new(),
    }
}
