//! Page slicing over a full result set
//!
//! With `end = page * limit` and `start = end - limit`:
//!
//! - `start > len` yields an empty page
//! - `end > len` yields the trailing partial page `[start, len)`
//! - otherwise the page is exactly `[start, end)`
//!
//! A request whose `start` equals `len` falls in the second case and
//! produces an empty slice. A page whose bounds overflow `usize` lies past
//! any result set and is empty too. No validation of `page` or `limit` happens
//! here; zero values simply produce an empty page.

use crate::types::PageRequest;

/// Returns the records on the requested page, preserving order
///
/// # Examples
///
/// ```rust
/// use storyhunt_core::pagination::paginate;
/// use storyhunt_core::PageRequest;
///
/// let records: Vec<u32> = (0..10).collect();
/// let page = PageRequest::new(2, 8).unwrap();
/// assert_eq!(paginate(&records, &page), &[8, 9]);
/// ```
pub fn paginate<'a, T>(records: &'a [T], page: &PageRequest) -> &'a [T] {
    let len = records.len();
    let (Some(start), Some(end)) = (page.start(), page.end()) else {
        return &[];
    };

    if start > len {
        &[]
    } else if end > len {
        &records[start..]
    } else {
        &records[start..end]
    }
}

/// Owned variant of [`paginate`]
pub fn paginate_owned<T: Clone>(records: &[T], page: &PageRequest) -> Vec<T> {
    paginate(records, page).to_vec()
}
