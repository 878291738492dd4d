//! Page-number pagination over LIMIT/OFFSET queries.
//!
//! Handlers count first, clamp the requested page against the total, then
//! fetch the slice. Out-of-range page numbers are served as the nearest
//! valid page instead of failing.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Pagination metadata included in every listing response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    pub number: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
    pub total: i64,
    #[serde(rename = "hasPrevious")]
    pub has_previous: bool,
    #[serde(rename = "hasNext")]
    pub has_next: bool,
}

/// A clamped page request, ready to be turned into LIMIT/OFFSET.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pager {
    pub number: i64,
    pub size: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pager {
    /// Clamp `requested` against the item count. An empty result set still
    /// has one (empty) page, so navigation flags stay consistent.
    pub fn clamped(requested: Option<i64>, size: i64, total: i64) -> Self {
        let total_pages = if total > 0 {
            (total + size - 1) / size
        } else {
            1
        };
        let number = requested.unwrap_or(1).clamp(1, total_pages);

        Pager {
            number,
            size,
            total,
            total_pages,
        }
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            number: self.number,
            total_pages: self.total_pages,
            total: self.total,
            has_previous: self.number > 1,
            has_next: self.number < self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_of_a_short_list() {
        let pager = Pager::clamped(Some(1), 10, 7);

        assert_eq!(pager.number, 1);
        assert_eq!(pager.total_pages, 1);
        assert_eq!(pager.limit(), 10);
        assert_eq!(pager.offset(), 0);

        let meta = pager.meta();
        assert!(!meta.has_previous);
        assert!(!meta.has_next);
    }

    #[test]
    fn middle_page_has_both_neighbours() {
        let pager = Pager::clamped(Some(2), 10, 25);

        assert_eq!(pager.total_pages, 3);
        assert_eq!(pager.offset(), 10);

        let meta = pager.meta();
        assert!(meta.has_previous);
        assert!(meta.has_next);
    }

    #[test]
    fn page_beyond_the_last_clamps_to_the_last() {
        let pager = Pager::clamped(Some(99), 10, 25);

        assert_eq!(pager.number, 3);
        assert_eq!(pager.offset(), 20);
        assert!(pager.meta().has_previous);
        assert!(!pager.meta().has_next);
    }

    #[test]
    fn zero_and_negative_pages_clamp_to_the_first() {
        assert_eq!(Pager::clamped(Some(0), 10, 25).number, 1);
        assert_eq!(Pager::clamped(Some(-3), 10, 25).number, 1);
    }

    #[test]
    fn missing_page_defaults_to_the_first() {
        assert_eq!(Pager::clamped(None, 10, 25).number, 1);
    }

    #[test]
    fn empty_result_set_is_a_single_empty_page() {
        let pager = Pager::clamped(Some(5), 10, 0);

        assert_eq!(pager.number, 1);
        assert_eq!(pager.total_pages, 1);
        assert_eq!(pager.offset(), 0);

        let meta = pager.meta();
        assert!(!meta.has_previous);
        assert!(!meta.has_next);
    }

    #[test]
    fn exact_multiple_of_the_page_size() {
        let pager = Pager::clamped(Some(2), 10, 20);

        assert_eq!(pager.total_pages, 2);
        assert!(!pager.meta().has_next);
    }
}
