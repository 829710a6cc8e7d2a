//! Pagination envelope arithmetic.

use serde::{Deserialize, Serialize};

/// Pagination metadata returned with every listing response. Recomputed
/// fresh on each call, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationEnvelope {
    pub current_page: i64,
    pub limit: i64,
    pub total_count: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PaginationEnvelope {
    /// Compute the envelope for a filtered result set.
    ///
    /// `total_pages` is `ceil(total_count / limit)`, so an empty result set
    /// has zero pages and therefore never a next page, regardless of the
    /// requested page.
    pub fn new(total_count: i64, page: i64, limit: i64) -> Self {
        debug_assert!(page >= 1, "page must be validated before this point");
        debug_assert!(limit >= 1, "limit must be validated before this point");

        let total_pages = if total_count == 0 {
            0
        } else {
            (total_count + limit - 1) / limit
        };

        Self {
            current_page: page,
            limit,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}
