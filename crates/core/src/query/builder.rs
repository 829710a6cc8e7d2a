//! Validation of raw listing parameters into a query descriptor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ticket::{TicketPriority, TicketStatus};

/// Default page when the parameter is absent.
pub const DEFAULT_PAGE: i64 = 1;

/// Default page size when the parameter is absent.
pub const DEFAULT_LIMIT: i64 = 10;

/// Maximum allowed page size.
pub const MAX_LIMIT: i64 = 100;

/// Validation failure for a listing request. Messages are part of the wire
/// contract and name the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Invalid page number.")]
    InvalidPage,

    #[error("Invalid limit. Must be between 1 and 100.")]
    InvalidLimit,

    #[error("Invalid status.")]
    InvalidStatus,

    #[error("Invalid priority.")]
    InvalidPriority,

    #[error("Invalid sortBy. Use 'newest' or 'oldest'.")]
    InvalidSortBy,
}

/// Sort order for the listing, always keyed on `created_at`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newest => "newest",
            Self::Oldest => "oldest",
        }
    }
}

/// Raw, un-trusted listing parameters as they arrive on the query string.
///
/// Every field is an optional string so that malformed input reaches
/// [`build_query`] instead of being rejected by the deserializer with a
/// generic message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

/// A validated, normalized listing query. One per request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub status_filter: Option<TicketStatus>,
    pub priority_filter: Option<TicketPriority>,
    pub search_term: Option<String>,
    pub sort_order: SortOrder,
    /// 1-based page index.
    pub page: i64,
    /// Page size, 1..=100.
    pub limit: i64,
}

impl QueryDescriptor {
    /// Number of rows to skip for the page window. Saturates for huge page
    /// numbers; a saturated offset is past the end of any result set, which
    /// still yields an empty page rather than an error.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self {
            status_filter: None,
            priority_filter: None,
            search_term: None,
            sort_order: SortOrder::Newest,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Validate raw listing parameters into a [`QueryDescriptor`].
///
/// Empty strings are treated the same as absent parameters. Pure function:
/// no side effects, no store access.
pub fn build_query(params: &RawListParams) -> Result<QueryDescriptor, QueryError> {
    let page = match non_empty(&params.page) {
        None => DEFAULT_PAGE,
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|p| *p >= 1)
            .ok_or(QueryError::InvalidPage)?,
    };

    let limit = match non_empty(&params.limit) {
        None => DEFAULT_LIMIT,
        Some(raw) => raw
            .parse::<i64>()
            .ok()
            .filter(|l| (1..=MAX_LIMIT).contains(l))
            .ok_or(QueryError::InvalidLimit)?,
    };

    let status_filter = match non_empty(&params.status) {
        None => None,
        Some(raw) => Some(TicketStatus::parse(raw).ok_or(QueryError::InvalidStatus)?),
    };

    let priority_filter = match non_empty(&params.priority) {
        None => None,
        Some(raw) => Some(TicketPriority::parse(raw).ok_or(QueryError::InvalidPriority)?),
    };

    let sort_order = match non_empty(&params.sort_by) {
        None => SortOrder::Newest,
        Some("newest") => SortOrder::Newest,
        Some("oldest") => SortOrder::Oldest,
        Some(_) => return Err(QueryError::InvalidSortBy),
    };

    let search_term = non_empty(&params.search).map(str::to_string);

    Ok(QueryDescriptor {
        status_filter,
        priority_filter,
        search_term,
        sort_order,
        page,
        limit,
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
