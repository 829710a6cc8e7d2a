//! The listing query subsystem: raw-parameter validation, pagination
//! arithmetic, and execution against the ticket store.

mod builder;
mod executor;
mod pagination;

pub use builder::{
    build_query, QueryDescriptor, QueryError, RawListParams, SortOrder, DEFAULT_LIMIT,
    DEFAULT_PAGE, MAX_LIMIT,
};
pub use executor::{ListQueryExecutor, ListSlice};
pub use pagination::PaginationEnvelope;
