//! Client-side listing state and fetch coordination.
//!
//! The server is the source of truth for ordering and pagination; this
//! crate only mirrors pages it receives. [`FetchCoordinator`] owns the
//! fetch lifecycle (debounced filter changes, single-flight load-more,
//! stale-response discard) and [`TicketListState`] holds the mirrored
//! window.

pub mod coordinator;
pub mod error;
pub mod listing;
pub mod store;

pub use coordinator::{FetchCoordinator, LoadMoreOutcome, DEBOUNCE_WINDOW};
pub use error::ClientError;
pub use listing::{HttpListingClient, ListQuery, ListingClient, ListingPage};
pub use store::{StatePatch, TicketListState};
