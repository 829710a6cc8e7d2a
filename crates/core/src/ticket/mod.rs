//! Ticket records, comments, and the storage trait.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteTicketStore;
pub use store::{
    CreateCommentRequest, CreateTicketRequest, TicketError, TicketStore, UpdateTicketRequest,
};
pub use types::{Comment, Ticket, TicketPriority, TicketStatus};
