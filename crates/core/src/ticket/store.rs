//! Ticket storage trait and request types.

use thiserror::Error;

use crate::query::QueryDescriptor;
use crate::ticket::{Comment, Ticket, TicketPriority, TicketStatus};

/// Error type for ticket storage operations.
#[derive(Debug, Error)]
pub enum TicketError {
    /// Ticket not found.
    #[error("Ticket not found: {0}")]
    NotFound(String),

    /// Comment not found.
    #[error("Comment not found: {0}")]
    CommentNotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

/// Request to create a new ticket.
#[derive(Debug, Clone)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
}

/// Partial update of a ticket. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
}

impl UpdateTicketRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
    }
}

/// Request to attach a comment to a ticket.
#[derive(Debug, Clone)]
pub struct CreateCommentRequest {
    pub author_name: String,
    pub message: String,
}

/// Trait for ticket storage backends.
///
/// `list` and `count` take the same validated [`QueryDescriptor`] so the
/// pagination envelope is always computed against the filter that produced
/// the returned slice.
pub trait TicketStore: Send + Sync {
    /// Create a new ticket.
    fn create(&self, request: CreateTicketRequest) -> Result<Ticket, TicketError>;

    /// Get a ticket by ID.
    fn get(&self, id: &str) -> Result<Option<Ticket>, TicketError>;

    /// List the page window selected by the descriptor, in the descriptor's
    /// sort order. A page past the end of the result set yields an empty
    /// vector.
    fn list(&self, query: &QueryDescriptor) -> Result<Vec<Ticket>, TicketError>;

    /// Count all tickets matching the descriptor's filter, ignoring the
    /// page window.
    fn count(&self, query: &QueryDescriptor) -> Result<i64, TicketError>;

    /// Apply a partial update to a ticket.
    fn update(&self, id: &str, update: UpdateTicketRequest) -> Result<Ticket, TicketError>;

    /// Permanently delete a ticket and its comments. Returns the deleted
    /// ticket if found.
    fn delete(&self, id: &str) -> Result<Ticket, TicketError>;

    /// Attach a comment to an existing ticket.
    fn add_comment(
        &self,
        ticket_id: &str,
        request: CreateCommentRequest,
    ) -> Result<Comment, TicketError>;

    /// List comments for a ticket, oldest first.
    fn list_comments(&self, ticket_id: &str) -> Result<Vec<Comment>, TicketError>;

    /// Delete a comment by ID. Returns the deleted comment if found.
    fn delete_comment(&self, comment_id: &str) -> Result<Comment, TicketError>;
}
