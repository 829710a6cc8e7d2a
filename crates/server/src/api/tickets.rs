//! Ticket API handlers.
//!
//! `list_tickets` is the listing endpoint: raw query parameters are
//! validated into a descriptor, executed against the store, and returned
//! with a freshly computed pagination envelope. The remaining handlers are
//! plain record CRUD.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use ticketdesk_core::{
    build_query, Comment, CreateCommentRequest, CreateTicketRequest, PaginationEnvelope,
    RawListParams, Ticket, TicketError, TicketPriority, TicketStatus, UpdateTicketRequest,
};

use super::{error_response, ApiError};
use crate::metrics::LIST_QUERIES_TOTAL;
use crate::state::AppState;

/// Minimum title length for create/update.
const TITLE_MIN: usize = 5;

/// Minimum description length for create/update.
const DESCRIPTION_MIN: usize = 20;

const TITLE_TOO_SHORT: &str = "Title is required and must be at least 5 characters long.";
const DESCRIPTION_TOO_SHORT: &str =
    "Description is required and must be at least 20 characters long.";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a ticket
#[derive(Debug, Deserialize)]
pub struct CreateTicketBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// Request body for updating a ticket (all fields optional)
#[derive(Debug, Deserialize)]
pub struct UpdateTicketBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
}

/// Response for the listing endpoint
#[derive(Debug, Serialize)]
pub struct ListTicketsResponse {
    pub tickets: Vec<Ticket>,
    pub pagination: PaginationEnvelope,
}

/// Response for mutations that return the affected ticket
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub message: String,
    pub ticket: Ticket,
}

/// A ticket together with its comment thread
#[derive(Debug, Serialize)]
pub struct TicketDetail {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub comments: Vec<Comment>,
}

/// Response for the detail endpoint
#[derive(Debug, Serialize)]
pub struct TicketDetailResponse {
    pub ticket: TicketDetail,
}

/// Response for deletions and other message-only outcomes
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Response for the seed endpoint
#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub count: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// List tickets: filter, sort, and paginate.
pub async fn list_tickets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RawListParams>,
) -> Result<Json<ListTicketsResponse>, ApiError> {
    // Validation short-circuits before the store is touched.
    let query = match build_query(&params) {
        Ok(query) => query,
        Err(e) => {
            LIST_QUERIES_TOTAL.with_label_values(&["invalid"]).inc();
            return Err(error_response(StatusCode::BAD_REQUEST, e.to_string()));
        }
    };

    match state.executor().execute(&query) {
        Ok(slice) => {
            LIST_QUERIES_TOTAL.with_label_values(&["ok"]).inc();
            let pagination = PaginationEnvelope::new(slice.total_count, query.page, query.limit);
            Ok(Json(ListTicketsResponse {
                tickets: slice.tickets,
                pagination,
            }))
        }
        Err(e) => {
            error!("Listing query failed: {}", e);
            LIST_QUERIES_TOTAL.with_label_values(&["error"]).inc();
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch tickets.",
            ))
        }
    }
}

/// Create a new ticket
pub async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateTicketBody>,
) -> Result<(StatusCode, Json<TicketResponse>), ApiError> {
    let title = body.title.as_deref().unwrap_or("").trim().to_string();
    if title.len() < TITLE_MIN {
        return Err(error_response(StatusCode::BAD_REQUEST, TITLE_TOO_SHORT));
    }

    let description = body.description.as_deref().unwrap_or("").trim().to_string();
    if description.len() < DESCRIPTION_MIN {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            DESCRIPTION_TOO_SHORT,
        ));
    }

    let status = parse_status_field(&body.status)?.unwrap_or(TicketStatus::Open);
    let priority = parse_priority_field(&body.priority)?.unwrap_or(TicketPriority::Low);

    let request = CreateTicketRequest {
        title,
        description,
        status,
        priority,
    };

    match state.ticket_store().create(request) {
        Ok(ticket) => Ok((
            StatusCode::CREATED,
            Json(TicketResponse {
                message: "Ticket created.".to_string(),
                ticket,
            }),
        )),
        Err(e) => {
            error!("Failed to create ticket: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create ticket.",
            ))
        }
    }
}

/// Get a ticket with its comment thread
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TicketDetailResponse>, ApiError> {
    let ticket = match state.ticket_store().get(&id) {
        Ok(Some(ticket)) => ticket,
        Ok(None) => {
            return Err(error_response(StatusCode::NOT_FOUND, "Ticket not found."));
        }
        Err(e) => {
            error!("Failed to fetch ticket {}: {}", id, e);
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch ticket.",
            ));
        }
    };

    let comments = match state.ticket_store().list_comments(&id) {
        Ok(comments) => comments,
        Err(e) => {
            error!("Failed to fetch comments for ticket {}: {}", id, e);
            return Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch ticket.",
            ));
        }
    };

    Ok(Json(TicketDetailResponse {
        ticket: TicketDetail { ticket, comments },
    }))
}

/// Partially update a ticket
pub async fn update_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTicketBody>,
) -> Result<Json<TicketResponse>, ApiError> {
    let title = match body.title {
        None => None,
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.len() < TITLE_MIN {
                return Err(error_response(StatusCode::BAD_REQUEST, TITLE_TOO_SHORT));
            }
            Some(trimmed)
        }
    };

    let description = match body.description {
        None => None,
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.len() < DESCRIPTION_MIN {
                return Err(error_response(
                    StatusCode::BAD_REQUEST,
                    DESCRIPTION_TOO_SHORT,
                ));
            }
            Some(trimmed)
        }
    };

    let update = UpdateTicketRequest {
        title,
        description,
        status: parse_status_field(&body.status)?,
        priority: parse_priority_field(&body.priority)?,
    };

    match state.ticket_store().update(&id, update) {
        Ok(ticket) => Ok(Json(TicketResponse {
            message: "Ticket updated.".to_string(),
            ticket,
        })),
        Err(TicketError::NotFound(_)) => {
            Err(error_response(StatusCode::NOT_FOUND, "Ticket not found."))
        }
        Err(e) => {
            error!("Failed to update ticket {}: {}", id, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to update ticket.",
            ))
        }
    }
}

/// Delete a ticket and its comments
pub async fn delete_ticket(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    match state.ticket_store().delete(&id) {
        Ok(_) => Ok(Json(MessageResponse {
            message: "Ticket deleted.".to_string(),
        })),
        Err(TicketError::NotFound(_)) => {
            Err(error_response(StatusCode::NOT_FOUND, "Ticket not found."))
        }
        Err(e) => {
            error!("Failed to delete ticket {}: {}", id, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete ticket.",
            ))
        }
    }
}

/// Seed sample tickets with comments (development convenience)
pub async fn seed_tickets(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SeedResponse>), ApiError> {
    const TICKETS_TO_CREATE: usize = 10;
    const COMMENTS_PER_TICKET: usize = 2;

    for i in 1..=TICKETS_TO_CREATE {
        let ticket = state
            .ticket_store()
            .create(CreateTicketRequest {
                title: format!("Sample Ticket {i}"),
                description: format!(
                    "This is a sample description for ticket {i}. It has enough detail to pass validation."
                ),
                status: TicketStatus::Open,
                priority: TicketPriority::Medium,
            })
            .map_err(|e| {
                error!("Failed to seed tickets: {}", e);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to seed sample data.",
                )
            })?;

        for c in 1..=COMMENTS_PER_TICKET {
            state
                .ticket_store()
                .add_comment(
                    &ticket.id,
                    CreateCommentRequest {
                        author_name: format!("User {c}"),
                        message: format!("Sample comment {c} for ticket {i}."),
                    },
                )
                .map_err(|e| {
                    error!("Failed to seed comments: {}", e);
                    error_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to seed sample data.",
                    )
                })?;
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(SeedResponse {
            message: "Sample data seeded.".to_string(),
            count: TICKETS_TO_CREATE,
        }),
    ))
}

// ============================================================================
// Field validation helpers
// ============================================================================

fn parse_status_field(raw: &Option<String>) -> Result<Option<TicketStatus>, ApiError> {
    match raw.as_deref().filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => TicketStatus::parse(value)
            .map(Some)
            .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Invalid status.")),
    }
}

fn parse_priority_field(raw: &Option<String>) -> Result<Option<TicketPriority>, ApiError> {
    match raw.as_deref().filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => TicketPriority::parse(value)
            .map(Some)
            .ok_or_else(|| error_response(StatusCode::BAD_REQUEST, "Invalid priority.")),
    }
}
