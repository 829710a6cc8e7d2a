//! Comment API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use ticketdesk_core::{Comment, CreateCommentRequest, TicketError};

use super::{error_response, ApiError};
use crate::state::AppState;

const MESSAGE_MIN: usize = 1;
const MESSAGE_MAX: usize = 500;

/// Request body for adding a comment
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentBody {
    pub author_name: Option<String>,
    pub message: Option<String>,
}

/// Response for a created comment
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub message: String,
    pub comment: Comment,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Add a comment to a ticket
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
    Json(body): Json<AddCommentBody>,
) -> Result<(StatusCode, Json<CommentResponse>), ApiError> {
    let author_name = body.author_name.as_deref().unwrap_or("").trim().to_string();
    if author_name.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Author name is required.",
        ));
    }

    let message = body.message.as_deref().unwrap_or("").trim().to_string();
    if message.len() < MESSAGE_MIN || message.len() > MESSAGE_MAX {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            format!("Message must be {MESSAGE_MIN}-{MESSAGE_MAX} characters long."),
        ));
    }

    let request = CreateCommentRequest {
        author_name,
        message,
    };

    match state.ticket_store().add_comment(&ticket_id, request) {
        Ok(comment) => Ok((
            StatusCode::CREATED,
            Json(CommentResponse {
                message: "Comment added.".to_string(),
                comment,
            }),
        )),
        Err(TicketError::NotFound(_)) => {
            Err(error_response(StatusCode::NOT_FOUND, "Ticket not found."))
        }
        Err(e) => {
            error!("Failed to add comment to ticket {}: {}", ticket_id, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to add comment.",
            ))
        }
    }
}

/// Delete a comment by ID
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    match state.ticket_store().delete_comment(&id) {
        Ok(_) => Ok(Json(MessageResponse {
            message: "Comment deleted.".to_string(),
        })),
        Err(TicketError::CommentNotFound(_)) => {
            Err(error_response(StatusCode::NOT_FOUND, "Comment not found."))
        }
        Err(e) => {
            error!("Failed to delete comment {}: {}", id, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete comment.",
            ))
        }
    }
}
