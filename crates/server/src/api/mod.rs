pub mod comments;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod tickets;

pub use routes::create_router;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

/// Error body shape shared by all endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            message: message.into(),
        }),
    )
}
