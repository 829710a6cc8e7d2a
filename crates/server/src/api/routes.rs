use axum::{
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{comments, handlers, middleware, tickets};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Tickets
        .route("/tickets", get(tickets::list_tickets))
        .route("/tickets", post(tickets::create_ticket))
        .route("/tickets/seed", post(tickets::seed_tickets))
        .route("/tickets/{id}", get(tickets::get_ticket))
        .route("/tickets/{id}", put(tickets::update_ticket))
        .route("/tickets/{id}", delete(tickets::delete_ticket))
        // Comments
        .route("/tickets/{id}/comments", post(comments::add_comment))
        .route("/comments/{id}", delete(comments::delete_comment))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .layer(from_fn(middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
