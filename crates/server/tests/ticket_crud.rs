//! Integration tests for ticket and comment CRUD plus the seed endpoint.

mod common;

use axum::http::StatusCode;
use common::{TestFixture, TestResponse};
use serde_json::json;

async fn create_ticket(fixture: &TestFixture) -> TestResponse {
    fixture
        .post(
            "/api/v1/tickets",
            json!({
                "title": "Broken monitor",
                "description": "The monitor at desk 12 flickers and then goes black.",
                "status": "OPEN",
                "priority": "HIGH",
            }),
        )
        .await
}

#[tokio::test]
async fn test_create_ticket_returns_record() {
    let fixture = TestFixture::new().await;
    let response = create_ticket(&fixture).await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["message"], "Ticket created.");
    let ticket = &response.body["ticket"];
    assert_eq!(ticket["title"], "Broken monitor");
    assert_eq!(ticket["status"], "OPEN");
    assert_eq!(ticket["priority"], "HIGH");
    assert!(ticket["id"].as_str().is_some());
    assert!(ticket["createdAt"].as_str().is_some());
}

#[tokio::test]
async fn test_create_ticket_defaults_status_and_priority() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({
                "title": "Missing keyboard",
                "description": "New starter at desk 3 has no keyboard assigned.",
            }),
        )
        .await;

    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["ticket"]["status"], "OPEN");
    assert_eq!(response.body["ticket"]["priority"], "LOW");
}

#[tokio::test]
async fn test_create_ticket_validation() {
    let fixture = TestFixture::new().await;

    let response = fixture
        .post("/api/v1/tickets", json!({ "description": "A perfectly long description here." }))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "Title is required and must be at least 5 characters long."
    );

    let response = fixture
        .post("/api/v1/tickets", json!({ "title": "Valid title", "description": "too short" }))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "Description is required and must be at least 20 characters long."
    );

    // Whitespace does not count toward the minimum.
    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({ "title": "   ab   ", "description": "A perfectly long description here." }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = fixture
        .post(
            "/api/v1/tickets",
            json!({
                "title": "Valid title",
                "description": "A perfectly long description here.",
                "status": "CLOSED",
            }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid status.");
}

#[tokio::test]
async fn test_get_ticket_includes_comments() {
    let fixture = TestFixture::new().await;
    let created = create_ticket(&fixture).await;
    let id = created.body["ticket"]["id"].as_str().unwrap().to_string();

    let comment = fixture
        .post(
            &format!("/api/v1/tickets/{id}/comments"),
            json!({ "authorName": "Dana", "message": "Swapped the cable, still flickers." }),
        )
        .await;
    assert_status!(comment, StatusCode::CREATED);
    assert_eq!(comment.body["message"], "Comment added.");

    let response = fixture.get(&format!("/api/v1/tickets/{id}")).await;
    assert_status!(response, StatusCode::OK);
    let ticket = &response.body["ticket"];
    assert_eq!(ticket["title"], "Broken monitor");
    let comments = ticket["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["authorName"], "Dana");
}

#[tokio::test]
async fn test_get_unknown_ticket_is_404() {
    let fixture = TestFixture::new().await;
    let response = fixture.get("/api/v1/tickets/no-such-id").await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Ticket not found.");
}

#[tokio::test]
async fn test_update_ticket_partial_fields() {
    let fixture = TestFixture::new().await;
    let created = create_ticket(&fixture).await;
    let id = created.body["ticket"]["id"].as_str().unwrap().to_string();

    let response = fixture
        .put(
            &format!("/api/v1/tickets/{id}"),
            json!({ "status": "IN_PROGRESS" }),
        )
        .await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["message"], "Ticket updated.");
    assert_eq!(response.body["ticket"]["status"], "IN_PROGRESS");
    // Untouched fields survive.
    assert_eq!(response.body["ticket"]["title"], "Broken monitor");
    assert_eq!(response.body["ticket"]["priority"], "HIGH");
}

#[tokio::test]
async fn test_update_ticket_validation_and_404() {
    let fixture = TestFixture::new().await;
    let created = create_ticket(&fixture).await;
    let id = created.body["ticket"]["id"].as_str().unwrap().to_string();

    let response = fixture
        .put(&format!("/api/v1/tickets/{id}"), json!({ "description": "short" }))
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "Description is required and must be at least 20 characters long."
    );

    let response = fixture
        .put("/api/v1/tickets/no-such-id", json!({ "status": "RESOLVED" }))
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Ticket not found.");
}

#[tokio::test]
async fn test_delete_ticket_removes_it_from_listing() {
    let fixture = TestFixture::new().await;
    let created = create_ticket(&fixture).await;
    let id = created.body["ticket"]["id"].as_str().unwrap().to_string();

    let response = fixture.delete(&format!("/api/v1/tickets/{id}")).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["message"], "Ticket deleted.");

    let response = fixture.get(&format!("/api/v1/tickets/{id}")).await;
    assert_status!(response, StatusCode::NOT_FOUND);

    let listing = fixture.get("/api/v1/tickets").await;
    assert_eq!(listing.body["pagination"]["totalCount"], 0);

    let response = fixture.delete(&format!("/api/v1/tickets/{id}")).await;
    assert_status!(response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_validation() {
    let fixture = TestFixture::new().await;
    let created = create_ticket(&fixture).await;
    let id = created.body["ticket"]["id"].as_str().unwrap().to_string();

    let response = fixture
        .post(
            &format!("/api/v1/tickets/{id}/comments"),
            json!({ "message": "No author on this one." }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Author name is required.");

    let response = fixture
        .post(
            &format!("/api/v1/tickets/{id}/comments"),
            json!({ "authorName": "Dana", "message": "" }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "Message must be 1-500 characters long."
    );

    let response = fixture
        .post(
            &format!("/api/v1/tickets/{id}/comments"),
            json!({ "authorName": "Dana", "message": "x".repeat(501) }),
        )
        .await;
    assert_status!(response, StatusCode::BAD_REQUEST);

    let response = fixture
        .post(
            "/api/v1/tickets/no-such-id/comments",
            json!({ "authorName": "Dana", "message": "Valid message." }),
        )
        .await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Ticket not found.");
}

#[tokio::test]
async fn test_delete_comment() {
    let fixture = TestFixture::new().await;
    let created = create_ticket(&fixture).await;
    let id = created.body["ticket"]["id"].as_str().unwrap().to_string();

    let comment = fixture
        .post(
            &format!("/api/v1/tickets/{id}/comments"),
            json!({ "authorName": "Dana", "message": "Will close after verification." }),
        )
        .await;
    let comment_id = comment.body["comment"]["id"].as_str().unwrap().to_string();

    let response = fixture.delete(&format!("/api/v1/comments/{comment_id}")).await;
    assert_status!(response, StatusCode::OK);
    assert_eq!(response.body["message"], "Comment deleted.");

    let response = fixture.delete(&format!("/api/v1/comments/{comment_id}")).await;
    assert_status!(response, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Comment not found.");
}

#[tokio::test]
async fn test_seed_populates_sample_data() {
    let fixture = TestFixture::new().await;

    let response = fixture.post("/api/v1/tickets/seed", json!({})).await;
    assert_status!(response, StatusCode::CREATED);
    assert_eq!(response.body["message"], "Sample data seeded.");
    assert_eq!(response.body["count"], 10);

    let listing = fixture.get("/api/v1/tickets?limit=100").await;
    assert_eq!(listing.body["pagination"]["totalCount"], 10);
}

#[tokio::test]
async fn test_health_and_config_endpoints() {
    let fixture = TestFixture::new().await;

    let response = fixture.get("/api/v1/health").await;
    assert_status!(response, StatusCode::OK);

    let response = fixture.get("/api/v1/config").await;
    assert_status!(response, StatusCode::OK);
    assert!(response.body["database"]["path"].as_str().is_some());
}
