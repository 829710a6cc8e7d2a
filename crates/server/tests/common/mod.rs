//! Common test utilities for in-process API testing.
//!
//! The fixture builds the full router against a temporary SQLite database
//! so tests exercise the real handler/store path without binding a socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use ticketdesk_core::{Config, DatabaseConfig, ServerConfig, SqliteTicketStore, TicketStore};
use ticketdesk_server::api::create_router;
use ticketdesk_server::state::AppState;

/// In-process test server over a temporary database.
pub struct TestFixture {
    pub router: Router,
    /// Keeps the database directory alive for the fixture's lifetime.
    #[allow(dead_code)]
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
        };

        let ticket_store: Arc<dyn TicketStore> = Arc::new(
            SqliteTicketStore::new(&db_path).expect("Failed to create ticket store"),
        );

        let state = Arc::new(AppState::new(config, ticket_store));
        let router = create_router(state);

        Self { router, temp_dir }
    }

    /// Create a fixture pre-populated with numbered tickets, oldest first.
    #[allow(dead_code)]
    pub async fn with_tickets(count: usize) -> Self {
        let fixture = Self::new().await;
        for i in 1..=count {
            let response = fixture
                .post(
                    "/api/v1/tickets",
                    serde_json::json!({
                        "title": format!("Ticket {i:02}"),
                        "description": format!("Description for ticket number {i:02}."),
                        "status": if i % 2 == 0 { "OPEN" } else { "RESOLVED" },
                        "priority": "MEDIUM",
                    }),
                )
                .await;
            assert_eq!(response.status, StatusCode::CREATED, "seed ticket {i}");
        }
        fixture
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PUT request with JSON body.
    #[allow(dead_code)]
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    #[allow(dead_code)]
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
