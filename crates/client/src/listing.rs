//! HTTP access to the listing endpoint.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use ticketdesk_core::{PaginationEnvelope, SortOrder, Ticket, TicketPriority, TicketStatus};

use crate::error::ClientError;

/// One page of the listing as returned by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingPage {
    pub tickets: Vec<Ticket>,
    pub pagination: PaginationEnvelope,
}

/// The parameters of one listing fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub status: Option<TicketStatus>,
    pub priority: Option<TicketPriority>,
    pub search: Option<String>,
    pub sort: SortOrder,
    pub page: i64,
    pub limit: i64,
}

impl ListQuery {
    /// Serialize as a query string, omitting unset filters.
    pub fn to_query_string(&self) -> String {
        let mut parts = vec![
            format!("page={}", self.page),
            format!("limit={}", self.limit),
            format!("sortBy={}", self.sort.as_str()),
        ];
        if let Some(status) = self.status {
            parts.push(format!("status={}", status.as_str()));
        }
        if let Some(priority) = self.priority {
            parts.push(format!("priority={}", priority.as_str()));
        }
        if let Some(search) = &self.search {
            parts.push(format!("search={}", urlencoding::encode(search)));
        }
        parts.join("&")
    }
}

/// Source of listing pages. The HTTP client implements this; tests swap in
/// a scripted double.
#[async_trait]
pub trait ListingClient: Send + Sync {
    async fn fetch_page(&self, query: &ListQuery) -> Result<ListingPage, ClientError>;
}

/// [`ListingClient`] backed by reqwest against a ticketdesk server.
pub struct HttpListingClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl HttpListingClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ListingClient for HttpListingClient {
    async fn fetch_page(&self, query: &ListQuery) -> Result<ListingPage, ClientError> {
        let url = format!(
            "{}/api/v1/tickets?{}",
            self.base_url,
            query.to_query_string()
        );

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Transport(format!("Request timed out: {e}"))
            } else {
                ClientError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|b| b.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<ListingPage>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_omits_unset_filters() {
        let query = ListQuery {
            page: 1,
            limit: 10,
            ..Default::default()
        };
        assert_eq!(query.to_query_string(), "page=1&limit=10&sortBy=newest");
    }

    #[test]
    fn test_query_string_encodes_search() {
        let query = ListQuery {
            status: Some(TicketStatus::InProgress),
            priority: Some(TicketPriority::High),
            search: Some("printer & scanner".to_string()),
            sort: SortOrder::Oldest,
            page: 3,
            limit: 25,
        };
        assert_eq!(
            query.to_query_string(),
            "page=3&limit=25&sortBy=oldest&status=IN_PROGRESS&priority=HIGH&search=printer%20%26%20scanner"
        );
    }
}
