//! Execution of a validated listing query against the ticket store.

use std::sync::Arc;

use crate::query::QueryDescriptor;
use crate::ticket::{Ticket, TicketError, TicketStore};

/// One page of a filtered result set together with the filter-wide count.
#[derive(Debug, Clone)]
pub struct ListSlice {
    pub tickets: Vec<Ticket>,
    pub total_count: i64,
}

/// Applies a [`QueryDescriptor`] against the record store. Stateless per
/// call; the page window and the total count are computed against the same
/// filter so the resulting pagination envelope is consistent with the slice.
#[derive(Clone)]
pub struct ListQueryExecutor {
    store: Arc<dyn TicketStore>,
}

impl ListQueryExecutor {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    pub fn execute(&self, query: &QueryDescriptor) -> Result<ListSlice, TicketError> {
        let tickets = self.store.list(query)?;
        let total_count = self.store.count(query)?;
        Ok(ListSlice {
            tickets,
            total_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build_query, RawListParams, SortOrder};
    use crate::ticket::{
        CreateTicketRequest, SqliteTicketStore, TicketPriority, TicketStatus,
    };

    fn seeded_executor(count: usize) -> ListQueryExecutor {
        let store = SqliteTicketStore::in_memory().unwrap();
        for i in 1..=count {
            store
                .create(CreateTicketRequest {
                    title: format!("Ticket {i:02}"),
                    description: format!("Description for ticket number {i:02}."),
                    status: if i % 2 == 0 {
                        TicketStatus::Open
                    } else {
                        TicketStatus::Resolved
                    },
                    priority: TicketPriority::Medium,
                })
                .unwrap();
        }
        ListQueryExecutor::new(Arc::new(store))
    }

    fn query(raw: RawListParams) -> crate::query::QueryDescriptor {
        build_query(&raw).unwrap()
    }

    #[test]
    fn test_page_window_scenario() {
        // limit=10, total=25, page=3 -> records 21..=25 in insertion order.
        let executor = seeded_executor(25);
        let descriptor = query(RawListParams {
            page: Some("3".to_string()),
            sort_by: Some("oldest".to_string()),
            ..Default::default()
        });

        let slice = executor.execute(&descriptor).unwrap();
        assert_eq!(slice.total_count, 25);
        assert_eq!(slice.tickets.len(), 5);
        let titles: Vec<&str> = slice.tickets.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            ["Ticket 21", "Ticket 22", "Ticket 23", "Ticket 24", "Ticket 25"]
        );
    }

    #[test]
    fn test_page_past_the_end_is_empty_not_an_error() {
        let executor = seeded_executor(5);
        let descriptor = query(RawListParams {
            page: Some("4".to_string()),
            limit: Some("10".to_string()),
            ..Default::default()
        });

        let slice = executor.execute(&descriptor).unwrap();
        assert!(slice.tickets.is_empty());
        assert_eq!(slice.total_count, 5);
    }

    #[test]
    fn test_newest_reverses_oldest() {
        let executor = seeded_executor(6);

        let newest = executor
            .execute(&query(RawListParams {
                limit: Some("100".to_string()),
                ..Default::default()
            }))
            .unwrap();
        let oldest = executor
            .execute(&query(RawListParams {
                limit: Some("100".to_string()),
                sort_by: Some("oldest".to_string()),
                ..Default::default()
            }))
            .unwrap();

        let mut reversed: Vec<String> = newest.tickets.iter().map(|t| t.id.clone()).collect();
        reversed.reverse();
        let oldest_ids: Vec<String> = oldest.tickets.iter().map(|t| t.id.clone()).collect();
        assert_eq!(reversed, oldest_ids);
    }

    #[test]
    fn test_repeated_query_returns_identical_ordering() {
        let executor = seeded_executor(20);
        let descriptor = crate::query::QueryDescriptor {
            limit: 20,
            sort_order: SortOrder::Newest,
            ..Default::default()
        };

        let first = executor.execute(&descriptor).unwrap();
        let second = executor.execute(&descriptor).unwrap();
        assert_eq!(first.tickets, second.tickets);
    }

    #[test]
    fn test_filters_are_conjunctive() {
        let executor = seeded_executor(10);
        let descriptor = query(RawListParams {
            status: Some("OPEN".to_string()),
            search: Some("ticket 04".to_string()),
            ..Default::default()
        });

        let slice = executor.execute(&descriptor).unwrap();
        assert_eq!(slice.total_count, 1);
        assert_eq!(slice.tickets[0].title, "Ticket 04");
    }
}
