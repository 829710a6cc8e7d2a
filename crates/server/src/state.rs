use std::sync::Arc;

use ticketdesk_core::{Config, ListQueryExecutor, SanitizedConfig, TicketStore};

/// Shared application state
pub struct AppState {
    config: Config,
    ticket_store: Arc<dyn TicketStore>,
    executor: ListQueryExecutor,
}

impl AppState {
    pub fn new(config: Config, ticket_store: Arc<dyn TicketStore>) -> Self {
        let executor = ListQueryExecutor::new(Arc::clone(&ticket_store));
        Self {
            config,
            ticket_store,
            executor,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn ticket_store(&self) -> &dyn TicketStore {
        self.ticket_store.as_ref()
    }

    pub fn executor(&self) -> &ListQueryExecutor {
        &self.executor
    }
}
