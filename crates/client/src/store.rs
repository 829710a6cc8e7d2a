//! The client-side list state cell.

use ticketdesk_core::{PaginationEnvelope, Ticket};

/// Partial update for coordinator bookkeeping flags. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatePatch {
    pub fetch_in_flight: Option<bool>,
    pub pending_debounce: Option<bool>,
}

/// In-memory projection of the visible ticket list. The server owns ordering
/// and pagination; this cell only mirrors pages it has been handed.
///
/// The visible list is `base_tickets ++ appended_tickets`: the base is the
/// most recent replace-fetch, the tail accumulates load-more pages issued
/// since then. Transitions are plain methods; callers serialize access.
#[derive(Debug, Clone, Default)]
pub struct TicketListState {
    base_tickets: Vec<Ticket>,
    appended_tickets: Vec<Ticket>,
    pagination: Option<PaginationEnvelope>,
    fetch_in_flight: bool,
    pending_debounce: bool,
}

impl TicketListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole visible list. Clears the appended tail and both
    /// bookkeeping flags.
    pub fn replace(&mut self, tickets: Vec<Ticket>, pagination: PaginationEnvelope) {
        self.base_tickets = tickets;
        self.appended_tickets.clear();
        self.pagination = Some(pagination);
        self.fetch_in_flight = false;
        self.pending_debounce = false;
    }

    /// Concatenate a load-more page onto the tail and clear `fetch_in_flight`.
    pub fn append(&mut self, tickets: Vec<Ticket>, pagination: PaginationEnvelope) {
        self.appended_tickets.extend(tickets);
        self.pagination = Some(pagination);
        self.fetch_in_flight = false;
    }

    /// Shallow-merge bookkeeping flags.
    pub fn patch(&mut self, patch: StatePatch) {
        if let Some(fetch_in_flight) = patch.fetch_in_flight {
            self.fetch_in_flight = fetch_in_flight;
        }
        if let Some(pending_debounce) = patch.pending_debounce {
            self.pending_debounce = pending_debounce;
        }
    }

    /// Return to the empty initial state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// The list as the user sees it: base followed by the appended tail.
    pub fn visible_tickets(&self) -> Vec<Ticket> {
        let mut visible = self.base_tickets.clone();
        visible.extend(self.appended_tickets.iter().cloned());
        visible
    }

    pub fn pagination(&self) -> Option<&PaginationEnvelope> {
        self.pagination.as_ref()
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.fetch_in_flight
    }

    pub fn pending_debounce(&self) -> bool {
        self.pending_debounce
    }
}
