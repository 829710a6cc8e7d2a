//! Fetch lifecycle for the ticket list.
//!
//! The coordinator decides when to call the listing endpoint and which
//! store transition to apply to the result. Three rules carry the whole
//! contract:
//!
//! - Filter, sort, and page-size changes schedule a replace-fetch behind a
//!   trailing debounce window; each new change cancels the pending timer and
//!   restarts it, so only the last change of a burst fires.
//! - Load-more is single-flight: at most one append-fetch outstanding,
//!   guarded by the `fetch_in_flight` flag on the store.
//! - Every fetch snapshots a generation token at issue time. The token is
//!   bumped by every filter change and every replace issuance; a completed
//!   fetch whose token no longer matches is discarded silently.
//!
//! All bookkeeping is synchronous around the single suspension point (the
//! network call); the inner mutex is never held across an await.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use ticketdesk_core::{
    PaginationEnvelope, SortOrder, Ticket, TicketPriority, TicketStatus, DEFAULT_LIMIT,
};

use crate::error::ClientError;
use crate::listing::{ListQuery, ListingClient};
use crate::store::{StatePatch, TicketListState};

/// Trailing debounce window for filter/sort/page-size changes.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(600);

/// Result of a load-more call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// The next page was fetched and appended.
    Appended,
    /// Another load-more was already outstanding; this call was a no-op.
    AlreadyInFlight,
    /// No pagination yet, or no next page to load.
    NothingLoaded,
    /// The response arrived after a replace had superseded it.
    Discarded,
}

/// The filter/sort/page-size context fetches are issued under.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveFilters {
    status: Option<TicketStatus>,
    priority: Option<TicketPriority>,
    search: Option<String>,
    sort: SortOrder,
    limit: i64,
}

impl Default for ActiveFilters {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            search: None,
            sort: SortOrder::Newest,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ActiveFilters {
    fn to_query(&self, page: i64) -> ListQuery {
        ListQuery {
            status: self.status,
            priority: self.priority,
            search: self.search.clone(),
            sort: self.sort,
            page,
            limit: self.limit,
        }
    }
}

struct Inner {
    state: TicketListState,
    filters: ActiveFilters,
    generation: u64,
    /// Generation the outstanding load-more was issued under, if any. Lets
    /// a stale load-more clear `fetch_in_flight` on completion without
    /// stepping on a newer load-more that has since taken the flag.
    load_more_owner: Option<u64>,
    debounce_timer: Option<JoinHandle<()>>,
}

/// Owns the list state and the fetch lifecycle around it.
///
/// Must live inside a tokio runtime; filter setters spawn the debounce
/// timer task.
pub struct FetchCoordinator {
    client: Arc<dyn ListingClient>,
    inner: Mutex<Inner>,
    debounce_window: Duration,
}

impl FetchCoordinator {
    pub fn new(client: Arc<dyn ListingClient>) -> Arc<Self> {
        Self::with_debounce_window(client, DEBOUNCE_WINDOW)
    }

    pub fn with_debounce_window(client: Arc<dyn ListingClient>, window: Duration) -> Arc<Self> {
        Arc::new(Self {
            client,
            inner: Mutex::new(Inner {
                state: TicketListState::new(),
                filters: ActiveFilters::default(),
                generation: 0,
                load_more_owner: None,
                debounce_timer: None,
            }),
            debounce_window: window,
        })
    }

    /// First load: replace-fetch page 1 under the default filters.
    pub async fn initial_load(self: &Arc<Self>) -> Result<(), ClientError> {
        self.issue_replace().await
    }

    /// External signal that a ticket or comment changed elsewhere. Refetches
    /// page 1 immediately under the current filters; the user's filter/sort
    /// view is preserved across the refresh.
    pub async fn notify_mutation(self: &Arc<Self>) -> Result<(), ClientError> {
        self.issue_replace().await
    }

    pub fn set_status_filter(self: &Arc<Self>, status: Option<TicketStatus>) {
        self.change_filters(|f| {
            if f.status == status {
                return false;
            }
            f.status = status;
            true
        });
    }

    pub fn set_priority_filter(self: &Arc<Self>, priority: Option<TicketPriority>) {
        self.change_filters(|f| {
            if f.priority == priority {
                return false;
            }
            f.priority = priority;
            true
        });
    }

    pub fn set_search(self: &Arc<Self>, search: Option<String>) {
        let search = search.filter(|s| !s.is_empty());
        self.change_filters(|f| {
            if f.search == search {
                return false;
            }
            f.search = search.clone();
            true
        });
    }

    pub fn set_sort_order(self: &Arc<Self>, sort: SortOrder) {
        self.change_filters(|f| {
            if f.sort == sort {
                return false;
            }
            f.sort = sort;
            true
        });
    }

    /// Change the page size. Leaves search text and other filters untouched.
    pub fn set_limit(self: &Arc<Self>, limit: i64) {
        self.change_filters(|f| {
            if f.limit == limit {
                return false;
            }
            f.limit = limit;
            true
        });
    }

    /// Load the next page and append it. Single-flight: a call while a
    /// previous load-more is still outstanding is silently ignored.
    pub async fn load_more(self: &Arc<Self>) -> Result<LoadMoreOutcome, ClientError> {
        let (generation, query) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.state.fetch_in_flight() {
                return Ok(LoadMoreOutcome::AlreadyInFlight);
            }
            let next_page = match inner.state.pagination() {
                Some(pagination) if pagination.has_next => pagination.current_page + 1,
                _ => return Ok(LoadMoreOutcome::NothingLoaded),
            };
            inner.state.patch(StatePatch {
                fetch_in_flight: Some(true),
                ..Default::default()
            });
            inner.load_more_owner = Some(inner.generation);
            (inner.generation, inner.filters.to_query(next_page))
        };

        match self.client.fetch_page(&query).await {
            Ok(page) => {
                let mut inner = self.inner.lock().unwrap();
                if inner.generation != generation {
                    // A replace superseded this fetch; the stale page must
                    // not be appended. Release the flag if this fetch still
                    // owns it (a failed replace never clears it for us).
                    Self::release_in_flight(&mut inner, generation);
                    debug!("Discarding stale load-more response");
                    return Ok(LoadMoreOutcome::Discarded);
                }
                inner.load_more_owner = None;
                inner.state.append(page.tickets, page.pagination);
                Ok(LoadMoreOutcome::Appended)
            }
            Err(e) => {
                let mut inner = self.inner.lock().unwrap();
                Self::release_in_flight(&mut inner, generation);
                Err(e)
            }
        }
    }

    /// Clear `fetch_in_flight` on a load-more completion path, but only if
    /// the flag is still owned by the fetch issued under `generation`. A
    /// newer load-more may have taken the flag after a replace reset it.
    fn release_in_flight(inner: &mut Inner, generation: u64) {
        if inner.load_more_owner == Some(generation) {
            inner.load_more_owner = None;
            inner.state.patch(StatePatch {
                fetch_in_flight: Some(false),
                ..Default::default()
            });
        }
    }

    /// The list as the consumer should render it.
    pub fn visible_tickets(&self) -> Vec<Ticket> {
        self.inner.lock().unwrap().state.visible_tickets()
    }

    pub fn pagination(&self) -> Option<PaginationEnvelope> {
        self.inner.lock().unwrap().state.pagination().copied()
    }

    pub fn fetch_in_flight(&self) -> bool {
        self.inner.lock().unwrap().state.fetch_in_flight()
    }

    pub fn pending_debounce(&self) -> bool {
        self.inner.lock().unwrap().state.pending_debounce()
    }

    /// Apply a filter mutation; when it reports a change, bump the
    /// generation and restart the debounce timer.
    fn change_filters(self: &Arc<Self>, mutate: impl FnOnce(&mut ActiveFilters) -> bool) {
        let mut inner = self.inner.lock().unwrap();
        if !mutate(&mut inner.filters) {
            return;
        }
        // Any filter change logically invalidates pages beyond 1, and makes
        // every outstanding fetch stale.
        inner.generation += 1;
        self.schedule_debounce(&mut inner);
    }

    /// Single-slot timer: a new schedule always cancels the outstanding one.
    fn schedule_debounce(self: &Arc<Self>, inner: &mut Inner) {
        if let Some(timer) = inner.debounce_timer.take() {
            timer.abort();
        }
        inner.state.patch(StatePatch {
            pending_debounce: Some(true),
            ..Default::default()
        });

        let coordinator = Arc::clone(self);
        let window = self.debounce_window;
        inner.debounce_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            {
                let mut inner = coordinator.inner.lock().unwrap();
                inner.debounce_timer = None;
                inner.state.patch(StatePatch {
                    pending_debounce: Some(false),
                    ..Default::default()
                });
            }
            if let Err(e) = coordinator.issue_replace().await {
                warn!("Debounced refetch failed: {}", e);
            }
        }));
    }

    /// Replace-fetch page 1 under the filters as they stand when the fetch
    /// is issued. Bumps the generation so any older in-flight fetch lands
    /// stale.
    async fn issue_replace(self: &Arc<Self>) -> Result<(), ClientError> {
        let (generation, query) = {
            let mut inner = self.inner.lock().unwrap();
            inner.generation += 1;
            (inner.generation, inner.filters.to_query(1))
        };

        match self.client.fetch_page(&query).await {
            Ok(page) => {
                let mut inner = self.inner.lock().unwrap();
                if inner.generation != generation {
                    debug!("Discarding stale replace response");
                    return Ok(());
                }
                inner.load_more_owner = None;
                inner.state.replace(page.tickets, page.pagination);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
