//! Paginated, filterable view of the business catalog.
//!
//! Pages accumulate locally as the user scrolls. A search or category filter
//! replaces the visible set with the server's result for that filter until
//! the filter is cleared, at which point the accumulated pages are shown
//! again without a network call.
//!
//! # Concurrency
//!
//! At most one page request is in flight at a time; extra `load_more` calls
//! from rapid scroll events return [`LoadOutcome::InFlight`]. Searches are not
//! serialized, but each carries a generation and only the most recent one is
//! applied. The same applies to page responses that land after [`ListingController::clear`].
//!
//! The state lock is never held across an await.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, error, info, instrument};

use mybn_core::{Business, FilterState, ListingPage};

use crate::api::{ApiError, CatalogApi, Credentials, SharedCredentials};
use crate::config::ListingConfig;

/// Errors raised by the listing controller.
///
/// State is never modified when one of these is returned.
#[derive(Debug, Error)]
pub enum ListingError {
    /// The catalog request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An append was requested for a page at or before the current cursor.
    #[error("page {requested} requested after page {current}")]
    OutOfOrder { requested: u32, current: u32 },
}

impl ListingError {
    /// Whether retrying may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_retryable(),
            Self::OutOfOrder { .. } => false,
        }
    }
}

/// Result of a page load.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The page was fetched and applied.
    Loaded(ListingPage),
    /// Another page request was already running; nothing was fetched.
    InFlight,
    /// The last page has been reached; nothing was fetched.
    Exhausted,
    /// The page was fetched but the listing was reset meanwhile; it was dropped.
    Stale,
}

/// Result of applying a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The filter was cleared and the accumulated pages are visible again.
    Cleared,
    /// A search ran and its results are visible.
    Searched(usize),
    /// A newer filter was applied while this search ran; its results were dropped.
    Stale,
}

/// Point-in-time view of the listing for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSnapshot {
    /// Businesses to display.
    pub visible: Vec<Business>,
    /// Number of businesses accumulated from paging.
    pub accumulated_len: usize,
    /// Catalog size reported by the last page.
    pub total: u64,
    /// Last page applied, 0 before the first load.
    pub page: u32,
    /// Whether `load_more` may fetch another page.
    pub has_more: bool,
    /// Whether a page request is in flight.
    pub loading: bool,
    /// Filter the visible set was produced by.
    pub filter: FilterState,
}

impl ListingSnapshot {
    /// Whether the visible set is a search result rather than the paged catalog.
    #[must_use]
    pub fn is_filtered(&self) -> bool {
        !self.filter.is_unfiltered()
    }
}

#[derive(Debug)]
struct ListingState {
    items: Vec<Business>,
    filtered: Option<Vec<Business>>,
    filter: FilterState,
    page: u32,
    total: u64,
    has_more: bool,
    in_flight: bool,
    page_generation: u64,
    filter_generation: u64,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            filtered: None,
            filter: FilterState::default(),
            page: 0,
            total: 0,
            has_more: true,
            in_flight: false,
            page_generation: 0,
            filter_generation: 0,
        }
    }
}

/// Page request admitted under the state lock.
struct PageTicket {
    page: u32,
    reset: bool,
    generation: u64,
    credentials: Credentials,
}

/// Clears the in-flight flag when a page request ends, however it ends.
struct InFlightGuard<'a> {
    state: &'a Mutex<ListingState>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight = false;
    }
}

/// Infinite-scroll controller over a [`CatalogApi`].
pub struct ListingController {
    catalog: Arc<dyn CatalogApi>,
    config: ListingConfig,
    credentials: SharedCredentials,
    state: Mutex<ListingState>,
}

impl ListingController {
    /// Create an empty controller with its own anonymous credentials.
    /// Nothing is fetched until the first load.
    #[must_use]
    pub fn new(catalog: Arc<dyn CatalogApi>, config: ListingConfig) -> Self {
        Self::with_credentials(catalog, config, SharedCredentials::default())
    }

    /// Create an empty controller whose requests use `credentials`, usually
    /// [`SessionManager::shared_credentials`](crate::SessionManager::shared_credentials).
    #[must_use]
    pub fn with_credentials(
        catalog: Arc<dyn CatalogApi>,
        config: ListingConfig,
        credentials: SharedCredentials,
    ) -> Self {
        Self {
            catalog,
            config,
            credentials,
            state: Mutex::new(ListingState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ListingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the credentials used for subsequent requests.
    ///
    /// Writes through to the shared slot, so a session manager sharing it
    /// sees the change too.
    pub fn set_credentials(&self, credentials: Credentials) {
        self.credentials.set(credentials);
    }

    // =========================================================================
    // Paging
    // =========================================================================

    /// Fetch one page.
    ///
    /// With `reset`, the fetched page replaces everything accumulated so far
    /// and the cursor restarts from it. Without, the page is appended and must
    /// come after the current cursor.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::OutOfOrder` for an append at or before the
    /// cursor, or `ListingError::Api` if the request fails. State is left
    /// untouched in both cases.
    pub async fn load_page(&self, page: u32, reset: bool) -> Result<LoadOutcome, ListingError> {
        let ticket = {
            let mut state = self.lock();
            if state.in_flight {
                debug!(page, "Page request already in flight");
                return Ok(LoadOutcome::InFlight);
            }
            if !reset && page <= state.page {
                return Err(ListingError::OutOfOrder {
                    requested: page,
                    current: state.page,
                });
            }
            self.admit(&mut state, page, reset)
        };

        self.run(ticket).await
    }

    /// Fetch the page after the cursor and append it.
    ///
    /// Does nothing while a page request is in flight or after the last page.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::Api` if the request fails; the cursor does not
    /// advance, so the next call retries the same page.
    pub async fn load_more(&self) -> Result<LoadOutcome, ListingError> {
        let ticket = {
            let mut state = self.lock();
            if state.in_flight {
                debug!("Page request already in flight");
                return Ok(LoadOutcome::InFlight);
            }
            if !state.has_more {
                return Ok(LoadOutcome::Exhausted);
            }
            let next = state.page.saturating_add(1);
            self.admit(&mut state, next, false)
        };

        self.run(ticket).await
    }

    /// Reload from the first page, replacing accumulated items.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::Api` if the request fails.
    pub async fn refresh(&self) -> Result<LoadOutcome, ListingError> {
        self.load_page(1, true).await
    }

    fn admit(&self, state: &mut ListingState, page: u32, reset: bool) -> PageTicket {
        state.in_flight = true;
        PageTicket {
            page,
            reset,
            generation: state.page_generation,
            credentials: self.credentials.get(),
        }
    }

    #[instrument(skip(self, ticket), fields(page = ticket.page, reset = ticket.reset))]
    async fn run(&self, ticket: PageTicket) -> Result<LoadOutcome, ListingError> {
        let _guard = InFlightGuard { state: &self.state };

        let fetched = self
            .catalog
            .list_businesses(&ticket.credentials, ticket.page, self.config.page_size)
            .await
            .inspect_err(|e| {
                error!(error = %e, "Failed to load business page");
            })?;

        let mut state = self.lock();
        if state.page_generation != ticket.generation {
            debug!("Listing was reset while the page loaded, dropping it");
            return Ok(LoadOutcome::Stale);
        }

        if ticket.reset {
            state.items.clone_from(&fetched.items);
        } else {
            state.items.extend(fetched.items.iter().cloned());
        }
        state.page = fetched.page;
        state.total = fetched.total;
        state.has_more = !fetched.is_last();

        debug!(
            accumulated = state.items.len(),
            has_more = state.has_more,
            "Applied business page"
        );
        Ok(LoadOutcome::Loaded(fetched))
    }

    // =========================================================================
    // Filtering
    // =========================================================================

    /// Apply a search and category filter.
    ///
    /// An empty query with the "All" category shows the accumulated pages
    /// again without a network call. Anything else runs a remote search whose
    /// results replace the visible set.
    ///
    /// # Errors
    ///
    /// Returns `ListingError::Api` if the search fails; the previous filter
    /// and visible set are kept.
    #[instrument(skip(self))]
    pub async fn apply_filter(&self, filter: FilterState) -> Result<FilterOutcome, ListingError> {
        let (generation, credentials) = {
            let mut state = self.lock();
            state.filter_generation += 1;

            if filter.is_unfiltered() {
                state.filter = filter;
                state.filtered = None;
                return Ok(FilterOutcome::Cleared);
            }

            (state.filter_generation, self.credentials.get())
        };

        let results = self
            .catalog
            .search_businesses(&credentials, &filter, self.config.search_limit)
            .await
            .inspect_err(|e| {
                error!(error = %e, "Business search failed");
            })?;

        let mut state = self.lock();
        if state.filter_generation != generation {
            debug!("A newer filter was applied, dropping search results");
            return Ok(FilterOutcome::Stale);
        }

        let count = results.len();
        info!(count, "Search returned businesses");
        state.filter = filter;
        state.filtered = Some(results);
        Ok(FilterOutcome::Searched(count))
    }

    /// Drop everything and return to the initial state, keeping credentials.
    ///
    /// Responses to requests started before the clear are discarded.
    pub fn clear(&self) {
        let mut state = self.lock();
        let fresh = ListingState {
            in_flight: state.in_flight,
            page_generation: state.page_generation + 1,
            filter_generation: state.filter_generation + 1,
            ..ListingState::default()
        };
        *state = fresh;
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Businesses to display: search results while filtered, otherwise the
    /// accumulated pages.
    #[must_use]
    pub fn visible(&self) -> Vec<Business> {
        let state = self.lock();
        state
            .filtered
            .as_ref()
            .unwrap_or(&state.items)
            .clone()
    }

    /// Businesses accumulated from paging, in page-then-item order.
    #[must_use]
    pub fn items(&self) -> Vec<Business> {
        self.lock().items.clone()
    }

    /// Whether `load_more` may fetch another page.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    /// Whether a page request is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().in_flight
    }

    /// Current filter.
    #[must_use]
    pub fn filter(&self) -> FilterState {
        self.lock().filter.clone()
    }

    /// Everything a listing screen renders, read under one lock.
    #[must_use]
    pub fn snapshot(&self) -> ListingSnapshot {
        let state = self.lock();
        ListingSnapshot {
            visible: state.filtered.as_ref().unwrap_or(&state.items).clone(),
            accumulated_len: state.items.len(),
            total: state.total,
            page: state.page,
            has_more: state.has_more,
            loading: state.in_flight,
            filter: state.filter.clone(),
        }
    }
}
