use crate::session::{SessionHandle, Slot, Snapshot};
use popcorn_models::{SearchResultItem, SessionState};
use popcorn_sources::MovieProvider;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

/// Title search where the newest query always wins.
///
/// Every `start_search` cancels the request before it; a cancelled or
/// superseded request never publishes a result.
pub struct SearchSession {
    provider: Arc<dyn MovieProvider>,
    min_query_len: usize,
    slot: Arc<Slot<Vec<SearchResultItem>>>,
}

impl SearchSession {
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        Self::with_min_query_len(provider, DEFAULT_MIN_QUERY_LEN)
    }

    pub fn with_min_query_len(provider: Arc<dyn MovieProvider>, min_query_len: usize) -> Self {
        Self {
            provider,
            min_query_len,
            slot: Arc::new(Slot::new()),
        }
    }

    pub fn min_query_len(&self) -> usize {
        self.min_query_len
    }

    /// Whether `query` is long enough to hit the network.
    pub fn is_searchable(&self, query: &str) -> bool {
        query.chars().count() >= self.min_query_len
    }

    /// Must be called inside a Tokio runtime.
    pub fn start_search(&self, query: &str) -> SessionHandle<Vec<SearchResultItem>> {
        if !self.is_searchable(query) {
            debug!(query, "Query too short, skipping search");
            let generation = self
                .slot
                .settle(Some(query.to_string()), SessionState::Success(Vec::new()));
            return SessionHandle::new(generation, Arc::clone(&self.slot));
        }

        let (generation, token) = self.slot.begin(query.to_string());
        let handle = SessionHandle::new(generation, Arc::clone(&self.slot));

        let provider = Arc::clone(&self.provider);
        let slot = Arc::clone(&self.slot);
        let query = query.to_string();
        tokio::spawn(async move {
            debug!(provider = provider.provider_name(), query = %query, generation, "Search started");
            let state = match provider.search(&query, &token).await {
                Ok(items) => SessionState::Success(items),
                Err(e) if e.is_cancelled() => {
                    debug!(query = %query, generation, "Search cancelled");
                    return;
                }
                Err(e) => {
                    warn!(query = %query, error = ?e, "Search failed: {}", e);
                    SessionState::Error(e.to_string())
                }
            };

            if !slot.commit(generation, &query, &token, state) {
                debug!(query = %query, generation, "Discarding superseded search result");
            }
        });

        handle
    }

    /// Cancel any running search and go back to `Idle`.
    pub fn reset(&self) {
        self.slot.settle(None, SessionState::Idle);
    }

    pub fn state(&self) -> SessionState<Vec<SearchResultItem>> {
        self.slot.snapshot().state
    }

    pub fn snapshot(&self) -> Snapshot<Vec<SearchResultItem>> {
        self.slot.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<Vec<SearchResultItem>>> {
        self.slot.subscribe()
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.slot.abort();
    }
}
