use crate::session::{SessionHandle, Slot, Snapshot};
use popcorn_models::{MovieDetail, SessionState};
use popcorn_sources::MovieProvider;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};

/// Detail lookup for the selected movie.
///
/// Requests are tagged with the id they were issued for. A response is only
/// applied while that id is still the selection, so a slow answer for one
/// movie can never replace the details of the next.
pub struct DetailSession {
    provider: Arc<dyn MovieProvider>,
    slot: Arc<Slot<MovieDetail>>,
}

impl DetailSession {
    pub fn new(provider: Arc<dyn MovieProvider>) -> Self {
        Self {
            provider,
            slot: Arc::new(Slot::new()),
        }
    }

    /// Must be called inside a Tokio runtime.
    pub fn fetch_detail(&self, id: &str) -> SessionHandle<MovieDetail> {
        let (generation, token) = self.slot.begin(id.to_string());
        let handle = SessionHandle::new(generation, Arc::clone(&self.slot));

        let provider = Arc::clone(&self.provider);
        let slot = Arc::clone(&self.slot);
        let id = id.to_string();
        tokio::spawn(async move {
            debug!(provider = provider.provider_name(), id = %id, generation, "Detail fetch started");
            let state = match provider.fetch_detail(&id, &token).await {
                Ok(detail) => SessionState::Success(detail),
                Err(e) if e.is_cancelled() => {
                    debug!(id = %id, generation, "Detail fetch cancelled");
                    return;
                }
                Err(e) => {
                    error!(id = %id, error = ?e, "Failed to fetch movie details: {}", e);
                    SessionState::Error(e.to_string())
                }
            };

            if !slot.commit(generation, &id, &token, state) {
                debug!(id = %id, generation, "Discarding stale detail response");
            }
        });

        handle
    }

    /// Drop the current selection, cancelling its request.
    pub fn clear(&self) {
        self.slot.settle(None, SessionState::Idle);
    }

    /// Id the current state belongs to.
    pub fn current_id(&self) -> Option<String> {
        self.slot.snapshot().key
    }

    pub fn state(&self) -> SessionState<MovieDetail> {
        self.slot.snapshot().state
    }

    pub fn snapshot(&self) -> Snapshot<MovieDetail> {
        self.slot.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<MovieDetail>> {
        self.slot.subscribe()
    }
}

impl Drop for DetailSession {
    fn drop(&mut self) {
        self.slot.abort();
    }
}
