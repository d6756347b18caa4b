use popcorn_models::SessionState;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Published state of a session, tagged with the request it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot<T> {
    /// Bumped on every new request; a result only commits under its own generation.
    pub generation: u64,
    /// Query text or movie id the state was requested for.
    pub key: Option<String>,
    pub state: SessionState<T>,
}

/// Single-request slot shared by a session and its spawned fetch task.
pub(crate) struct Slot<T> {
    tx: watch::Sender<Snapshot<T>>,
    inflight: Mutex<Option<Inflight>>,
}

struct Inflight {
    generation: u64,
    token: CancellationToken,
}

impl<T> Slot<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot {
            generation: 0,
            key: None,
            state: SessionState::Idle,
        });
        Self {
            tx,
            inflight: Mutex::new(None),
        }
    }

    fn inflight(&self) -> MutexGuard<'_, Option<Inflight>> {
        self.inflight.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn advance(&self, key: Option<String>, state: SessionState<T>) -> u64 {
        let mut generation = 0;
        self.tx.send_modify(|snapshot| {
            snapshot.generation += 1;
            snapshot.key = key;
            snapshot.state = state;
            generation = snapshot.generation;
        });
        generation
    }

    /// Supersede whatever is running and enter `Loading` for `key`.
    pub(crate) fn begin(&self, key: String) -> (u64, CancellationToken) {
        let token = CancellationToken::new();
        let mut inflight = self.inflight();
        if let Some(previous) = inflight.take() {
            previous.token.cancel();
        }
        let generation = self.advance(Some(key), SessionState::Loading);
        *inflight = Some(Inflight {
            generation,
            token: token.clone(),
        });
        (generation, token)
    }

    /// Supersede whatever is running and settle immediately, without a request.
    pub(crate) fn settle(&self, key: Option<String>, state: SessionState<T>) -> u64 {
        let mut inflight = self.inflight();
        if let Some(previous) = inflight.take() {
            previous.token.cancel();
        }
        self.advance(key, state)
    }

    /// Publish a finished result. Returns false, leaving state untouched, when
    /// the request was cancelled or a newer one has started.
    pub(crate) fn commit(
        &self,
        generation: u64,
        key: &str,
        token: &CancellationToken,
        state: SessionState<T>,
    ) -> bool {
        let committed = self.tx.send_if_modified(|snapshot| {
            if token.is_cancelled()
                || snapshot.generation != generation
                || snapshot.key.as_deref() != Some(key)
            {
                return false;
            }
            snapshot.state = state;
            true
        });

        if committed {
            let mut inflight = self.inflight();
            if inflight.as_ref().is_some_and(|current| current.generation == generation) {
                inflight.take();
            }
        }
        committed
    }

    /// Cancel `generation` if it is still the current request, back to `Idle`.
    pub(crate) fn cancel(&self, generation: u64) -> bool {
        let mut inflight = self.inflight();
        let cancelled = self.tx.send_if_modified(|snapshot| {
            if snapshot.generation != generation || !snapshot.state.is_loading() {
                return false;
            }
            snapshot.state = SessionState::Idle;
            true
        });
        if cancelled {
            if let Some(current) = inflight.take() {
                current.token.cancel();
            }
        }
        cancelled
    }

    /// Cancel anything in flight without touching published state.
    pub(crate) fn abort(&self) {
        if let Some(current) = self.inflight().take() {
            current.token.cancel();
        }
    }

    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.tx.subscribe()
    }
}

/// Caller's view of one request.
///
/// The handle never observes another request's outcome: once superseded it
/// reports `Idle`.
pub struct SessionHandle<T> {
    generation: u64,
    slot: Arc<Slot<T>>,
    rx: watch::Receiver<Snapshot<T>>,
}

impl<T> SessionHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(generation: u64, slot: Arc<Slot<T>>) -> Self {
        let rx = slot.subscribe();
        Self {
            generation,
            slot,
            rx,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once a newer request of the same kind has started.
    pub fn is_superseded(&self) -> bool {
        self.rx.borrow().generation != self.generation
    }

    pub fn state(&self) -> SessionState<T> {
        let snapshot = self.rx.borrow();
        if snapshot.generation != self.generation {
            return SessionState::Idle;
        }
        snapshot.state.clone()
    }

    /// Wait for this request to leave `Loading`.
    pub async fn wait(&mut self) -> SessionState<T> {
        loop {
            {
                let snapshot = self.rx.borrow_and_update();
                if snapshot.generation != self.generation {
                    return SessionState::Idle;
                }
                if !snapshot.state.is_loading() {
                    return snapshot.state.clone();
                }
            }
            if self.rx.changed().await.is_err() {
                return SessionState::Idle;
            }
        }
    }

    /// Cancel this request. Has no effect once it settled or was superseded.
    pub fn cancel(&self) -> bool {
        self.slot.cancel(self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_cancels_previous_token() {
        let slot: Slot<u32> = Slot::new();
        let (first_gen, first) = slot.begin("a".to_string());
        let (second_gen, second) = slot.begin("b".to_string());

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(second_gen > first_gen);
        assert_eq!(slot.snapshot().state, SessionState::Loading);
    }

    #[test]
    fn test_commit_rejects_stale_generation() {
        let slot: Slot<u32> = Slot::new();
        let (first_gen, first) = slot.begin("a".to_string());
        let (second_gen, second) = slot.begin("b".to_string());

        assert!(!slot.commit(first_gen, "a", &first, SessionState::Success(1)));
        assert_eq!(slot.snapshot().state, SessionState::Loading);

        assert!(slot.commit(second_gen, "b", &second, SessionState::Success(2)));
        assert_eq!(slot.snapshot().state, SessionState::Success(2));
        assert_eq!(slot.snapshot().key.as_deref(), Some("b"));
    }

    #[test]
    fn test_commit_rejects_mismatched_key() {
        let slot: Slot<u32> = Slot::new();
        let (generation, token) = slot.begin("tt1".to_string());
        assert!(!slot.commit(generation, "tt2", &token, SessionState::Success(7)));
        assert!(slot.snapshot().state.is_loading());
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let slot: Slot<u32> = Slot::new();
        let (generation, token) = slot.begin("a".to_string());
        assert!(slot.cancel(generation));
        assert!(token.is_cancelled());
        assert_eq!(slot.snapshot().state, SessionState::Idle);

        // Nothing left to commit into
        assert!(!slot.commit(generation, "a", &token, SessionState::Success(1)));
        assert!(!slot.cancel(generation));
    }

    #[test]
    fn test_settle_supersedes_inflight() {
        let slot: Slot<u32> = Slot::new();
        let (_, token) = slot.begin("abc".to_string());
        slot.settle(Some("ab".to_string()), SessionState::Success(0));
        assert!(token.is_cancelled());
        assert_eq!(slot.snapshot().state, SessionState::Success(0));
    }

    #[tokio::test]
    async fn test_handle_reports_idle_when_superseded() {
        let slot = Arc::new(Slot::<u32>::new());
        let (first_gen, _first) = slot.begin("a".to_string());
        let mut handle = SessionHandle::new(first_gen, Arc::clone(&slot));
        assert_eq!(handle.state(), SessionState::Loading);

        let (second_gen, second) = slot.begin("b".to_string());
        slot.commit(second_gen, "b", &second, SessionState::Success(9));

        assert!(handle.is_superseded());
        assert_eq!(handle.wait().await, SessionState::Idle);
    }
}
