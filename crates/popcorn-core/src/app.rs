use crate::detail::DetailSession;
use crate::search::SearchSession;
use crate::session::SessionHandle;
use crate::store::{KeyValueStore, StoreError, WatchedStore};
use crate::summary::WatchedSummary;
use crate::view::{DetailView, KeyBus, TitleBar};
use popcorn_models::{MovieDetail, SearchResultItem, SessionState, UserRating, WatchedEntry};
use popcorn_sources::MovieProvider;
use std::sync::Arc;
use tracing::debug;

/// Application state behind any front end: one search, at most one open
/// movie, and the watched list.
pub struct Popcorn<S: KeyValueStore> {
    search: SearchSession,
    detail: DetailSession,
    watched: WatchedStore<S>,
    title_bar: TitleBar,
    keys: KeyBus,
    view: Option<DetailView>,
}

impl<S: KeyValueStore> Popcorn<S> {
    pub fn new(provider: Arc<dyn MovieProvider>, watched: WatchedStore<S>, min_query_len: usize) -> Self {
        Self {
            search: SearchSession::with_min_query_len(Arc::clone(&provider), min_query_len),
            detail: DetailSession::new(provider),
            watched,
            title_bar: TitleBar::new(),
            keys: KeyBus::new(),
            view: None,
        }
    }

    pub fn search(&self) -> &SearchSession {
        &self.search
    }

    pub fn detail(&self) -> &DetailSession {
        &self.detail
    }

    pub fn title_bar(&self) -> &TitleBar {
        &self.title_bar
    }

    pub fn keys(&self) -> &KeyBus {
        &self.keys
    }

    /// New query text. A query long enough to search also closes the open movie.
    pub fn set_query(&mut self, query: &str) -> SessionHandle<Vec<SearchResultItem>> {
        if self.search.is_searchable(query) {
            self.close_movie();
        }
        self.search.start_search(query)
    }

    /// Clicking a movie. Clicking the open one again closes it.
    pub fn select_movie(&mut self, id: &str) -> Option<SessionHandle<MovieDetail>> {
        if self.selected_id() == Some(id) {
            self.close_movie();
            return None;
        }

        self.view = Some(DetailView::open(id, &self.title_bar, &self.keys));
        Some(self.detail.fetch_detail(id))
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.view.as_ref().map(DetailView::id)
    }

    pub fn close_movie(&mut self) {
        if self.view.take().is_some() {
            self.detail.clear();
        }
    }

    /// Apply pending view effects: an escape key closes the movie, loaded
    /// details title the window. Returns false if the movie was closed.
    pub fn refresh_view(&mut self) -> bool {
        let Some(view) = self.view.as_mut() else {
            return false;
        };

        if view.escape_pressed() {
            debug!(id = view.id(), "Escape pressed, closing movie");
            self.close_movie();
            return false;
        }

        let snapshot = self.detail.snapshot();
        if let SessionState::Success(detail) = &snapshot.state {
            if snapshot.key.as_deref() == Some(view.id()) {
                view.show_title(&detail.title);
            }
        }
        true
    }

    /// Details of the open movie, if loaded.
    pub fn selected_detail(&self) -> Option<MovieDetail> {
        let id = self.selected_id()?;
        let snapshot = self.detail.snapshot();
        match snapshot.state {
            SessionState::Success(detail) if snapshot.key.as_deref() == Some(id) => Some(detail),
            _ => None,
        }
    }

    /// Rate and keep `detail`, then close it. Returns false if it was already watched.
    pub fn add_watched(&mut self, detail: &MovieDetail, rating: UserRating) -> Result<bool, StoreError> {
        let added = self.watched.add(WatchedEntry::from_detail(detail, rating))?;
        self.close_movie();
        Ok(added)
    }

    pub fn remove_watched(&mut self, id: &str) -> Result<bool, StoreError> {
        self.watched.remove(id)
    }

    pub fn is_watched(&self, id: &str) -> bool {
        self.watched.contains(id)
    }

    pub fn watched_rating(&self, id: &str) -> Option<UserRating> {
        self.watched.user_rating(id)
    }

    pub fn watched(&self) -> &[WatchedEntry] {
        self.watched.entries()
    }

    pub fn summary(&self) -> WatchedSummary {
        WatchedSummary::from_entries(self.watched.entries())
    }
}
