use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use popcorn_core::{
    DetailSession, Key, MemoryKeyValueStore, Popcorn, SearchSession, WatchedStore, DEFAULT_TITLE,
};
use popcorn_models::{MovieDetail, SearchResultItem, SessionState, UserRating};
use popcorn_sources::{MovieProvider, SourceError};
use tokio_util::sync::CancellationToken;

/// In-process provider with per-key latency and canned answers.
#[derive(Default)]
struct FakeProvider {
    delays: Mutex<HashMap<String, Duration>>,
    results: Mutex<HashMap<String, Vec<SearchResultItem>>>,
    details: Mutex<HashMap<String, MovieDetail>>,
    fail_with_status: Mutex<Option<u16>>,
    calls: AtomicUsize,
    cancelled: AtomicUsize,
}

impl FakeProvider {
    fn delay(&self, key: &str, delay: Duration) {
        self.delays.lock().unwrap().insert(key.to_string(), delay);
    }

    fn results(&self, query: &str, items: Vec<SearchResultItem>) {
        self.results.lock().unwrap().insert(query.to_string(), items);
    }

    fn detail(&self, detail: MovieDetail) {
        self.details.lock().unwrap().insert(detail.id.clone(), detail);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn pause(&self, key: &str, cancel: &CancellationToken) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.delays.lock().unwrap().get(key).copied().unwrap_or_default();
        tokio::select! {
            _ = cancel.cancelled() => {
                self.cancelled.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::Cancelled)
            }
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

#[async_trait]
impl MovieProvider for FakeProvider {
    fn provider_name(&self) -> &str {
        "fake"
    }

    async fn search(
        &self,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResultItem>, SourceError> {
        self.pause(query, cancel).await?;
        if let Some(status) = *self.fail_with_status.lock().unwrap() {
            return Err(SourceError::BadStatus(status));
        }
        self.results
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .ok_or(SourceError::NotFound)
    }

    async fn fetch_detail(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<MovieDetail, SourceError> {
        self.pause(id, cancel).await?;
        self.details
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or(SourceError::NotFound)
    }
}

fn item(id: &str, title: &str) -> SearchResultItem {
    SearchResultItem {
        id: id.to_string(),
        title: title.to_string(),
        year: "2005".to_string(),
        poster_url: "N/A".to_string(),
    }
}

fn detail(id: &str, title: &str, runtime: u32, rating: f64) -> MovieDetail {
    MovieDetail {
        id: id.to_string(),
        title: title.to_string(),
        year: "2005".to_string(),
        poster_url: "N/A".to_string(),
        runtime_minutes: Some(runtime),
        external_rating: Some(rating),
        plot: String::new(),
        release_date: String::new(),
        actors: String::new(),
        director: String::new(),
        genre: String::new(),
    }
}

#[tokio::test]
async fn test_short_queries_never_hit_the_network() {
    let provider = Arc::new(FakeProvider::default());
    let session = SearchSession::new(provider.clone());

    for query in ["", "b", "ba", "ñé"] {
        let mut handle = session.start_search(query);
        assert_eq!(handle.wait().await, SessionState::Success(Vec::new()));
        assert!(session.state().error().is_none());
    }
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_newer_search_supersedes_older() {
    let provider = Arc::new(FakeProvider::default());
    provider.delay("batman", Duration::from_millis(200));
    provider.results("batman", vec![item("tt1", "Batman")]);
    provider.results("superman", vec![item("tt2", "Superman")]);

    let session = SearchSession::new(provider.clone());
    let mut first = session.start_search("batman");
    let mut second = session.start_search("superman");

    assert_eq!(second.wait().await, SessionState::Success(vec![item("tt2", "Superman")]));
    assert_eq!(first.wait().await, SessionState::Idle);

    // Give the old request every chance to land
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(session.state(), SessionState::Success(vec![item("tt2", "Superman")]));
    assert_eq!(session.snapshot().key.as_deref(), Some("superman"));
    assert_eq!(provider.cancelled.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_slow_newer_search_is_not_overwritten_by_fast_older() {
    let provider = Arc::new(FakeProvider::default());
    provider.delay("abc", Duration::from_millis(10));
    provider.delay("abcd", Duration::from_millis(100));
    provider.results("abc", vec![item("tt1", "Abc")]);
    provider.results("abcd", vec![item("tt2", "Abcd")]);

    let session = SearchSession::new(provider.clone());
    let _typed = session.start_search("abc");
    let mut latest = session.start_search("abcd");

    // Loading until the latest settles, never the older result
    let mut rx = session.subscribe();
    let mut seen = Vec::new();
    loop {
        let state = rx.borrow_and_update().state.clone();
        seen.push(state.clone());
        if state.is_settled() {
            break;
        }
        rx.changed().await.unwrap();
    }
    assert!(!seen.contains(&SessionState::Success(vec![item("tt1", "Abc")])));
    assert_eq!(latest.wait().await, SessionState::Success(vec![item("tt2", "Abcd")]));
}

#[tokio::test]
async fn test_short_query_cancels_running_search() {
    let provider = Arc::new(FakeProvider::default());
    provider.delay("batman", Duration::from_millis(200));
    provider.results("batman", vec![item("tt1", "Batman")]);

    let session = SearchSession::new(provider.clone());
    let mut running = session.start_search("batman");
    session.start_search("ba");

    assert_eq!(running.wait().await, SessionState::Idle);
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(session.state(), SessionState::Success(Vec::new()));
}

#[tokio::test]
async fn test_errors_carry_user_messages() {
    let provider = Arc::new(FakeProvider::default());
    let session = SearchSession::new(provider.clone());

    let mut missing = session.start_search("qwertyuiop");
    assert_eq!(missing.wait().await, SessionState::Error("Movie not found".to_string()));

    *provider.fail_with_status.lock().unwrap() = Some(500);
    let mut broken = session.start_search("batman");
    assert_eq!(
        broken.wait().await,
        SessionState::Error("Something went wrong with fetching movies".to_string())
    );
}

#[tokio::test]
async fn test_cancelled_handle_goes_idle_without_error() {
    let provider = Arc::new(FakeProvider::default());
    provider.delay("batman", Duration::from_millis(200));
    provider.results("batman", vec![item("tt1", "Batman")]);

    let session = SearchSession::new(provider.clone());
    let mut handle = session.start_search("batman");
    assert!(handle.cancel());
    assert_eq!(handle.wait().await, SessionState::Idle);

    tokio::time::sleep(Duration::from_millis(250)).await;
    assert_eq!(session.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_stale_detail_never_replaces_newer_selection() {
    let provider = Arc::new(FakeProvider::default());
    provider.delay("ttA", Duration::from_millis(150));
    provider.detail(detail("ttA", "Slow A", 100, 6.0));
    provider.detail(detail("ttB", "Fast B", 90, 7.0));

    let session = DetailSession::new(provider.clone());
    let mut a = session.fetch_detail("ttA");
    let mut b = session.fetch_detail("ttB");

    let loaded = b.wait().await;
    assert_eq!(loaded.value().map(|d| d.title.as_str()), Some("Fast B"));
    assert_eq!(a.wait().await, SessionState::Idle);

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(session.current_id().as_deref(), Some("ttB"));
    assert_eq!(session.state().value().map(|d| d.id.as_str()), Some("ttB"));
}

#[tokio::test]
async fn test_detail_errors_are_visible() {
    let provider = Arc::new(FakeProvider::default());
    let session = DetailSession::new(provider);
    let mut handle = session.fetch_detail("tt404");
    assert_eq!(handle.wait().await, SessionState::Error("Movie not found".to_string()));
}

#[tokio::test]
async fn test_rate_and_add_scenario() {
    let provider = Arc::new(FakeProvider::default());
    provider.results(
        "batman",
        vec![
            item("tt0372784", "Batman Begins"),
            item("tt0468569", "The Dark Knight"),
            item("tt1877830", "The Batman"),
        ],
    );
    provider.detail(detail("tt0468569", "The Dark Knight", 152, 9.0));

    let store = WatchedStore::open(MemoryKeyValueStore::new(), "watchedMovies").unwrap();
    let mut app = Popcorn::new(provider, store, 3);

    let results = app.set_query("batman").wait().await;
    let items = results.value().cloned().unwrap();
    assert_eq!(items.len(), 3);

    let mut handle = app.select_movie(&items[1].id).expect("selected");
    let loaded = handle.wait().await.value().cloned().expect("detail loaded");
    assert!(app.refresh_view());
    assert_eq!(app.title_bar().current(), "Movie | The Dark Knight");
    assert_eq!(app.selected_detail().as_ref(), Some(&loaded));

    let added = app.add_watched(&loaded, UserRating::new(8).unwrap()).unwrap();
    assert!(added);
    assert_eq!(app.selected_id(), None);
    assert_eq!(app.title_bar().current(), DEFAULT_TITLE);

    let watched = app.watched();
    assert_eq!(watched.len(), 1);
    assert_eq!(watched[0].id, "tt0468569");
    assert_eq!(watched[0].user_rating.value(), 8);
    assert_eq!(watched[0].runtime_minutes, Some(152));
    assert_eq!(watched[0].external_rating, Some(9.0));

    let summary = app.summary();
    assert_eq!(summary.count, 1);
    assert_eq!(summary.user_rating_label(), "8.00");
    assert_eq!(summary.external_rating_label(), "9.00");
    assert_eq!(summary.runtime_label(), "152 min");
    assert!(app.is_watched("tt0468569"));
    assert_eq!(app.watched_rating("tt0468569").map(UserRating::value), Some(8));
}

#[tokio::test]
async fn test_selecting_same_movie_toggles_it_off() {
    let provider = Arc::new(FakeProvider::default());
    provider.detail(detail("tt1", "One", 100, 5.0));
    let store = WatchedStore::open(MemoryKeyValueStore::new(), "w").unwrap();
    let mut app = Popcorn::new(provider, store, 3);

    assert!(app.select_movie("tt1").is_some());
    assert_eq!(app.selected_id(), Some("tt1"));
    assert!(app.select_movie("tt1").is_none());
    assert_eq!(app.selected_id(), None);
    assert_eq!(app.detail().state(), SessionState::Idle);
}

#[tokio::test]
async fn test_escape_closes_movie_and_restores_title() {
    let provider = Arc::new(FakeProvider::default());
    provider.detail(detail("tt1", "One", 100, 5.0));
    let store = WatchedStore::open(MemoryKeyValueStore::new(), "w").unwrap();
    let mut app = Popcorn::new(provider, store, 3);

    app.select_movie("tt1").unwrap().wait().await;
    app.refresh_view();
    assert_eq!(app.title_bar().current(), "Movie | One");
    assert_eq!(app.keys().listener_count(), 1);

    app.keys().press(Key::Escape);
    assert!(!app.refresh_view());
    assert_eq!(app.selected_id(), None);
    assert_eq!(app.title_bar().current(), DEFAULT_TITLE);
    assert_eq!(app.keys().listener_count(), 0);
}

#[tokio::test]
async fn test_new_search_closes_open_movie_but_short_typing_does_not() {
    let provider = Arc::new(FakeProvider::default());
    provider.detail(detail("tt1", "One", 100, 5.0));
    provider.results("other", vec![]);
    let store = WatchedStore::open(MemoryKeyValueStore::new(), "w").unwrap();
    let mut app = Popcorn::new(provider, store, 3);

    app.select_movie("tt1");
    app.set_query("ot");
    assert_eq!(app.selected_id(), Some("tt1"));

    app.set_query("other");
    assert_eq!(app.selected_id(), None);
}

#[tokio::test]
async fn test_duplicate_add_through_app_is_refused() {
    let provider = Arc::new(FakeProvider::default());
    let store = WatchedStore::open(MemoryKeyValueStore::new(), "w").unwrap();
    let mut app = Popcorn::new(provider, store, 3);
    let movie = detail("tt1", "One", 100, 5.0);

    assert!(app.add_watched(&movie, UserRating::new(5).unwrap()).unwrap());
    assert!(!app.add_watched(&movie, UserRating::new(9).unwrap()).unwrap());
    assert_eq!(app.watched().len(), 1);
    assert_eq!(app.watched_rating("tt1").map(UserRating::value), Some(5));

    assert!(app.remove_watched("tt1").unwrap());
    assert!(app.watched().is_empty());
}
