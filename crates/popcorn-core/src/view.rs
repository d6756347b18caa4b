use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::debug;

pub const DEFAULT_TITLE: &str = "usePopcorn";

const KEY_BUS_CAPACITY: usize = 16;

/// The window title, observable by whatever renders it.
#[derive(Clone)]
pub struct TitleBar {
    tx: Arc<watch::Sender<String>>,
}

impl TitleBar {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(DEFAULT_TITLE.to_string());
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn set(&self, title: impl Into<String>) {
        let title = title.into();
        self.tx.send_if_modified(|current| {
            if *current == title {
                return false;
            }
            *current = title;
            true
        });
    }

    pub fn reset(&self) {
        self.set(DEFAULT_TITLE);
    }
}

impl Default for TitleBar {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
}

/// Keyboard events fanned out to whichever views are listening.
#[derive(Clone)]
pub struct KeyBus {
    tx: broadcast::Sender<Key>,
}

impl KeyBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(KEY_BUS_CAPACITY);
        Self { tx }
    }

    /// Returns how many listeners received the key.
    pub fn press(&self, key: Key) -> usize {
        self.tx.send(key).unwrap_or(0)
    }

    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn subscribe(&self) -> broadcast::Receiver<Key> {
        self.tx.subscribe()
    }
}

impl Default for KeyBus {
    fn default() -> Self {
        Self::new()
    }
}

/// An open movie detail pane.
///
/// Opening it subscribes to the escape key; once the movie title is known the
/// window title shows it. Dropping the view, on any path, unsubscribes and
/// puts the default title back.
pub struct DetailView {
    id: String,
    keys: broadcast::Receiver<Key>,
    title_bar: TitleBar,
    titled: bool,
}

impl DetailView {
    pub fn open(id: impl Into<String>, title_bar: &TitleBar, keys: &KeyBus) -> Self {
        let id = id.into();
        debug!(id = %id, "Opening detail view");
        Self {
            id,
            keys: keys.subscribe(),
            title_bar: title_bar.clone(),
            titled: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn show_title(&mut self, movie_title: &str) {
        if movie_title.is_empty() {
            return;
        }
        self.title_bar.set(format!("Movie | {}", movie_title));
        self.titled = true;
    }

    /// Drain pending keys without waiting. True if escape was among them.
    pub fn escape_pressed(&mut self) -> bool {
        let mut escape = false;
        loop {
            match self.keys.try_recv() {
                Ok(Key::Escape) => escape = true,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        escape
    }

    /// Resolve on the next escape key. Pending forever if the bus is gone.
    pub async fn wait_for_escape(&mut self) {
        loop {
            match self.keys.recv().await {
                Ok(Key::Escape) => return,
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
            }
        }
    }
}

impl Drop for DetailView {
    fn drop(&mut self) {
        debug!(id = %self.id, "Closing detail view");
        if self.titled {
            self.title_bar.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_follows_view_lifetime() {
        let title_bar = TitleBar::new();
        let keys = KeyBus::new();
        assert_eq!(title_bar.current(), DEFAULT_TITLE);

        {
            let mut view = DetailView::open("tt1", &title_bar, &keys);
            assert_eq!(title_bar.current(), DEFAULT_TITLE);
            view.show_title("Batman Begins");
            assert_eq!(title_bar.current(), "Movie | Batman Begins");
        }

        assert_eq!(title_bar.current(), DEFAULT_TITLE);
    }

    #[test]
    fn test_empty_title_ignored() {
        let title_bar = TitleBar::new();
        let keys = KeyBus::new();
        let mut view = DetailView::open("tt1", &title_bar, &keys);
        view.show_title("");
        assert_eq!(title_bar.current(), DEFAULT_TITLE);
    }

    #[test]
    fn test_subscription_scoped_to_view() {
        let title_bar = TitleBar::new();
        let keys = KeyBus::new();
        assert_eq!(keys.listener_count(), 0);

        let mut view = DetailView::open("tt1", &title_bar, &keys);
        assert_eq!(keys.listener_count(), 1);

        assert!(!view.escape_pressed());
        keys.press(Key::Escape);
        assert!(view.escape_pressed());

        drop(view);
        assert_eq!(keys.listener_count(), 0);
        assert_eq!(keys.press(Key::Escape), 0);
    }

    #[tokio::test]
    async fn test_wait_for_escape() {
        let title_bar = TitleBar::new();
        let keys = KeyBus::new();
        let mut view = DetailView::open("tt1", &title_bar, &keys);

        keys.press(Key::Escape);
        tokio::time::timeout(std::time::Duration::from_secs(1), view.wait_for_escape())
            .await
            .expect("escape delivered");
    }
}
