pub mod app;
pub mod detail;
pub mod search;
pub mod session;
pub mod store;
pub mod summary;
pub mod view;

pub use app::Popcorn;
pub use detail::DetailSession;
pub use search::SearchSession;
pub use session::{SessionHandle, Snapshot};
pub use store::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StoreError, WatchedStore};
pub use summary::WatchedSummary;
pub use view::{DetailView, Key, KeyBus, TitleBar, DEFAULT_TITLE};
