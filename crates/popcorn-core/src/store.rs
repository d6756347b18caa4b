use popcorn_models::{UserRating, WatchedEntry};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize watched list: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
}

/// Durable string-keyed storage, the local-storage equivalent.
pub trait KeyValueStore: Send + Sync {
    /// A missing key is `Ok(None)`, never an error.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One `<key>.json` file per key inside a directory.
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path)(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, value).map_err(io_error(&temp_path))?;
        std::fs::rename(&temp_path, &path).map_err(io_error(&path))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path)(e)),
        }
    }
}

/// Process-lifetime storage for tests and throwaway sessions.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self.values.lock().unwrap_or_else(|p| p.into_inner());
        values.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }
}

/// Owner of the watched list.
///
/// The whole list lives under one key and is re-serialized in full after
/// every mutation. Ids are unique; order is insertion order.
pub struct WatchedStore<S: KeyValueStore> {
    backend: S,
    key: String,
    entries: Vec<WatchedEntry>,
}

impl<S: KeyValueStore> WatchedStore<S> {
    pub fn open(backend: S, key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        let mut store = Self {
            backend,
            key,
            entries: Vec::new(),
        };
        store.entries = store.load()?;
        Ok(store)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the persisted list. Missing data is an empty list; unreadable
    /// data is backed up under `<key>.bak` and treated as empty.
    pub fn load(&self) -> Result<Vec<WatchedEntry>, StoreError> {
        let Some(raw) = self.backend.get(&self.key)? else {
            debug!(key = %self.key, "No watched list stored yet");
            return Ok(Vec::new());
        };

        // The web app wrote `null` before anything was added
        if raw.trim().is_empty() || raw.trim() == "null" {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<WatchedEntry>>(&raw) {
            Ok(entries) => {
                let entries = dedup_by_id(entries);
                info!(key = %self.key, count = entries.len(), "Loaded watched list");
                Ok(entries)
            }
            Err(e) => {
                let backup_key = format!("{}.bak", self.key);
                if let Err(backup_err) = self.backend.set(&backup_key, &raw) {
                    warn!(
                        "Failed to back up unreadable watched list: {}. Starting with an empty list.",
                        backup_err
                    );
                } else {
                    warn!(
                        "Watched list unreadable (error: {}). Backed up to '{}' and starting with an empty list.",
                        e, backup_key
                    );
                }
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the persisted list with the in-memory one.
    pub fn save(&self) -> Result<(), StoreError> {
        self.persist(&self.entries)
    }

    /// Write `entries` as the stored list, then make them current. On failure
    /// the in-memory list keeps matching what is on disk.
    fn commit(&mut self, entries: Vec<WatchedEntry>) -> Result<(), StoreError> {
        self.persist(&entries)?;
        self.entries = entries;
        Ok(())
    }

    fn persist(&self, entries: &[WatchedEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_string(entries)?;
        self.backend.set(&self.key, &json)?;
        debug!(key = %self.key, count = entries.len(), "Saved watched list");
        Ok(())
    }

    pub fn entries(&self) -> &[WatchedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&WatchedEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn user_rating(&self, id: &str) -> Option<UserRating> {
        self.get(id).map(|entry| entry.user_rating)
    }

    /// Append `entry` unless its id is already present. Returns whether it was added.
    pub fn add(&mut self, entry: WatchedEntry) -> Result<bool, StoreError> {
        if self.contains(&entry.id) {
            debug!(id = %entry.id, "Already in watched list, not adding");
            return Ok(false);
        }
        info!(id = %entry.id, title = %entry.title, rating = entry.user_rating.value(), "Adding to watched list");
        let mut entries = self.entries.clone();
        entries.push(entry);
        self.commit(entries)?;
        Ok(true)
    }

    /// Remove the entry with `id`. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        if !self.contains(id) {
            return Ok(false);
        }
        let entries: Vec<WatchedEntry> = self
            .entries
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        self.commit(entries)?;
        info!(id, "Removed from watched list");
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<usize, StoreError> {
        let removed = self.entries.len();
        self.commit(Vec::new())?;
        Ok(removed)
    }
}

/// Keep the first occurrence of each id; older web-app data may hold duplicates.
fn dedup_by_id(entries: Vec<WatchedEntry>) -> Vec<WatchedEntry> {
    let mut seen = std::collections::HashSet::new();
    let before = entries.len();
    let unique: Vec<WatchedEntry> = entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id.clone()))
        .collect();
    if unique.len() != before {
        warn!(dropped = before - unique.len(), "Dropped duplicate watched entries");
    }
    unique
}
