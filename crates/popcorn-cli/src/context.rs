use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_config::{Config, CredentialStore, PathManager, API_KEY_ENV};
use popcorn_core::{FileKeyValueStore, Popcorn, WatchedStore};
use popcorn_sources::{MovieProvider, OmdbClient};
use std::sync::Arc;
use tracing::debug;

/// Paths and configuration shared by every command.
pub struct AppContext {
    pub paths: PathManager,
    pub config: Config,
}

impl AppContext {
    pub fn load() -> Result<Self> {
        let paths = PathManager::default();
        let config_file = paths.config_file();
        let config = Config::load_or_default(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
        config
            .validate()
            .map_err(|e| eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
        debug!(config_file = %config_file.display(), "Configuration loaded");
        Ok(Self { paths, config })
    }

    pub fn credentials(&self) -> Result<CredentialStore> {
        let credentials_file = self.paths.credentials_file();
        let mut store = CredentialStore::new(credentials_file.clone());
        store
            .load()
            .map_err(|e| eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
        Ok(store)
    }

    pub fn provider(&self) -> Result<Arc<dyn MovieProvider>> {
        let api_key = self.credentials()?.resolve_omdb_api_key().ok_or_else(|| {
            eyre!(
                "No OMDb API key configured. Run `popcorn config api-key` or set {}",
                API_KEY_ENV
            )
        })?;

        let client = OmdbClient::new(&self.config.omdb.base_url, api_key, self.config.request_timeout())
            .map_err(|e| eyre!("Failed to create HTTP client: {:?}", e))?;
        Ok(Arc::new(client))
    }

    pub fn watched_store(&self) -> Result<WatchedStore<FileKeyValueStore>> {
        let backend = FileKeyValueStore::new(self.paths.data_dir());
        debug!(dir = %backend.dir().display(), key = %self.config.storage.watched_key, "Opening watched list");
        WatchedStore::open(backend, self.config.storage.watched_key.clone())
            .map_err(|e| eyre!("Failed to open watched list: {}", e))
    }

    pub fn app(&self) -> Result<Popcorn<FileKeyValueStore>> {
        Ok(Popcorn::new(
            self.provider()?,
            self.watched_store()?,
            self.config.search.min_query_len,
        ))
    }
}
