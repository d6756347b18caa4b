use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_OMDB_BASE_URL: &str = "https://www.omdbapi.com";
pub const DEFAULT_WATCHED_KEY: &str = "watchedMovies";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OmdbConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Upper bound for a single request; the web app had none
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Queries shorter than this never reach the network
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_watched_key")]
    pub watched_key: String,
}

fn default_base_url() -> String {
    DEFAULT_OMDB_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_min_query_len() -> usize {
    3
}

fn default_watched_key() -> String {
    DEFAULT_WATCHED_KEY.to_string()
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_query_len: default_min_query_len(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            watched_key: default_watched_key(),
        }
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if present, defaults otherwise.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let base_url = self.omdb.base_url.trim();
        if base_url.is_empty() {
            return Err(anyhow::anyhow!("omdb.base_url cannot be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("omdb.base_url must start with http:// or https://"));
        }
        if self.omdb.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("omdb.request_timeout_secs must be greater than zero"));
        }
        if self.search.min_query_len == 0 {
            return Err(anyhow::anyhow!("search.min_query_len must be at least 1"));
        }
        if self.storage.watched_key.trim().is_empty() {
            return Err(anyhow::anyhow!("storage.watched_key cannot be empty"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.omdb.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let config = Config {
            omdb: OmdbConfig {
                base_url: "http://localhost:8080".to_string(),
                request_timeout_secs: 3,
            },
            search: SearchConfig { min_query_len: 2 },
            storage: StorageConfig::default(),
        };

        config.save_to_file(file.path()).unwrap();

        let loaded = Config::load_from_file(file.path()).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.storage.watched_key, "watchedMovies");
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: Config = toml::from_str("[search]\nmin_query_len = 4\n").unwrap();
        assert_eq!(config.search.min_query_len, 4);
        assert_eq!(config.omdb.base_url, DEFAULT_OMDB_BASE_URL);
        assert_eq!(config.omdb.request_timeout_secs, 10);
        assert_eq!(config.storage.watched_key, DEFAULT_WATCHED_KEY);
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_validate() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.omdb.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());

        config.omdb.base_url = DEFAULT_OMDB_BASE_URL.to_string();
        config.omdb.request_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.omdb.request_timeout_secs = 5;
        config.search.min_query_len = 0;
        assert!(config.validate().is_err());

        config.search.min_query_len = 3;
        config.storage.watched_key = "  ".to_string();
        assert!(config.validate().is_err());
    }
}
