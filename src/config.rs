//! Persistent configuration model, defaults and loading.

use std::path::{Path, PathBuf};

use log::info;

use crate::error::ConfigError;
use crate::reconciliation::DEFAULT_MAX_NEW;
use crate::sources::google_books::GOOGLE_BOOKS_URL;
use crate::sources::omdb::OMDB_URL;

const MIN_TIMEOUT_SECS: u64 = 1;
const MAX_TIMEOUT_SECS: u64 = 300;

/// Root configuration persisted to `adaptation_ledger.toml`.
#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Config {
    #[serde(default)]
    /// Database location.
    pub storage: StorageConfig,
    #[serde(default)]
    /// Per-run budget.
    pub batch: BatchConfig,
    #[serde(default)]
    /// Book metadata source.
    pub books: BookSourceConfig,
    #[serde(default)]
    /// Film metadata source.
    pub movies: MovieSourceConfig,
    #[serde(default)]
    /// Candidate title discovery.
    pub discovery: DiscoveryConfig,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct StorageConfig {
    /// Empty means the platform data directory.
    #[serde(default)]
    pub database_path: String,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct BatchConfig {
    #[serde(default = "default_max_new")]
    pub max_new: usize,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct BookSourceConfig {
    #[serde(default = "default_books_base_url")]
    pub base_url: String,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct MovieSourceConfig {
    #[serde(default = "default_movies_base_url")]
    pub base_url: String,
    /// Falls back to `OMDB_API_KEY`, then the system keyring, when empty.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct DiscoveryConfig {
    /// Newline-delimited candidate list.
    #[serde(default)]
    pub title_list_path: String,
}

fn default_max_new() -> usize {
    DEFAULT_MAX_NEW
}

fn default_books_base_url() -> String {
    GOOGLE_BOOKS_URL.to_string()
}

fn default_movies_base_url() -> String {
    OMDB_URL.to_string()
}

fn default_requests_per_second() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_new: default_max_new(),
        }
    }
}

impl Default for BookSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_books_base_url(),
            requests_per_second: default_requests_per_second(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MovieSourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_movies_base_url(),
            api_key: String::new(),
            requests_per_second: default_requests_per_second(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_database_path(&self) -> Option<PathBuf> {
        let configured = self.database_path.trim();
        if configured.is_empty() {
            crate::db_manager::DbManager::default_path()
        } else {
            Some(PathBuf::from(configured))
        }
    }
}

/// Clamps values that would make the sources unusable.
pub fn sanitize_config(config: Config) -> Config {
    let clamp_timeout = |secs: u64| secs.clamp(MIN_TIMEOUT_SECS, MAX_TIMEOUT_SECS);
    let books_base_url = if config.books.base_url.trim().is_empty() {
        default_books_base_url()
    } else {
        config.books.base_url.trim().to_string()
    };
    let movies_base_url = if config.movies.base_url.trim().is_empty() {
        default_movies_base_url()
    } else {
        config.movies.base_url.trim().to_string()
    };

    Config {
        books: BookSourceConfig {
            base_url: books_base_url,
            requests_per_second: config.books.requests_per_second.max(1),
            timeout_secs: clamp_timeout(config.books.timeout_secs),
        },
        movies: MovieSourceConfig {
            base_url: movies_base_url,
            api_key: config.movies.api_key.trim().to_string(),
            requests_per_second: config.movies.requests_per_second.max(1),
            timeout_secs: clamp_timeout(config.movies.timeout_secs),
        },
        ..config
    }
}

/// `<config dir>/adaptation_ledger.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("adaptation_ledger.toml"))
}

/// Loads the config at `path`, writing defaults first if the file is missing.
pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
    let io_error = |source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    };
    if !path.exists() {
        info!(
            "Config file not found. Creating default config. path={}",
            path.display()
        );
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(io_error)?;
            }
        }
        let default_content = toml::to_string(&Config::default())?;
        std::fs::write(path, default_content).map_err(io_error)?;
    }

    let content = std::fs::read_to_string(path).map_err(io_error)?;
    let config = toml::from_str::<Config>(&content)?;
    Ok(sanitize_config(config))
}
