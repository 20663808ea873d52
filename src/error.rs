//! Error types shared by the storage layer, the metadata sources and the CLI.

use thiserror::Error;

/// Durable-storage failure. Fatal for the current batch.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure reported by an external metadata source.
///
/// Both variants are absorbed by the orchestrator and turned into a failure
/// entry; neither is ever returned from a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// Unreachable, timed out, rate limited or returned an unparseable payload.
    #[error("source unavailable: {0}")]
    Unavailable(String),
    /// The source answered but had no usable match.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Candidate registration failure.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("title '{0}' is empty after normalization")]
    EmptyTitle(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<rusqlite::Error> for RegistryError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Storage(StorageError::Sqlite(error))
    }
}

/// Configuration file could not be read, written or parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}
