//! SQLite storage context shared by the registry, ledger and record store.

use std::path::{Path, PathBuf};

use log::debug;
use rusqlite::Connection;

use crate::error::StorageError;

/// Owns the single SQLite connection. Components borrow it for their lifetime.
pub struct DbManager {
    conn: Connection,
}

impl DbManager {
    /// Opens (or creates) the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        debug!("Opening adaptation database at {}", path.display());
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn new_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    /// `<data dir>/adaptation_ledger/adaptations.db`
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("adaptation_ledger").join("adaptations.db"))
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let db_manager = Self { conn };
        db_manager.initialize_schema()?;
        Ok(db_manager)
    }

    fn initialize_schema(&self) -> Result<(), StorageError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS titles (
                title_id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL UNIQUE COLLATE NOCASE
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS books (
                title_id INTEGER NOT NULL UNIQUE,
                rating REAL,
                rating_count INTEGER,
                FOREIGN KEY(title_id) REFERENCES titles(title_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS movies (
                title_id INTEGER NOT NULL UNIQUE,
                rating REAL,
                vote_count INTEGER,
                FOREIGN KEY(title_id) REFERENCES titles(title_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS failed_titles (
                title_id INTEGER NOT NULL UNIQUE,
                reason TEXT NOT NULL DEFAULT '',
                failed_at_unix_ms INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY(title_id) REFERENCES titles(title_id)
            )",
            [],
        )?;
        Ok(())
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}
