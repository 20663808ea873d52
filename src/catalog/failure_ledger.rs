//! Permanent record of titles that could not be enriched.

use log::debug;
use rusqlite::params;

use super::now_unix_ms;
use crate::db_manager::DbManager;
use crate::error::StorageError;
use crate::records::{FailureEntry, TitleId};

pub struct FailureLedger<'a> {
    db: &'a DbManager,
}

impl<'a> FailureLedger<'a> {
    pub fn new(db: &'a DbManager) -> Self {
        Self { db }
    }

    /// Marks `title_id` as permanently failed.
    ///
    /// Returns `false` when the title was already marked; the first reason
    /// is kept. Titles holding enrichment records are never marked.
    pub fn mark_failed(&self, title_id: TitleId, reason: &str) -> Result<bool, StorageError> {
        let inserted = self.db.conn().execute(
            "INSERT OR IGNORE INTO failed_titles (title_id, reason, failed_at_unix_ms)
             SELECT ?1, ?2, ?3
             WHERE NOT EXISTS (SELECT 1 FROM books WHERE title_id = ?1)
               AND NOT EXISTS (SELECT 1 FROM movies WHERE title_id = ?1)",
            params![title_id, reason, now_unix_ms()],
        )?;
        if inserted > 0 {
            debug!("Marked title {} as failed: {}", title_id, reason);
        }
        Ok(inserted > 0)
    }

    pub fn is_failed(&self, title_id: TitleId) -> Result<bool, StorageError> {
        let exists: bool = self.db.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM failed_titles WHERE title_id = ?1)",
            params![title_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    pub fn failed_titles(&self) -> Result<Vec<FailureEntry>, StorageError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT title_id, reason, failed_at_unix_ms FROM failed_titles ORDER BY title_id ASC",
        )?;
        let entry_iter = stmt.query_map([], |row| {
            Ok(FailureEntry {
                title_id: row.get(0)?,
                reason: row.get(1)?,
                failed_at_unix_ms: row.get(2)?,
            })
        })?;

        let mut entries = Vec::new();
        for entry in entry_iter {
            entries.push(entry?);
        }
        Ok(entries)
    }

    pub fn count(&self) -> Result<usize, StorageError> {
        let count: i64 =
            self.db
                .conn()
                .query_row("SELECT COUNT(*) FROM failed_titles", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::FailureLedger;
    use crate::catalog::{RecordStore, TitleRegistry};
    use crate::db_manager::DbManager;
    use crate::records::{BookData, MovieData};

    #[test]
    fn test_mark_failed_is_idempotent_and_keeps_first_reason() {
        let db = DbManager::new_in_memory().expect("failed to create in-memory db");
        let id = TitleRegistry::new(&db)
            .register("Eragon")
            .expect("register should succeed");
        let ledger = FailureLedger::new(&db);

        assert!(ledger.mark_failed(id, "first").expect("mark should succeed"));
        assert!(!ledger.mark_failed(id, "second").expect("mark should succeed"));

        let entries = ledger.failed_titles().expect("list should succeed");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title_id, id);
        assert_eq!(entries[0].reason, "first");
        assert!(entries[0].failed_at_unix_ms > 0);
        assert!(ledger.is_failed(id).expect("is_failed should succeed"));
    }

    #[test]
    fn test_mark_failed_skips_enriched_titles() {
        let db = DbManager::new_in_memory().expect("failed to create in-memory db");
        let id = TitleRegistry::new(&db)
            .register("Holes")
            .expect("register should succeed");
        RecordStore::new(&db)
            .store_pair(id, &BookData::default(), &MovieData::default())
            .expect("store should succeed");

        let ledger = FailureLedger::new(&db);
        assert!(!ledger.mark_failed(id, "late failure").expect("mark should succeed"));
        assert!(!ledger.is_failed(id).expect("is_failed should succeed"));
        assert_eq!(ledger.count().expect("count should succeed"), 0);
    }

    #[test]
    fn test_mark_failed_for_unknown_title_is_a_storage_error() {
        let db = DbManager::new_in_memory().expect("failed to create in-memory db");
        let ledger = FailureLedger::new(&db);
        assert!(ledger.mark_failed(404, "missing").is_err());
    }
}
