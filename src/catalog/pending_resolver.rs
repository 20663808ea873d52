//! Resolves which registered titles still lack any enrichment outcome.

use rusqlite::params;

use crate::db_manager::DbManager;
use crate::error::StorageError;
use crate::records::Title;

// Anti-join of titles against books, movies and failed_titles.
const PENDING_FILTER_SQL: &str = "FROM titles AS t
     WHERE NOT EXISTS (SELECT 1 FROM books AS b WHERE b.title_id = t.title_id)
       AND NOT EXISTS (SELECT 1 FROM movies AS m WHERE m.title_id = t.title_id)
       AND NOT EXISTS (SELECT 1 FROM failed_titles AS f WHERE f.title_id = t.title_id)";

pub struct PendingResolver<'a> {
    db: &'a DbManager,
}

impl<'a> PendingResolver<'a> {
    pub fn new(db: &'a DbManager) -> Self {
        Self { db }
    }

    /// Up to `limit` pending titles in registration order.
    ///
    /// The order is stable, so repeated calls without intervening writes
    /// return the same prefix.
    pub fn pending(&self, limit: usize) -> Result<Vec<Title>, StorageError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.db.conn().prepare(&format!(
            "SELECT t.title_id, t.text {PENDING_FILTER_SQL} ORDER BY t.title_id ASC LIMIT ?1"
        ))?;
        let title_iter = stmt.query_map(params![limit], |row| {
            Ok(Title {
                title_id: row.get(0)?,
                text: row.get(1)?,
            })
        })?;

        let mut titles = Vec::new();
        for title in title_iter {
            titles.push(title?);
        }
        Ok(titles)
    }

    pub fn pending_count(&self) -> Result<usize, StorageError> {
        let count: i64 = self.db.conn().query_row(
            &format!("SELECT COUNT(*) {PENDING_FILTER_SQL}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::PendingResolver;
    use crate::catalog::{FailureLedger, RecordStore, TitleRegistry};
    use crate::db_manager::DbManager;
    use crate::records::{BookData, MovieData};

    fn seeded(texts: &[&str]) -> DbManager {
        let db = DbManager::new_in_memory().expect("failed to create in-memory db");
        TitleRegistry::new(&db)
            .register_all(texts.iter().copied())
            .expect("register_all should succeed");
        db
    }

    fn texts(titles: &[crate::records::Title]) -> Vec<&str> {
        titles.iter().map(|title| title.text.as_str()).collect()
    }

    #[test]
    fn test_pending_returns_titles_in_insertion_order() {
        let db = seeded(&["C", "A", "B"]);
        let resolver = PendingResolver::new(&db);
        let pending = resolver.pending(10).expect("pending should succeed");
        assert_eq!(texts(&pending), vec!["C", "A", "B"]);
        assert_eq!(resolver.pending_count().expect("count should succeed"), 3);
    }

    #[test]
    fn test_pending_honors_limit_and_is_repeatable() {
        let db = seeded(&["A", "B", "C", "D"]);
        let resolver = PendingResolver::new(&db);
        let first = resolver.pending(2).expect("pending should succeed");
        let second = resolver.pending(2).expect("pending should succeed");
        assert_eq!(texts(&first), vec!["A", "B"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_pending_is_empty_for_zero_limit_or_empty_registry() {
        let db = seeded(&[]);
        let resolver = PendingResolver::new(&db);
        assert!(resolver.pending(5).expect("pending should succeed").is_empty());

        let db = seeded(&["A"]);
        let resolver = PendingResolver::new(&db);
        assert!(resolver.pending(0).expect("pending should succeed").is_empty());
    }

    #[test]
    fn test_pending_excludes_failed_enriched_and_partial_titles() {
        let db = seeded(&["Failed", "Enriched", "BookOnly", "Open"]);
        let registry = TitleRegistry::new(&db);
        let id = |text: &str| {
            registry
                .lookup(text)
                .expect("lookup should succeed")
                .expect("title should exist")
                .title_id
        };
        FailureLedger::new(&db)
            .mark_failed(id("Failed"), "not found")
            .expect("mark should succeed");
        let store = RecordStore::new(&db);
        store
            .store_pair(id("Enriched"), &BookData::default(), &MovieData::default())
            .expect("store should succeed");
        store
            .store_book(id("BookOnly"), &BookData::default())
            .expect("store should succeed");

        let resolver = PendingResolver::new(&db);
        let pending = resolver.pending(10).expect("pending should succeed");
        assert_eq!(texts(&pending), vec!["Open"]);
        assert_eq!(resolver.pending_count().expect("count should succeed"), 1);
    }
}
