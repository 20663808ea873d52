//! Book and movie enrichment records, at most one of each per title.

use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db_manager::DbManager;
use crate::error::StorageError;
use crate::records::{AdaptationPair, BookData, BookRecord, MovieData, MovieRecord, Title, TitleId};

// Titles in the failure ledger never receive records.
const INSERT_BOOK_SQL: &str = "INSERT OR IGNORE INTO books (title_id, rating, rating_count)
     SELECT ?1, ?2, ?3
     WHERE NOT EXISTS (SELECT 1 FROM failed_titles WHERE title_id = ?1)";
const INSERT_MOVIE_SQL: &str = "INSERT OR IGNORE INTO movies (title_id, rating, vote_count)
     SELECT ?1, ?2, ?3
     WHERE NOT EXISTS (SELECT 1 FROM failed_titles WHERE title_id = ?1)";

pub struct RecordStore<'a> {
    db: &'a DbManager,
}

impl<'a> RecordStore<'a> {
    pub fn new(db: &'a DbManager) -> Self {
        Self { db }
    }

    fn insert_book(conn: &Connection, title_id: TitleId, book: &BookData) -> rusqlite::Result<bool> {
        let changed = conn.execute(
            INSERT_BOOK_SQL,
            params![title_id, book.rating, book.rating_count],
        )?;
        Ok(changed > 0)
    }

    fn insert_movie(
        conn: &Connection,
        title_id: TitleId,
        movie: &MovieData,
    ) -> rusqlite::Result<bool> {
        let changed = conn.execute(
            INSERT_MOVIE_SQL,
            params![title_id, movie.rating, movie.vote_count],
        )?;
        Ok(changed > 0)
    }

    /// Stores a book record. A second call for the same title is a no-op.
    pub fn store_book(&self, title_id: TitleId, book: &BookData) -> Result<bool, StorageError> {
        Ok(Self::insert_book(self.db.conn(), title_id, book)?)
    }

    /// Stores a movie record. A second call for the same title is a no-op.
    pub fn store_movie(&self, title_id: TitleId, movie: &MovieData) -> Result<bool, StorageError> {
        Ok(Self::insert_movie(self.db.conn(), title_id, movie)?)
    }

    /// Stores both records in one transaction.
    ///
    /// Returns `true` if either record was newly written.
    pub fn store_pair(
        &self,
        title_id: TitleId,
        book: &BookData,
        movie: &MovieData,
    ) -> Result<bool, StorageError> {
        let tx = self.db.conn().unchecked_transaction()?;
        let book_written = Self::insert_book(&tx, title_id, book)?;
        let movie_written = Self::insert_movie(&tx, title_id, movie)?;
        tx.commit()?;
        if book_written || movie_written {
            debug!("Stored book/movie pair for title {}", title_id);
        }
        Ok(book_written || movie_written)
    }

    pub fn book(&self, title_id: TitleId) -> Result<Option<BookRecord>, StorageError> {
        let record = self
            .db
            .conn()
            .query_row(
                "SELECT title_id, rating, rating_count FROM books WHERE title_id = ?1",
                params![title_id],
                |row| {
                    Ok(BookRecord {
                        title_id: row.get(0)?,
                        rating: row.get(1)?,
                        rating_count: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn movie(&self, title_id: TitleId) -> Result<Option<MovieRecord>, StorageError> {
        let record = self
            .db
            .conn()
            .query_row(
                "SELECT title_id, rating, vote_count FROM movies WHERE title_id = ?1",
                params![title_id],
                |row| {
                    Ok(MovieRecord {
                        title_id: row.get(0)?,
                        rating: row.get(1)?,
                        vote_count: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    /// True if the title has a book record, a movie record or a failure entry.
    pub fn has_outcome(&self, title_id: TitleId) -> Result<bool, StorageError> {
        let exists: bool = self.db.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM books WHERE title_id = ?1)
                 OR EXISTS(SELECT 1 FROM movies WHERE title_id = ?1)
                 OR EXISTS(SELECT 1 FROM failed_titles WHERE title_id = ?1)",
            params![title_id],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Titles with both records, in registration order.
    pub fn complete_pairs(&self) -> Result<Vec<AdaptationPair>, StorageError> {
        let mut stmt = self.db.conn().prepare(
            "SELECT t.title_id, t.text, b.rating, b.rating_count, m.rating, m.vote_count
             FROM titles AS t
             JOIN books AS b ON b.title_id = t.title_id
             JOIN movies AS m ON m.title_id = t.title_id
             ORDER BY t.title_id ASC",
        )?;
        let pair_iter = stmt.query_map([], |row| {
            let title_id: TitleId = row.get(0)?;
            Ok(AdaptationPair {
                title: Title {
                    title_id,
                    text: row.get(1)?,
                },
                book: BookRecord {
                    title_id,
                    rating: row.get(2)?,
                    rating_count: row.get(3)?,
                },
                movie: MovieRecord {
                    title_id,
                    rating: row.get(4)?,
                    vote_count: row.get(5)?,
                },
            })
        })?;

        let mut pairs = Vec::new();
        for pair in pair_iter {
            pairs.push(pair?);
        }
        Ok(pairs)
    }

    pub fn pair_count(&self) -> Result<usize, StorageError> {
        let count: i64 = self.db.conn().query_row(
            "SELECT COUNT(*) FROM books AS b JOIN movies AS m ON m.title_id = b.title_id",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
