//! Deduplicated registry of candidate titles.

use log::debug;
use rusqlite::{params, OptionalExtension};

use crate::db_manager::DbManager;
use crate::error::{RegistryError, StorageError};
use crate::records::{Title, TitleId};

/// Totals for one `register_all` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegisterSummary {
    pub seen: usize,
    pub inserted: usize,
    pub skipped_empty: usize,
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_series_index_marker(value: &str) -> bool {
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '#' && chars.peek().is_some_and(|next| next.is_ascii_digit()) {
            return true;
        }
    }
    false
}

/// Byte offset of the `(` that balances the final `)` of `value`.
fn trailing_group_start(value: &str) -> Option<usize> {
    if !value.ends_with(')') {
        return None;
    }
    let mut depth = 0usize;
    for (index, ch) in value.char_indices().rev() {
        match ch {
            ')' => depth += 1,
            '(' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Normalizes a raw discovered title.
///
/// A trailing parenthetical holding a series index such as `(Series, #1)` is
/// removed, nested groups included, then whitespace is trimmed and internal
/// runs are collapsed. Case is kept as-is; the `titles` table compares text
/// case-insensitively.
pub fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    let stripped = match trailing_group_start(trimmed) {
        Some(open) if has_series_index_marker(&trimmed[open..]) => &trimmed[..open],
        _ => trimmed,
    };
    collapse_whitespace(stripped)
}

/// Registers candidate titles. Duplicate text is a no-op.
pub struct TitleRegistry<'a> {
    db: &'a DbManager,
}

impl<'a> TitleRegistry<'a> {
    pub fn new(db: &'a DbManager) -> Self {
        Self { db }
    }

    /// Returns the id for `text`, inserting it first if it is new.
    pub fn register(&self, text: &str) -> Result<TitleId, RegistryError> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Err(RegistryError::EmptyTitle(text.to_string()));
        }
        let inserted = self.db.conn().execute(
            "INSERT OR IGNORE INTO titles (text) VALUES (?1)",
            params![normalized],
        )?;
        let title_id = self.db.conn().query_row(
            "SELECT title_id FROM titles WHERE text = ?1",
            params![normalized],
            |row| row.get(0),
        )?;
        if inserted > 0 {
            debug!("Registered title {} as id {}", normalized, title_id);
        }
        Ok(title_id)
    }

    /// Registers a discovered batch in one transaction.
    ///
    /// Entries that normalize to nothing are counted and skipped rather than
    /// failing the whole batch.
    pub fn register_all<I, S>(&self, texts: I) -> Result<RegisterSummary, StorageError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tx = self.db.conn().unchecked_transaction()?;
        let mut summary = RegisterSummary::default();
        {
            let mut stmt = tx.prepare("INSERT OR IGNORE INTO titles (text) VALUES (?1)")?;
            for text in texts {
                summary.seen += 1;
                let normalized = normalize(text.as_ref());
                if normalized.is_empty() {
                    summary.skipped_empty += 1;
                    continue;
                }
                summary.inserted += stmt.execute(params![normalized])?;
            }
        }
        tx.commit()?;
        Ok(summary)
    }

    pub fn lookup(&self, text: &str) -> Result<Option<Title>, StorageError> {
        let normalized = normalize(text);
        let title = self
            .db
            .conn()
            .query_row(
                "SELECT title_id, text FROM titles WHERE text = ?1",
                params![normalized],
                |row| {
                    Ok(Title {
                        title_id: row.get(0)?,
                        text: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(title)
    }

    pub fn get(&self, title_id: TitleId) -> Result<Option<Title>, StorageError> {
        let title = self
            .db
            .conn()
            .query_row(
                "SELECT title_id, text FROM titles WHERE title_id = ?1",
                params![title_id],
                |row| {
                    Ok(Title {
                        title_id: row.get(0)?,
                        text: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(title)
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        let count: i64 = self
            .db
            .conn()
            .query_row("SELECT COUNT(*) FROM titles", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}
