//! Batch driver that enriches pending candidates and commits the outcomes.
//!
//! Each candidate is processed to completion before the next one starts:
//! book lookup, movie lookup (only if the book lookup matched), then a single
//! storage commit. Source failures are absorbed into the failure ledger; only
//! storage failures abort a batch.

use log::{debug, info, warn};

use crate::catalog::{FailureLedger, PendingResolver, RecordStore};
use crate::db_manager::DbManager;
use crate::error::StorageError;
use crate::records::{BatchSummary, CandidateOutcome, FailureReason, Title, TitleId};
use crate::sources::{BookSource, MovieSource};

/// Default per-run budget.
pub const DEFAULT_MAX_NEW: usize = 25;

pub struct ReconciliationOrchestrator<'s> {
    book_source: &'s dyn BookSource,
    movie_source: &'s dyn MovieSource,
}

impl<'s> ReconciliationOrchestrator<'s> {
    pub fn new(book_source: &'s dyn BookSource, movie_source: &'s dyn MovieSource) -> Self {
        Self {
            book_source,
            movie_source,
        }
    }

    /// Looks a candidate up in both sources. No storage access.
    pub fn enrich(&self, title: &Title) -> CandidateOutcome {
        let book = match self.book_source.fetch_book(&title.text) {
            Ok(book) => book,
            Err(error) => return CandidateOutcome::Failed(FailureReason::Book(error)),
        };
        // Book data is dropped with this frame if the movie lookup fails.
        match self.movie_source.fetch_movie(&title.text) {
            Ok(movie) => CandidateOutcome::Enriched { book, movie },
            Err(error) => CandidateOutcome::Failed(FailureReason::Movie(error)),
        }
    }

    fn commit(
        db: &DbManager,
        title_id: TitleId,
        outcome: &CandidateOutcome,
    ) -> Result<(), StorageError> {
        match outcome {
            CandidateOutcome::Enriched { book, movie } => {
                RecordStore::new(db).store_pair(title_id, book, movie)?;
            }
            CandidateOutcome::Failed(reason) => {
                FailureLedger::new(db).mark_failed(title_id, &reason.to_string())?;
            }
        }
        Ok(())
    }

    /// Processes at most `max_new` pending candidates.
    ///
    /// The candidate list is read once; the loop stops when it runs out or
    /// when `max_new` pairs were committed, so no more than `max_new` titles
    /// are ever sent to the sources per call. Repeated calls continue where
    /// the previous call stopped.
    pub fn run_batch(&self, db: &DbManager, max_new: usize) -> Result<BatchSummary, StorageError> {
        let mut summary = BatchSummary::default();
        if max_new == 0 {
            return Ok(summary);
        }

        let candidates = PendingResolver::new(db).pending(max_new)?;
        info!(
            "Reconciliation batch starting: max_new={} candidates={}",
            max_new,
            candidates.len()
        );

        for title in candidates {
            if summary.succeeded >= max_new {
                break;
            }
            let outcome = self.enrich(&title);
            match &outcome {
                CandidateOutcome::Enriched { book, movie } => debug!(
                    "Enriched '{}' (id {}): book={:?}/{:?} movie={:?}/{:?}",
                    title.text,
                    title.title_id,
                    book.rating,
                    book.rating_count,
                    movie.rating,
                    movie.vote_count
                ),
                CandidateOutcome::Failed(reason) => warn!(
                    "Marking '{}' (id {}) as failed: {}",
                    title.text, title.title_id, reason
                ),
            }
            Self::commit(db, title.title_id, &outcome)?;
            summary.record(&outcome);
        }

        info!("Reconciliation batch finished: {}", summary);
        Ok(summary)
    }
}
