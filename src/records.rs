//! Typed records for candidate titles and their enrichment outcomes.

use std::fmt;

use crate::error::SourceError;

/// Surrogate key assigned by the title registry. Stable once assigned.
pub type TitleId = i64;

/// A normalized candidate title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Title {
    pub title_id: TitleId,
    pub text: String,
}

/// Book-side data returned by a book source, before it is bound to a title.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BookData {
    /// Average rating on a 0-5 scale.
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
}

/// Film-side data returned by a movie source, before it is bound to a title.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovieData {
    /// Rating on a 0-10 scale.
    pub rating: Option<f64>,
    pub vote_count: Option<u32>,
}

/// Stored book enrichment for one title.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub title_id: TitleId,
    pub rating: Option<f64>,
    pub rating_count: Option<u32>,
}

/// Stored movie enrichment for one title.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieRecord {
    pub title_id: TitleId,
    pub rating: Option<f64>,
    pub vote_count: Option<u32>,
}

impl MovieRecord {
    /// Movie rating on the book 0-5 scale.
    pub fn comparison_rating(&self) -> Option<f64> {
        to_comparison_scale(self.rating)
    }
}

/// Permanent failure marker for one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEntry {
    pub title_id: TitleId,
    pub reason: String,
    pub failed_at_unix_ms: i64,
}

/// A title with both enrichment records, as read by the analysis layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptationPair {
    pub title: Title,
    pub book: BookRecord,
    pub movie: MovieRecord,
}

/// Converts a 0-10 movie rating to the 0-5 book scale. Absent stays absent.
pub fn to_comparison_scale(movie_rating: Option<f64>) -> Option<f64> {
    movie_rating.map(|rating| rating / 2.0)
}

/// Which side of the enrichment failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Book(SourceError),
    Movie(SourceError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Book(error) => write!(f, "book source: {error}"),
            Self::Movie(error) => write!(f, "movie source: {error}"),
        }
    }
}

/// Result of one enrichment attempt. Either both sides or nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    Enriched { book: BookData, movie: MovieData },
    Failed(FailureReason),
}

/// Counts reported by one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub(crate) fn record(&mut self, outcome: &CandidateOutcome) {
        self.attempted += 1;
        match outcome {
            CandidateOutcome::Enriched { .. } => self.succeeded += 1,
            CandidateOutcome::Failed(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attempted={} succeeded={} failed={}",
            self.attempted, self.succeeded, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{
        to_comparison_scale, BatchSummary, CandidateOutcome, FailureReason, MovieRecord,
    };
    use crate::error::SourceError;

    #[test]
    fn test_to_comparison_scale_halves_movie_rating() {
        assert_eq!(to_comparison_scale(Some(8.4)), Some(4.2));
        assert_eq!(to_comparison_scale(Some(0.0)), Some(0.0));
    }

    #[test]
    fn test_to_comparison_scale_keeps_absent_rating_absent() {
        assert_eq!(to_comparison_scale(None), None);
        let record = MovieRecord {
            title_id: 1,
            rating: None,
            vote_count: Some(10),
        };
        assert_eq!(record.comparison_rating(), None);
    }

    #[test]
    fn test_batch_summary_folds_outcomes() {
        let mut summary = BatchSummary::default();
        summary.record(&CandidateOutcome::Enriched {
            book: Default::default(),
            movie: Default::default(),
        });
        summary.record(&CandidateOutcome::Failed(FailureReason::Movie(
            SourceError::NotFound("Movie not found!".to_string()),
        )));
        assert_eq!(summary.attempted, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.to_string(), "attempted=2 succeeded=1 failed=1");
    }

    #[test]
    fn test_failure_reason_names_the_failing_side() {
        let reason = FailureReason::Book(SourceError::Unavailable("timed out".to_string()));
        assert_eq!(reason.to_string(), "book source: source unavailable: timed out");
    }
}
