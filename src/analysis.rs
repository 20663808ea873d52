//! Read-side comparison of book and film reception over stored pairs.
//!
//! Movie ratings are converted to the 0-5 book scale here, at read time;
//! storage keeps the source values untouched.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::records::{to_comparison_scale, AdaptationPair};

pub const DEFAULT_MIN_BOOK_COUNT: u32 = 10;
pub const DEFAULT_MIN_MOVIE_COUNT: u32 = 10;
const MIN_POINTS: usize = 3;

/// How often the book or the film was rated higher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreferenceCounts {
    pub books_better: usize,
    pub movies_better: usize,
    pub ties: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreferenceShares {
    pub books_better: f64,
    pub movies_better: f64,
    pub ties: f64,
}

impl PreferenceCounts {
    /// Fractions of `total`; `None` when nothing was compared.
    pub fn shares(&self) -> Option<PreferenceShares> {
        if self.total == 0 {
            return None;
        }
        let total = self.total as f64;
        Some(PreferenceShares {
            books_better: self.books_better as f64 / total,
            movies_better: self.movies_better as f64 / total,
            ties: self.ties as f64 / total,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub r: f64,
    pub points: usize,
    /// Two-sided p-value for `r == 0`.
    pub p_value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r: f64,
    pub p_value: f64,
    /// Standard error of the slope.
    pub stderr: f64,
}

/// Keeps pairs whose book and movie counts are both known and large enough.
pub fn filter_by_counts(
    pairs: &[AdaptationPair],
    min_book_count: u32,
    min_movie_count: u32,
) -> Vec<AdaptationPair> {
    pairs
        .iter()
        .filter(|pair| {
            matches!(
                (pair.book.rating_count, pair.movie.vote_count),
                (Some(book_count), Some(movie_count))
                    if book_count >= min_book_count && movie_count >= min_movie_count
            )
        })
        .cloned()
        .collect()
}

/// Book rating and scaled movie rating for every pair where both are present.
pub fn rating_points(pairs: &[AdaptationPair]) -> (Vec<f64>, Vec<f64>) {
    pairs
        .iter()
        .filter_map(|pair| Some((pair.book.rating?, to_comparison_scale(pair.movie.rating)?)))
        .unzip()
}

pub fn preference_counts(pairs: &[AdaptationPair]) -> PreferenceCounts {
    let (book_ratings, movie_ratings) = rating_points(pairs);
    let mut counts = PreferenceCounts::default();
    for (book, movie) in book_ratings.iter().zip(movie_ratings.iter()) {
        counts.total += 1;
        if movie > book {
            counts.movies_better += 1;
        } else if book > movie {
            counts.books_better += 1;
        } else {
            counts.ties += 1;
        }
    }
    counts
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Centered sums: (sxx, syy, sxy).
fn centered_sums(x: &[f64], y: &[f64]) -> Option<(f64, f64, f64)> {
    if x.len() != y.len() || x.len() < MIN_POINTS {
        return None;
    }
    let (mean_x, mean_y) = (mean(x), mean(y));
    let mut sums = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y.iter()) {
        let (dx, dy) = (xi - mean_x, yi - mean_y);
        sums.0 += dx * dx;
        sums.1 += dy * dy;
        sums.2 += dx * dy;
    }
    if sums.0 == 0.0 || sums.1 == 0.0 {
        return None;
    }
    Some(sums)
}

fn correlation_coefficient(sxx: f64, syy: f64, sxy: f64) -> f64 {
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Two-sided p-value of `r` under a Student t with `points - 2` degrees of freedom.
fn correlation_p_value(r: f64, points: usize) -> Option<f64> {
    let freedom = (points - 2) as f64;
    let unexplained = 1.0 - r * r;
    if unexplained <= 0.0 {
        return Some(0.0);
    }
    let t = r * (freedom / unexplained).sqrt();
    let distribution = StudentsT::new(0.0, 1.0, freedom).ok()?;
    Some((2.0 * (1.0 - distribution.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Pearson correlation. `None` for fewer than three points or zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<Correlation> {
    let (sxx, syy, sxy) = centered_sums(x, y)?;
    let r = correlation_coefficient(sxx, syy, sxy);
    Some(Correlation {
        r,
        points: x.len(),
        p_value: correlation_p_value(r, x.len())?,
    })
}

/// Least-squares fit of `y` on `x`.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Option<Regression> {
    let (sxx, syy, sxy) = centered_sums(x, y)?;
    let slope = sxy / sxx;
    let r = correlation_coefficient(sxx, syy, sxy);
    let freedom = (x.len() - 2) as f64;
    Some(Regression {
        slope,
        intercept: mean(y) - slope * mean(x),
        r,
        p_value: correlation_p_value(r, x.len())?,
        stderr: ((1.0 - r * r).max(0.0) * syy / sxx / freedom).sqrt(),
    })
}

#[cfg(test)]
mod tests {
    use super::{filter_by_counts, linear_regression, pearson, preference_counts, rating_points};
    use crate::records::{AdaptationPair, BookRecord, MovieRecord, Title};

    fn pair(
        id: i64,
        book_rating: Option<f64>,
        book_count: Option<u32>,
        movie_rating: Option<f64>,
        movie_votes: Option<u32>,
    ) -> AdaptationPair {
        AdaptationPair {
            title: Title {
                title_id: id,
                text: format!("Title {id}"),
            },
            book: BookRecord {
                title_id: id,
                rating: book_rating,
                rating_count: book_count,
            },
            movie: MovieRecord {
                title_id: id,
                rating: movie_rating,
                vote_count: movie_votes,
            },
        }
    }

    #[test]
    fn test_filter_by_counts_drops_small_and_unknown_counts() {
        let pairs = vec![
            pair(1, Some(4.0), Some(50), Some(7.0), Some(50)),
            pair(2, Some(4.0), Some(9), Some(7.0), Some(50)),
            pair(3, Some(4.0), None, Some(7.0), Some(50)),
            pair(4, Some(4.0), Some(10), Some(7.0), Some(10)),
        ];
        let kept = filter_by_counts(&pairs, 10, 10);
        let ids: Vec<i64> = kept.iter().map(|pair| pair.title.title_id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_preference_counts_compare_on_book_scale() {
        let pairs = vec![
            pair(1, Some(4.0), None, Some(9.0), None),
            pair(2, Some(4.5), None, Some(7.0), None),
            pair(3, Some(3.5), None, Some(7.0), None),
            pair(4, None, None, Some(7.0), None),
            pair(5, Some(3.0), None, None, None),
        ];
        let counts = preference_counts(&pairs);
        assert_eq!(counts.movies_better, 1);
        assert_eq!(counts.books_better, 1);
        assert_eq!(counts.ties, 1);
        assert_eq!(counts.total, 3);

        let shares = counts.shares().expect("total is non-zero");
        assert!((shares.ties - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_shares_are_absent_without_comparisons() {
        assert_eq!(preference_counts(&[]).shares(), None);
    }

    #[test]
    fn test_rating_points_scale_movie_ratings() {
        let pairs = vec![pair(1, Some(4.0), None, Some(8.4), None)];
        let (x, y) = rating_points(&pairs);
        assert_eq!(x, vec![4.0]);
        assert_eq!(y, vec![4.2]);
    }

    #[test]
    fn test_pearson_and_regression_on_a_perfect_line() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [3.0, 5.0, 7.0, 9.0];
        let correlation = pearson(&x, &y).expect("enough points");
        assert!((correlation.r - 1.0).abs() < 1e-12);
        assert_eq!(correlation.points, 4);

        let fit = linear_regression(&x, &y).expect("enough points");
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!(fit.p_value < 1e-9);
        assert!(fit.stderr < 1e-6);
    }

    #[test]
    fn test_significance_matches_reference_values() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];

        let correlation = pearson(&x, &y).expect("enough points");
        assert!((correlation.r - 0.774_596_669_241_483_4).abs() < 1e-12);
        assert!((correlation.p_value - 0.124_027_062_657_554_6).abs() < 1e-7);

        let fit = linear_regression(&x, &y).expect("enough points");
        assert!((fit.slope - 0.6).abs() < 1e-12);
        assert!((fit.intercept - 2.2).abs() < 1e-12);
        assert!((fit.stderr - 0.08_f64.sqrt()).abs() < 1e-12);
        assert!((fit.p_value - correlation.p_value).abs() < 1e-12);
    }

    #[test]
    fn test_statistics_need_three_varied_points() {
        assert_eq!(pearson(&[1.0, 2.0], &[1.0, 2.0]), None);
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]), None);
        assert_eq!(linear_regression(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]), None);
    }
}
