//! Rating store and its two views.
//!
//! [`RatingStore`] owns the rating events and shares the movie catalog with
//! the rest of the program. Queries are grouped into two read-only views
//! that borrow the store:
//!
//! - [`MovieView`] (`store.movies()`): aggregates per movie and per year
//! - [`UserView`] (`store.users()`): aggregates per user
//!
//! ## Rules
//! - Years are calendar years of the rating timestamp in UTC.
//! - Movie and user scores need at least two ratings; single observations
//!   would otherwise dominate every top list.
//! - Scores are rounded to 2 decimals, user buckets to 1 decimal.
//! - Top-N ties keep the order in which the movie or user first appears.

use crate::movies::Catalog;
use crate::ranking::{OrderedGroups, checked_limit, count_in_order, top_n};
use crate::stats::{from_tenths, mean, round_to, tenths, variance};
use crate::types::{Metric, YearRatingSummary, YearTrend};
use data_loader::{MovieId, RatingEvent, UserId};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Observations needed before a movie or user gets a score
const MIN_RATINGS_FOR_SCORE: usize = 2;

/// Rating events plus the catalog used to resolve titles and genres
#[derive(Debug, Clone)]
pub struct RatingStore {
    ratings: Vec<RatingEvent>,
    catalog: Arc<Catalog>,
}

impl RatingStore {
    pub fn new(ratings: Vec<RatingEvent>, catalog: Arc<Catalog>) -> Self {
        Self { ratings, catalog }
    }

    pub fn ratings(&self) -> &[RatingEvent] {
        &self.ratings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Per-movie queries
    pub fn movies(&self) -> MovieView<'_> {
        MovieView { store: self }
    }

    /// Per-user queries
    pub fn users(&self) -> UserView<'_> {
        UserView { store: self }
    }

    /// Rating values of every event on one of `movie_ids`, in file order
    pub fn ratings_for_movies(&self, movie_ids: &[MovieId]) -> Vec<f64> {
        let wanted: HashSet<MovieId> = movie_ids.iter().copied().collect();
        self.ratings
            .iter()
            .filter(|r| wanted.contains(&r.movie_id))
            .map(|r| r.rating)
            .collect()
    }

    /// Ratings grouped by movie, movies in first-seen order
    fn by_movie(&self) -> Vec<(MovieId, Vec<f64>)> {
        self.ratings
            .iter()
            .map(|r| (r.movie_id, r.rating))
            .collect::<OrderedGroups<_, _>>()
            .into_vec()
    }

    /// Ratings grouped by user, users in first-seen order
    fn by_user(&self) -> Vec<(UserId, Vec<f64>)> {
        self.ratings
            .iter()
            .map(|r| (r.user_id, r.rating))
            .collect::<OrderedGroups<_, _>>()
            .into_vec()
    }

    /// Replace movie ids by titles, dropping ids the catalog does not know
    fn with_titles<V>(&self, ranked: Vec<(MovieId, V)>) -> Vec<(String, V)> {
        ranked
            .into_iter()
            .filter_map(|(id, value)| match self.catalog.title(id) {
                Some(title) => Some((title.to_string(), value)),
                None => {
                    debug!("No title for movie {}", id);
                    None
                }
            })
            .collect()
    }
}

/// Calendar year of a rating, logging the (unlikely) out-of-range timestamp
fn rating_year(rating: &RatingEvent) -> Option<i32> {
    let year = rating.year();
    if year.is_none() {
        warn!("Skipping rating with out-of-range timestamp: {:?}", rating);
    }
    year
}

/// Movie-centric aggregations over a [`RatingStore`]
#[derive(Debug, Clone, Copy)]
pub struct MovieView<'a> {
    store: &'a RatingStore,
}

impl MovieView<'_> {
    /// Number of ratings made in each year, oldest year first
    pub fn dist_by_year(&self) -> Vec<(i32, usize)> {
        let mut dist: BTreeMap<i32, usize> = BTreeMap::new();
        for year in self.store.ratings.iter().filter_map(rating_year) {
            *dist.entry(year).or_insert(0) += 1;
        }
        dist.into_iter().collect()
    }

    /// Number of ratings per rating value, lowest value first
    pub fn dist_by_rating(&self) -> Vec<(f64, usize)> {
        let mut dist: BTreeMap<i64, usize> = BTreeMap::new();
        for rating in &self.store.ratings {
            *dist.entry(tenths(rating.rating)).or_insert(0) += 1;
        }
        dist.into_iter().map(|(k, count)| (from_tenths(k), count)).collect()
    }

    /// Movies with the most ratings, as (title, number of ratings)
    pub fn top_by_num_of_ratings(&self, n: i64) -> Vec<(String, usize)> {
        let Some(n) = checked_limit(n, "top_by_num_of_ratings") else {
            return Vec::new();
        };
        let counts = count_in_order(self.store.ratings.iter().map(|r| r.movie_id));
        self.store.with_titles(top_n(counts, n))
    }

    /// Best movies by average or median rating (rounded to 2 decimals)
    pub fn top_by_ratings(&self, n: i64, metric: Metric) -> Vec<(String, f64)> {
        let Some(n) = checked_limit(n, "top_by_ratings") else {
            return Vec::new();
        };
        let scores = self
            .store
            .by_movie()
            .into_iter()
            .filter(|(_, values)| values.len() >= MIN_RATINGS_FOR_SCORE)
            .map(|(id, values)| (id, round_to(metric.apply(&values), 2)))
            .collect();
        self.store.with_titles(top_n(scores, n))
    }

    /// Movies whose raters disagree the most, by sample variance
    pub fn top_controversial(&self, n: i64) -> Vec<(String, f64)> {
        let Some(n) = checked_limit(n, "top_controversial") else {
            return Vec::new();
        };
        let variances = self
            .store
            .by_movie()
            .into_iter()
            .filter(|(_, values)| values.len() >= MIN_RATINGS_FOR_SCORE)
            .map(|(id, values)| (id, round_to(variance(&values), 2)))
            .collect();
        self.store.with_titles(top_n(variances, n))
    }

    /// Yearly count and mean of the ratings given to matching movies.
    ///
    /// A movie matches when it carries `genre` (if given) and was released
    /// in `release_year` (if given). Without filters every catalog movie
    /// matches.
    pub fn average_rating_by_year(
        &self,
        genre: Option<&str>,
        release_year: Option<u16>,
    ) -> Vec<YearRatingSummary> {
        let matching: HashSet<MovieId> = self
            .store
            .catalog
            .get_movies()
            .iter()
            .filter(|m| genre.is_none_or(|g| m.has_genre(g)))
            .filter(|m| release_year.is_none_or(|y| m.release_year() == Some(y)))
            .map(|m| m.id)
            .collect();

        let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        for rating in self
            .store
            .ratings
            .iter()
            .filter(|r| matching.contains(&r.movie_id))
        {
            if let Some(year) = rating_year(rating) {
                by_year.entry(year).or_default().push(rating.rating);
            }
        }

        by_year
            .into_iter()
            .map(|(year, values)| YearRatingSummary {
                year,
                count: values.len(),
                average_rating: round_to(mean(&values), 2),
            })
            .collect()
    }
}

/// User-centric aggregations over a [`RatingStore`]
#[derive(Debug, Clone, Copy)]
pub struct UserView<'a> {
    store: &'a RatingStore,
}

impl UserView<'_> {
    /// How many distinct users gave each rating value, lowest value first
    pub fn dist_by_num_of_ratings(&self) -> Vec<(f64, usize)> {
        let mut users: BTreeMap<i64, HashSet<UserId>> = BTreeMap::new();
        for rating in &self.store.ratings {
            users
                .entry(tenths(rating.rating))
                .or_default()
                .insert(rating.user_id);
        }
        users
            .into_iter()
            .map(|(k, users)| (from_tenths(k), users.len()))
            .collect()
    }

    /// Distribution of users' average (or median) rating, rounded to one
    /// decimal, lowest bucket first
    pub fn dist_by_user_rating(&self, metric: Metric) -> Vec<(f64, usize)> {
        let mut dist: BTreeMap<i64, usize> = BTreeMap::new();
        for (_, values) in self.store.by_user() {
            let bucket = round_to(metric.apply(&values), 1);
            *dist.entry(tenths(bucket)).or_insert(0) += 1;
        }
        dist.into_iter().map(|(k, count)| (from_tenths(k), count)).collect()
    }

    /// Users whose ratings vary the most, as (user id, sample variance)
    pub fn top_controversial(&self, n: i64) -> Vec<(UserId, f64)> {
        let Some(n) = checked_limit(n, "top_controversial_users") else {
            return Vec::new();
        };
        let variances = self
            .store
            .by_user()
            .into_iter()
            .filter(|(_, values)| values.len() >= MIN_RATINGS_FOR_SCORE)
            .map(|(id, values)| (id, round_to(variance(&values), 2)))
            .collect();
        top_n(variances, n)
    }

    /// Yearly mean rating, rating count and distinct raters for movies of
    /// one genre
    pub fn genre_rating_trend_by_year(&self, genre: &str) -> Vec<YearTrend> {
        let catalog = &self.store.catalog;
        let mut by_year: BTreeMap<i32, (Vec<f64>, BTreeSet<UserId>)> = BTreeMap::new();
        for rating in &self.store.ratings {
            let in_genre = catalog
                .get(rating.movie_id)
                .is_some_and(|m| m.has_genre(genre));
            if !in_genre {
                continue;
            }
            if let Some(year) = rating_year(rating) {
                let (values, users) = by_year.entry(year).or_default();
                values.push(rating.rating);
                users.insert(rating.user_id);
            }
        }

        by_year
            .into_iter()
            .map(|(year, (values, users))| YearTrend {
                year,
                average_rating: round_to(mean(&values), 2),
                ratings: values.len(),
                users: users.len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::MovieRecord;

    // 1996-06-01, 2000-06-01 and 2016-06-01, all UTC
    const Y1996: i64 = 833_587_200;
    const Y2000: i64 = 959_817_600;
    const Y2016: i64 = 1_464_739_200;

    fn movie(id: MovieId, title: &str, genres: &[&str]) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
        }
    }

    fn rating(user_id: UserId, movie_id: MovieId, rating: f64, timestamp: i64) -> RatingEvent {
        RatingEvent {
            user_id,
            movie_id,
            rating,
            timestamp,
        }
    }

    fn create_test_store() -> RatingStore {
        let catalog = Catalog::new(vec![
            movie(1, "Toy Story (1995)", &["Animation", "Comedy"]),
            movie(2, "Heat (1995)", &["Action", "Thriller"]),
            movie(3, "Fargo (1996)", &["Comedy", "Crime", "Thriller"]),
            movie(4, "Psycho (1960)", &["Horror"]),
        ]);

        let ratings = vec![
            rating(1, 1, 4.0, Y1996),
            rating(1, 2, 5.0, Y1996),
            rating(2, 2, 1.0, Y2000),
            rating(2, 1, 5.0, Y2000),
            rating(3, 3, 3.0, Y2000),
            rating(3, 2, 3.0, Y2016),
            rating(3, 1, 4.5, Y2016),
            rating(4, 4, 0.5, Y2016),
            rating(4, 3, 4.0, Y2016),
        ];
        RatingStore::new(ratings, Arc::new(catalog))
    }

    #[test]
    fn test_dist_by_year() {
        let store = create_test_store();
        assert_eq!(
            store.movies().dist_by_year(),
            vec![(1996, 2), (2000, 3), (2016, 4)]
        );
    }

    #[test]
    fn test_dist_by_rating() {
        let store = create_test_store();
        assert_eq!(
            store.movies().dist_by_rating(),
            vec![
                (0.5, 1),
                (1.0, 1),
                (3.0, 2),
                (4.0, 2),
                (4.5, 1),
                (5.0, 2)
            ]
        );
    }

    #[test]
    fn test_top_by_num_of_ratings_breaks_ties_by_first_seen() {
        let store = create_test_store();
        let expected = vec![
            ("Toy Story (1995)".to_string(), 3),
            ("Heat (1995)".to_string(), 3),
        ];
        assert_eq!(store.movies().top_by_num_of_ratings(2), expected);
        // Same answer on a second call
        assert_eq!(store.movies().top_by_num_of_ratings(2), expected);
        assert!(store.movies().top_by_num_of_ratings(-1).is_empty());
    }

    #[test]
    fn test_top_by_ratings_skips_single_ratings() {
        let store = create_test_store();
        let by_average = store.movies().top_by_ratings(10, Metric::Average);
        // Toy Story: (4 + 5 + 4.5) / 3 = 4.5, Fargo: 3.5, Heat: 3.0.
        // Psycho has a single rating and is left out.
        assert_eq!(
            by_average,
            vec![
                ("Toy Story (1995)".to_string(), 4.5),
                ("Fargo (1996)".to_string(), 3.5),
                ("Heat (1995)".to_string(), 3.0)
            ]
        );

        let by_median = store.movies().top_by_ratings(1, Metric::Median);
        assert_eq!(by_median, vec![("Toy Story (1995)".to_string(), 4.5)]);
    }

    #[test]
    fn test_top_controversial_movies() {
        let store = create_test_store();
        let top = store.movies().top_controversial(2);
        // Heat: [5, 1, 3] -> variance 4.0; Toy Story: [4, 5, 4.5] -> 0.25;
        // Fargo: [3, 4] -> 0.5
        assert_eq!(
            top,
            vec![("Heat (1995)".to_string(), 4.0), ("Fargo (1996)".to_string(), 0.5)]
        );
    }

    #[test]
    fn test_average_rating_by_year_filters() {
        let store = create_test_store();
        let comedy_1995 = store
            .movies()
            .average_rating_by_year(Some("Comedy"), Some(1995));
        assert_eq!(
            comedy_1995,
            vec![
                YearRatingSummary {
                    year: 1996,
                    count: 1,
                    average_rating: 4.0
                },
                YearRatingSummary {
                    year: 2000,
                    count: 1,
                    average_rating: 5.0
                },
                YearRatingSummary {
                    year: 2016,
                    count: 1,
                    average_rating: 4.5
                },
            ]
        );

        let thrillers = store.movies().average_rating_by_year(Some("Thriller"), None);
        let years: Vec<i32> = thrillers.iter().map(|s| s.year).collect();
        assert_eq!(years, vec![1996, 2000, 2016]);
        // 2000: Heat 1.0 and Fargo 3.0
        assert_eq!(thrillers[1].count, 2);
        assert_eq!(thrillers[1].average_rating, 2.0);

        let everything = store.movies().average_rating_by_year(None, None);
        let total: usize = everything.iter().map(|s| s.count).sum();
        assert_eq!(total, store.ratings().len());

        assert!(store
            .movies()
            .average_rating_by_year(Some("Western"), None)
            .is_empty());
    }

    #[test]
    fn test_dist_by_num_of_ratings_counts_distinct_users() {
        let store = create_test_store();
        let dist = store.users().dist_by_num_of_ratings();
        // Users 1 and 2 both gave a 5.0; user 3 gave two 3.0s
        assert!(dist.contains(&(5.0, 2)));
        assert!(dist.contains(&(3.0, 1)));
        assert!(dist.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_dist_by_user_rating() {
        let store = create_test_store();
        // Means: user 1 4.5, user 2 3.0, user 3 3.5, user 4 2.25 -> 2.2
        assert_eq!(
            store.users().dist_by_user_rating(Metric::Average),
            vec![(2.2, 1), (3.0, 1), (3.5, 1), (4.5, 1)]
        );
        // Medians: 4.5, 3.0, 3.0, 2.25 -> 2.2
        assert_eq!(
            store.users().dist_by_user_rating(Metric::Median),
            vec![(2.2, 1), (3.0, 2), (4.5, 1)]
        );
    }

    #[test]
    fn test_top_controversial_users() {
        let store = create_test_store();
        // User 2: [1, 5] -> 8.0; user 4: [0.5, 4] -> 6.125 -> 6.12
        assert_eq!(store.users().top_controversial(2), vec![(2, 8.0), (4, 6.12)]);
        assert!(store.users().top_controversial(-3).is_empty());
    }

    #[test]
    fn test_genre_rating_trend_by_year() {
        let store = create_test_store();
        let trend = store.users().genre_rating_trend_by_year("Thriller");
        assert_eq!(
            trend,
            vec![
                YearTrend {
                    year: 1996,
                    average_rating: 5.0,
                    ratings: 1,
                    users: 1
                },
                YearTrend {
                    year: 2000,
                    average_rating: 2.0,
                    ratings: 2,
                    users: 2
                },
                YearTrend {
                    year: 2016,
                    average_rating: 3.5,
                    ratings: 2,
                    users: 2
                },
            ]
        );
        assert!(store.users().genre_rating_trend_by_year("Western").is_empty());
    }

    #[test]
    fn test_ratings_for_movies() {
        let store = create_test_store();
        assert_eq!(store.ratings_for_movies(&[3, 4]), vec![3.0, 0.5, 4.0]);
        assert!(store.ratings_for_movies(&[]).is_empty());
    }
}
