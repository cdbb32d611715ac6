//! Movie catalog: the loaded movies.csv rows and the queries over them.
//!
//! ## Ordering rules
//! - Distributions are sorted by descending count; equal counts keep the
//!   order in which the key first appeared in the file.
//! - Top-N queries reject negative `n` with a warning and an empty result.

use crate::ranking::{checked_limit, count_in_order, top_n};
use data_loader::{MovieId, MovieRecord, Result, parser};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, instrument};

/// The loaded movies, indexed by identifier
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<MovieRecord>,
    by_id: HashMap<MovieId, usize>,
}

impl Catalog {
    /// Build a catalog from records in file order.
    ///
    /// When an identifier repeats, lookups by id resolve to its first row.
    pub fn new(movies: Vec<MovieRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(movies.len());
        for (idx, movie) in movies.iter().enumerate() {
            by_id.entry(movie.id).or_insert(idx);
        }
        Self { movies, by_id }
    }

    /// Load movies.csv, keeping at most `max_rows` movies
    pub fn load(path: &Path, max_rows: Option<usize>) -> Result<Self> {
        Ok(Self::new(parser::load_movies(path, max_rows)?))
    }

    pub fn get_movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn get(&self, id: MovieId) -> Option<&MovieRecord> {
        self.by_id.get(&id).map(|&idx| &self.movies[idx])
    }

    pub fn title(&self, id: MovieId) -> Option<&str> {
        self.get(id).map(|m| m.title.as_str())
    }

    pub fn ids(&self) -> HashSet<MovieId> {
        self.by_id.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Identifier of the first movie whose title matches, ignoring case
    pub fn movie_id_by_title(&self, title: &str) -> Option<MovieId> {
        let wanted = title.to_lowercase();
        self.movies
            .iter()
            .find(|m| m.title.to_lowercase() == wanted)
            .map(|m| m.id)
    }

    /// Number of movies per release year ("1995" -> 224), most common first
    pub fn dist_by_release(&self) -> Vec<(String, usize)> {
        let years = self
            .movies
            .iter()
            .filter_map(|m| m.release_year_text().map(str::to_string));
        top_n(count_in_order(years), usize::MAX)
    }

    /// Number of movies per genre, most common first
    pub fn dist_by_genres(&self) -> Vec<(String, usize)> {
        let genres = self.movies.iter().flat_map(|m| m.genres.iter().cloned());
        top_n(count_in_order(genres), usize::MAX)
    }

    /// Movies with the most genres, as (title, number of genres)
    pub fn most_genres(&self, n: i64) -> Vec<(String, usize)> {
        let Some(n) = checked_limit(n, "most_genres") else {
            return Vec::new();
        };
        let counts = self
            .movies
            .iter()
            .map(|m| (m.title.clone(), m.genres.len()))
            .collect();
        top_n(counts, n)
    }

    /// Titles of movies tagged with exactly `genre`
    pub fn movies_by_genre(&self, genre: &str) -> Vec<&str> {
        self.movies
            .iter()
            .filter(|m| m.has_genre(genre))
            .map(|m| m.title.as_str())
            .collect()
    }

    /// Movies released in `year`, most "popular" first.
    ///
    /// A movie's popularity is the sum of the catalog-wide frequencies of
    /// its genres, so movies in many common genres come first.
    #[instrument(skip(self))]
    pub fn movies_by_year(&self, year: u16) -> Vec<&MovieRecord> {
        let marker = format!("({})", year);
        let movies: Vec<&MovieRecord> = self
            .movies
            .iter()
            .filter(|m| m.title.contains(&marker))
            .collect();
        if movies.is_empty() {
            return movies;
        }

        let frequency: HashMap<String, usize> = self.dist_by_genres().into_iter().collect();
        let local = top_n(
            count_in_order(movies.iter().flat_map(|m| m.genres.iter().cloned())),
            1,
        );
        debug!(
            "{} movies released in {}, most common genre: {:?}",
            movies.len(),
            year,
            local.first()
        );

        let scored = movies
            .into_iter()
            .map(|m| {
                let popularity: usize = m
                    .genres
                    .iter()
                    .map(|g| frequency.get(g).copied().unwrap_or(0))
                    .sum();
                (m, popularity)
            })
            .collect();
        top_n(scored, usize::MAX).into_iter().map(|(m, _)| m).collect()
    }

    /// Most frequent genre combinations ("Comedy|Drama" -> 54)
    ///
    /// Genres are sorted alphabetically before joining, so the order in the
    /// file does not matter. Movies without genres are ignored.
    pub fn common_genre_combinations(&self, n: i64) -> Vec<(String, usize)> {
        let Some(n) = checked_limit(n, "common_genre_combinations") else {
            return Vec::new();
        };
        let signatures = self
            .movies
            .iter()
            .filter(|m| !m.genres.is_empty())
            .map(|m| {
                let mut genres: Vec<&str> = m.genres.iter().map(String::as_str).collect();
                genres.sort_unstable();
                genres.join("|")
            });
        top_n(count_in_order(signatures), n)
    }
}
