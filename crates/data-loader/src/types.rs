//! Core domain types for the MovieLens CSV dataset.
//!
//! Every record is created once while its file is loaded and never mutated
//! afterwards; the analytics layer only ever reads them.

use chrono::{DateTime, Datelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user
pub type UserId = u32;

/// Unique identifier for a movie (primary key of movies.csv)
pub type MovieId = u32;

/// A release year written as `(1995)` somewhere in a title
static YEAR_IN_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d{4})\)").expect("valid year pattern"));

// =============================================================================
// Movie-related Types
// =============================================================================

/// A row of movies.csv
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    /// Title as written in the file, usually ending with the release year,
    /// e.g. "Toy Story (1995)"
    pub title: String,
    /// Genres in file order; empty when the genres field is blank
    pub genres: Vec<String>,
}

impl MovieRecord {
    /// Release year embedded in the title, as written.
    ///
    /// The last `(dddd)` group wins, so "1900 (Novecento) (1976)" gives "1976".
    pub fn release_year_text(&self) -> Option<&str> {
        extract_year_text(&self.title)
    }

    /// Release year embedded in the title.
    pub fn release_year(&self) -> Option<u16> {
        extract_year_from_title(&self.title)
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// Extract the release year text from a movie title
///
/// Example: "Toy Story (1995)" -> Some("1995")
///          "Movie Title" -> None
///
/// The last `(dddd)` group anywhere in the title is used for both the release
/// distribution and the year filters, so the two always agree on a movie's year.
pub fn extract_year_text(title: &str) -> Option<&str> {
    YEAR_IN_TITLE
        .captures_iter(title)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Extract year from movie title
///
/// Example: "Toy Story (1995)" -> Some(1995)
///          "Movie Title" -> None
pub fn extract_year_from_title(title: &str) -> Option<u16> {
    extract_year_text(title)?.parse().ok()
}

// =============================================================================
// Rating and Tag Types
// =============================================================================

/// A single rating event from ratings.csv
///
/// Repeated (user, movie) pairs are kept; each one is an observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingEvent {
    pub user_id: UserId,
    pub movie_id: MovieId,
    /// Rating value on the 0.5 .. 5.0 half-star scale
    pub rating: f64,
    /// Unix timestamp when rating was made
    pub timestamp: i64,
}

impl RatingEvent {
    /// Calendar year (UTC) in which the rating was made.
    pub fn year(&self) -> Option<i32> {
        DateTime::from_timestamp(self.timestamp, 0).map(|dt| dt.year())
    }
}

/// A free-text tag from tags.csv
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub tag: String,
    pub timestamp: i64,
}

/// A row of links.csv, cross-referencing external databases
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub movie_id: MovieId,
    /// IMDb identifier without the `tt` prefix; kept as text to preserve
    /// the leading zeros ("0114709")
    pub imdb_id: String,
    /// Missing for a handful of movies
    pub tmdb_id: Option<u32>,
}

// =============================================================================
// Dataset - everything loaded from one data directory
// =============================================================================

/// Records loaded from a MovieLens directory.
///
/// Ratings and tags only contain events for movies present in `movies`.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub movies: Vec<MovieRecord>,
    pub ratings: Vec<RatingEvent>,
    pub tags: Vec<TagRecord>,
}

impl Dataset {
    /// Creates a new, empty Dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.movies.len(), self.ratings.len(), self.tags.len())
    }
}
