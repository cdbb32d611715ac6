//! # Data Loader Crate
//!
//! This crate handles loading the MovieLens "latest-small" CSV dataset.
//!
//! ## Main Components
//!
//! - **types**: Core records (MovieRecord, RatingEvent, TagRecord, LinkRecord, Dataset)
//! - **parser**: Header-validated CSV rows and the typed loaders built on them
//! - **dataset**: Load a whole data directory with consistent movie filtering
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::{Dataset, LoadOptions};
//! use std::path::Path;
//!
//! // First 1000 rows of every file, ratings/tags restricted to loaded movies
//! let dataset = Dataset::load_from_dir(Path::new("data/ml-latest-small"), &LoadOptions::default())?;
//!
//! let (movies, ratings, tags) = dataset.counts();
//! println!("{} movies, {} ratings, {} tags", movies, ratings, tags);
//! ```

// Public modules
pub mod dataset;
pub mod error;
pub mod parser;
pub mod types;

// Re-export commonly used types for convenience
pub use dataset::{DEFAULT_MAX_ROWS, LoadOptions, movie_ids};
pub use error::{DataLoadError, Result};
pub use parser::{RecordLoader, Row};
pub use types::{
    // Type aliases
    MovieId,
    UserId,
    // Core types
    Dataset,
    LinkRecord,
    MovieRecord,
    RatingEvent,
    TagRecord,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_creation() {
        // Test that we can create an empty Dataset
        let dataset = Dataset::new();
        let (movies, ratings, tags) = dataset.counts();

        assert_eq!(movies, 0);
        assert_eq!(ratings, 0);
        assert_eq!(tags, 0);
    }

    #[test]
    fn test_movie_ids() {
        let movies = vec![
            MovieRecord {
                id: 1,
                title: "Toy Story (1995)".to_string(),
                genres: vec!["Animation".to_string()],
            },
            MovieRecord {
                id: 1193,
                title: "One Flew Over the Cuckoo's Nest (1975)".to_string(),
                genres: vec!["Drama".to_string()],
            },
        ];

        let ids = movie_ids(&movies);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&1193));
        assert!(!ids.contains(&2));
    }
}
