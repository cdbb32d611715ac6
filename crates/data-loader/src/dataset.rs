//! Dataset loading for a MovieLens data directory.
//!
//! Movies are read first; their identifiers become the admissible set for
//! ratings and tags, so every event loaded refers to a known movie.

use crate::error::Result;
use crate::parser;
use crate::types::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Rows read from each file unless configured otherwise
pub const DEFAULT_MAX_ROWS: usize = 1000;

/// Where the four files of a dataset live and how much of each to read.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub movies_file: String,
    pub ratings_file: String,
    pub tags_file: String,
    pub links_file: String,
    /// Cap on accepted rows per file; `None` reads everything
    pub max_rows: Option<usize>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            movies_file: "movies.csv".to_string(),
            ratings_file: "ratings.csv".to_string(),
            tags_file: "tags.csv".to_string(),
            links_file: "links.csv".to_string(),
            max_rows: Some(DEFAULT_MAX_ROWS),
        }
    }
}

impl LoadOptions {
    pub fn with_max_rows(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn movies_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.movies_file)
    }

    pub fn ratings_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.ratings_file)
    }

    pub fn tags_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.tags_file)
    }

    pub fn links_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.links_file)
    }
}

impl Dataset {
    /// Load movies, ratings and tags from a directory
    ///
    /// Steps:
    /// 1. Parse movies.csv (capped)
    /// 2. Collect the movie ids
    /// 3. Parse ratings.csv and tags.csv, keeping only rows for those ids
    #[instrument(skip(options), fields(max_rows = ?options.max_rows))]
    pub fn load_from_dir(data_dir: &Path, options: &LoadOptions) -> Result<Self> {
        info!("Loading MovieLens dataset from {:?}", data_dir);

        let movies = parser::load_movies(&options.movies_path(data_dir), options.max_rows)?;
        let movie_ids = movie_ids(&movies);

        let ratings = parser::load_ratings(
            &options.ratings_path(data_dir),
            options.max_rows,
            Some(&movie_ids),
        )?;
        let tags = parser::load_tags(
            &options.tags_path(data_dir),
            options.max_rows,
            Some(&movie_ids),
        )?;

        let dataset = Dataset {
            movies,
            ratings,
            tags,
        };
        let (movies, ratings, tags) = dataset.counts();
        info!(
            "Loaded {} movies, {} ratings, {} tags",
            movies, ratings, tags
        );
        Ok(dataset)
    }

    /// Identifiers of every loaded movie
    pub fn movie_ids(&self) -> HashSet<MovieId> {
        movie_ids(&self.movies)
    }
}

/// Identifiers of `movies`, for use as an admissible-id filter
pub fn movie_ids(movies: &[MovieRecord]) -> HashSet<MovieId> {
    movies.iter().map(|m| m.id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_dataset(dir: &Path) {
        fs::write(
            dir.join("movies.csv"),
            "movieId,title,genres\n\
             1,Toy Story (1995),Adventure|Animation|Children|Comedy|Fantasy\n\
             2,Jumanji (1995),Adventure|Children|Fantasy\n\
             3,Grumpier Old Men (1995),Comedy|Romance\n",
        )
        .unwrap();
        fs::write(
            dir.join("ratings.csv"),
            "userId,movieId,rating,timestamp\n\
             1,1,4.0,964982703\n\
             1,3,4.0,964981247\n\
             1,999,5.0,964982224\n\
             2,2,3.5,1445714835\n",
        )
        .unwrap();
        fs::write(
            dir.join("tags.csv"),
            "userId,movieId,tag,timestamp\n\
             2,1,pixar,1445714994\n\
             2,42,unknown movie,1445714996\n",
        )
        .unwrap();
    }

    #[test]
    fn test_load_from_dir_filters_unknown_movies() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());

        let dataset = Dataset::load_from_dir(dir.path(), &LoadOptions::default()).unwrap();
        assert_eq!(dataset.counts(), (3, 3, 1));
        assert!(dataset.ratings.iter().all(|r| r.movie_id != 999));
        assert_eq!(dataset.tags[0].tag, "pixar");
    }

    #[test]
    fn test_row_cap_applies_per_file() {
        let dir = TempDir::new().unwrap();
        write_dataset(dir.path());

        let options = LoadOptions::default().with_max_rows(Some(2));
        let dataset = Dataset::load_from_dir(dir.path(), &options).unwrap();
        assert_eq!(dataset.movies.len(), 2);
        // Movie 3 is no longer admissible, so only (1,1) and (2,2) remain
        assert_eq!(dataset.ratings.len(), 2);
    }

    #[test]
    fn test_load_dataset() {
        // This test requires the actual dataset files
        // Place ml-latest-small in ../../data/ml-latest-small/
        let data_dir = Path::new("../../data/ml-latest-small");

        if data_dir.exists() {
            let dataset = Dataset::load_from_dir(data_dir, &LoadOptions::default()).unwrap();
            let (movies, ratings, tags) = dataset.counts();

            assert_eq!(movies, DEFAULT_MAX_ROWS);
            assert!(ratings <= DEFAULT_MAX_ROWS);
            assert!(tags <= DEFAULT_MAX_ROWS);
        }
    }
}
