//! # Analytics Crate
//!
//! Reports over the loaded MovieLens tables.
//!
//! ## Main Components
//!
//! - **movies**: `Catalog`, the movie table with release, genre and title queries
//! - **ratings**: `RatingStore` with its `MovieView` and `UserView` projections
//! - **tags**: `TagStore`, vocabulary and per-movie tag queries
//! - **ranking**: stable top-N and the shared negative-size check
//! - **stats**: mean, median, sample variance and rounding
//! - **types**: report rows and the `Metric` selector
//!
//! ## Example Usage
//!
//! ```ignore
//! use analytics::{Catalog, Metric, RatingStore};
//! use data_loader::parser;
//! use std::sync::Arc;
//!
//! let catalog = Arc::new(Catalog::load(movies_path, Some(1000))?);
//! let ids = catalog.ids();
//! let ratings = parser::load_ratings(ratings_path, Some(1000), Some(&ids))?;
//! let store = RatingStore::new(ratings, Arc::clone(&catalog));
//!
//! for (title, score) in store.movies().top_by_ratings(10, Metric::Average) {
//!     println!("{:.2}  {}", score, title);
//! }
//! ```

pub mod movies;
pub mod ranking;
pub mod ratings;
pub mod stats;
pub mod tags;
pub mod types;

pub use movies::Catalog;
pub use ratings::{MovieView, RatingStore, UserView};
pub use tags::TagStore;
pub use types::{Metric, YearRatingSummary, YearTrend};
