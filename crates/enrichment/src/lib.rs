//! # Enrichment Crate
//!
//! Metadata scraped from the web for movies in links.csv.
//!
//! ## Main Components
//!
//! - **source**: the `MetadataSource` trait plus `get_imdb` / `get_imdb_rating`
//! - **imdb**: `ImdbClient`, the blocking `ureq` implementation of the trait
//! - **links**: `Links`, the enriched links table and its reports
//! - **finance**: `FinanceClient`, statement rows from Yahoo Finance
//! - **error**: Error types for fetching and parsing
//!
//! Reports only see the trait, so they run against a fake source in tests.
//!
//! ```ignore
//! use enrichment::{ImdbClient, Links, DEFAULT_ENRICH_LIMIT};
//!
//! let client = ImdbClient::new();
//! let links = Links::load(Path::new("data/ml-latest-small/links.csv"), &client, DEFAULT_ENRICH_LIMIT)?;
//! for (director, movies) in links.top_directors(5) {
//!     println!("{director}: {movies}");
//! }
//! ```

pub mod error;
pub mod finance;
mod html;
mod http;
pub mod imdb;
pub mod links;
pub mod parse;
pub mod source;
pub mod types;

pub use error::{EnrichmentError, Result};
pub use finance::{FinanceClient, FinancialRow, parse_financial_row};
pub use html::{parse_details, parse_rating};
pub use imdb::ImdbClient;
pub use links::{DEFAULT_ENRICH_LIMIT, Links};
pub use source::{MetadataSource, fetch_details, get_imdb, get_imdb_rating};
pub use types::{Field, MovieDetails, RatingInfo};
