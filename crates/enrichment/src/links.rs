//! links.csv joined with scraped metadata, and the reports over it.

use analytics::ranking::{checked_limit, count_in_order, top_n};
use analytics::stats::round_to;
use crate::error::Result;
use crate::parse::{parse_money, parse_runtime_minutes};
use crate::source::{MetadataSource, fetch_details};
use crate::types::MovieDetails;
use data_loader::parser::{self, LINKS_HEADER};
use std::path::Path;
use tracing::{debug, instrument};

/// How many ids are enriched when no limit is given
pub const DEFAULT_ENRICH_LIMIT: usize = 10;

const IMDB_COLUMN: &str = "imdbId";

/// IMDb ids from links.csv, with details for the first few of them
#[derive(Debug, Clone, Default)]
pub struct Links {
    imdb_ids: Vec<String>,
    details: Vec<(String, MovieDetails)>,
}

impl Links {
    /// Read the imdbId column of `path` and enrich the first `limit` ids.
    ///
    /// Enrichment stops at the first failed fetch; the ids read from the
    /// file are kept regardless.
    #[instrument(skip(source))]
    pub fn load<S>(path: &Path, source: &S, limit: usize) -> Result<Self>
    where
        S: MetadataSource + ?Sized,
    {
        let imdb_ids = parser::read_column(path, LINKS_HEADER, IMDB_COLUMN, None)?;
        let details = fetch_details(source, imdb_ids.iter().take(limit));
        Ok(Self { imdb_ids, details })
    }

    /// A table over details that were already fetched
    pub fn from_details(details: Vec<(String, MovieDetails)>) -> Self {
        Self {
            imdb_ids: details.iter().map(|(id, _)| id.clone()).collect(),
            details,
        }
    }

    /// Every IMDb id read from the file, in file order
    pub fn imdb_ids(&self) -> &[String] {
        &self.imdb_ids
    }

    /// Fetched (id, details) pairs, in fetch order
    pub fn details(&self) -> &[(String, MovieDetails)] {
        &self.details
    }

    /// (title, value) for every movie where `value` yields something
    fn per_title<V>(&self, value: impl Fn(&MovieDetails) -> Option<V>) -> Vec<(String, V)> {
        self.details
            .iter()
            .filter_map(|(id, d)| match value(d) {
                Some(v) => Some((d.title.clone(), v)),
                None => {
                    debug!("Skipping {} ({}): unparseable value", d.title, id);
                    None
                }
            })
            .collect()
    }

    /// Directors by number of fetched movies
    pub fn top_directors(&self, n: i64) -> Vec<(String, usize)> {
        let Some(n) = checked_limit(n, "top_directors") else {
            return Vec::new();
        };
        let directors = self.details.iter().map(|(_, d)| d.director.clone());
        top_n(count_in_order(directors), n)
    }

    /// Movies by budget
    pub fn most_expensive(&self, n: i64) -> Vec<(String, f64)> {
        let Some(n) = checked_limit(n, "most_expensive") else {
            return Vec::new();
        };
        top_n(self.per_title(|d| parse_money(&d.budget)), n)
    }

    /// Movies by worldwide gross minus budget
    pub fn most_profitable(&self, n: i64) -> Vec<(String, f64)> {
        let Some(n) = checked_limit(n, "most_profitable") else {
            return Vec::new();
        };
        let profits = self.per_title(|d| {
            Some(parse_money(&d.gross_worldwide)? - parse_money(&d.budget)?)
        });
        top_n(profits, n)
    }

    /// Movies by runtime in minutes
    pub fn longest(&self, n: i64) -> Vec<(String, u32)> {
        let Some(n) = checked_limit(n, "longest") else {
            return Vec::new();
        };
        top_n(self.per_title(|d| parse_runtime_minutes(&d.runtime)), n)
    }

    /// Movies by budget per minute of runtime, rounded to 2 decimals.
    /// Movies without a positive runtime are left out.
    pub fn top_cost_per_minute(&self, n: i64) -> Vec<(String, f64)> {
        let Some(n) = checked_limit(n, "top_cost_per_minute") else {
            return Vec::new();
        };
        let costs = self.per_title(|d| {
            let minutes = parse_runtime_minutes(&d.runtime).filter(|&m| m > 0)?;
            let budget = parse_money(&d.budget)?;
            Some(round_to(budget / f64::from(minutes), 2))
        });
        top_n(costs, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Field;

    fn movie(
        title: &str,
        director: &str,
        budget: &str,
        gross: &str,
        runtime: &str,
    ) -> MovieDetails {
        let mut d = MovieDetails::default();
        d.set(Field::Title, title);
        d.set(Field::Director, director);
        d.set(Field::Budget, budget);
        d.set(Field::GrossWorldwide, gross);
        d.set(Field::Runtime, runtime);
        d
    }

    fn create_test_links() -> Links {
        Links::from_details(vec![
            (
                "0114709".to_string(),
                movie(
                    "Toy Story",
                    "John Lasseter",
                    "$30,000,000 (estimated)",
                    "$394,436,586",
                    "1 hour 21 minutes",
                ),
            ),
            (
                "0113497".to_string(),
                movie(
                    "Jumanji",
                    "Joe Johnston",
                    "$65,000,000 (estimated)",
                    "$262,821,940",
                    "1 hour 44 minutes",
                ),
            ),
            (
                "0120363".to_string(),
                movie(
                    "Toy Story 2",
                    "John Lasseter",
                    "$90,000,000 (estimated)",
                    "$511,358,276",
                    "1 hour 32 minutes",
                ),
            ),
            (
                "0113228".to_string(),
                movie("Grumpier Old Men", "Howard Deutch", "0", "0", "1 hour 41 minutes"),
            ),
            (
                "0114576".to_string(),
                movie("Sudden Death", "Peter Hyams", "$35,000,000 (estimated)", "unknown", "0"),
            ),
        ])
    }

    #[test]
    fn test_top_directors() {
        let links = create_test_links();
        assert_eq!(
            links.top_directors(2),
            vec![
                ("John Lasseter".to_string(), 2),
                ("Joe Johnston".to_string(), 1)
            ]
        );
        assert!(links.top_directors(-1).is_empty());
    }

    #[test]
    fn test_negative_limits_report_nothing() {
        let links = create_test_links();
        assert!(links.most_expensive(-1).is_empty());
        assert!(links.most_profitable(-3).is_empty());
        assert!(links.longest(-1).is_empty());
        assert!(links.top_cost_per_minute(-1).is_empty());
        assert!(links.longest(0).is_empty());
    }

    #[test]
    fn test_most_expensive() {
        let links = create_test_links();
        assert_eq!(
            links.most_expensive(3),
            vec![
                ("Toy Story 2".to_string(), 90_000_000.0),
                ("Jumanji".to_string(), 65_000_000.0),
                ("Sudden Death".to_string(), 35_000_000.0)
            ]
        );
    }

    #[test]
    fn test_most_profitable_skips_unparseable() {
        let links = create_test_links();
        let profits = links.most_profitable(10);
        assert_eq!(profits.len(), 4);
        assert_eq!(profits[0], ("Toy Story 2".to_string(), 421_358_276.0));
        assert_eq!(profits[1], ("Toy Story".to_string(), 364_436_586.0));
        assert!(profits.iter().all(|(title, _)| title != "Sudden Death"));
    }

    #[test]
    fn test_longest() {
        let links = create_test_links();
        assert_eq!(
            links.longest(2),
            vec![
                ("Jumanji".to_string(), 104),
                ("Grumpier Old Men".to_string(), 101)
            ]
        );
    }

    #[test]
    fn test_top_cost_per_minute() {
        let links = create_test_links();
        let costs = links.top_cost_per_minute(10);
        // 90,000,000 / 92 = 978260.869..., 65,000,000 / 104 = 625000
        assert_eq!(costs[0], ("Toy Story 2".to_string(), 978_260.87));
        assert_eq!(costs[1], ("Jumanji".to_string(), 625_000.0));
        // Sudden Death has no runtime
        assert!(costs.iter().all(|(title, _)| title != "Sudden Death"));
    }
}
