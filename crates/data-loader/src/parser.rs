//! Parser for MovieLens CSV files.
//!
//! This module handles the four comma-separated files of the dataset:
//! - movies.csv:  movieId,title,genres
//! - ratings.csv: userId,movieId,rating,timestamp
//! - tags.csv:    userId,movieId,tag,timestamp
//! - links.csv:   movieId,imdbId,tmdbId
//!
//! [`RecordLoader`] turns a file into [`Row`]s: the header must match
//! exactly, malformed rows are skipped one by one, and reading stops once
//! the row cap is reached. The typed loaders below convert rows into the
//! records of [`crate::types`].

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const MOVIES_HEADER: &[&str] = &["movieId", "title", "genres"];
pub const RATINGS_HEADER: &[&str] = &["userId", "movieId", "rating", "timestamp"];
pub const TAGS_HEADER: &[&str] = &["userId", "movieId", "tag", "timestamp"];
pub const LINKS_HEADER: &[&str] = &["movieId", "imdbId", "tmdbId"];

/// Column used by the admissible-identifier filter
const MOVIE_ID_COLUMN: &str = "movieId";

/// One data line of a CSV file, addressable by column name.
///
/// A row always has exactly as many values as its header has columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    headers: Arc<[String]>,
    values: Vec<String>,
    line: usize,
}

impl Row {
    /// Value of the named column, if the header has it
    pub fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .iter()
            .position(|h| h == column)
            .map(|idx| self.values[idx].as_str())
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 1-based line number in the source file
    pub fn line(&self) -> usize {
        self.line
    }
}

/// Reads a CSV file into rows, validating its header.
///
/// ```ignore
/// let rows = RecordLoader::new("data/ratings.csv", RATINGS_HEADER)
///     .max_rows(1000)
///     .admissible_ids(&movie_ids)
///     .load()?;
/// ```
pub struct RecordLoader<'a> {
    path: PathBuf,
    headers: Vec<&'a [&'a str]>,
    max_rows: Option<usize>,
    admissible: Option<&'a HashSet<MovieId>>,
}

impl<'a> RecordLoader<'a> {
    pub fn new(path: impl AsRef<Path>, header: &'a [&'a str]) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            headers: vec![header],
            max_rows: None,
            admissible: None,
        }
    }

    /// Accept a second header shape as well (builder pattern)
    pub fn or_header(mut self, header: &'a [&'a str]) -> Self {
        self.headers.push(header);
        self
    }

    /// Stop after this many accepted rows
    pub fn max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Optional variant of [`RecordLoader::max_rows`]
    pub fn max_rows_opt(mut self, max_rows: Option<usize>) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Only keep rows whose `movieId` parses and is in `ids`
    pub fn admissible_ids(mut self, ids: &'a HashSet<MovieId>) -> Self {
        self.admissible = Some(ids);
        self
    }

    /// Optional variant of [`RecordLoader::admissible_ids`]
    pub fn admissible_ids_opt(mut self, ids: Option<&'a HashSet<MovieId>>) -> Self {
        self.admissible = ids;
        self
    }

    /// Read the file.
    ///
    /// Fails when the file cannot be opened or its header is not one of the
    /// accepted shapes. Individual bad rows are skipped.
    pub fn load(&self) -> Result<Vec<Row>> {
        let path_str = self.path.display().to_string();
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
                path: path_str.clone(),
            },
            _ => DataLoadError::IoError(e),
        })?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let found: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if !self
            .headers
            .iter()
            .any(|expected| expected.iter().copied().eq(found.iter().map(String::as_str)))
        {
            return Err(DataLoadError::HeaderMismatch {
                path: path_str,
                expected: self.headers[0].join(","),
                found: found.join(","),
            });
        }

        let id_idx = found.iter().position(|h| h == MOVIE_ID_COLUMN);
        if self.admissible.is_some() && id_idx.is_none() {
            return Err(DataLoadError::InvalidValue {
                field: "header".to_string(),
                value: format!("'{}' has no {} column", found.join(","), MOVIE_ID_COLUMN),
            });
        }

        let headers: Arc<[String]> = found.into();
        let mut rows = Vec::new();
        let mut skipped = 0usize;

        for result in reader.records() {
            if self.max_rows.is_some_and(|max| rows.len() >= max) {
                break;
            }

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    debug!("Skipping unreadable row in {}: {}", path_str, e);
                    skipped += 1;
                    continue;
                }
            };
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

            if record.len() != headers.len() {
                debug!(
                    "Skipping line {} in {}: expected {} fields, found {}",
                    line,
                    path_str,
                    headers.len(),
                    record.len()
                );
                skipped += 1;
                continue;
            }

            if let (Some(ids), Some(idx)) = (self.admissible, id_idx) {
                let admitted = record[idx]
                    .parse::<MovieId>()
                    .is_ok_and(|id| ids.contains(&id));
                if !admitted {
                    skipped += 1;
                    continue;
                }
            }

            rows.push(Row {
                headers: headers.clone(),
                values: record.iter().map(str::to_string).collect(),
                line,
            });
        }

        debug!(
            "Read {} rows from {} ({} skipped)",
            rows.len(),
            path_str,
            skipped
        );
        Ok(rows)
    }

    /// Like [`RecordLoader::load`], but a failed load is logged and yields
    /// no rows.
    pub fn load_or_empty(&self) -> Vec<Row> {
        self.load().unwrap_or_else(|e| {
            warn!("Failed to load {}: {}", self.path.display(), e);
            Vec::new()
        })
    }
}

/// Parse the movies.csv file
///
/// Format: movieId,title,genres
///
/// Titles containing commas are quoted: `11,"American President, The (1995)",Comedy|Drama|Romance`.
/// Genres are pipe-separated: "Animation|Children|Comedy"
pub fn load_movies(path: &Path, max_rows: Option<usize>) -> Result<Vec<MovieRecord>> {
    let rows = RecordLoader::new(path, MOVIES_HEADER)
        .max_rows_opt(max_rows)
        .load()?;
    Ok(collect_rows(path, &rows, movie_from_row))
}

/// Parse the ratings.csv file
///
/// Format: userId,movieId,rating,timestamp
///
/// The tag-form header (userId,movieId,tag,timestamp) is accepted too; its
/// third column is then read as the rating value.
pub fn load_ratings(
    path: &Path,
    max_rows: Option<usize>,
    admissible: Option<&HashSet<MovieId>>,
) -> Result<Vec<RatingEvent>> {
    let rows = RecordLoader::new(path, RATINGS_HEADER)
        .or_header(TAGS_HEADER)
        .max_rows_opt(max_rows)
        .admissible_ids_opt(admissible)
        .load()?;
    Ok(collect_rows(path, &rows, rating_from_row))
}

/// Parse the tags.csv file
///
/// Format: userId,movieId,tag,timestamp
pub fn load_tags(
    path: &Path,
    max_rows: Option<usize>,
    admissible: Option<&HashSet<MovieId>>,
) -> Result<Vec<TagRecord>> {
    let rows = RecordLoader::new(path, TAGS_HEADER)
        .max_rows_opt(max_rows)
        .admissible_ids_opt(admissible)
        .load()?;
    Ok(collect_rows(path, &rows, tag_from_row))
}

/// Parse the links.csv file
///
/// Format: movieId,imdbId,tmdbId
pub fn load_links(
    path: &Path,
    max_rows: Option<usize>,
    admissible: Option<&HashSet<MovieId>>,
) -> Result<Vec<LinkRecord>> {
    let rows = RecordLoader::new(path, LINKS_HEADER)
        .max_rows_opt(max_rows)
        .admissible_ids_opt(admissible)
        .load()?;
    Ok(collect_rows(path, &rows, link_from_row))
}

/// Values of a single column, in file order
///
/// Example: `read_column(links, LINKS_HEADER, "imdbId", None)` gives
/// `["0114709", "0113497", ...]`
pub fn read_column(
    path: &Path,
    header: &[&str],
    column: &str,
    admissible: Option<&HashSet<MovieId>>,
) -> Result<Vec<String>> {
    if !header.contains(&column) {
        return Err(DataLoadError::InvalidValue {
            field: "column".to_string(),
            value: column.to_string(),
        });
    }
    let rows = RecordLoader::new(path, header)
        .admissible_ids_opt(admissible)
        .load()?;
    Ok(rows
        .iter()
        .filter_map(|row| row.get(column).map(str::to_string))
        .collect())
}

/// First `count` data lines of a file, header excluded, as raw text
pub fn head_lines(path: &Path, count: usize) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    BufReader::new(file)
        .lines()
        .skip(1)
        .take(count)
        .map(|line| line.map_err(DataLoadError::from))
        .collect()
}

/// Convert rows with `parse`, logging and dropping the ones that fail
fn collect_rows<T>(path: &Path, rows: &[Row], parse: fn(&Row, &str) -> Result<T>) -> Vec<T> {
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut skipped = 0usize;
    let records: Vec<T> = rows
        .iter()
        .filter_map(|row| match parse(row, &file) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("{}", e);
                skipped += 1;
                None
            }
        })
        .collect();
    info!("Loaded {} records from {} ({} rejected)", records.len(), file, skipped);
    records
}

fn field<'r>(row: &'r Row, file: &str, column: &str) -> Result<&'r str> {
    row.get(column).ok_or_else(|| DataLoadError::ParseError {
        file: file.to_string(),
        line: row.line(),
        reason: format!("Missing {}", column),
    })
}

fn parse_field<T>(row: &Row, file: &str, column: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    field(row, file, column)?
        .parse()
        .map_err(|e| DataLoadError::ParseError {
            file: file.to_string(),
            line: row.line(),
            reason: format!("Invalid {}: {}", column, e),
        })
}

fn movie_from_row(row: &Row, file: &str) -> Result<MovieRecord> {
    Ok(MovieRecord {
        id: parse_field(row, file, "movieId")?,
        title: field(row, file, "title")?.to_string(),
        genres: parse_genres(field(row, file, "genres")?),
    })
}

fn rating_from_row(row: &Row, file: &str) -> Result<RatingEvent> {
    let value_column = if row.get("rating").is_some() { "rating" } else { "tag" };
    Ok(RatingEvent {
        user_id: parse_field(row, file, "userId")?,
        movie_id: parse_field(row, file, "movieId")?,
        rating: parse_field(row, file, value_column)?,
        timestamp: parse_field(row, file, "timestamp")?,
    })
}

fn tag_from_row(row: &Row, file: &str) -> Result<TagRecord> {
    let tag = field(row, file, "tag")?;
    if tag.is_empty() {
        return Err(DataLoadError::InvalidValue {
            field: "tag".to_string(),
            value: format!("<empty> at line {}", row.line()),
        });
    }
    Ok(TagRecord {
        user_id: parse_field(row, file, "userId")?,
        movie_id: parse_field(row, file, "movieId")?,
        tag: tag.to_string(),
        timestamp: parse_field(row, file, "timestamp")?,
    })
}

fn link_from_row(row: &Row, file: &str) -> Result<LinkRecord> {
    let tmdb = field(row, file, "tmdbId")?;
    Ok(LinkRecord {
        movie_id: parse_field(row, file, "movieId")?,
        imdb_id: field(row, file, "imdbId")?.to_string(),
        tmdb_id: if tmdb.is_empty() {
            None
        } else {
            Some(parse_field(row, file, "tmdbId")?)
        },
    })
}

/// Parse pipe-separated genres
///
/// Example: "Action|Adventure|Sci-Fi" -> vec!["Action", "Adventure", "Sci-Fi"]
fn parse_genres(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split('|').map(|g| g.trim().to_string()).collect()
}
