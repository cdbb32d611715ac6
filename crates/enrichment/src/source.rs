//! The metadata capability and the batch lookups built on it.

use crate::error::Result;
use crate::types::{Field, MovieDetails, RatingInfo};
use std::cmp::Reverse;
use tracing::{info, warn};

/// Somewhere movie metadata can be fetched from, keyed by IMDb id
/// (the digits after `tt`, e.g. `"0114709"`).
pub trait MetadataSource {
    fn fetch_fields(&self, imdb_id: &str) -> Result<MovieDetails>;

    fn fetch_rating(&self, imdb_id: &str) -> Result<RatingInfo>;
}

/// Sort key for IMDb ids: numeric value, then text
fn id_key(imdb_id: &str) -> (u64, &str) {
    (imdb_id.parse().unwrap_or(0), imdb_id)
}

/// Fetch details for `ids` in order, stopping at the first failure.
///
/// Details gathered before the failure are kept.
pub fn fetch_details<S, I>(source: &S, ids: I) -> Vec<(String, MovieDetails)>
where
    S: MetadataSource + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut fetched = Vec::new();
    for id in ids {
        let id = id.as_ref();
        match source.fetch_fields(id) {
            Ok(details) => fetched.push((id.to_string(), details)),
            Err(e) => {
                warn!("Stopping metadata fetch at {}: {}", id, e);
                break;
            }
        }
    }
    info!("Fetched metadata for {} movies", fetched.len());
    fetched
}

/// Rows of `[id, field values...]` in the order of `fields`, highest id
/// first.
///
/// A failed fetch ends the batch; rows gathered before it are returned.
pub fn get_imdb<S, I>(source: &S, ids: I, fields: &[Field]) -> Vec<Vec<String>>
where
    S: MetadataSource + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut rows: Vec<Vec<String>> = fetch_details(source, ids)
        .into_iter()
        .map(|(id, details)| {
            let mut row = Vec::with_capacity(fields.len() + 1);
            row.push(id);
            row.extend(fields.iter().map(|&f| details.get(f).to_string()));
            row
        })
        .collect();
    rows.sort_by(|a, b| id_key(&b[0]).cmp(&id_key(&a[0])));
    rows
}

/// Title and rating for each id, best rated first.
///
/// Ids that fail to fetch are logged and left out; pages without a rating
/// sort as 0.
pub fn get_imdb_rating<S, I>(source: &S, ids: I) -> Vec<RatingInfo>
where
    S: MetadataSource + ?Sized,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut ratings: Vec<RatingInfo> = ids
        .into_iter()
        .filter_map(|id| match source.fetch_rating(id.as_ref()) {
            Ok(info) => Some(info),
            Err(e) => {
                warn!("Error fetching rating for movie {}: {}", id.as_ref(), e);
                None
            }
        })
        .collect();
    ratings.sort_by_key(|r| Reverse(score_key(r.score())));
    ratings
}

/// Rating on an integer grid so it can be used as a sort key
fn score_key(score: f64) -> i64 {
    (score * 100.0).round() as i64
}
