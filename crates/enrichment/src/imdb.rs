//! IMDb title pages as a [`MetadataSource`].

use crate::error::Result;
use crate::html;
use crate::http::{build_agent, fetch_text};
use crate::source::MetadataSource;
use crate::types::{MovieDetails, RatingInfo};
use std::time::Duration;
use tracing::debug;

pub const IMDB_BASE_URL: &str = "https://www.imdb.com/title";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/138.0.0.0 Safari/537.36",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Referer", "https://www.imdb.com/title/"),
    ("Upgrade-Insecure-Requests", "1"),
];

/// Scrapes `https://www.imdb.com/title/tt{id}/`, one blocking request per call
#[derive(Debug, Clone)]
pub struct ImdbClient {
    agent: ureq::Agent,
    base_url: String,
}

impl Default for ImdbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ImdbClient {
    pub fn new() -> Self {
        Self {
            agent: build_agent(DEFAULT_TIMEOUT),
            base_url: IMDB_BASE_URL.to_string(),
        }
    }

    /// Connect, read and write timeout for every request
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(timeout);
        self
    }

    /// Serve pages from another host (a mirror or a local test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn title_url(&self, imdb_id: &str) -> String {
        format!("{}/tt{}/", self.base_url, imdb_id)
    }

    fn fetch_page(&self, imdb_id: &str) -> Result<String> {
        let page = fetch_text(&self.agent, &self.title_url(imdb_id), HEADERS)?;
        debug!("Fetched {} bytes for tt{}", page.len(), imdb_id);
        Ok(page)
    }
}

impl MetadataSource for ImdbClient {
    fn fetch_fields(&self, imdb_id: &str) -> Result<MovieDetails> {
        Ok(html::parse_details(&self.fetch_page(imdb_id)?))
    }

    fn fetch_rating(&self, imdb_id: &str) -> Result<RatingInfo> {
        Ok(html::parse_rating(imdb_id, &self.fetch_page(imdb_id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_url() {
        let client = ImdbClient::new();
        assert_eq!(
            client.title_url("0114709"),
            "https://www.imdb.com/title/tt0114709/"
        );
        let mirror = ImdbClient::new().with_base_url("http://127.0.0.1:8080/title/");
        assert_eq!(mirror.title_url("1"), "http://127.0.0.1:8080/title/tt1/");
    }
}
