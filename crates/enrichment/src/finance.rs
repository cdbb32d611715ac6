//! Yahoo Finance statement rows ("Total Revenue", "Cost of Revenue", ...).

use crate::error::Result;
use crate::html::find_elements;
use crate::http::{build_agent, fetch_text};
use serde::Serialize;
use std::fmt;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

pub const FINANCE_BASE_URL: &str = "https://finance.yahoo.com/quote";
pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);
const TIMEOUT: Duration = Duration::from_secs(15);

const HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/125.0.0.0 Safari/537.36",
    ),
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Upgrade-Insecure-Requests", "1"),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-User", "?1"),
];

/// One row of a financial statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FinancialRow {
    /// Non-empty cell texts of the row, the row title first
    Values(Vec<String>),
    /// The ticker or the row title is not on the page
    NotFound,
}

impl fmt::Display for FinancialRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinancialRow::Values(values) => write!(f, "({})", values.join(", ")),
            FinancialRow::NotFound => write!(f, "Wrong argument"),
        }
    }
}

/// Find the statement row titled `field` in a financials page
pub fn parse_financial_row(html: &str, field: &str) -> FinancialRow {
    let rows = find_elements(html, "div", |e| e.has_class("row"));
    let target = rows.into_iter().find(|row| {
        !find_elements(row.inner(), "div", |e| {
            e.attr("title") == Some(field) && e.text() == field
        })
        .is_empty()
    });

    match target {
        Some(row) => FinancialRow::Values(
            find_elements(row.inner(), "div", |e| e.has_class("column"))
                .iter()
                .map(|cell| cell.text())
                .filter(|text| !text.is_empty())
                .collect(),
        ),
        None => FinancialRow::NotFound,
    }
}

/// Fetches financial statements, pausing before every request
#[derive(Debug, Clone)]
pub struct FinanceClient {
    agent: ureq::Agent,
    base_url: String,
    delay: Duration,
}

impl Default for FinanceClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FinanceClient {
    pub fn new() -> Self {
        Self {
            agent: build_agent(TIMEOUT),
            base_url: FINANCE_BASE_URL.to_string(),
            delay: DEFAULT_DELAY,
        }
    }

    /// Pause before each request
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn financials_url(&self, ticker: &str) -> String {
        format!(
            "{}/{}/financials/?p={}",
            self.base_url,
            ticker.to_uppercase(),
            ticker.to_lowercase()
        )
    }

    /// Cells of the row titled `field` on the financials page of `ticker`.
    ///
    /// A blank ticker or field is `NotFound` without a request.
    pub fn financial_row(&self, ticker: &str, field: &str) -> Result<FinancialRow> {
        let (ticker, field) = (ticker.trim(), field.trim());
        if ticker.is_empty() || field.is_empty() {
            warn!("Ticker and field are both required");
            return Ok(FinancialRow::NotFound);
        }

        thread::sleep(self.delay);
        let page = fetch_text(&self.agent, &self.financials_url(ticker), HEADERS)?;
        let row = parse_financial_row(&page, field);
        if row == FinancialRow::NotFound {
            info!("No '{}' row for {}", field, ticker);
        }
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINANCIALS_PAGE: &str = r#"<div class="tableBody yf-t22klz">
  <div class="row lv-0 yf-t22klz">
    <div class="column sticky yf-t22klz"><div class="rowTitle yf-t22klz" title="Total Revenue">Total Revenue</div></div>
    <div class="column yf-t22klz">261,802,000</div>
    <div class="column alt yf-t22klz">245,122,000</div>
    <div class="column yf-t22klz"> </div>
  </div>
  <div class="row lv-0 yf-t22klz">
    <div class="column sticky yf-t22klz"><div class="rowTitle yf-t22klz" title="Cost of Revenue">Cost of Revenue</div></div>
    <div class="column yf-t22klz">79,920,000</div>
  </div>
</div>"#;

    #[test]
    fn test_parse_financial_row() {
        assert_eq!(
            parse_financial_row(FINANCIALS_PAGE, "Total Revenue"),
            FinancialRow::Values(vec![
                "Total Revenue".to_string(),
                "261,802,000".to_string(),
                "245,122,000".to_string()
            ])
        );
        assert_eq!(
            parse_financial_row(FINANCIALS_PAGE, "Cost of Revenue"),
            FinancialRow::Values(vec!["Cost of Revenue".to_string(), "79,920,000".to_string()])
        );
        assert_eq!(
            parse_financial_row(FINANCIALS_PAGE, "Net Income"),
            FinancialRow::NotFound
        );
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(FinancialRow::NotFound.to_string(), "Wrong argument");
        let row = FinancialRow::Values(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(row.to_string(), "(a, b)");
    }

    #[test]
    fn test_blank_arguments_skip_the_request() {
        let client = FinanceClient::new()
            .with_delay(Duration::ZERO)
            .with_base_url("http://127.0.0.1:9");
        assert_eq!(client.financial_row("", "Total Revenue").unwrap(), FinancialRow::NotFound);
        assert_eq!(client.financial_row("MSFT", "  ").unwrap(), FinancialRow::NotFound);
    }

    #[test]
    fn test_financials_url() {
        let client = FinanceClient::new();
        assert_eq!(
            client.financials_url("msft"),
            "https://finance.yahoo.com/quote/MSFT/financials/?p=msft"
        );
    }
}
