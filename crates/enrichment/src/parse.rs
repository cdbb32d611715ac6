//! Numbers out of scraped text ("$30,000,000 (estimated)", "1 hour 21 minutes").

use regex::Regex;
use std::sync::LazyLock;

/// First amount in a string: grouped thousands or a plain digit run, with an
/// optional decimal part
static AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,3}(?:,\d{3})+|\d+)(\.\d+)?").expect("valid amount regex")
});

static HOURS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*h(?:ou)?r").expect("valid hours regex"));

static MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*min").expect("valid minutes regex"));

static PLAIN_MINUTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*$").expect("valid minutes regex"));

/// The first money amount in `text`, ignoring currency symbols and notes.
///
/// `"$30,000,000 (estimated)"` gives `30000000.0`; `"€1,234.50"` gives
/// `1234.5`. Text without digits gives `None`.
pub fn parse_money(text: &str) -> Option<f64> {
    let caps = AMOUNT.captures(text)?;
    let mut number = caps[1].replace(',', "");
    if let Some(fraction) = caps.get(2) {
        number.push_str(fraction.as_str());
    }
    number.parse().ok()
}

/// Runtime in minutes from text like `"2 hours 4 minutes"`, `"1hour"`,
/// `"45 min"` or a bare `"81"`
pub fn parse_runtime_minutes(text: &str) -> Option<u32> {
    let hours = HOURS
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok());
    let minutes = MINUTES
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok());

    match (hours, minutes) {
        (None, None) => PLAIN_MINUTES
            .captures(text)
            .and_then(|c| c[1].parse::<u32>().ok()),
        (h, m) => Some(h.unwrap_or(0) * 60 + m.unwrap_or(0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money_takes_first_amount() {
        assert_eq!(parse_money("$30,000,000 (estimated)"), Some(30_000_000.0));
        assert_eq!(parse_money("$394,436,586"), Some(394_436_586.0));
        assert_eq!(parse_money("€1,234.50"), Some(1234.5));
        // Digits after the first amount are not glued onto it
        assert_eq!(parse_money("$29,140,617, 26 Nov 1995"), Some(29_140_617.0));
        assert_eq!(parse_money("0"), Some(0.0));
        assert_eq!(parse_money("unknown"), None);
    }

    #[test]
    fn test_parse_runtime_minutes() {
        assert_eq!(parse_runtime_minutes("2 hours 4 minutes"), Some(124));
        assert_eq!(parse_runtime_minutes("1hour 21minutes"), Some(81));
        assert_eq!(parse_runtime_minutes("3 hours"), Some(180));
        assert_eq!(parse_runtime_minutes("58 minutes"), Some(58));
        assert_eq!(parse_runtime_minutes("81"), Some(81));
        assert_eq!(parse_runtime_minutes("0"), Some(0));
        assert_eq!(parse_runtime_minutes("-"), None);
    }
}
