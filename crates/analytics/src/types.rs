//! Report row types shared by the stores.

use anyhow::{Result, anyhow};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// How a group of ratings is summarised into one score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Average,
    Median,
}

impl Metric {
    pub(crate) fn apply(self, values: &[f64]) -> f64 {
        match self {
            Metric::Average => crate::stats::mean(values),
            Metric::Median => crate::stats::median(values),
        }
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "average" | "mean" => Ok(Metric::Average),
            "median" => Ok(Metric::Median),
            other => Err(anyhow!("unknown metric '{}', expected average or median", other)),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Average => write!(f, "average"),
            Metric::Median => write!(f, "median"),
        }
    }
}

/// Ratings received in one calendar year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearRatingSummary {
    pub year: i32,
    pub count: usize,
    /// Mean rating, rounded to 2 decimals
    pub average_rating: f64,
}

/// Ratings on one genre in one calendar year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearTrend {
    pub year: i32,
    /// Mean rating, rounded to 2 decimals
    pub average_rating: f64,
    pub ratings: usize,
    /// Distinct users who rated that year
    pub users: usize,
}
