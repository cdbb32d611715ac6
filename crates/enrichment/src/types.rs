//! Scraped movie metadata.

use crate::error::EnrichmentError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A scrapeable property of a movie page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Field {
    Director,
    Budget,
    GrossWorldwide,
    GrossUsCanada,
    OpeningWeekendUsCanada,
    Runtime,
    Title,
}

impl Field {
    /// Every field, in the order the `Links` table requests them
    pub const ALL: [Field; 7] = [
        Field::Director,
        Field::Budget,
        Field::GrossWorldwide,
        Field::GrossUsCanada,
        Field::OpeningWeekendUsCanada,
        Field::Runtime,
        Field::Title,
    ];

    /// Label used on the page (box-office labels match it exactly)
    pub fn label(self) -> &'static str {
        match self {
            Field::Director => "Director",
            Field::Budget => "Budget",
            Field::GrossWorldwide => "Gross worldwide",
            Field::GrossUsCanada => "Gross US & Canada",
            Field::OpeningWeekendUsCanada => "Opening weekend US & Canada",
            Field::Runtime => "Runtime",
            Field::Title => "Title",
        }
    }

    /// Value used when the page does not provide the field
    pub fn sentinel(self) -> &'static str {
        match self {
            Field::Director => "Unknown",
            Field::Title => "-",
            _ => "0",
        }
    }

    fn from_label(label: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.label() == label)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Field {
    type Err = EnrichmentError;

    /// Accepts the page label ("Gross worldwide") or a short name
    /// ("gross-worldwide"), ignoring case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        let field = match wanted.as_str() {
            "director" => Field::Director,
            "budget" => Field::Budget,
            "gross-worldwide" | "gross worldwide" => Field::GrossWorldwide,
            "gross-us-canada" | "gross us & canada" => Field::GrossUsCanada,
            "opening-weekend" | "opening weekend us & canada" => Field::OpeningWeekendUsCanada,
            "runtime" => Field::Runtime,
            "title" => Field::Title,
            _ => return Err(EnrichmentError::UnknownField(s.to_string())),
        };
        Ok(field)
    }
}

/// Fields scraped from one title page, each holding its sentinel until a
/// value is found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovieDetails {
    pub director: String,
    pub budget: String,
    pub gross_worldwide: String,
    pub gross_us_canada: String,
    pub opening_weekend_us_canada: String,
    pub runtime: String,
    pub title: String,
}

impl Default for MovieDetails {
    fn default() -> Self {
        Self {
            director: Field::Director.sentinel().to_string(),
            budget: Field::Budget.sentinel().to_string(),
            gross_worldwide: Field::GrossWorldwide.sentinel().to_string(),
            gross_us_canada: Field::GrossUsCanada.sentinel().to_string(),
            opening_weekend_us_canada: Field::OpeningWeekendUsCanada.sentinel().to_string(),
            runtime: Field::Runtime.sentinel().to_string(),
            title: Field::Title.sentinel().to_string(),
        }
    }
}

impl MovieDetails {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Director => &self.director,
            Field::Budget => &self.budget,
            Field::GrossWorldwide => &self.gross_worldwide,
            Field::GrossUsCanada => &self.gross_us_canada,
            Field::OpeningWeekendUsCanada => &self.opening_weekend_us_canada,
            Field::Runtime => &self.runtime,
            Field::Title => &self.title,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Director => &mut self.director,
            Field::Budget => &mut self.budget,
            Field::GrossWorldwide => &mut self.gross_worldwide,
            Field::GrossUsCanada => &mut self.gross_us_canada,
            Field::OpeningWeekendUsCanada => &mut self.opening_weekend_us_canada,
            Field::Runtime => &mut self.runtime,
            Field::Title => &mut self.title,
        };
        *slot = value.into();
    }

    /// Set the field whose page label is `label`; unknown labels are ignored.
    /// Returns whether a field was set.
    pub fn set_by_label(&mut self, label: &str, value: impl Into<String>) -> bool {
        match Field::from_label(label) {
            Some(field) => {
                self.set(field, value);
                true
            }
            None => false,
        }
    }
}

/// Title and rating text from one title page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingInfo {
    pub imdb_id: String,
    pub title: String,
    /// Rating text as shown ("8.3/10"), when the page has one
    pub rating: Option<String>,
}

impl RatingInfo {
    pub const UNKNOWN_TITLE: &'static str = "Unknown Title";

    /// Numeric rating (the part before `/`), `0.0` when missing or unreadable
    pub fn score(&self) -> f64 {
        self.rating
            .as_deref()
            .and_then(|r| r.split('/').next())
            .and_then(|r| r.trim().parse::<f64>().ok())
            .unwrap_or(0.0)
    }
}
