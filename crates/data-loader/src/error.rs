//! Error types for the data-loader crate.
//!
//! Row-level problems (wrong field count, bad identifiers) never surface here:
//! the loader skips those rows and keeps going. These variants describe
//! failures of a whole load, so callers can tell "no data" apart from
//! "the file could not be read".

use thiserror::Error;

/// Errors that can occur during data loading and parsing
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The CSV reader failed before any row could be produced
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The first line of the file is not the header we expect
    #[error("Unexpected header in {path}: expected '{expected}', found '{found}'")]
    HeaderMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// Line in data file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
