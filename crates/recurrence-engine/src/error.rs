//! Error types for recurrence-engine boundary operations.
//!
//! Matching, clipping, expansion and formatting are total and never produce
//! these. Only parsing at the edges (wire objects, day names, date strings,
//! time zone resolution) is fallible.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecurrenceError {
    #[error("Unknown pattern type: {0}")]
    UnknownPatternType(String),

    #[error("Unknown range type: {0}")]
    UnknownRangeType(String),

    #[error("Unknown day of week: {0}")]
    UnknownDayOfWeek(String),

    #[error("Invalid interval: {0} (must be at least 1)")]
    InvalidInterval(i64),

    #[error("Invalid number of occurrences: {0} (must be at least 1)")]
    InvalidOccurrenceCount(i64),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid datetime: {0}")]
    InvalidDateTime(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RecurrenceError>;
