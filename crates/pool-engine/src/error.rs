//! Error types for pool-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PoolError {
    /// An input table is missing one or more required columns.
    #[error("Table '{table}' is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        table: &'static str,
        columns: Vec<String>,
    },

    /// A component code that the catalog does not know.
    #[error("Missing data: unknown component '{0}'")]
    MissingData(String),

    /// The most-time-unchanged selector was handed no lanes to choose from.
    #[error("No candidate lanes for component '{component}' at {changeout_date}")]
    EmptyCandidates {
        component: String,
        changeout_date: NaiveDate,
    },

    /// A cell could not be parsed. `row` is 1-based and excludes the header.
    #[error("Invalid record in '{table}' at row {row}: {message}")]
    InvalidRecord {
        table: &'static str,
        row: usize,
        message: String,
    },

    #[error("Unknown changeout type: '{0}'")]
    UnknownChangeoutType(String),

    #[error("Invalid week label: {0}")]
    InvalidWeek(String),

    /// A projected date falls outside the representable calendar.
    #[error("Date overflow: {date} + {days} days")]
    DateOverflow { date: NaiveDate, days: i64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PoolError>;
