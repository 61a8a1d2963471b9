//! Error taxonomy for the core library.
//!
//! `LoadError` is fatal for a load attempt: no partial table is ever
//! returned. `UsageError` reports an invalid caller parameter without
//! touching shared state. Empty aggregation results are not errors.

use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),

    #[error("row {row}: invalid date `{value}`, expected MM/DD/YYYY hh:mm:ss AM/PM")]
    InvalidDate { row: usize, value: String },

    #[error("row {row}: invalid amount `{value}`")]
    InvalidAmount { row: usize, value: String },

    #[error("failed to read CSV input")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("end date {end} precedes start date {start}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },

    #[error("statistic `{statistic}` cannot be computed over `{value}`")]
    UnsupportedStatistic {
        statistic: &'static str,
        value: &'static str,
    },
}
