//! Period error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while resolving a period.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PeriodError {
    /// Unknown period token.
    #[error("Unknown period: {0}")]
    UnknownToken(String),

    /// Month outside 1..=12 or year out of range.
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth {
        /// Year.
        year: i32,
        /// Month.
        month: u32,
    },

    /// The local start of a day does not exist in the business timezone.
    #[error("No local midnight on {0}")]
    NonexistentLocalTime(NaiveDate),

    /// Date arithmetic overflowed.
    #[error("Date out of range")]
    OutOfRange,
}

impl From<PeriodError> for pdj_shared::AppError {
    fn from(err: PeriodError) -> Self {
        Self::Validation(err.to_string())
    }
}
