//! Order numbering error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while formatting, parsing, or allocating order numbers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderNumberError {
    /// The string is not of the form `PDJ-YYYYMMDD-NNN`.
    #[error("Invalid order number: {0}")]
    InvalidFormat(String),

    /// Sequence outside `1..=999`.
    #[error("Sequence {0} is outside 1..=999")]
    SequenceOutOfRange(u32),

    /// Every sequence value of the day has been used.
    #[error("Daily order sequence exhausted for {0}")]
    SequenceExhausted(NaiveDate),

    /// The sequence store failed.
    #[error("Sequence storage error: {0}")]
    Storage(String),
}

impl From<OrderNumberError> for pdj_shared::AppError {
    fn from(err: OrderNumberError) -> Self {
        match err {
            OrderNumberError::InvalidFormat(_) | OrderNumberError::SequenceOutOfRange(_) => {
                Self::Validation(err.to_string())
            }
            OrderNumberError::SequenceExhausted(_) => Self::BusinessRule(err.to_string()),
            OrderNumberError::Storage(_) => Self::Database(err.to_string()),
        }
    }
}
