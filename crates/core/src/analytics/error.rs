//! Analytics error types.

use thiserror::Error;

use crate::period::PeriodError;

/// Failure reported by an [`OrderSource`](super::OrderSource).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct SourceError(pub String);

impl SourceError {
    /// Creates a source error from any displayable cause.
    pub fn new(cause: impl std::fmt::Display) -> Self {
        Self(cause.to_string())
    }
}

/// Errors that abort an analytics request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalyticsError {
    /// The requested period could not be resolved.
    #[error(transparent)]
    Period(#[from] PeriodError),

    /// Orders could not be fetched.
    #[error("Order source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// Orders were not fetched within the deadline.
    #[error("Order fetch timed out after {0}s")]
    Timeout(u64),
}

impl From<AnalyticsError> for pdj_shared::AppError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::Period(e) => e.into(),
            AnalyticsError::SourceUnavailable(_) => Self::Upstream(err.to_string()),
            AnalyticsError::Timeout(_) => Self::Timeout(err.to_string()),
        }
    }
}
