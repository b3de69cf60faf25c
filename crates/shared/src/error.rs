//! Application-wide error types.
//!
//! Domain crates keep their own error enums and convert into [`AppError`] at the
//! boundary where a response has to be produced.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Business rule violation.
    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    /// Conflict (e.g., invoice already generated for the period).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Upstream data source could not be reached.
    #[error("Upstream unavailable: {0}")]
    Upstream(String),

    /// Upstream call exceeded its deadline.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Validation(_) => 400,
            Self::BusinessRule(_) => 422,
            Self::Conflict(_) => 409,
            Self::Upstream(_) => 503,
            Self::Timeout(_) => 504,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation_error",
            Self::BusinessRule(_) => "business_rule_violation",
            Self::Conflict(_) => "conflict",
            Self::Database(_) => "database_error",
            Self::Upstream(_) => "upstream_unavailable",
            Self::Timeout(_) => "timeout",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Whether the caller may reasonably retry the same request.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Upstream(_) | Self::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AppError::NotFound(String::new()), 404, "not_found")]
    #[case(AppError::Validation(String::new()), 400, "validation_error")]
    #[case(AppError::BusinessRule(String::new()), 422, "business_rule_violation")]
    #[case(AppError::Conflict(String::new()), 409, "conflict")]
    #[case(AppError::Database(String::new()), 500, "database_error")]
    #[case(AppError::Upstream(String::new()), 503, "upstream_unavailable")]
    #[case(AppError::Timeout(String::new()), 504, "timeout")]
    #[case(AppError::Internal(String::new()), 500, "internal_error")]
    fn test_status_and_error_code(
        #[case] error: AppError,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        assert_eq!(error.status_code(), status);
        assert_eq!(error.error_code(), code);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Conflict("invoice exists".into()).to_string(),
            "Conflict: invoice exists"
        );
        assert_eq!(
            AppError::Upstream("orders".into()).to_string(),
            "Upstream unavailable: orders"
        );
        assert_eq!(
            AppError::Timeout("orders".into()).to_string(),
            "Timed out: orders"
        );
    }

    #[test]
    fn test_only_transient_errors_are_retryable() {
        assert!(AppError::Upstream(String::new()).is_retryable());
        assert!(AppError::Timeout(String::new()).is_retryable());
        assert!(!AppError::Conflict(String::new()).is_retryable());
        assert!(!AppError::Validation(String::new()).is_retryable());
    }
}
