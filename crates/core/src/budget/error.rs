//! Budget error types.

use pdj_shared::types::BusinessId;
use thiserror::Error;

/// Budget-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    /// No budget is active for the business and department today.
    #[error("No active budget for business {business_id}")]
    NoActiveBudget {
        /// Business ID.
        business_id: BusinessId,
        /// Department filter, if any.
        department: Option<String>,
    },

    /// Budgets could not be loaded.
    #[error("Budget source unavailable: {0}")]
    SourceUnavailable(String),
}

impl From<BudgetError> for pdj_shared::AppError {
    fn from(err: BudgetError) -> Self {
        match err {
            BudgetError::NoActiveBudget { .. } => Self::NotFound(err.to_string()),
            BudgetError::SourceUnavailable(_) => Self::Upstream(err.to_string()),
        }
    }
}
