//! Budget tracking.
//!
//! Budgets are read-only here: `used_amount` is maintained by the checkout
//! path and may lag slightly behind the orders it reflects.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::BudgetError;
pub use service::{BudgetSource, BudgetTracker};
pub use types::{
    ActiveBudgetReport, ActiveBudgetSelection, AlertTier, Budget, BudgetStatus, BudgetWarning,
    EmployeeSpending,
};
