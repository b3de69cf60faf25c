//! Repository abstractions for data access.
//!
//! Repositories implement the `pdj_core` data contracts (`OrderSource`,
//! `SequenceAllocator`, `BudgetSource`, `InvoiceStore`) against PostgreSQL,
//! hiding the `SeaORM` details from the rest of the application.

pub mod budget;
pub mod business;
pub mod invoice;
pub mod order;
pub mod sequence;

pub use budget::{BudgetRepository, BudgetRepositoryError, CreateBudgetInput};
pub use business::{
    BusinessRepository, BusinessRepositoryError, CreateBusinessInput, CreateEmployeeInput,
};
pub use invoice::InvoiceRepository;
pub use order::{MAX_NUMBER_ATTEMPTS, OrderRepository, OrderRepositoryError};
pub use sequence::OrderSequenceRepository;

use sea_orm::{DbErr, SqlErr};

/// Returns true if `err` is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Returns true if `err` violates the unique constraint named `constraint`.
///
/// PostgreSQL names the constraint in the message:
/// `duplicate key value violates unique constraint "<name>"`.
pub(crate) fn violates_unique(err: &DbErr, constraint: &str) -> bool {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(message)) => {
            message.contains(&format!("\"{constraint}\""))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::RuntimeErr;

    #[test]
    fn test_non_sql_errors_are_not_unique_violations() {
        let err = DbErr::Query(RuntimeErr::Internal("connection reset".to_string()));
        assert!(!is_unique_violation(&err));
        assert!(!violates_unique(&err, "uq_invoices_business_period"));
    }
}
