//! Invoice error types.

use chrono::NaiveDate;
use pdj_shared::types::{BusinessId, InvoiceId};
use thiserror::Error;

use super::types::InvoiceStatus;
use crate::period::PeriodError;

/// Invoice-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvoiceError {
    /// The billing period is invalid.
    #[error(transparent)]
    InvalidPeriod(#[from] PeriodError),

    /// An invoice already exists for the business and period.
    #[error("Business {business_id} already invoiced for {period_start}..={period_end}")]
    AlreadyInvoiced {
        /// Business ID.
        business_id: BusinessId,
        /// First day of the period.
        period_start: NaiveDate,
        /// Last day of the period.
        period_end: NaiveDate,
    },

    /// The period has no billable orders.
    #[error("No billable orders for business {business_id} in {period_start}..={period_end}")]
    NothingToInvoice {
        /// Business ID.
        business_id: BusinessId,
        /// First day of the period.
        period_start: NaiveDate,
        /// Last day of the period.
        period_end: NaiveDate,
    },

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(InvoiceId),

    /// Status change not allowed.
    #[error("Invalid invoice transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: InvoiceStatus,
        /// Requested status.
        to: InvoiceStatus,
    },

    /// An invoice cannot become overdue before its due date.
    #[error("Invoice is not due until {0}")]
    NotYetDue(NaiveDate),

    /// Another request changed the invoice first.
    #[error("Invoice {0} was modified concurrently")]
    ConcurrentUpdate(InvoiceId),

    /// An order in the batch was billed on another invoice meanwhile.
    #[error("One or more orders are already billed on another invoice")]
    OrdersAlreadyBilled,

    /// Unknown status name.
    #[error("Unknown invoice status: {0}")]
    UnknownStatus(String),

    /// Storage failure.
    #[error("Invoice storage error: {0}")]
    Storage(String),
}

impl From<InvoiceError> for pdj_shared::AppError {
    fn from(err: InvoiceError) -> Self {
        match err {
            InvoiceError::InvalidPeriod(_) | InvoiceError::UnknownStatus(_) => {
                Self::Validation(err.to_string())
            }
            InvoiceError::AlreadyInvoiced { .. }
            | InvoiceError::OrdersAlreadyBilled
            | InvoiceError::ConcurrentUpdate(_) => {
                Self::Conflict(err.to_string())
            }
            InvoiceError::NothingToInvoice { .. }
            | InvoiceError::InvalidTransition { .. }
            | InvoiceError::NotYetDue(_) => Self::BusinessRule(err.to_string()),
            InvoiceError::NotFound(_) => Self::NotFound(err.to_string()),
            InvoiceError::Storage(_) => Self::Database(err.to_string()),
        }
    }
}
