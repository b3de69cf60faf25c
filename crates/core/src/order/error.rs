//! Order error types.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::OrderStatus;

/// Errors raised while validating or mutating orders.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// An order needs at least one item.
    #[error("Order must contain at least one item")]
    EmptyOrder,

    /// A monetary field is negative.
    #[error("{0} cannot be negative")]
    NegativeAmount(&'static str),

    /// A monetary field exceeds the storable range.
    #[error("{0} is out of range")]
    AmountOutOfRange(&'static str),

    /// A monetary field has more than two decimal places.
    #[error("{0} cannot have more than 2 decimal places")]
    TooPrecise(&'static str),

    /// Item quantity must be at least one.
    #[error("Quantity for '{0}' must be between 1 and 2147483647")]
    InvalidQuantity(String),

    /// Order subtotal does not match the sum of its lines.
    #[error("Subtotal mismatch: expected {expected}, got {got}")]
    SubtotalMismatch {
        /// Sum of line subtotals.
        expected: Decimal,
        /// Submitted subtotal.
        got: Decimal,
    },

    /// Order total does not satisfy `subtotal + delivery_fee - discount + tax_amount`.
    #[error("Total mismatch: expected {expected}, got {got}")]
    TotalMismatch {
        /// Total derived from the other financial fields.
        expected: Decimal,
        /// Submitted total.
        got: Decimal,
    },

    /// A business-billed order must reference a business.
    #[error("Business-billed order has no business")]
    MissingBusiness,

    /// Status change not allowed from the current status.
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// Unknown status string.
    #[error("Unknown order status: {0}")]
    UnknownStatus(String),
}

impl From<OrderError> for pdj_shared::AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidTransition { .. } => Self::BusinessRule(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
