//! Orders and their line items.
//!
//! Orders are created once at checkout together with their items and are
//! immutable afterwards except for status transitions.

pub mod error;
pub mod types;

pub use error::OrderError;
pub use types::{
    MAX_QUANTITY, MONEY_SCALE, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus,
    StatusTimestamps, max_order_amount,
};
