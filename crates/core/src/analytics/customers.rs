//! Per-customer statistics.

use chrono::{DateTime, Utc};
use pdj_shared::types::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::engine::{AggregationEngine, ratio};
use super::types::RankMetric;
use crate::order::Order;

/// Lifetime statistics of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerStats {
    /// Customer.
    pub user_id: UserId,
    /// Orders placed.
    pub order_count: u64,
    /// Sum of order totals.
    pub total_spent: Decimal,
    /// `total_spent / order_count`, or zero.
    pub average_order_value: Decimal,
    /// Most recent order.
    pub last_order_at: Option<DateTime<Utc>>,
    /// Dish ordered in the largest quantity.
    pub favorite_dish: Option<String>,
    /// False when the history could not be loaded and the figures are defaults.
    pub loaded: bool,
}

impl CustomerStats {
    /// Zero-valued statistics for a customer whose history failed to load.
    #[must_use]
    pub const fn unavailable(user_id: UserId) -> Self {
        Self {
            user_id,
            order_count: 0,
            total_spent: Decimal::ZERO,
            average_order_value: Decimal::ZERO,
            last_order_at: None,
            favorite_dish: None,
            loaded: false,
        }
    }

    /// Computes statistics from a customer's order history.
    #[must_use]
    pub fn from_orders(user_id: UserId, orders: &[Order]) -> Self {
        let total_spent: Decimal = orders.iter().map(|order| order.total).sum();
        let order_count = orders.len() as u64;

        Self {
            user_id,
            order_count,
            total_spent,
            average_order_value: ratio(total_spent, Decimal::from(order_count)),
            last_order_at: orders.iter().map(|order| order.created_at).max(),
            favorite_dish: AggregationEngine::top_dishes(orders, RankMetric::Quantity, 1)
                .into_iter()
                .next()
                .map(|entry| entry.key),
            loaded: true,
        }
    }
}
