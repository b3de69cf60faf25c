//! Order data types.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use pdj_shared::types::{BusinessId, EmployeeId, OrderId, OrderItemId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::OrderError;
use crate::numbering::OrderNumber;

/// Decimal places kept for monetary amounts.
pub const MONEY_SCALE: u32 = 2;

/// Largest quantity a line item may carry.
pub const MAX_QUANTITY: u32 = i32::MAX.unsigned_abs();

/// Largest monetary amount an order field may carry (`NUMERIC(12, 2)`).
#[must_use]
pub fn max_order_amount() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

fn check_amount(name: &'static str, amount: Decimal) -> Result<(), OrderError> {
    if amount < Decimal::ZERO {
        return Err(OrderError::NegativeAmount(name));
    }
    if amount > max_order_amount() {
        return Err(OrderError::AmountOutOfRange(name));
    }
    if amount.round_dp(MONEY_SCALE) != amount {
        return Err(OrderError::TooPrecise(name));
    }
    Ok(())
}

/// Order lifecycle status.
///
/// `pending → confirmed → preparing → out_for_delivery → delivered`, with
/// `cancelled` reachable until the order leaves the kitchen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed, awaiting confirmation.
    Pending,
    /// Accepted by the kitchen.
    Confirmed,
    /// Being prepared.
    Preparing,
    /// Handed to the courier.
    OutForDelivery,
    /// Delivered to the customer.
    Delivered,
    /// Cancelled before delivery.
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Preparing => "preparing",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Returns true if `next` is a legal successor of this status.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Preparing | Self::Cancelled)
                | (Self::Preparing, Self::OutForDelivery | Self::Cancelled)
                | (Self::OutForDelivery, Self::Delivered)
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = OrderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| OrderError::UnknownStatus(s.to_string()))
    }
}

/// Per-status timestamps, set when the order enters that status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusTimestamps {
    /// When the order was confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When preparation started.
    pub preparing_at: Option<DateTime<Utc>>,
    /// When the order left for delivery.
    pub out_for_delivery_at: Option<DateTime<Utc>>,
    /// When the order was delivered.
    pub delivered_at: Option<DateTime<Utc>>,
    /// When the order was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl StatusTimestamps {
    fn record(&mut self, status: OrderStatus, at: DateTime<Utc>) {
        let slot = match status {
            OrderStatus::Pending => return,
            OrderStatus::Confirmed => &mut self.confirmed_at,
            OrderStatus::Preparing => &mut self.preparing_at,
            OrderStatus::OutForDelivery => &mut self.out_for_delivery_at,
            OrderStatus::Delivered => &mut self.delivered_at,
            OrderStatus::Cancelled => &mut self.cancelled_at,
        };
        *slot = Some(at);
    }
}

/// A line item of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Unique identifier.
    pub id: OrderItemId,
    /// Owning order.
    pub order_id: OrderId,
    /// Dish name at the time of ordering.
    pub dish_name: String,
    /// Dish category.
    pub category: String,
    /// Unit price.
    pub unit_price: Decimal,
    /// Quantity ordered.
    pub quantity: u32,
    /// Stored line subtotal.
    pub subtotal: Decimal,
}

impl OrderItem {
    /// `unit_price × quantity`, saturating at the decimal bounds.
    #[must_use]
    pub fn line_subtotal(&self) -> Decimal {
        self.unit_price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// A placed order with its items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier.
    pub id: OrderId,
    /// Human-readable order number.
    pub order_number: OrderNumber,
    /// Customer who placed the order.
    pub user_id: UserId,
    /// Business account the order belongs to, if any.
    pub business_id: Option<BusinessId>,
    /// Employee who placed a business order.
    pub employee_id: Option<EmployeeId>,
    /// Whether the order is billed to the business instead of the customer.
    pub is_business_billed: bool,
    /// Current status.
    pub status: OrderStatus,
    /// Sum of line subtotals.
    pub subtotal: Decimal,
    /// Delivery fee.
    pub delivery_fee: Decimal,
    /// Discount applied.
    pub discount: Decimal,
    /// Tax amount (zero where not applicable).
    pub tax_amount: Decimal,
    /// Amount charged.
    pub total: Decimal,
    /// Requested delivery date.
    pub delivery_date: NaiveDate,
    /// Requested delivery time slot.
    pub delivery_time: Option<NaiveTime>,
    /// Delivery postal code.
    pub delivery_postal_code: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Status timestamps.
    #[serde(flatten)]
    pub timestamps: StatusTimestamps,
    /// Line items.
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// `subtotal + delivery_fee - discount + tax_amount`, or `None` on overflow.
    #[must_use]
    pub fn expected_total(&self) -> Option<Decimal> {
        expected_total(self.subtotal, self.delivery_fee, self.discount, self.tax_amount)
    }

    /// Returns true if `total` matches the other financial fields.
    #[must_use]
    pub fn is_total_consistent(&self) -> bool {
        self.expected_total() == Some(self.total)
    }

    /// Returns true if the order has been delivered.
    #[must_use]
    pub fn is_delivered(&self) -> bool {
        self.status == OrderStatus::Delivered
    }

    /// Total quantity across all items.
    #[must_use]
    pub fn item_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Moves the order to `next`, stamping the matching timestamp.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidTransition` if `next` is not a legal successor.
    pub fn transition(&mut self, next: OrderStatus, at: DateTime<Utc>) -> Result<(), OrderError> {
        if !self.status.can_transition_to(next) {
            return Err(OrderError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.timestamps.record(next, at);
        Ok(())
    }
}

fn expected_total(
    subtotal: Decimal,
    delivery_fee: Decimal,
    discount: Decimal,
    tax_amount: Decimal,
) -> Option<Decimal> {
    subtotal
        .checked_add(delivery_fee)?
        .checked_sub(discount)?
        .checked_add(tax_amount)
}

/// Item of an order being placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderItem {
    /// Dish name.
    pub dish_name: String,
    /// Dish category.
    pub category: String,
    /// Unit price.
    pub unit_price: Decimal,
    /// Quantity.
    pub quantity: u32,
}

/// Checkout input for a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    /// Customer placing the order.
    pub user_id: UserId,
    /// Business account, for B2B orders.
    pub business_id: Option<BusinessId>,
    /// Employee placing a B2B order.
    pub employee_id: Option<EmployeeId>,
    /// Bill the business instead of the customer.
    #[serde(default)]
    pub is_business_billed: bool,
    /// Sum of line subtotals.
    pub subtotal: Decimal,
    /// Delivery fee.
    pub delivery_fee: Decimal,
    /// Discount.
    #[serde(default)]
    pub discount: Decimal,
    /// Tax amount.
    #[serde(default)]
    pub tax_amount: Decimal,
    /// Amount charged.
    pub total: Decimal,
    /// Requested delivery date.
    pub delivery_date: NaiveDate,
    /// Requested delivery time slot.
    pub delivery_time: Option<NaiveTime>,
    /// Delivery postal code.
    pub delivery_postal_code: String,
    /// Items.
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Checks the financial invariants of the checkout input.
    ///
    /// Amounts must be non-negative, fit `NUMERIC(12, 2)` and carry at most
    /// two decimal places, so the stored order equals the validated one.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if self.is_business_billed && self.business_id.is_none() {
            return Err(OrderError::MissingBusiness);
        }

        for (name, amount) in [
            ("subtotal", self.subtotal),
            ("delivery_fee", self.delivery_fee),
            ("discount", self.discount),
            ("tax_amount", self.tax_amount),
            ("total", self.total),
        ] {
            check_amount(name, amount)?;
        }

        let mut lines = Decimal::ZERO;
        for item in &self.items {
            if item.quantity == 0 || item.quantity > MAX_QUANTITY {
                return Err(OrderError::InvalidQuantity(item.dish_name.clone()));
            }
            check_amount("unit_price", item.unit_price)?;
            let line = item
                .unit_price
                .checked_mul(Decimal::from(item.quantity))
                .filter(|line| *line <= max_order_amount())
                .ok_or(OrderError::AmountOutOfRange("line subtotal"))?;
            lines = lines
                .checked_add(line)
                .ok_or(OrderError::AmountOutOfRange("subtotal"))?;
        }

        if lines != self.subtotal {
            return Err(OrderError::SubtotalMismatch {
                expected: lines,
                got: self.subtotal,
            });
        }

        let expected = expected_total(
            self.subtotal,
            self.delivery_fee,
            self.discount,
            self.tax_amount,
        )
        .ok_or(OrderError::AmountOutOfRange("total"))?;
        if expected != self.total {
            return Err(OrderError::TotalMismatch {
                expected,
                got: self.total,
            });
        }

        Ok(())
    }

    /// Builds the persisted order once an id and number have been allocated.
    ///
    /// Line subtotals saturate instead of overflowing; call
    /// [`NewOrder::validate`] first to reject such input.
    #[must_use]
    pub fn into_order(self, id: OrderId, order_number: OrderNumber, created_at: DateTime<Utc>) -> Order {
        let items = self
            .items
            .into_iter()
            .map(|item| {
                let subtotal = item.unit_price.saturating_mul(Decimal::from(item.quantity));
                OrderItem {
                    id: OrderItemId::new(),
                    order_id: id,
                    dish_name: item.dish_name,
                    category: item.category,
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                    subtotal,
                }
            })
            .collect();

        Order {
            id,
            order_number,
            user_id: self.user_id,
            business_id: self.business_id,
            employee_id: self.employee_id,
            is_business_billed: self.is_business_billed,
            status: OrderStatus::Pending,
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            discount: self.discount,
            tax_amount: self.tax_amount,
            total: self.total,
            delivery_date: self.delivery_date,
            delivery_time: self.delivery_time,
            delivery_postal_code: self.delivery_postal_code,
            created_at,
            timestamps: StatusTimestamps::default(),
            items,
        }
    }
}
