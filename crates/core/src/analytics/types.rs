//! Analytics result types.

use std::ops::AddAssign;

use chrono::{NaiveDate, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::order::OrderStatus;
use crate::period::ResolvedPeriod;

/// Which date of an order a time series is bucketed by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateField {
    /// Local date of the creation timestamp.
    #[default]
    CreatedAt,
    /// Requested delivery date.
    DeliveryDate,
}

/// Headline figures for a set of orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    /// Sum of `total` over all orders.
    pub total_revenue: Decimal,
    /// Sum of `total` over delivered orders.
    pub delivered_revenue: Decimal,
    /// Number of orders.
    pub order_count: u64,
    /// Number of delivered orders.
    pub delivered_count: u64,
    /// `total_revenue / order_count`, or zero without orders.
    pub average_order_value: Decimal,
    /// Number of distinct customers.
    pub distinct_customers: u64,
}

/// Orders and revenue on one local date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBucket {
    /// Calendar date.
    pub date: NaiveDate,
    /// Orders on that date.
    pub order_count: u64,
    /// Revenue on that date.
    pub revenue: Decimal,
}

/// Orders and revenue in one local hour of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourBucket {
    /// Hour, 0 to 23.
    pub hour: u32,
    /// Orders placed in that hour.
    pub order_count: u64,
    /// Revenue placed in that hour.
    pub revenue: Decimal,
}

/// Orders and revenue on one day of the week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayBucket {
    /// Day of the week.
    pub weekday: Weekday,
    /// Orders placed on that weekday.
    pub order_count: u64,
    /// Revenue placed on that weekday.
    pub revenue: Decimal,
}

/// Order count per status.
///
/// Every status has its own field, so a status with no orders reads as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusDistribution {
    /// Pending orders.
    pub pending: u64,
    /// Confirmed orders.
    pub confirmed: u64,
    /// Orders being prepared.
    pub preparing: u64,
    /// Orders out for delivery.
    pub out_for_delivery: u64,
    /// Delivered orders.
    pub delivered: u64,
    /// Cancelled orders.
    pub cancelled: u64,
}

impl StatusDistribution {
    /// Count for one status.
    #[must_use]
    pub const fn get(&self, status: OrderStatus) -> u64 {
        match status {
            OrderStatus::Pending => self.pending,
            OrderStatus::Confirmed => self.confirmed,
            OrderStatus::Preparing => self.preparing,
            OrderStatus::OutForDelivery => self.out_for_delivery,
            OrderStatus::Delivered => self.delivered,
            OrderStatus::Cancelled => self.cancelled,
        }
    }

    /// Sum over all statuses.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.pending
            + self.confirmed
            + self.preparing
            + self.out_for_delivery
            + self.delivered
            + self.cancelled
    }

    pub(crate) fn increment(&mut self, status: OrderStatus) {
        let slot = match status {
            OrderStatus::Pending => &mut self.pending,
            OrderStatus::Confirmed => &mut self.confirmed,
            OrderStatus::Preparing => &mut self.preparing,
            OrderStatus::OutForDelivery => &mut self.out_for_delivery,
            OrderStatus::Delivered => &mut self.delivered,
            OrderStatus::Cancelled => &mut self.cancelled,
        };
        *slot += 1;
    }
}

/// Accumulated totals for one group of a breakdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupTotals {
    /// Orders contributing to the group.
    pub order_count: u64,
    /// Units sold.
    pub quantity: u64,
    /// Revenue.
    pub revenue: Decimal,
}

impl AddAssign for GroupTotals {
    fn add_assign(&mut self, rhs: Self) {
        self.order_count += rhs.order_count;
        self.quantity += rhs.quantity;
        self.revenue += rhs.revenue;
    }
}

/// A named group of a breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    /// Group key (category, postal code, dish, department, customer).
    pub key: String,
    /// Totals for the group.
    #[serde(flatten)]
    pub totals: GroupTotals,
}

/// Metric a ranking is sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    /// Revenue.
    #[default]
    Revenue,
    /// Units sold.
    Quantity,
    /// Number of orders.
    OrderCount,
}

/// The per-dimension breakdowns of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedBreakdowns {
    /// Orders per status.
    pub status: StatusDistribution,
    /// Item sales per dish category.
    pub category: Vec<GroupEntry>,
    /// Orders per delivery postal code.
    pub zone: Vec<GroupEntry>,
    /// All 24 hours of the day.
    pub hour: Vec<HourBucket>,
    /// All 7 weekdays, Monday first.
    pub weekday: Vec<WeekdayBucket>,
}

/// Top-N rankings of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopRankings {
    /// Best-selling dishes by revenue.
    pub dishes: Vec<GroupEntry>,
    /// Highest-spending customers.
    pub customers: Vec<GroupEntry>,
    /// Busiest delivery zones by revenue.
    pub zones: Vec<GroupEntry>,
}

/// Period-over-period comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodComparison {
    /// Summary of the requested period.
    pub current: OrderSummary,
    /// Summary of the preceding period.
    pub previous: OrderSummary,
    /// Revenue growth in percent.
    pub revenue_growth: Decimal,
    /// Order count growth in percent.
    pub order_count_growth: Decimal,
    /// Average order value growth in percent.
    pub average_order_value_growth: Decimal,
}

/// Complete analytics result for one scope and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Resolved period the report covers.
    pub period: ResolvedPeriod,
    /// Summary of the requested period.
    pub summary: OrderSummary,
    /// Comparison against the preceding period.
    pub comparison: PeriodComparison,
    /// Sparse daily series, ascending by date.
    pub time_series: Vec<DailyBucket>,
    /// Per-dimension breakdowns.
    pub grouped_by: GroupedBreakdowns,
    /// Rankings.
    pub top_n: TopRankings,
}
