//! Pure aggregation over order sets.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::Hash;
use std::ops::AddAssign;

use chrono::{Datelike, NaiveDate, Timelike, Weekday};
use chrono_tz::Tz;
use pdj_shared::types::EmployeeId;
use rust_decimal::Decimal;

use super::types::{
    AnalyticsReport, DailyBucket, DateField, GroupEntry, GroupTotals, GroupedBreakdowns,
    HourBucket, OrderSummary, PeriodComparison, RankMetric, StatusDistribution, TopRankings,
    WeekdayBucket,
};
use crate::business::Employee;
use crate::order::Order;
use crate::period::ResolvedPeriod;

/// Department key for orders without a known department.
pub const UNASSIGNED_DEPARTMENT: &str = "unassigned";

/// Default length of rankings.
pub const DEFAULT_TOP_N: usize = 10;

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Stateless aggregation engine.
///
/// Every function is a pure reduction of its input; callers fetch the orders.
pub struct AggregationEngine;

impl AggregationEngine {
    /// Summarizes a set of orders.
    #[must_use]
    pub fn summarize(orders: &[Order]) -> OrderSummary {
        let mut summary = OrderSummary::default();
        let mut customers = HashSet::new();

        for order in orders {
            summary.total_revenue += order.total;
            summary.order_count += 1;
            if order.is_delivered() {
                summary.delivered_revenue += order.total;
                summary.delivered_count += 1;
            }
            customers.insert(order.user_id);
        }

        summary.average_order_value = ratio(summary.total_revenue, Decimal::from(summary.order_count));
        summary.distinct_customers = customers.len() as u64;
        summary
    }

    /// Percentage change from `previous` to `current`, rounded to 2 places.
    ///
    /// Returns zero when `previous` is zero.
    #[must_use]
    pub fn growth(current: Decimal, previous: Decimal) -> Decimal {
        ratio(current - previous, previous)
            .checked_mul(Decimal::ONE_HUNDRED)
            .unwrap_or(Decimal::ZERO)
            .round_dp(2)
    }

    /// Groups orders by local date.
    ///
    /// The series is sparse: dates without orders are absent. Entries are
    /// ascending and unique by date.
    #[must_use]
    pub fn bucket_by_day(orders: &[Order], field: DateField, tz: Tz) -> Vec<DailyBucket> {
        let mut days: BTreeMap<NaiveDate, (u64, Decimal)> = BTreeMap::new();
        for order in orders {
            let date = match field {
                DateField::CreatedAt => order.created_at.with_timezone(&tz).date_naive(),
                DateField::DeliveryDate => order.delivery_date,
            };
            let entry = days.entry(date).or_default();
            entry.0 += 1;
            entry.1 += order.total;
        }

        days.into_iter()
            .map(|(date, (order_count, revenue))| DailyBucket {
                date,
                order_count,
                revenue,
            })
            .collect()
    }

    /// Groups orders by local hour of creation. Always returns 24 buckets.
    #[must_use]
    pub fn bucket_by_hour(orders: &[Order], tz: Tz) -> Vec<HourBucket> {
        let mut buckets: Vec<HourBucket> = (0..24)
            .map(|hour| HourBucket {
                hour,
                order_count: 0,
                revenue: Decimal::ZERO,
            })
            .collect();

        for order in orders {
            let hour = order.created_at.with_timezone(&tz).hour() as usize;
            if let Some(bucket) = buckets.get_mut(hour) {
                bucket.order_count += 1;
                bucket.revenue += order.total;
            }
        }
        buckets
    }

    /// Groups orders by local weekday of creation. Always returns 7 buckets,
    /// Monday first.
    #[must_use]
    pub fn bucket_by_weekday(orders: &[Order], tz: Tz) -> Vec<WeekdayBucket> {
        let mut buckets: Vec<WeekdayBucket> = WEEK
            .iter()
            .map(|&weekday| WeekdayBucket {
                weekday,
                order_count: 0,
                revenue: Decimal::ZERO,
            })
            .collect();

        for order in orders {
            let index = order
                .created_at
                .with_timezone(&tz)
                .weekday()
                .num_days_from_monday() as usize;
            if let Some(bucket) = buckets.get_mut(index) {
                bucket.order_count += 1;
                bucket.revenue += order.total;
            }
        }
        buckets
    }

    /// Accumulates `value_fn` of every item under `key_fn`.
    ///
    /// The map is unordered; callers sort as needed.
    pub fn group_by<T, K, V>(
        items: impl IntoIterator<Item = T>,
        key_fn: impl Fn(&T) -> K,
        value_fn: impl Fn(&T) -> V,
    ) -> HashMap<K, V>
    where
        K: Eq + Hash,
        V: AddAssign + Default,
    {
        let mut groups: HashMap<K, V> = HashMap::new();
        for item in items {
            *groups.entry(key_fn(&item)).or_default() += value_fn(&item);
        }
        groups
    }

    /// Orders per status. The counts always sum to `orders.len()`.
    #[must_use]
    pub fn status_distribution(orders: &[Order]) -> StatusDistribution {
        let mut distribution = StatusDistribution::default();
        for order in orders {
            distribution.increment(order.status);
        }
        distribution
    }

    /// Item sales per dish category, sorted by category.
    #[must_use]
    pub fn category_breakdown(orders: &[Order]) -> Vec<GroupEntry> {
        Self::item_breakdown(orders, |category, _| category)
    }

    /// Item sales per dish, sorted by dish name.
    #[must_use]
    pub fn dish_breakdown(orders: &[Order]) -> Vec<GroupEntry> {
        Self::item_breakdown(orders, |_, dish| dish)
    }

    /// Orders per delivery postal code, sorted by postal code.
    #[must_use]
    pub fn zone_breakdown(orders: &[Order]) -> Vec<GroupEntry> {
        into_entries(Self::group_by(
            orders,
            |order| order.delivery_postal_code.clone(),
            |order| order_totals(order),
        ))
    }

    /// Orders per customer, keyed by user ID.
    #[must_use]
    pub fn customer_breakdown(orders: &[Order]) -> Vec<GroupEntry> {
        into_entries(Self::group_by(
            orders,
            |order| order.user_id.to_string(),
            |order| order_totals(order),
        ))
    }

    /// Orders per employee department.
    ///
    /// Orders without an employee, or whose employee has no department, are
    /// grouped under [`UNASSIGNED_DEPARTMENT`].
    #[must_use]
    pub fn department_breakdown(orders: &[Order], employees: &[Employee]) -> Vec<GroupEntry> {
        let departments: HashMap<EmployeeId, &str> = employees
            .iter()
            .filter_map(|employee| Some((employee.id, employee.department.as_deref()?)))
            .collect();

        into_entries(Self::group_by(
            orders,
            |order| {
                order
                    .employee_id
                    .and_then(|id| departments.get(&id).copied())
                    .unwrap_or(UNASSIGNED_DEPARTMENT)
                    .to_string()
            },
            |order| order_totals(order),
        ))
    }

    /// The `n` highest entries by `metric`, highest first.
    ///
    /// The sort is stable, so equal entries keep their input order. Returns
    /// `min(n, entries.len())` entries.
    #[must_use]
    pub fn top_n(mut entries: Vec<GroupEntry>, metric: RankMetric, n: usize) -> Vec<GroupEntry> {
        entries.sort_by(|a, b| match metric {
            RankMetric::Revenue => b.totals.revenue.cmp(&a.totals.revenue),
            RankMetric::Quantity => b.totals.quantity.cmp(&a.totals.quantity),
            RankMetric::OrderCount => b.totals.order_count.cmp(&a.totals.order_count),
        });
        entries.truncate(n);
        entries
    }

    /// Top dishes by `metric`.
    #[must_use]
    pub fn top_dishes(orders: &[Order], metric: RankMetric, n: usize) -> Vec<GroupEntry> {
        Self::top_n(Self::dish_breakdown(orders), metric, n)
    }

    /// Top customers by `metric`.
    #[must_use]
    pub fn top_customers(orders: &[Order], metric: RankMetric, n: usize) -> Vec<GroupEntry> {
        Self::top_n(Self::customer_breakdown(orders), metric, n)
    }

    /// Top delivery zones by `metric`.
    #[must_use]
    pub fn top_zones(orders: &[Order], metric: RankMetric, n: usize) -> Vec<GroupEntry> {
        Self::top_n(Self::zone_breakdown(orders), metric, n)
    }

    /// Compares two order sets.
    #[must_use]
    pub fn compare(current: &[Order], previous: &[Order]) -> PeriodComparison {
        let current = Self::summarize(current);
        let previous = Self::summarize(previous);

        PeriodComparison {
            revenue_growth: Self::growth(current.total_revenue, previous.total_revenue),
            order_count_growth: Self::growth(
                Decimal::from(current.order_count),
                Decimal::from(previous.order_count),
            ),
            average_order_value_growth: Self::growth(
                current.average_order_value,
                previous.average_order_value,
            ),
            current,
            previous,
        }
    }

    /// Builds the full report for a resolved period.
    #[must_use]
    pub fn build_report(
        period: ResolvedPeriod,
        current: &[Order],
        previous: &[Order],
        tz: Tz,
        n: usize,
    ) -> AnalyticsReport {
        let comparison = Self::compare(current, previous);

        AnalyticsReport {
            period,
            summary: comparison.current.clone(),
            time_series: Self::bucket_by_day(current, DateField::CreatedAt, tz),
            grouped_by: GroupedBreakdowns {
                status: Self::status_distribution(current),
                category: Self::category_breakdown(current),
                zone: Self::zone_breakdown(current),
                hour: Self::bucket_by_hour(current, tz),
                weekday: Self::bucket_by_weekday(current, tz),
            },
            top_n: TopRankings {
                dishes: Self::top_dishes(current, RankMetric::Revenue, n),
                customers: Self::top_customers(current, RankMetric::Revenue, n),
                zones: Self::top_zones(current, RankMetric::Revenue, n),
            },
            comparison,
        }
    }

    /// Item-level breakdown where each order counts once per group it touches.
    fn item_breakdown(
        orders: &[Order],
        key: impl for<'a> Fn(&'a str, &'a str) -> &'a str,
    ) -> Vec<GroupEntry> {
        let mut groups: HashMap<String, GroupTotals> = HashMap::new();

        for order in orders {
            let per_order = Self::group_by(
                &order.items,
                |item| key(&item.category, &item.dish_name).to_string(),
                |item| GroupTotals {
                    order_count: 0,
                    quantity: u64::from(item.quantity),
                    revenue: item.subtotal,
                },
            );
            for (group, mut totals) in per_order {
                totals.order_count = 1;
                *groups.entry(group).or_default() += totals;
            }
        }

        into_entries(groups)
    }
}

fn order_totals(order: &Order) -> GroupTotals {
    GroupTotals {
        order_count: 1,
        quantity: order.item_quantity(),
        revenue: order.total,
    }
}

fn into_entries(groups: HashMap<String, GroupTotals>) -> Vec<GroupEntry> {
    let mut entries: Vec<GroupEntry> = groups
        .into_iter()
        .map(|(key, totals)| GroupEntry { key, totals })
        .collect();
    entries.sort_by(|a, b| a.key.cmp(&b.key));
    entries
}

/// `numerator / denominator`, or zero when the denominator is zero.
pub(crate) fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::tests::{order_at, order_with_items};
    use chrono::{TimeZone, Utc};
    use pdj_shared::types::BusinessId;
    use rust_decimal_macros::dec;

    use crate::business::{EmployeeRole, EmployeeStatus};
    use crate::order::OrderStatus;

    #[test]
    fn test_growth_rounds_to_two_places() {
        assert_eq!(AggregationEngine::growth(dec!(100), dec!(30)), dec!(233.33));
        assert_eq!(AggregationEngine::growth(dec!(50), dec!(100)), dec!(-50));
    }

    #[test]
    fn test_growth_from_zero_is_zero() {
        assert_eq!(AggregationEngine::growth(dec!(500), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(AggregationEngine::growth(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_summary_separates_delivered_revenue() {
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap();
        let mut delivered = order_at(dec!(30), at);
        delivered.status = OrderStatus::Delivered;
        let orders = vec![order_at(dec!(10), at), delivered];

        let summary = AggregationEngine::summarize(&orders);

        assert_eq!(summary.total_revenue, dec!(40));
        assert_eq!(summary.delivered_revenue, dec!(30));
        assert_eq!(summary.delivered_count, 1);
        assert_eq!(summary.distinct_customers, 2);
    }

    #[test]
    fn test_bucket_by_day_uses_local_date() {
        // 01:00 UTC on the 11th is 22:00 on the 10th in São Paulo.
        let tz = chrono_tz::America::Sao_Paulo;
        let orders = vec![
            order_at(dec!(10), Utc.with_ymd_and_hms(2026, 3, 11, 1, 0, 0).unwrap()),
            order_at(dec!(20), Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap()),
            order_at(dec!(5), Utc.with_ymd_and_hms(2026, 3, 12, 15, 0, 0).unwrap()),
        ];

        let series = AggregationEngine::bucket_by_day(&orders, DateField::CreatedAt, tz);

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        assert_eq!(series[0].order_count, 2);
        assert_eq!(series[0].revenue, dec!(30));
        assert_eq!(series[1].date, NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());
    }

    #[test]
    fn test_hour_and_weekday_buckets_are_zero_filled() {
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap(); // Tuesday
        let orders = vec![order_at(dec!(10), at)];

        let hours = AggregationEngine::bucket_by_hour(&orders, chrono_tz::UTC);
        let weekdays = AggregationEngine::bucket_by_weekday(&orders, chrono_tz::UTC);

        assert_eq!(hours.len(), 24);
        assert_eq!(hours[15].order_count, 1);
        assert_eq!(hours.iter().map(|b| b.order_count).sum::<u64>(), 1);
        assert_eq!(weekdays.len(), 7);
        assert_eq!(weekdays[0].weekday, Weekday::Mon);
        assert_eq!(weekdays[1].weekday, Weekday::Tue);
        assert_eq!(weekdays[1].revenue, dec!(10));
    }

    #[test]
    fn test_category_breakdown_counts_each_order_once() {
        let order = order_with_items(&[
            ("Feijoada", "mains", dec!(20), 2),
            ("Moqueca", "mains", dec!(25), 1),
            ("Pudim", "desserts", dec!(5), 1),
        ]);

        let categories = AggregationEngine::category_breakdown(&[order]);

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].key, "desserts");
        assert_eq!(categories[1].key, "mains");
        assert_eq!(categories[1].totals.order_count, 1);
        assert_eq!(categories[1].totals.quantity, 3);
        assert_eq!(categories[1].totals.revenue, dec!(65));
    }

    #[test]
    fn test_top_n_sorts_descending_and_truncates() {
        let orders = vec![
            order_with_items(&[("Feijoada", "mains", dec!(20), 1)]),
            order_with_items(&[("Pudim", "desserts", dec!(5), 10)]),
            order_with_items(&[("Moqueca", "mains", dec!(25), 1)]),
        ];

        let by_revenue = AggregationEngine::top_dishes(&orders, RankMetric::Revenue, 2);
        let by_quantity = AggregationEngine::top_dishes(&orders, RankMetric::Quantity, 1);

        assert_eq!(by_revenue.len(), 2);
        assert_eq!(by_revenue[0].key, "Pudim");
        assert_eq!(by_revenue[1].key, "Moqueca");
        assert_eq!(by_quantity[0].key, "Pudim");
    }

    #[test]
    fn test_department_breakdown_groups_unknown_as_unassigned() {
        let business_id = BusinessId::new();
        let employee = Employee {
            id: EmployeeId::new(),
            business_id,
            user_id: None,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            department: Some("engineering".to_string()),
            monthly_budget: dec!(500),
            status: EmployeeStatus::Active,
            role: EmployeeRole::Employee,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 15, 0, 0).unwrap();
        let mut known = order_at(dec!(40), at);
        known.employee_id = Some(employee.id);
        let unknown = order_at(dec!(15), at);

        let departments = AggregationEngine::department_breakdown(&[known, unknown], &[employee]);

        assert_eq!(departments.len(), 2);
        assert_eq!(departments[0].key, "engineering");
        assert_eq!(departments[0].totals.revenue, dec!(40));
        assert_eq!(departments[1].key, UNASSIGNED_DEPARTMENT);
    }

    #[test]
    fn test_group_by_accumulates_generic_values() {
        let words = ["apple", "avocado", "banana"];
        let lengths = AggregationEngine::group_by(words, |w| w.chars().next(), |w| w.len());
        assert_eq!(lengths.get(&Some('a')), Some(&12));
        assert_eq!(lengths.get(&Some('b')), Some(&6));
    }
}
