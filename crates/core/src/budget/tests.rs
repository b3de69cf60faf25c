//! Property-based and scenario tests for budget module.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use pdj_shared::types::{BudgetId, BusinessId, EmployeeId, OrderId, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::BudgetError;
use super::service::{BudgetSource, BudgetTracker};
use super::types::{AlertTier, Budget, BudgetWarning};
use crate::business::{Employee, EmployeeRole, EmployeeStatus};
use crate::numbering::OrderNumber;
use crate::order::{NewOrder, NewOrderItem, Order, OrderStatus};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

fn budget(business_id: BusinessId, total: Decimal, used: Decimal) -> Budget {
    Budget {
        id: BudgetId::new(),
        business_id,
        name: "March".to_string(),
        department: None,
        period_start: day(1),
        period_end: day(31),
        total_budget: total,
        used_amount: used,
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2026, 2, 20, 9, 0, 0).unwrap(),
    }
}

proptest! {
    /// Property 1: remaining amount is total minus used.
    #[test]
    fn test_remaining_amount_invariant(
        total in 0i64..100_000_000,
        used in 0i64..100_000_000,
    ) {
        let b = budget(BusinessId::new(), Decimal::new(total, 2), Decimal::new(used, 2));
        prop_assert_eq!(b.remaining_amount(), b.total_budget - b.used_amount);
    }

    /// Property 2: an empty budget has zero usage instead of a division fault.
    #[test]
    fn test_zero_budget_has_zero_usage(used in 0i64..100_000_000) {
        let b = budget(BusinessId::new(), Decimal::ZERO, Decimal::new(used, 2));
        prop_assert_eq!(b.usage_ratio(), Decimal::ZERO);
        prop_assert_eq!(b.alert(), AlertTier::Nominal);
    }

    /// Property 3: the alert tier never decreases as usage grows.
    #[test]
    fn test_alert_tier_monotonic(total in 1i64..1_000_000, a in 0i64..2_000_000, b in 0i64..2_000_000) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let business_id = BusinessId::new();
        let total = Decimal::from(total);
        let low = budget(business_id, total, Decimal::from(low));
        let high = budget(business_id, total, Decimal::from(high));
        prop_assert!(low.alert() <= high.alert());
    }
}

#[test]
fn test_status_scenario_200_150() {
    let b = budget(BusinessId::new(), dec!(200), dec!(150));

    let status = BudgetTracker::status(&b, day(21));

    assert_eq!(status.remaining_amount, dec!(50));
    assert_eq!(status.usage_percent, dec!(75));
    assert_eq!(status.alert, AlertTier::Warning);
    assert_eq!(status.days_remaining, 10);
}

#[test]
fn test_active_budget_ignores_inactive_and_out_of_period() {
    let business_id = BusinessId::new();
    let mut inactive = budget(business_id, dec!(100), dec!(0));
    inactive.is_active = false;
    let mut expired = budget(business_id, dec!(100), dec!(0));
    expired.period_start = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
    expired.period_end = NaiveDate::from_ymd_opt(2026, 2, 28).unwrap();
    let current = budget(business_id, dec!(100), dec!(0));

    let selection =
        BudgetTracker::active_budget(&[inactive, expired, current.clone()], day(15), None)
            .unwrap();

    assert_eq!(selection.budget.id, current.id);
    assert_eq!(selection.warning, None);
}

#[test]
fn test_period_bounds_are_inclusive() {
    let b = budget(BusinessId::new(), dec!(100), dec!(0));
    assert!(BudgetTracker::active_budget(std::slice::from_ref(&b), day(1), None).is_some());
    assert!(BudgetTracker::active_budget(std::slice::from_ref(&b), day(31), None).is_some());
    assert!(
        BudgetTracker::active_budget(
            std::slice::from_ref(&b),
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            None
        )
        .is_none()
    );
}

#[test]
fn test_overlapping_budgets_pick_most_recent_and_warn() {
    let business_id = BusinessId::new();
    let older = budget(business_id, dec!(100), dec!(0));
    let mut newer = budget(business_id, dec!(300), dec!(0));
    newer.created_at = older.created_at + Duration::days(3);

    let selection =
        BudgetTracker::active_budget(&[newer.clone(), older.clone()], day(15), None).unwrap();

    assert_eq!(selection.budget.id, newer.id);
    assert_eq!(
        selection.warning,
        Some(BudgetWarning::AmbiguousActiveBudget {
            candidate_ids: vec![newer.id, older.id],
            chosen: newer.id,
        })
    );
}

#[test]
fn test_department_budget_preferred_with_company_fallback() {
    let business_id = BusinessId::new();
    let company = budget(business_id, dec!(1000), dec!(0));
    let mut sales = budget(business_id, dec!(200), dec!(0));
    sales.department = Some("sales".to_string());
    let budgets = [company.clone(), sales.clone()];

    let for_sales = BudgetTracker::active_budget(&budgets, day(15), Some("sales")).unwrap();
    let for_legal = BudgetTracker::active_budget(&budgets, day(15), Some("legal")).unwrap();
    let company_wide = BudgetTracker::active_budget(&budgets, day(15), None).unwrap();

    assert_eq!(for_sales.budget.id, sales.id);
    assert_eq!(for_legal.budget.id, company.id);
    assert_eq!(company_wide.budget.id, company.id);
    assert_eq!(company_wide.warning, None);
}

struct StaticBudgets(Vec<Budget>);

#[async_trait]
impl BudgetSource for StaticBudgets {
    async fn budgets_for(&self, business_id: BusinessId) -> Result<Vec<Budget>, BudgetError> {
        Ok(self
            .0
            .iter()
            .filter(|b| b.business_id == business_id)
            .cloned()
            .collect())
    }
}

#[tokio::test]
async fn test_active_status_reports_missing_budget() {
    let business_id = BusinessId::new();
    let source = StaticBudgets(vec![budget(BusinessId::new(), dec!(100), dec!(10))]);

    let err = BudgetTracker::active_status(&source, business_id, None, day(15))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BudgetError::NoActiveBudget {
            business_id,
            department: None
        }
    );
}

#[tokio::test]
async fn test_active_status_returns_status() {
    let business_id = BusinessId::new();
    let source = StaticBudgets(vec![budget(business_id, dec!(200), dec!(190))]);

    let report = BudgetTracker::active_status(&source, business_id, None, day(15))
        .await
        .unwrap();

    assert_eq!(report.status.alert, AlertTier::Critical);
    assert_eq!(report.status.usage_percent, dec!(95));
    assert!(report.warning.is_none());
}

fn employee(business_id: BusinessId, status: EmployeeStatus) -> Employee {
    Employee {
        id: EmployeeId::new(),
        business_id,
        user_id: Some(UserId::new()),
        name: "Bruno".to_string(),
        email: "bruno@example.com".to_string(),
        department: Some("sales".to_string()),
        monthly_budget: dec!(400),
        status,
        role: EmployeeRole::Employee,
        created_at: Utc.with_ymd_and_hms(2026, 1, 5, 9, 0, 0).unwrap(),
    }
}

fn employee_order(employee: &Employee, total: Decimal, status: OrderStatus) -> Order {
    let created_at = Utc.with_ymd_and_hms(2026, 3, 12, 13, 0, 0).unwrap();
    let input = NewOrder {
        user_id: employee.user_id.unwrap(),
        business_id: Some(employee.business_id),
        employee_id: Some(employee.id),
        is_business_billed: true,
        subtotal: total,
        delivery_fee: Decimal::ZERO,
        discount: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        total,
        delivery_date: day(12),
        delivery_time: None,
        delivery_postal_code: "04538-133".to_string(),
        items: vec![NewOrderItem {
            dish_name: "Marmita".to_string(),
            category: "mains".to_string(),
            unit_price: total,
            quantity: 1,
        }],
    };
    let mut order = input.into_order(
        OrderId::new(),
        OrderNumber::new(day(12), 1).unwrap(),
        created_at,
    );
    order.status = status;
    order
}

#[test]
fn test_employee_spending_counts_billed_uncancelled_orders() {
    let business_id = BusinessId::new();
    let active = employee(business_id, EmployeeStatus::Active);
    let suspended = employee(business_id, EmployeeStatus::Suspended);
    let orders = vec![
        employee_order(&active, dec!(200), OrderStatus::Delivered),
        employee_order(&active, dec!(100), OrderStatus::Pending),
        employee_order(&active, dec!(80), OrderStatus::Cancelled),
        employee_order(&suspended, dec!(50), OrderStatus::Delivered),
    ];

    let spending = BudgetTracker::employee_spending(&[active.clone(), suspended], &orders);

    assert_eq!(spending.len(), 1);
    let row = &spending[0];
    assert_eq!(row.employee_id, active.id);
    assert_eq!(row.spent, dec!(300));
    assert_eq!(row.remaining, dec!(100));
    assert_eq!(row.order_count, 2);
    assert_eq!(row.usage_percent, dec!(75));
    assert_eq!(row.alert, AlertTier::Warning);
}

#[test]
fn test_usage_beyond_decimal_range_saturates_to_critical() {
    let business_id = BusinessId::new();
    let huge = Decimal::from_i128_with_scale(10_i128.pow(27), 0);

    let ratio_overflow = budget(business_id, dec!(0.01), Decimal::MAX);
    assert_eq!(ratio_overflow.usage_ratio(), Decimal::MAX);
    assert_eq!(ratio_overflow.alert(), AlertTier::Critical);

    let percent_overflow = budget(business_id, dec!(1), huge);
    assert_eq!(percent_overflow.usage_percent(), Decimal::MAX);
    assert_eq!(percent_overflow.alert(), AlertTier::Critical);
}

#[test]
fn test_employee_without_allowance_has_zero_usage() {
    let business_id = BusinessId::new();
    let mut active = employee(business_id, EmployeeStatus::Active);
    active.monthly_budget = Decimal::ZERO;
    let orders = vec![employee_order(&active, dec!(30), OrderStatus::Delivered)];

    let spending = BudgetTracker::employee_spending(&[active], &orders);

    assert_eq!(spending[0].usage_percent, Decimal::ZERO);
    assert_eq!(spending[0].alert, AlertTier::Nominal);
}
