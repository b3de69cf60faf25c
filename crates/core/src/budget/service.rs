//! Active budget selection and consumption tracking.

use async_trait::async_trait;
use chrono::NaiveDate;
use pdj_shared::types::BusinessId;
use rust_decimal::Decimal;
use tracing::warn;

use super::error::BudgetError;
use super::types::{
    ActiveBudgetReport, ActiveBudgetSelection, AlertTier, Budget, BudgetStatus, BudgetWarning,
    EmployeeSpending, usage_percent,
};
use crate::business::Employee;
use crate::order::{Order, OrderStatus};

/// Source of a business's budgets.
#[async_trait]
pub trait BudgetSource: Send + Sync {
    /// All budgets of `business_id`, active or not.
    async fn budgets_for(&self, business_id: BusinessId) -> Result<Vec<Budget>, BudgetError>;
}

/// Stateless budget tracker.
pub struct BudgetTracker;

impl BudgetTracker {
    /// Selects the budget authoritative on `today`.
    ///
    /// Candidates are active budgets whose period covers `today`. With a
    /// department, budgets of that department are preferred and company-wide
    /// budgets are the fallback; without one only company-wide budgets match.
    ///
    /// Several candidates are a data problem: the most recently created one is
    /// chosen (ties broken by the larger ID) and a warning is attached.
    #[must_use]
    pub fn active_budget(
        budgets: &[Budget],
        today: NaiveDate,
        department: Option<&str>,
    ) -> Option<ActiveBudgetSelection> {
        let in_force = |budget: &&Budget| budget.is_active && budget.covers(today);

        let mut candidates: Vec<&Budget> = match department {
            Some(department) => budgets
                .iter()
                .filter(in_force)
                .filter(|budget| budget.department.as_deref() == Some(department))
                .collect(),
            None => Vec::new(),
        };
        if candidates.is_empty() {
            candidates = budgets
                .iter()
                .filter(in_force)
                .filter(|budget| budget.department.is_none())
                .collect();
        }

        let chosen = candidates
            .iter()
            .copied()
            .max_by_key(|budget| (budget.created_at, budget.id))?;

        let warning = (candidates.len() > 1).then(|| {
            let candidate_ids = candidates.iter().map(|budget| budget.id).collect();
            warn!(
                business_id = %chosen.business_id,
                department = department.unwrap_or("*"),
                candidates = candidates.len(),
                chosen = %chosen.id,
                "Multiple active budgets match, using the most recent"
            );
            BudgetWarning::AmbiguousActiveBudget {
                candidate_ids,
                chosen: chosen.id,
            }
        });

        Some(ActiveBudgetSelection {
            budget: chosen.clone(),
            warning,
        })
    }

    /// Consumption state of `budget` on `today`.
    #[must_use]
    pub fn status(budget: &Budget, today: NaiveDate) -> BudgetStatus {
        BudgetStatus {
            budget_id: budget.id,
            name: budget.name.clone(),
            department: budget.department.clone(),
            period_start: budget.period_start,
            period_end: budget.period_end,
            total_budget: budget.total_budget,
            used_amount: budget.used_amount,
            remaining_amount: budget.remaining_amount(),
            usage_percent: budget.usage_percent().round_dp(2),
            alert: budget.alert(),
            days_remaining: (budget.period_end - today).num_days().max(0),
        }
    }

    /// Loads the budgets of a business and reports the active one.
    pub async fn active_status<S: BudgetSource + ?Sized>(
        source: &S,
        business_id: BusinessId,
        department: Option<&str>,
        today: NaiveDate,
    ) -> Result<ActiveBudgetReport, BudgetError> {
        let budgets = source.budgets_for(business_id).await?;
        let selection = Self::active_budget(&budgets, today, department).ok_or_else(|| {
            BudgetError::NoActiveBudget {
                business_id,
                department: department.map(str::to_string),
            }
        })?;

        Ok(ActiveBudgetReport {
            status: Self::status(&selection.budget, today),
            warning: selection.warning,
        })
    }

    /// Spend of each active employee against their monthly allowance.
    ///
    /// `orders` should cover the current month; only business-billed orders
    /// that were not cancelled are counted.
    #[must_use]
    pub fn employee_spending(employees: &[Employee], orders: &[Order]) -> Vec<EmployeeSpending> {
        employees
            .iter()
            .filter(|employee| employee.is_active())
            .map(|employee| {
                let (order_count, spent) = orders
                    .iter()
                    .filter(|order| {
                        order.employee_id == Some(employee.id)
                            && order.is_business_billed
                            && order.status != OrderStatus::Cancelled
                    })
                    .fold((0u64, Decimal::ZERO), |(count, sum), order| {
                        (count + 1, sum.saturating_add(order.total))
                    });

                let percent = usage_percent(spent, employee.monthly_budget);

                EmployeeSpending {
                    employee_id: employee.id,
                    name: employee.name.clone(),
                    department: employee.department.clone(),
                    monthly_budget: employee.monthly_budget,
                    spent,
                    remaining: employee.monthly_budget - spent,
                    usage_percent: percent.round_dp(2),
                    alert: AlertTier::from_percent(percent),
                    order_count,
                }
            })
            .collect()
    }
}
