//! Budget data types.

use chrono::{DateTime, NaiveDate, Utc};
use pdj_shared::types::{BudgetId, BusinessId, EmployeeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Usage percent from which a budget is in the warning tier.
pub const WARNING_PERCENT: Decimal = Decimal::from_parts(75, 0, 0, false, 0);

/// Usage percent above which a budget is in the critical tier.
pub const CRITICAL_PERCENT: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

/// Budget consumption alert tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertTier {
    /// Below 75%.
    Nominal,
    /// 75% to 90% inclusive.
    Warning,
    /// Above 90%.
    Critical,
}

impl AlertTier {
    /// Tier of a usage percentage.
    #[must_use]
    pub fn from_percent(percent: Decimal) -> Self {
        if percent > CRITICAL_PERCENT {
            Self::Critical
        } else if percent >= WARNING_PERCENT {
            Self::Warning
        } else {
            Self::Nominal
        }
    }
}

/// `used / allotted`; zero when nothing is allotted, `Decimal::MAX` when
/// the quotient does not fit.
pub(crate) fn usage_ratio(used: Decimal, allotted: Decimal) -> Decimal {
    if allotted.is_zero() {
        return Decimal::ZERO;
    }
    used.checked_div(allotted).unwrap_or(Decimal::MAX)
}

/// [`usage_ratio`] in percent, saturating at `Decimal::MAX`.
pub(crate) fn usage_percent(used: Decimal, allotted: Decimal) -> Decimal {
    usage_ratio(used, allotted)
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::MAX)
}

/// A spending budget of a business, optionally scoped to one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    /// Budget ID.
    pub id: BudgetId,
    /// Owning business.
    pub business_id: BusinessId,
    /// Display name.
    pub name: String,
    /// Department scope; `None` applies company-wide.
    pub department: Option<String>,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered (inclusive).
    pub period_end: NaiveDate,
    /// Amount allotted.
    pub total_budget: Decimal,
    /// Amount consumed so far.
    pub used_amount: Decimal,
    /// Whether the budget is enabled.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Budget {
    /// `total_budget - used_amount`.
    #[must_use]
    pub fn remaining_amount(&self) -> Decimal {
        self.total_budget - self.used_amount
    }

    /// `used_amount / total_budget`, or zero for an empty budget.
    #[must_use]
    pub fn usage_ratio(&self) -> Decimal {
        usage_ratio(self.used_amount, self.total_budget)
    }

    /// Usage ratio in percent.
    #[must_use]
    pub fn usage_percent(&self) -> Decimal {
        usage_percent(self.used_amount, self.total_budget)
    }

    /// Alert tier of the current usage.
    #[must_use]
    pub fn alert(&self) -> AlertTier {
        AlertTier::from_percent(self.usage_percent())
    }

    /// Returns true if `day` falls within the budget period.
    #[must_use]
    pub fn covers(&self, day: NaiveDate) -> bool {
        self.period_start <= day && day <= self.period_end
    }
}

/// Data-quality warnings raised while selecting a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BudgetWarning {
    /// More than one budget is active for the same scope and day.
    AmbiguousActiveBudget {
        /// Every matching budget.
        candidate_ids: Vec<BudgetId>,
        /// The budget that was used.
        chosen: BudgetId,
    },
}

/// The budget authoritative for a scope and day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBudgetSelection {
    /// Selected budget.
    pub budget: Budget,
    /// Set when the selection was not unique.
    pub warning: Option<BudgetWarning>,
}

/// Consumption state of a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// Budget ID.
    pub budget_id: BudgetId,
    /// Display name.
    pub name: String,
    /// Department scope.
    pub department: Option<String>,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Amount allotted.
    pub total_budget: Decimal,
    /// Amount consumed.
    pub used_amount: Decimal,
    /// Amount left.
    pub remaining_amount: Decimal,
    /// Usage in percent, rounded to 2 places.
    pub usage_percent: Decimal,
    /// Alert tier.
    pub alert: AlertTier,
    /// Days left until the period ends, zero once it has.
    pub days_remaining: i64,
}

/// Active budget status together with any selection warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBudgetReport {
    /// Status of the selected budget.
    pub status: BudgetStatus,
    /// Selection warning.
    pub warning: Option<BudgetWarning>,
}

/// Month-to-date spend of one employee against their monthly allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeSpending {
    /// Employee ID.
    pub employee_id: EmployeeId,
    /// Display name.
    pub name: String,
    /// Department.
    pub department: Option<String>,
    /// Monthly allowance.
    pub monthly_budget: Decimal,
    /// Business-billed spend this month.
    pub spent: Decimal,
    /// `monthly_budget - spent`.
    pub remaining: Decimal,
    /// Usage in percent, rounded to 2 places.
    pub usage_percent: Decimal,
    /// Alert tier.
    pub alert: AlertTier,
    /// Orders counted.
    pub order_count: u64,
}
