//! Business and employee data types.

use chrono::{DateTime, Utc};
use pdj_shared::types::{BusinessId, EmployeeId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A company billed monthly for its employees' orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Business {
    /// Business ID.
    pub id: BusinessId,
    /// Legal or trading name.
    pub name: String,
    /// Tax registration number.
    pub tax_id: Option<String>,
    /// Address invoices are sent to.
    pub billing_email: String,
    /// Billing address.
    pub billing_address: Option<String>,
    /// Account manager on the customer side.
    pub manager_user_id: Option<UserId>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Employee membership status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    /// Invitation sent, not yet accepted.
    Invited,
    /// Can place business-billed orders.
    Active,
    /// Temporarily blocked.
    Suspended,
    /// No longer part of the business.
    Removed,
}

/// Employee role inside the business account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    /// Full control of the business account.
    Admin,
    /// Manages budgets and employees.
    Manager,
    /// Places orders.
    Employee,
}

/// An employee of a business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Employee ID.
    pub id: EmployeeId,
    /// Owning business.
    pub business_id: BusinessId,
    /// Linked customer account once the invitation is accepted.
    pub user_id: Option<UserId>,
    /// Display name.
    pub name: String,
    /// Work email.
    pub email: String,
    /// Department, if assigned.
    pub department: Option<String>,
    /// Individual monthly spending allowance.
    pub monthly_budget: Decimal,
    /// Membership status.
    pub status: EmployeeStatus,
    /// Role.
    pub role: EmployeeRole,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Employee {
    /// Returns true if the employee may currently order on the business account.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }
}
