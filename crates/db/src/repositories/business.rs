//! Business and employee repository.

use chrono::{DateTime, Utc};
use pdj_core::business::{Business, Employee, EmployeeRole, EmployeeStatus};
use pdj_shared::types::{BusinessId, EmployeeId, UserId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use super::is_unique_violation;
use crate::entities::{businesses, employees, sea_orm_active_enums::EmployeeStatus as DbStatus};

/// Error types for business operations.
#[derive(Debug, thiserror::Error)]
pub enum BusinessRepositoryError {
    /// Business not found.
    #[error("Business not found: {0}")]
    NotFound(BusinessId),

    /// Another business uses this tax ID.
    #[error("Tax ID already registered: {0}")]
    DuplicateTaxId(String),

    /// The email is already registered for this business.
    #[error("Employee email already registered: {0}")]
    DuplicateEmail(String),

    /// Monthly budget cannot be negative.
    #[error("Monthly budget cannot be negative")]
    NegativeBudget,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for registering a business.
#[derive(Debug, Clone)]
pub struct CreateBusinessInput {
    /// Legal name.
    pub name: String,
    /// Tax registration number.
    pub tax_id: Option<String>,
    /// Where invoices are sent.
    pub billing_email: String,
    /// Billing address.
    pub billing_address: Option<String>,
    /// Account manager.
    pub manager_user_id: Option<UserId>,
}

/// Input for adding an employee to a business.
#[derive(Debug, Clone)]
pub struct CreateEmployeeInput {
    /// Employer.
    pub business_id: BusinessId,
    /// Linked customer account, once the invitation is accepted.
    pub user_id: Option<UserId>,
    /// Full name.
    pub name: String,
    /// Work email.
    pub email: String,
    /// Department name.
    pub department: Option<String>,
    /// Monthly spending allowance.
    pub monthly_budget: Decimal,
    /// Initial status.
    pub status: EmployeeStatus,
    /// Role within the business account.
    pub role: EmployeeRole,
}

/// Repository for businesses and their employees.
#[derive(Debug, Clone)]
pub struct BusinessRepository {
    db: DatabaseConnection,
}

impl BusinessRepository {
    /// Creates a new business repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Registers a business.
    pub async fn create(
        &self,
        input: CreateBusinessInput,
        now: DateTime<Utc>,
    ) -> Result<Business, BusinessRepositoryError> {
        let tax_id = input.tax_id.clone();
        let model = businesses::ActiveModel {
            id: Set(BusinessId::new().into_inner()),
            name: Set(input.name),
            tax_id: Set(input.tax_id),
            billing_email: Set(input.billing_email),
            billing_address: Set(input.billing_address),
            manager_user_id: Set(input.manager_user_id.map(UserId::into_inner)),
            created_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BusinessRepositoryError::DuplicateTaxId(tax_id.unwrap_or_default())
            } else {
                e.into()
            }
        })?;

        Ok(model.into())
    }

    /// Finds a business by ID.
    pub async fn find_by_id(&self, id: BusinessId) -> Result<Option<Business>, DbErr> {
        Ok(businesses::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .map(Business::from))
    }

    /// Adds an employee to an existing business.
    pub async fn add_employee(
        &self,
        input: CreateEmployeeInput,
        now: DateTime<Utc>,
    ) -> Result<Employee, BusinessRepositoryError> {
        if input.monthly_budget.is_sign_negative() {
            return Err(BusinessRepositoryError::NegativeBudget);
        }
        if self.find_by_id(input.business_id).await?.is_none() {
            return Err(BusinessRepositoryError::NotFound(input.business_id));
        }

        let email = input.email.clone();
        let model = employees::ActiveModel {
            id: Set(EmployeeId::new().into_inner()),
            business_id: Set(input.business_id.into_inner()),
            user_id: Set(input.user_id.map(UserId::into_inner)),
            name: Set(input.name),
            email: Set(input.email),
            department: Set(input.department),
            monthly_budget: Set(input.monthly_budget),
            status: Set(input.status.into()),
            role: Set(input.role.into()),
            created_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                BusinessRepositoryError::DuplicateEmail(email)
            } else {
                e.into()
            }
        })?;

        Ok(model.into())
    }

    /// Every employee of a business, by name.
    pub async fn employees(&self, business_id: BusinessId) -> Result<Vec<Employee>, DbErr> {
        let models = employees::Entity::find()
            .filter(employees::Column::BusinessId.eq(business_id.into_inner()))
            .order_by_asc(employees::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Employee::from).collect())
    }

    /// Active employees of a business.
    pub async fn active_employees(&self, business_id: BusinessId) -> Result<Vec<Employee>, DbErr> {
        let models = employees::Entity::find()
            .filter(employees::Column::BusinessId.eq(business_id.into_inner()))
            .filter(employees::Column::Status.eq(DbStatus::Active))
            .order_by_asc(employees::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Employee::from).collect())
    }
}
