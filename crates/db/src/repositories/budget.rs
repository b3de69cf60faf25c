//! Budget repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pdj_core::budget::{Budget, BudgetError, BudgetSource};
use pdj_shared::types::{BudgetId, BusinessId};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entities::budgets;

/// Error types for budget persistence.
#[derive(Debug, thiserror::Error)]
pub enum BudgetRepositoryError {
    /// Period end precedes its start.
    #[error("Budget period ends before it starts")]
    InvalidPeriod,

    /// Amount cannot be negative.
    #[error("Budget amount cannot be negative")]
    NegativeAmount,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetInput {
    /// Owning business.
    pub business_id: BusinessId,
    /// Display name.
    pub name: String,
    /// Department the budget applies to; `None` for company-wide.
    pub department: Option<String>,
    /// First day covered.
    pub period_start: NaiveDate,
    /// Last day covered.
    pub period_end: NaiveDate,
    /// Amount allotted.
    pub total_budget: Decimal,
}

/// Repository for business budgets.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an active budget with nothing used yet.
    pub async fn create(
        &self,
        input: CreateBudgetInput,
        now: DateTime<Utc>,
    ) -> Result<Budget, BudgetRepositoryError> {
        if input.period_end < input.period_start {
            return Err(BudgetRepositoryError::InvalidPeriod);
        }
        if input.total_budget.is_sign_negative() {
            return Err(BudgetRepositoryError::NegativeAmount);
        }

        let model = budgets::ActiveModel {
            id: Set(BudgetId::new().into_inner()),
            business_id: Set(input.business_id.into_inner()),
            name: Set(input.name),
            department: Set(input.department),
            period_start: Set(input.period_start),
            period_end: Set(input.period_end),
            total_budget: Set(input.total_budget),
            used_amount: Set(Decimal::ZERO),
            is_active: Set(true),
            created_at: Set(now.into()),
        }
        .insert(&self.db)
        .await?;

        Ok(model.into())
    }

    /// Every budget of a business, newest first.
    pub async fn find_by_business(&self, business_id: BusinessId) -> Result<Vec<Budget>, DbErr> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::BusinessId.eq(business_id.into_inner()))
            .order_by_desc(budgets::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Budget::from).collect())
    }

    /// Deactivates a budget. Returns false if it did not exist.
    pub async fn deactivate(&self, id: BudgetId) -> Result<bool, DbErr> {
        let result = budgets::Entity::update_many()
            .set(budgets::ActiveModel {
                is_active: Set(false),
                ..Default::default()
            })
            .filter(budgets::Column::Id.eq(id.into_inner()))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl BudgetSource for BudgetRepository {
    async fn budgets_for(&self, business_id: BusinessId) -> Result<Vec<Budget>, BudgetError> {
        self.find_by_business(business_id)
            .await
            .map_err(|e| BudgetError::SourceUnavailable(e.to_string()))
    }
}
