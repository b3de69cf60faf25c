//! `SeaORM` Entity for budgets table.

use pdj_core::budget::Budget;
use pdj_shared::types::{BudgetId, BusinessId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub department: Option<String>,
    pub period_start: Date,
    pub period_end: Date,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_budget: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub used_amount: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::businesses::Entity",
        from = "Column::BusinessId",
        to = "super::businesses::Column::Id"
    )]
    Businesses,
}

impl Related<super::businesses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Businesses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Budget {
    fn from(model: Model) -> Self {
        Self {
            id: BudgetId::from_uuid(model.id),
            business_id: BusinessId::from_uuid(model.business_id),
            name: model.name,
            department: model.department,
            period_start: model.period_start,
            period_end: model.period_end,
            total_budget: model.total_budget,
            used_amount: model.used_amount,
            is_active: model.is_active,
            created_at: model.created_at.to_utc(),
        }
    }
}
