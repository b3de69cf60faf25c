//! `SeaORM` Entity for businesses table.

use pdj_core::business::Business;
use pdj_shared::types::{BusinessId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "businesses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub tax_id: Option<String>,
    pub billing_email: String,
    pub billing_address: Option<String>,
    pub manager_user_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::employees::Entity")]
    Employees,
    #[sea_orm(has_many = "super::budgets::Entity")]
    Budgets,
    #[sea_orm(has_many = "super::invoices::Entity")]
    Invoices,
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl Related<super::budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Budgets.def()
    }
}

impl Related<super::invoices::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Business {
    fn from(model: Model) -> Self {
        Self {
            id: BusinessId::from_uuid(model.id),
            name: model.name,
            tax_id: model.tax_id,
            billing_email: model.billing_email,
            billing_address: model.billing_address,
            manager_user_id: model.manager_user_id.map(UserId::from_uuid),
            created_at: model.created_at.to_utc(),
        }
    }
}
