//! `SeaORM` Entity for employees table.

use pdj_core::business::Employee;
use pdj_shared::types::{BusinessId, EmployeeId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{EmployeeRole, EmployeeStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub monthly_budget: Decimal,
    pub status: EmployeeStatus,
    pub role: EmployeeRole,
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
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::businesses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Businesses.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Employee {
    fn from(model: Model) -> Self {
        Self {
            id: EmployeeId::from_uuid(model.id),
            business_id: BusinessId::from_uuid(model.business_id),
            user_id: model.user_id.map(UserId::from_uuid),
            name: model.name,
            email: model.email,
            department: model.department,
            monthly_budget: model.monthly_budget,
            status: model.status.into(),
            role: model.role.into(),
            created_at: model.created_at.to_utc(),
        }
    }
}
