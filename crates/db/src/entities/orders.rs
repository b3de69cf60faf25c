//! `SeaORM` Entity for orders table.

use pdj_core::numbering::OrderNumber;
use pdj_core::order::{Order, OrderItem, StatusTimestamps};
use pdj_shared::types::{BusinessId, EmployeeId, OrderId, UserId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::OrderStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_number: String,
    pub user_id: Uuid,
    pub business_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub is_business_billed: bool,
    pub status: OrderStatus,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub delivery_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub tax_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total: Decimal,
    pub delivery_date: Date,
    pub delivery_time: Option<Time>,
    pub delivery_postal_code: String,
    pub created_at: DateTimeWithTimeZone,
    pub confirmed_at: Option<DateTimeWithTimeZone>,
    pub preparing_at: Option<DateTimeWithTimeZone>,
    pub out_for_delivery_at: Option<DateTimeWithTimeZone>,
    pub delivered_at: Option<DateTimeWithTimeZone>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_items::Entity")]
    OrderItems,
    #[sea_orm(
        belongs_to = "super::businesses::Entity",
        from = "Column::BusinessId",
        to = "super::businesses::Column::Id"
    )]
    Businesses,
    #[sea_orm(
        belongs_to = "super::employees::Entity",
        from = "Column::EmployeeId",
        to = "super::employees::Column::Id"
    )]
    Employees,
}

impl Related<super::order_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl Related<super::businesses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Businesses.def()
    }
}

impl Related<super::employees::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employees.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds the domain order from this row and its item rows.
    ///
    /// # Errors
    ///
    /// Returns `DbErr::Type` if a stored value does not fit the domain type.
    pub fn into_order(self, items: Vec<super::order_items::Model>) -> Result<Order, DbErr> {
        let order_number: OrderNumber = self
            .order_number
            .parse()
            .map_err(|e| DbErr::Type(format!("order {}: {e}", self.id)))?;
        let items = items
            .into_iter()
            .map(OrderItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Order {
            id: OrderId::from_uuid(self.id),
            order_number,
            user_id: UserId::from_uuid(self.user_id),
            business_id: self.business_id.map(BusinessId::from_uuid),
            employee_id: self.employee_id.map(EmployeeId::from_uuid),
            is_business_billed: self.is_business_billed,
            status: self.status.into(),
            subtotal: self.subtotal,
            delivery_fee: self.delivery_fee,
            discount: self.discount,
            tax_amount: self.tax_amount,
            total: self.total,
            delivery_date: self.delivery_date,
            delivery_time: self.delivery_time,
            delivery_postal_code: self.delivery_postal_code,
            created_at: self.created_at.to_utc(),
            timestamps: StatusTimestamps {
                confirmed_at: self.confirmed_at.map(|t| t.to_utc()),
                preparing_at: self.preparing_at.map(|t| t.to_utc()),
                out_for_delivery_at: self.out_for_delivery_at.map(|t| t.to_utc()),
                delivered_at: self.delivered_at.map(|t| t.to_utc()),
                cancelled_at: self.cancelled_at.map(|t| t.to_utc()),
            },
            items,
        })
    }
}
