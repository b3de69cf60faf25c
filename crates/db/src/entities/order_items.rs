//! `SeaORM` Entity for order_items table.

use pdj_core::order::OrderItem;
use pdj_shared::types::{OrderId, OrderItemId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub order_id: Uuid,
    pub dish_name: String,
    pub category: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub unit_price: Decimal,
    pub quantity: i32,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub subtotal: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id",
        on_delete = "Cascade"
    )]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for OrderItem {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(model.quantity)
            .map_err(|_| DbErr::Type(format!("order item {}: negative quantity", model.id)))?;

        Ok(Self {
            id: OrderItemId::from_uuid(model.id),
            order_id: OrderId::from_uuid(model.order_id),
            dish_name: model.dish_name,
            category: model.category,
            unit_price: model.unit_price,
            quantity,
            subtotal: model.subtotal,
        })
    }
}
