//! `SeaORM` Entity for invoices table.

use pdj_core::invoice::Invoice;
use pdj_shared::types::{BusinessId, InvoiceId};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::InvoiceStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_id: Uuid,
    #[sea_orm(unique)]
    pub invoice_number: String,
    pub period_start: Date,
    pub period_end: Date,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub tax_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
    pub total_amount: Decimal,
    pub order_count: i32,
    pub status: InvoiceStatus,
    pub due_date: Date,
    pub paid_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::businesses::Entity",
        from = "Column::BusinessId",
        to = "super::businesses::Column::Id"
    )]
    Businesses,
    #[sea_orm(has_many = "super::invoice_orders::Entity")]
    InvoiceOrders,
}

impl Related<super::businesses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Businesses.def()
    }
}

impl Related<super::invoice_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InvoiceOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Invoice {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let order_count = u64::try_from(model.order_count)
            .map_err(|_| DbErr::Type(format!("invoice {}: negative order count", model.id)))?;

        Ok(Self {
            id: InvoiceId::from_uuid(model.id),
            business_id: BusinessId::from_uuid(model.business_id),
            invoice_number: model.invoice_number,
            period_start: model.period_start,
            period_end: model.period_end,
            subtotal: model.subtotal,
            tax_amount: model.tax_amount,
            total_amount: model.total_amount,
            order_count,
            status: model.status.into(),
            due_date: model.due_date,
            paid_at: model.paid_at.map(|t| t.to_utc()),
            created_at: model.created_at.to_utc(),
        })
    }
}
