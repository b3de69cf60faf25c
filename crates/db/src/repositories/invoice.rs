//! Invoice repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use pdj_core::invoice::{Invoice, InvoiceError, InvoiceStatus, InvoiceStore, NewInvoice};
use pdj_core::order::Order;
use pdj_core::period::DateInterval;
use pdj_shared::types::{BusinessId, InvoiceId, PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

use super::order::load_orders;
use super::violates_unique;
use crate::entities::{
    invoice_orders, invoices, orders,
    sea_orm_active_enums::{InvoiceStatus as DbInvoiceStatus, OrderStatus as DbOrderStatus},
};

/// One invoice per business and billing period.
const PERIOD_CONSTRAINT: &str = "uq_invoices_business_period";
/// An order is billed on at most one invoice.
const BILLED_ORDER_CONSTRAINT: &str = "uq_invoice_orders_order";

fn storage(err: DbErr) -> InvoiceError {
    InvoiceError::Storage(err.to_string())
}

/// Repository for invoices and the orders they bill.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Invoices of a business, newest period first.
    pub async fn list_for_business(
        &self,
        business_id: BusinessId,
        page: &PageRequest,
    ) -> Result<PageResponse<Invoice>, DbErr> {
        let query = invoices::Entity::find()
            .filter(invoices::Column::BusinessId.eq(business_id.into_inner()));

        let total = query.clone().count(&self.db).await?;
        let models = query
            .order_by_desc(invoices::Column::PeriodStart)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;
        let data = models
            .into_iter()
            .map(Invoice::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    async fn insert_invoice(
        &self,
        invoice: NewInvoice,
        created_at: DateTime<Utc>,
    ) -> Result<Invoice, DbErr> {
        let order_count = i32::try_from(invoice.order_count)
            .map_err(|_| DbErr::Type(format!("order count {}", invoice.order_count)))?;
        let order_ids = invoice.order_ids.clone();
        let invoice = invoice.into_invoice(InvoiceId::new(), created_at);

        let txn = self.db.begin().await?;

        invoices::ActiveModel {
            id: Set(invoice.id.into_inner()),
            business_id: Set(invoice.business_id.into_inner()),
            invoice_number: Set(invoice.invoice_number.clone()),
            period_start: Set(invoice.period_start),
            period_end: Set(invoice.period_end),
            subtotal: Set(invoice.subtotal),
            tax_amount: Set(invoice.tax_amount),
            total_amount: Set(invoice.total_amount),
            order_count: Set(order_count),
            status: Set(invoice.status.into()),
            due_date: Set(invoice.due_date),
            paid_at: Set(None),
            created_at: Set(created_at.into()),
            updated_at: Set(created_at.into()),
        }
        .insert(&txn)
        .await?;

        let links = order_ids.iter().map(|order_id| invoice_orders::ActiveModel {
            invoice_id: Set(invoice.id.into_inner()),
            order_id: Set(order_id.into_inner()),
        });
        invoice_orders::Entity::insert_many(links)
            .on_empty_do_nothing()
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(invoice)
    }
}

#[async_trait]
impl InvoiceStore for InvoiceRepository {
    async fn find_for_period(
        &self,
        business_id: BusinessId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<Invoice>, InvoiceError> {
        invoices::Entity::find()
            .filter(invoices::Column::BusinessId.eq(business_id.into_inner()))
            .filter(invoices::Column::PeriodStart.eq(period_start))
            .filter(invoices::Column::PeriodEnd.eq(period_end))
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(Invoice::try_from)
            .transpose()
            .map_err(storage)
    }

    async fn billable_orders(
        &self,
        business_id: BusinessId,
        interval: DateInterval,
    ) -> Result<Vec<Order>, InvoiceError> {
        let select = orders::Entity::find()
            .filter(orders::Column::BusinessId.eq(business_id.into_inner()))
            .filter(orders::Column::IsBusinessBilled.eq(true))
            .filter(orders::Column::Status.ne(DbOrderStatus::Cancelled))
            .filter(orders::Column::CreatedAt.gte(interval.start))
            .filter(orders::Column::CreatedAt.lt(interval.end));

        load_orders(&self.db, select).await.map_err(storage)
    }

    async fn insert(
        &self,
        invoice: NewInvoice,
        created_at: DateTime<Utc>,
    ) -> Result<Invoice, InvoiceError> {
        let business_id = invoice.business_id;
        let period_start = invoice.period_start;
        let period_end = invoice.period_end;

        self.insert_invoice(invoice, created_at)
            .await
            .map_err(|e| {
                if violates_unique(&e, PERIOD_CONSTRAINT) {
                    InvoiceError::AlreadyInvoiced {
                        business_id,
                        period_start,
                        period_end,
                    }
                } else if violates_unique(&e, BILLED_ORDER_CONSTRAINT) {
                    InvoiceError::OrdersAlreadyBilled
                } else {
                    storage(e)
                }
            })
    }

    async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoiceError> {
        invoices::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(storage)?
            .map(Invoice::try_from)
            .transpose()
            .map_err(storage)
    }

    async fn update_status(
        &self,
        invoice: &Invoice,
        expected: InvoiceStatus,
    ) -> Result<(), InvoiceError> {
        let result = invoices::Entity::update_many()
            .set(invoices::ActiveModel {
                status: Set(invoice.status.into()),
                paid_at: Set(invoice.paid_at.map(Into::into)),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .filter(invoices::Column::Id.eq(invoice.id.into_inner()))
            .filter(invoices::Column::Status.eq(DbInvoiceStatus::from(expected)))
            .exec(&self.db)
            .await
            .map_err(storage)?;

        if result.rows_affected == 0 {
            return Err(InvoiceError::ConcurrentUpdate(invoice.id));
        }
        Ok(())
    }

    async fn mark_overdue(&self, today: NaiveDate) -> Result<u64, InvoiceError> {
        let result = invoices::Entity::update_many()
            .set(invoices::ActiveModel {
                status: Set(DbInvoiceStatus::Overdue),
                updated_at: Set(Utc::now().into()),
                ..Default::default()
            })
            .filter(invoices::Column::Status.eq(DbInvoiceStatus::Sent))
            .filter(invoices::Column::DueDate.lt(today))
            .exec(&self.db)
            .await
            .map_err(storage)?;

        Ok(result.rows_affected)
    }
}
