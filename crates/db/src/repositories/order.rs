//! Order repository: order creation with number allocation, status changes
//! and the analytics order source.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use pdj_core::analytics::{OrderQuery, OrderScope, OrderSource, SourceError};
use pdj_core::numbering::{OrderNumberAllocator, OrderNumberError};
use pdj_core::order::{NewOrder, Order, OrderError, OrderStatus};
use pdj_shared::types::OrderId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    ModelTrait, QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use super::violates_unique;
use super::sequence::{TransactionSequence, resync_sequence};
use crate::entities::{order_items, orders, sea_orm_active_enums::OrderStatus as DbOrderStatus};

/// Attempts at inserting an order before giving up on number conflicts.
pub const MAX_NUMBER_ATTEMPTS: u32 = 5;

/// Upper bound of order IDs per item lookup.
const ITEM_LOOKUP_CHUNK: usize = 1_000;

/// Error types for order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderRepositoryError {
    /// Checkout input violates an order invariant.
    #[error(transparent)]
    Invalid(#[from] OrderError),

    /// No order number could be allocated.
    #[error(transparent)]
    Numbering(#[from] OrderNumberError),

    /// Order not found.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// The order changed status between read and write.
    #[error("Order {0} was modified concurrently")]
    ConcurrentUpdate(OrderId),

    /// Every attempt hit an existing order number.
    #[error("Order number still taken after {0} attempts")]
    NumberConflict(u32),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for orders and their items.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
    tz: Tz,
}

impl OrderRepository {
    /// Creates a repository numbering orders by the local day in `tz`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, tz: Tz) -> Self {
        Self { db, tz }
    }

    /// Validates and stores a new order with its items.
    ///
    /// The order number is taken from the per-day counter inside the insert
    /// transaction, so a failed insert gives its number back. If the number is
    /// already used (the counter was reset or a row was written by hand), the
    /// counter is moved past the stored numbers and the insert is retried, up
    /// to [`MAX_NUMBER_ATTEMPTS`] times.
    pub async fn create_order(
        &self,
        input: NewOrder,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderRepositoryError> {
        input.validate()?;
        let day = now.with_timezone(&self.tz).date_naive();

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            match self.insert_order(input.clone(), now).await {
                Err(OrderRepositoryError::Database(err))
                    if violates_unique(&err, "uq_orders_order_number") =>
                {
                    warn!(attempt, %day, error = %err, "Order number conflict, retrying");
                    resync_sequence(&self.db, day).await?;
                }
                result => return result,
            }
        }

        Err(OrderRepositoryError::NumberConflict(MAX_NUMBER_ATTEMPTS))
    }

    async fn insert_order(
        &self,
        input: NewOrder,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderRepositoryError> {
        let txn = self.db.begin().await?;

        let number = OrderNumberAllocator::new(TransactionSequence(&txn), self.tz)
            .allocate(now)
            .await?;
        let order = input.into_order(OrderId::new(), number, now);

        orders::ActiveModel {
            id: Set(order.id.into_inner()),
            order_number: Set(order.order_number.to_string()),
            user_id: Set(order.user_id.into_inner()),
            business_id: Set(order.business_id.map(|id| id.into_inner())),
            employee_id: Set(order.employee_id.map(|id| id.into_inner())),
            is_business_billed: Set(order.is_business_billed),
            status: Set(order.status.into()),
            subtotal: Set(order.subtotal),
            delivery_fee: Set(order.delivery_fee),
            discount: Set(order.discount),
            tax_amount: Set(order.tax_amount),
            total: Set(order.total),
            delivery_date: Set(order.delivery_date),
            delivery_time: Set(order.delivery_time),
            delivery_postal_code: Set(order.delivery_postal_code.clone()),
            created_at: Set(now.into()),
            confirmed_at: Set(None),
            preparing_at: Set(None),
            out_for_delivery_at: Set(None),
            delivered_at: Set(None),
            cancelled_at: Set(None),
        }
        .insert(&txn)
        .await?;

        let items = order
            .items
            .iter()
            .map(|item| {
                let quantity = i32::try_from(item.quantity)
                    .map_err(|_| OrderError::InvalidQuantity(item.dish_name.clone()))?;
                Ok(order_items::ActiveModel {
                    id: Set(item.id.into_inner()),
                    order_id: Set(order.id.into_inner()),
                    dish_name: Set(item.dish_name.clone()),
                    category: Set(item.category.clone()),
                    unit_price: Set(item.unit_price),
                    quantity: Set(quantity),
                    subtotal: Set(item.subtotal),
                })
            })
            .collect::<Result<Vec<_>, OrderRepositoryError>>()?;
        order_items::Entity::insert_many(items).exec(&txn).await?;

        txn.commit().await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total = %order.total,
            "Order created"
        );
        Ok(order)
    }

    /// Finds an order with its items.
    pub async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderRepositoryError> {
        let Some(model) = orders::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let items = model.find_related(order_items::Entity).all(&self.db).await?;
        Ok(Some(model.into_order(items)?))
    }

    /// Moves an order to `next`, stamping the matching status timestamp.
    ///
    /// The write only applies if the stored status is still the one read, so
    /// two concurrent transitions cannot both succeed.
    pub async fn update_status(
        &self,
        id: OrderId,
        next: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderRepositoryError> {
        let mut order = self
            .find_by_id(id)
            .await?
            .ok_or(OrderRepositoryError::NotFound(id))?;
        let current = order.status;
        order.transition(next, now)?;

        let stamps = &order.timestamps;
        let result = orders::Entity::update_many()
            .set(orders::ActiveModel {
                status: Set(next.into()),
                confirmed_at: Set(stamps.confirmed_at.map(Into::into)),
                preparing_at: Set(stamps.preparing_at.map(Into::into)),
                out_for_delivery_at: Set(stamps.out_for_delivery_at.map(Into::into)),
                delivered_at: Set(stamps.delivered_at.map(Into::into)),
                cancelled_at: Set(stamps.cancelled_at.map(Into::into)),
                ..Default::default()
            })
            .filter(orders::Column::Id.eq(id.into_inner()))
            .filter(orders::Column::Status.eq(DbOrderStatus::from(current)))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(OrderRepositoryError::ConcurrentUpdate(id));
        }

        info!(order_id = %id, from = %current, to = %next, "Order status changed");
        Ok(order)
    }

    /// Orders matching an analytics query, oldest first.
    pub async fn find_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, DbErr> {
        let mut select = orders::Entity::find();

        select = match query.scope {
            OrderScope::All => select,
            OrderScope::User(user_id) => {
                select.filter(orders::Column::UserId.eq(user_id.into_inner()))
            }
            OrderScope::Business(business_id) => {
                select.filter(orders::Column::BusinessId.eq(business_id.into_inner()))
            }
        };
        if query.business_billed_only {
            select = select.filter(orders::Column::IsBusinessBilled.eq(true));
        }
        if let Some(interval) = query.interval {
            select = select
                .filter(orders::Column::CreatedAt.gte(interval.start))
                .filter(orders::Column::CreatedAt.lt(interval.end));
        }

        load_orders(&self.db, select).await
    }
}

#[async_trait]
impl OrderSource for OrderRepository {
    async fn fetch_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, SourceError> {
        self.find_orders(query).await.map_err(SourceError::new)
    }
}

/// Runs `select` ordered by creation time and attaches each order's items.
pub(crate) async fn load_orders<C: ConnectionTrait>(
    conn: &C,
    select: Select<orders::Entity>,
) -> Result<Vec<Order>, DbErr> {
    let models = select
        .order_by_asc(orders::Column::CreatedAt)
        .order_by_asc(orders::Column::Id)
        .all(conn)
        .await?;

    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let mut items: HashMap<Uuid, Vec<order_items::Model>> = HashMap::with_capacity(ids.len());
    for chunk in ids.chunks(ITEM_LOOKUP_CHUNK) {
        let rows = order_items::Entity::find()
            .filter(order_items::Column::OrderId.is_in(chunk.iter().copied()))
            .all(conn)
            .await?;
        for row in rows {
            items.entry(row.order_id).or_default().push(row);
        }
    }

    models
        .into_iter()
        .map(|model| {
            let order_items = items.remove(&model.id).unwrap_or_default();
            model.into_order(order_items)
        })
        .collect()
}
