//! Per-day order number counter.
//!
//! The counter is a single upsert so concurrent callers never read the same
//! value: the row lock taken by `ON CONFLICT DO UPDATE` serializes them.

use async_trait::async_trait;
use chrono::NaiveDate;
use pdj_core::numbering::{ORDER_NUMBER_PREFIX, OrderNumberError, SequenceAllocator};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbBackend, DbErr, EntityTrait,
    Statement, Value,
};

use crate::entities::order_sequences;

const NEXT_VALUE_SQL: &str = r"
INSERT INTO order_sequences (day, last_value)
VALUES ($1, 1)
ON CONFLICT (day) DO UPDATE SET last_value = order_sequences.last_value + 1
RETURNING last_value
";

// Raises the counter of a day to the highest number already stored, for when
// the counter fell behind the orders table.
const RESYNC_SQL: &str = r"
INSERT INTO order_sequences (day, last_value)
SELECT $1, MAX(CAST(RIGHT(order_number, 3) AS INTEGER))
FROM orders
WHERE order_number LIKE $2
HAVING COUNT(*) > 0
ON CONFLICT (day) DO UPDATE
SET last_value = GREATEST(order_sequences.last_value, EXCLUDED.last_value)
";

/// Increments and returns the counter of `day` on `conn`.
pub(crate) async fn next_sequence_value<C: ConnectionTrait>(
    conn: &C,
    day: NaiveDate,
) -> Result<u32, DbErr> {
    let row = conn
        .query_one(Statement::from_sql_and_values(
            DbBackend::Postgres,
            NEXT_VALUE_SQL,
            [Value::from(day)],
        ))
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("order sequence for {day}")))?;
    let value: i32 = row.try_get("", "last_value")?;
    u32::try_from(value).map_err(|_| DbErr::Type(format!("order sequence for {day}: {value}")))
}

/// Moves the counter of `day` past every order number stored for that day.
pub(crate) async fn resync_sequence<C: ConnectionTrait>(
    conn: &C,
    day: NaiveDate,
) -> Result<(), DbErr> {
    let pattern = format!("{ORDER_NUMBER_PREFIX}-{}-%", day.format("%Y%m%d"));
    conn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        RESYNC_SQL,
        [Value::from(day), Value::from(pattern)],
    ))
    .await?;
    Ok(())
}

/// Order number counter backed by the `order_sequences` table.
#[derive(Debug, Clone)]
pub struct OrderSequenceRepository {
    db: DatabaseConnection,
}

impl OrderSequenceRepository {
    /// Creates a new sequence repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Last value handed out for `day`, or 0.
    pub async fn current(&self, day: NaiveDate) -> Result<u32, DbErr> {
        let row = order_sequences::Entity::find_by_id(day).one(&self.db).await?;
        Ok(row.map_or(0, |r| u32::try_from(r.last_value).unwrap_or(0)))
    }

    /// Moves the counter of `day` past every stored order number of that day.
    pub async fn resync(&self, day: NaiveDate) -> Result<(), DbErr> {
        resync_sequence(&self.db, day).await
    }
}

#[async_trait]
impl SequenceAllocator for OrderSequenceRepository {
    async fn next_value(&self, day: NaiveDate) -> Result<u32, OrderNumberError> {
        next_sequence_value(&self.db, day)
            .await
            .map_err(|e| OrderNumberError::Storage(e.to_string()))
    }
}

/// Counter bound to an open transaction, so a rolled-back order also returns
/// its number.
pub(crate) struct TransactionSequence<'a>(pub(crate) &'a DatabaseTransaction);

#[async_trait]
impl SequenceAllocator for TransactionSequence<'_> {
    async fn next_value(&self, day: NaiveDate) -> Result<u32, OrderNumberError> {
        next_sequence_value(self.0, day)
            .await
            .map_err(|e| OrderNumberError::Storage(e.to_string()))
    }
}
