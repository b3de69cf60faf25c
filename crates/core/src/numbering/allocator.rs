//! Sequence allocation for order numbers.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use dashmap::DashMap;

use super::error::OrderNumberError;
use super::number::{MAX_DAILY_SEQUENCE, OrderNumber};

/// Source of per-day sequence values.
///
/// Implementations must be atomic: every call for the same `day` returns a value
/// no other call has received. A "count today's orders, add one" query is not a
/// valid implementation.
#[async_trait]
pub trait SequenceAllocator: Send + Sync {
    /// Returns the next 1-based sequence value for `day`.
    async fn next_value(&self, day: NaiveDate) -> Result<u32, OrderNumberError>;
}

/// Process-local allocator backed by one atomic counter per day.
#[derive(Debug, Default)]
pub struct InMemorySequence {
    counters: DashMap<NaiveDate, AtomicU32>,
}

impl InMemorySequence {
    /// Creates an allocator with no days issued yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value handed out for `day`, or 0.
    #[must_use]
    pub fn current(&self, day: NaiveDate) -> u32 {
        self.counters
            .get(&day)
            .map_or(0, |counter| counter.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl SequenceAllocator for InMemorySequence {
    async fn next_value(&self, day: NaiveDate) -> Result<u32, OrderNumberError> {
        let counter = self.counters.entry(day).or_default();
        Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Produces order numbers for the business's local calendar day.
#[derive(Debug)]
pub struct OrderNumberAllocator<S> {
    sequence: S,
    tz: Tz,
}

impl<S: SequenceAllocator> OrderNumberAllocator<S> {
    /// Creates an allocator that numbers orders per day in `tz`.
    pub const fn new(sequence: S, tz: Tz) -> Self {
        Self { sequence, tz }
    }

    /// Local calendar day of an instant.
    #[must_use]
    pub fn local_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    /// Allocates the number of an order created at `at`.
    ///
    /// # Errors
    ///
    /// Returns `OrderNumberError::SequenceExhausted` once the day has passed
    /// 999 orders, or the allocator's storage error.
    pub async fn allocate(&self, at: DateTime<Utc>) -> Result<OrderNumber, OrderNumberError> {
        let day = self.local_day(at);
        let value = self.sequence.next_value(day).await?;
        if value > MAX_DAILY_SEQUENCE {
            return Err(OrderNumberError::SequenceExhausted(day));
        }
        OrderNumber::new(day, value)
    }
}
