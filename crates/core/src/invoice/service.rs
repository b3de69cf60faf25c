//! Invoice generation and lifecycle over a store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use pdj_shared::types::{BusinessId, InvoiceId};
use tracing::{info, warn};

use super::error::InvoiceError;
use super::generator::InvoiceGenerator;
use super::types::{Invoice, InvoiceStatus, NewInvoice};
use crate::order::Order;
use crate::period::{DateInterval, PeriodResolver, month_bounds};

/// Persistence contract for invoices.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// The invoice of a business for an exact period, if any.
    async fn find_for_period(
        &self,
        business_id: BusinessId,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<Option<Invoice>, InvoiceError>;

    /// Business-billed orders of a business created within `interval`.
    async fn billable_orders(
        &self,
        business_id: BusinessId,
        interval: DateInterval,
    ) -> Result<Vec<Order>, InvoiceError>;

    /// Stores a draft invoice.
    ///
    /// Must return `InvoiceError::AlreadyInvoiced` if the business already has
    /// an invoice for the period, including one inserted concurrently, and
    /// `InvoiceError::OrdersAlreadyBilled` if an order is on another invoice.
    async fn insert(
        &self,
        invoice: NewInvoice,
        created_at: DateTime<Utc>,
    ) -> Result<Invoice, InvoiceError>;

    /// Loads an invoice.
    async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, InvoiceError>;

    /// Persists the status and `paid_at` of `invoice` if its stored status is
    /// still `expected`; otherwise returns `InvoiceError::ConcurrentUpdate`.
    async fn update_status(
        &self,
        invoice: &Invoice,
        expected: InvoiceStatus,
    ) -> Result<(), InvoiceError>;

    /// Marks every sent invoice due before `today` as overdue. Returns how
    /// many changed.
    async fn mark_overdue(&self, today: NaiveDate) -> Result<u64, InvoiceError>;
}

/// Generates invoices and applies lifecycle transitions.
#[derive(Debug)]
pub struct InvoiceService<S> {
    store: S,
    resolver: PeriodResolver,
    payment_terms_days: u32,
}

impl<S: InvoiceStore> InvoiceService<S> {
    /// Creates a service for a business timezone and payment terms.
    pub const fn new(store: S, tz: Tz, payment_terms_days: u32) -> Self {
        Self {
            store,
            resolver: PeriodResolver::new(tz),
            payment_terms_days,
        }
    }

    /// Underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Generates the draft invoice of `business_id` for `year`-`month`.
    pub async fn generate(
        &self,
        business_id: BusinessId,
        year: i32,
        month: u32,
        now: DateTime<Utc>,
    ) -> Result<Invoice, InvoiceError> {
        let (period_start, period_end) = month_bounds(year, month)?;

        if self
            .store
            .find_for_period(business_id, period_start, period_end)
            .await?
            .is_some()
        {
            warn!(%business_id, %period_start, %period_end, "Invoice already generated for period");
            return Err(InvoiceError::AlreadyInvoiced {
                business_id,
                period_start,
                period_end,
            });
        }

        let interval = self.resolver.month_interval(year, month)?;
        let orders = self.store.billable_orders(business_id, interval).await?;
        let draft = InvoiceGenerator::compute(
            business_id,
            year,
            month,
            &interval,
            &orders,
            self.payment_terms_days,
        )?;

        let invoice = self.store.insert(draft, now).await.inspect_err(|e| {
            if matches!(e, InvoiceError::AlreadyInvoiced { .. }) {
                warn!(%business_id, %period_start, "Concurrent invoice generation rejected");
            }
        })?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            %business_id,
            order_count = invoice.order_count,
            total_amount = %invoice.total_amount,
            "Invoice generated"
        );
        Ok(invoice)
    }

    /// Moves an invoice to `next`.
    pub async fn transition(
        &self,
        id: InvoiceId,
        next: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> Result<Invoice, InvoiceError> {
        let mut invoice = self
            .store
            .get(id)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;
        let current = invoice.status;

        invoice.transition(next, now, self.resolver.local_date(now))?;
        self.store.update_status(&invoice, current).await?;

        info!(invoice_id = %id, from = %current, to = %next, "Invoice status changed");
        Ok(invoice)
    }

    /// Marks sent invoices past their due date as overdue.
    pub async fn mark_overdue(&self, now: DateTime<Utc>) -> Result<u64, InvoiceError> {
        let today = self.resolver.local_date(now);
        let updated = self.store.mark_overdue(today).await?;
        if updated > 0 {
            info!(%today, updated, "Invoices marked overdue");
        }
        Ok(updated)
    }
}
