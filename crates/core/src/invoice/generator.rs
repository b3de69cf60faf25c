//! Invoice computation.

use chrono::Days;
use pdj_shared::types::BusinessId;
use rust_decimal::Decimal;

use super::error::InvoiceError;
use super::types::NewInvoice;
use crate::order::{Order, OrderStatus};
use crate::period::{DateInterval, PeriodError, month_bounds};

/// Default days between period end and due date.
pub const DEFAULT_PAYMENT_TERMS_DAYS: u32 = 30;

/// `INV-<last 8 hex digits of the business ID>-<YYYYMM>`.
#[must_use]
pub fn invoice_number(business_id: BusinessId, year: i32, month: u32) -> String {
    let hex = business_id.into_inner().simple().to_string().to_uppercase();
    let short = hex.get(hex.len().saturating_sub(8)..).unwrap_or(&hex);
    format!("INV-{short}-{year:04}{month:02}")
}

/// Stateless invoice generator.
pub struct InvoiceGenerator;

impl InvoiceGenerator {
    /// Returns true if `order` is billed on the business's invoice for `interval`.
    #[must_use]
    pub fn qualifies(order: &Order, business_id: BusinessId, interval: &DateInterval) -> bool {
        order.business_id == Some(business_id)
            && order.is_business_billed
            && order.status != OrderStatus::Cancelled
            && interval.contains(order.created_at)
    }

    /// Computes the invoice of `business_id` for a calendar month.
    ///
    /// `interval` is the month in the business timezone; orders outside it,
    /// cancelled or not billed to the business are skipped.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidPeriod` for an invalid month and
    /// `InvoiceError::NothingToInvoice` when no order qualifies.
    pub fn compute(
        business_id: BusinessId,
        year: i32,
        month: u32,
        interval: &DateInterval,
        orders: &[Order],
        payment_terms_days: u32,
    ) -> Result<NewInvoice, InvoiceError> {
        let (period_start, period_end) = month_bounds(year, month)?;

        let billed: Vec<&Order> = orders
            .iter()
            .filter(|order| Self::qualifies(order, business_id, interval))
            .collect();

        if billed.is_empty() {
            return Err(InvoiceError::NothingToInvoice {
                business_id,
                period_start,
                period_end,
            });
        }

        let due_date = period_end
            .checked_add_days(Days::new(u64::from(payment_terms_days)))
            .ok_or(PeriodError::OutOfRange)?;
        let subtotal: Decimal = billed.iter().map(|order| order.subtotal).sum();
        let tax_amount: Decimal = billed.iter().map(|order| order.tax_amount).sum();

        Ok(NewInvoice {
            business_id,
            invoice_number: invoice_number(business_id, year, month),
            period_start,
            period_end,
            subtotal,
            tax_amount,
            total_amount: subtotal + tax_amount,
            order_count: billed.len() as u64,
            due_date,
            order_ids: billed.iter().map(|order| order.id).collect(),
        })
    }
}
