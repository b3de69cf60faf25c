//! Invoice data types.

use chrono::{DateTime, NaiveDate, Utc};
use pdj_shared::types::{BusinessId, InvoiceId, OrderId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::InvoiceError;

/// Invoice lifecycle status.
///
/// `draft → sent → paid`, `sent → overdue → paid`, and `draft | sent → cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Generated, not yet sent.
    Draft,
    /// Sent to the business.
    Sent,
    /// Paid.
    Paid,
    /// Past its due date without payment.
    Overdue,
    /// Voided.
    Cancelled,
}

impl InvoiceStatus {
    /// Every status.
    pub const ALL: [Self; 5] = [
        Self::Draft,
        Self::Sent,
        Self::Paid,
        Self::Overdue,
        Self::Cancelled,
    ];

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns true if `next` is a legal successor of this status.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Draft, Self::Sent | Self::Cancelled)
                | (Self::Sent, Self::Paid | Self::Overdue | Self::Cancelled)
                | (Self::Overdue, Self::Paid)
        )
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InvoiceStatus {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvoiceError::UnknownStatus(s.to_string()))
    }
}

/// A persisted invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice ID.
    pub id: InvoiceId,
    /// Billed business.
    pub business_id: BusinessId,
    /// Human-readable number.
    pub invoice_number: String,
    /// First day of the billing period.
    pub period_start: NaiveDate,
    /// Last day of the billing period.
    pub period_end: NaiveDate,
    /// Sum of order subtotals.
    pub subtotal: Decimal,
    /// Sum of order taxes.
    pub tax_amount: Decimal,
    /// `subtotal + tax_amount`.
    pub total_amount: Decimal,
    /// Orders billed.
    pub order_count: u64,
    /// Lifecycle status.
    pub status: InvoiceStatus,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// When the invoice was paid.
    pub paid_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    /// Moves the invoice to `next`.
    ///
    /// `today` is the business-local date; an invoice only becomes overdue
    /// after its due date. Paying sets `paid_at`.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidTransition` or `InvoiceError::NotYetDue`.
    pub fn transition(
        &mut self,
        next: InvoiceStatus,
        at: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<(), InvoiceError> {
        if !self.status.can_transition_to(next) {
            return Err(InvoiceError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        if next == InvoiceStatus::Overdue && today <= self.due_date {
            return Err(InvoiceError::NotYetDue(self.due_date));
        }

        self.status = next;
        if next == InvoiceStatus::Paid {
            self.paid_at = Some(at);
        }
        Ok(())
    }

    /// Returns true if the invoice is sent and past due on `today`.
    #[must_use]
    pub fn is_past_due(&self, today: NaiveDate) -> bool {
        self.status == InvoiceStatus::Sent && today > self.due_date
    }
}

/// An invoice computed but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInvoice {
    /// Billed business.
    pub business_id: BusinessId,
    /// Human-readable number.
    pub invoice_number: String,
    /// First day of the billing period.
    pub period_start: NaiveDate,
    /// Last day of the billing period.
    pub period_end: NaiveDate,
    /// Sum of order subtotals.
    pub subtotal: Decimal,
    /// Sum of order taxes.
    pub tax_amount: Decimal,
    /// `subtotal + tax_amount`.
    pub total_amount: Decimal,
    /// Orders billed.
    pub order_count: u64,
    /// Payment due date.
    pub due_date: NaiveDate,
    /// Orders included.
    pub order_ids: Vec<OrderId>,
}

impl NewInvoice {
    /// The draft invoice stored for this computation.
    #[must_use]
    pub fn into_invoice(self, id: InvoiceId, created_at: DateTime<Utc>) -> Invoice {
        Invoice {
            id,
            business_id: self.business_id,
            invoice_number: self.invoice_number,
            period_start: self.period_start,
            period_end: self.period_end,
            subtotal: self.subtotal,
            tax_amount: self.tax_amount,
            total_amount: self.total_amount,
            order_count: self.order_count,
            status: InvoiceStatus::Draft,
            due_date: self.due_date,
            paid_at: None,
            created_at,
        }
    }
}
