//! Monthly B2B invoicing.
//!
//! [`InvoiceGenerator`] computes an invoice from a business's billable orders
//! for one calendar month. [`InvoiceService`] runs generation and lifecycle
//! transitions against an [`InvoiceStore`], which must reject a second invoice
//! for the same business and period.

pub mod error;
pub mod generator;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::InvoiceError;
pub use generator::{DEFAULT_PAYMENT_TERMS_DAYS, InvoiceGenerator, invoice_number};
pub use service::{InvoiceService, InvoiceStore};
pub use types::{Invoice, InvoiceStatus, NewInvoice};
