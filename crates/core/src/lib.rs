//! Core business logic for PDJ order analytics and B2B billing.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Data is fetched through the async contracts each module declares
//! ([`analytics::OrderSource`], [`budget::BudgetSource`], [`invoice::InvoiceStore`],
//! [`numbering::SequenceAllocator`]); the db crate implements them.
//!
//! # Modules
//!
//! - `period` - Period tokens and interval resolution
//! - `order` - Orders, line items and the status lifecycle
//! - `numbering` - `PDJ-YYYYMMDD-NNN` order numbers
//! - `analytics` - Aggregation engine, reports and report cache
//! - `budget` - Active budget selection and consumption alerts
//! - `business` - Business accounts and employees
//! - `invoice` - Monthly invoice generation and lifecycle
//! - `schedule` - Cancellable periodic tasks

pub mod analytics;
pub mod budget;
pub mod business;
pub mod invoice;
pub mod numbering;
pub mod order;
pub mod period;
pub mod schedule;
