//! `SeaORM` entity definitions.
//!
//! One module per table, plus the PostgreSQL enum mappings and the
//! conversions into `pdj_core` domain types.

#![allow(missing_docs)]

pub mod businesses;
pub mod budgets;
pub mod employees;
pub mod invoice_orders;
pub mod invoices;
pub mod order_items;
pub mod order_sequences;
pub mod orders;
pub mod sea_orm_active_enums;

pub mod prelude {
    //! Entity re-exports.

    pub use super::budgets::Entity as Budgets;
    pub use super::businesses::Entity as Businesses;
    pub use super::employees::Entity as Employees;
    pub use super::invoice_orders::Entity as InvoiceOrders;
    pub use super::invoices::Entity as Invoices;
    pub use super::order_items::Entity as OrderItems;
    pub use super::order_sequences::Entity as OrderSequences;
    pub use super::orders::Entity as Orders;
}
