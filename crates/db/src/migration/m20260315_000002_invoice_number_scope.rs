//! Scopes invoice number uniqueness to the business.
//!
//! Invoice numbers only carry the tail of the business ID, so two businesses
//! may legitimately share a number for the same month.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(SCOPE_TO_BUSINESS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(GLOBAL_SCOPE_SQL).await?;
        Ok(())
    }
}

const SCOPE_TO_BUSINESS_SQL: &str = r"
ALTER TABLE invoices DROP CONSTRAINT IF EXISTS uq_invoices_number;
ALTER TABLE invoices
    ADD CONSTRAINT uq_invoices_business_number UNIQUE (business_id, invoice_number);
";

const GLOBAL_SCOPE_SQL: &str = r"
ALTER TABLE invoices DROP CONSTRAINT IF EXISTS uq_invoices_business_number;
ALTER TABLE invoices ADD CONSTRAINT uq_invoices_number UNIQUE (invoice_number);
";
