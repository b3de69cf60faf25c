//! Initial schema: businesses, employees, budgets, orders, invoices and the
//! per-day order number counter.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(BUSINESSES_SQL).await?;
        db.execute_unprepared(BUDGETS_SQL).await?;
        db.execute_unprepared(ORDERS_SQL).await?;
        db.execute_unprepared(INVOICES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE order_status AS ENUM (
    'pending', 'confirmed', 'preparing', 'out_for_delivery', 'delivered', 'cancelled'
);
CREATE TYPE employee_status AS ENUM ('invited', 'active', 'suspended', 'removed');
CREATE TYPE employee_role AS ENUM ('admin', 'manager', 'employee');
CREATE TYPE invoice_status AS ENUM ('draft', 'sent', 'paid', 'overdue', 'cancelled');
";

const BUSINESSES_SQL: &str = r"
CREATE TABLE businesses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    tax_id VARCHAR(32),
    billing_email VARCHAR(255) NOT NULL,
    billing_address TEXT,
    manager_user_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_businesses_tax_id UNIQUE (tax_id)
);

CREATE TABLE employees (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    business_id UUID NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
    user_id UUID,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    department VARCHAR(100),
    monthly_budget NUMERIC(12, 2) NOT NULL DEFAULT 0,
    status employee_status NOT NULL DEFAULT 'invited',
    role employee_role NOT NULL DEFAULT 'employee',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_employees_business_email UNIQUE (business_id, email),
    CONSTRAINT chk_employees_budget_non_negative CHECK (monthly_budget >= 0)
);

CREATE INDEX idx_employees_business ON employees(business_id, status);
";

const BUDGETS_SQL: &str = r"
CREATE TABLE budgets (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    business_id UUID NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    department VARCHAR(100),
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    total_budget NUMERIC(14, 2) NOT NULL,
    used_amount NUMERIC(14, 2) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_budgets_total_non_negative CHECK (total_budget >= 0),
    CONSTRAINT chk_budgets_used_non_negative CHECK (used_amount >= 0),
    CONSTRAINT chk_budgets_period CHECK (period_end >= period_start)
);

-- Active budget lookup
CREATE INDEX idx_budgets_business_period ON budgets(business_id, period_start, period_end)
    WHERE is_active;
";

const ORDERS_SQL: &str = r"
-- One row per local calendar day; last_value is the last sequence handed out
CREATE TABLE order_sequences (
    day DATE PRIMARY KEY,
    last_value INTEGER NOT NULL,
    CONSTRAINT chk_order_sequences_positive CHECK (last_value > 0)
);

CREATE TABLE orders (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    order_number VARCHAR(16) NOT NULL,
    user_id UUID NOT NULL,
    business_id UUID REFERENCES businesses(id),
    employee_id UUID REFERENCES employees(id),
    is_business_billed BOOLEAN NOT NULL DEFAULT false,
    status order_status NOT NULL DEFAULT 'pending',
    subtotal NUMERIC(12, 2) NOT NULL,
    delivery_fee NUMERIC(12, 2) NOT NULL DEFAULT 0,
    discount NUMERIC(12, 2) NOT NULL DEFAULT 0,
    tax_amount NUMERIC(12, 2) NOT NULL DEFAULT 0,
    total NUMERIC(12, 2) NOT NULL,
    delivery_date DATE NOT NULL,
    delivery_time TIME,
    delivery_postal_code VARCHAR(16) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    confirmed_at TIMESTAMPTZ,
    preparing_at TIMESTAMPTZ,
    out_for_delivery_at TIMESTAMPTZ,
    delivered_at TIMESTAMPTZ,
    cancelled_at TIMESTAMPTZ,
    CONSTRAINT uq_orders_order_number UNIQUE (order_number),
    CONSTRAINT chk_orders_order_number CHECK (order_number ~ '^PDJ-[0-9]{8}-[0-9]{3}$'),
    CONSTRAINT chk_orders_amounts_non_negative CHECK (
        subtotal >= 0 AND delivery_fee >= 0 AND discount >= 0 AND tax_amount >= 0
    ),
    CONSTRAINT chk_orders_total CHECK (total = subtotal + delivery_fee - discount + tax_amount),
    CONSTRAINT chk_orders_business_billed CHECK (NOT is_business_billed OR business_id IS NOT NULL)
);

CREATE INDEX idx_orders_business_created ON orders(business_id, created_at);
CREATE INDEX idx_orders_user_created ON orders(user_id, created_at);
CREATE INDEX idx_orders_created ON orders(created_at);

CREATE TABLE order_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    order_id UUID NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
    dish_name VARCHAR(255) NOT NULL,
    category VARCHAR(100) NOT NULL,
    unit_price NUMERIC(12, 2) NOT NULL,
    quantity INTEGER NOT NULL,
    subtotal NUMERIC(12, 2) NOT NULL,
    CONSTRAINT chk_order_items_quantity CHECK (quantity > 0),
    CONSTRAINT chk_order_items_subtotal CHECK (subtotal = unit_price * quantity)
);

CREATE INDEX idx_order_items_order ON order_items(order_id);
";

const INVOICES_SQL: &str = r"
CREATE TABLE invoices (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    business_id UUID NOT NULL REFERENCES businesses(id),
    invoice_number VARCHAR(32) NOT NULL,
    period_start DATE NOT NULL,
    period_end DATE NOT NULL,
    subtotal NUMERIC(14, 2) NOT NULL,
    tax_amount NUMERIC(14, 2) NOT NULL,
    total_amount NUMERIC(14, 2) NOT NULL,
    order_count INTEGER NOT NULL,
    status invoice_status NOT NULL DEFAULT 'draft',
    due_date DATE NOT NULL,
    paid_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_invoices_business_period UNIQUE (business_id, period_start, period_end),
    CONSTRAINT uq_invoices_number UNIQUE (invoice_number),
    CONSTRAINT chk_invoices_total CHECK (total_amount = subtotal + tax_amount),
    CONSTRAINT chk_invoices_paid CHECK (status <> 'paid' OR paid_at IS NOT NULL)
);

-- Overdue sweep
CREATE INDEX idx_invoices_status_due ON invoices(status, due_date);

-- An order is billed on at most one invoice
CREATE TABLE invoice_orders (
    invoice_id UUID NOT NULL REFERENCES invoices(id) ON DELETE CASCADE,
    order_id UUID NOT NULL REFERENCES orders(id),
    PRIMARY KEY (invoice_id, order_id),
    CONSTRAINT uq_invoice_orders_order UNIQUE (order_id)
);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS invoice_orders CASCADE;
DROP TABLE IF EXISTS invoices CASCADE;
DROP TABLE IF EXISTS order_items CASCADE;
DROP TABLE IF EXISTS orders CASCADE;
DROP TABLE IF EXISTS order_sequences CASCADE;
DROP TABLE IF EXISTS budgets CASCADE;
DROP TABLE IF EXISTS employees CASCADE;
DROP TABLE IF EXISTS businesses CASCADE;

DROP TYPE IF EXISTS invoice_status;
DROP TYPE IF EXISTS employee_role;
DROP TYPE IF EXISTS employee_status;
DROP TYPE IF EXISTS order_status;
";
