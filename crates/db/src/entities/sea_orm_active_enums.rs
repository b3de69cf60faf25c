//! `SeaORM` mappings for the PostgreSQL enum types.

use pdj_core::business::{EmployeeRole as CoreEmployeeRole, EmployeeStatus as CoreEmployeeStatus};
use pdj_core::invoice::InvoiceStatus as CoreInvoiceStatus;
use pdj_core::order::OrderStatus as CoreOrderStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "order_status")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "preparing")]
    Preparing,
    #[sea_orm(string_value = "out_for_delivery")]
    OutForDelivery,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "employee_status")]
pub enum EmployeeStatus {
    #[sea_orm(string_value = "invited")]
    Invited,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "suspended")]
    Suspended,
    #[sea_orm(string_value = "removed")]
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "employee_role")]
pub enum EmployeeRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "manager")]
    Manager,
    #[sea_orm(string_value = "employee")]
    Employee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "sent")]
    Sent,
    #[sea_orm(string_value = "paid")]
    Paid,
    #[sea_orm(string_value = "overdue")]
    Overdue,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<OrderStatus> for CoreOrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => Self::Pending,
            OrderStatus::Confirmed => Self::Confirmed,
            OrderStatus::Preparing => Self::Preparing,
            OrderStatus::OutForDelivery => Self::OutForDelivery,
            OrderStatus::Delivered => Self::Delivered,
            OrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<CoreOrderStatus> for OrderStatus {
    fn from(status: CoreOrderStatus) -> Self {
        match status {
            CoreOrderStatus::Pending => Self::Pending,
            CoreOrderStatus::Confirmed => Self::Confirmed,
            CoreOrderStatus::Preparing => Self::Preparing,
            CoreOrderStatus::OutForDelivery => Self::OutForDelivery,
            CoreOrderStatus::Delivered => Self::Delivered,
            CoreOrderStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<EmployeeStatus> for CoreEmployeeStatus {
    fn from(status: EmployeeStatus) -> Self {
        match status {
            EmployeeStatus::Invited => Self::Invited,
            EmployeeStatus::Active => Self::Active,
            EmployeeStatus::Suspended => Self::Suspended,
            EmployeeStatus::Removed => Self::Removed,
        }
    }
}

impl From<CoreEmployeeStatus> for EmployeeStatus {
    fn from(status: CoreEmployeeStatus) -> Self {
        match status {
            CoreEmployeeStatus::Invited => Self::Invited,
            CoreEmployeeStatus::Active => Self::Active,
            CoreEmployeeStatus::Suspended => Self::Suspended,
            CoreEmployeeStatus::Removed => Self::Removed,
        }
    }
}

impl From<EmployeeRole> for CoreEmployeeRole {
    fn from(role: EmployeeRole) -> Self {
        match role {
            EmployeeRole::Admin => Self::Admin,
            EmployeeRole::Manager => Self::Manager,
            EmployeeRole::Employee => Self::Employee,
        }
    }
}

impl From<CoreEmployeeRole> for EmployeeRole {
    fn from(role: CoreEmployeeRole) -> Self {
        match role {
            CoreEmployeeRole::Admin => Self::Admin,
            CoreEmployeeRole::Manager => Self::Manager,
            CoreEmployeeRole::Employee => Self::Employee,
        }
    }
}

impl From<InvoiceStatus> for CoreInvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Sent => Self::Sent,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Overdue => Self::Overdue,
            InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<CoreInvoiceStatus> for InvoiceStatus {
    fn from(status: CoreInvoiceStatus) -> Self {
        match status {
            CoreInvoiceStatus::Draft => Self::Draft,
            CoreInvoiceStatus::Sent => Self::Sent,
            CoreInvoiceStatus::Paid => Self::Paid,
            CoreInvoiceStatus::Overdue => Self::Overdue,
            CoreInvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}
