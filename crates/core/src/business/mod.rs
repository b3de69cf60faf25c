//! B2B business accounts and their employees.

pub mod types;

pub use types::{Business, Employee, EmployeeRole, EmployeeStatus};
