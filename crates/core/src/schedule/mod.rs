//! Caller-owned periodic tasks.

pub mod task;

pub use task::ScheduledTask;
