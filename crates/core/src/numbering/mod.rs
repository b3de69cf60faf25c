//! Human-readable order numbering.
//!
//! Order numbers have the form `PDJ-<YYYYMMDD>-<NNN>` where `NNN` is the
//! 1-based sequence of the order within its local calendar day. Sequence values
//! come from a [`SequenceAllocator`], which must hand out each value exactly once
//! per day even under concurrent checkouts.

pub mod allocator;
pub mod error;
pub mod number;

pub use allocator::{InMemorySequence, OrderNumberAllocator, SequenceAllocator};
pub use error::OrderNumberError;
pub use number::{MAX_DAILY_SEQUENCE, ORDER_NUMBER_PREFIX, OrderNumber};
