//! Reporting periods.
//!
//! A [`PeriodToken`] names either a rolling window ending now or a calendar
//! window aligned to month/year boundaries in the business timezone. The
//! [`PeriodResolver`] turns a token into a concrete half-open interval plus the
//! equally long interval immediately before it, used for growth comparisons.

pub mod error;
pub mod resolver;
pub mod token;

pub use error::PeriodError;
pub use resolver::{DateInterval, PeriodResolver, ResolvedPeriod, month_bounds};
pub use token::{PeriodKind, PeriodToken};
