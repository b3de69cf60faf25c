//! Order analytics.
//!
//! [`AggregationEngine`] reduces an order set to summaries, time series,
//! breakdowns and rankings. [`AnalyticsService`] resolves a period, fetches
//! the current and comparison order sets from an [`OrderSource`] and builds an
//! [`AnalyticsReport`]. Reports can be kept in an [`AnalyticsCache`].

pub mod cache;
pub mod customers;
pub mod engine;
pub mod error;
pub mod service;
pub mod source;
pub mod types;


pub use cache::{AnalyticsCache, ReportKey};
pub use customers::CustomerStats;
pub use engine::{AggregationEngine, DEFAULT_TOP_N, UNASSIGNED_DEPARTMENT};
pub use error::{AnalyticsError, SourceError};
pub use service::AnalyticsService;
pub use source::{OrderQuery, OrderScope, OrderSource};
pub use types::*;
