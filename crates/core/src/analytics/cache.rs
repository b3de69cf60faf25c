//! Analytics report caching using Moka.
//!
//! Reports are keyed by scope and period token. Entries expire after the
//! configured TTL and are invalidated explicitly when a scope receives a new
//! order.
//!
//! Each invalidation also moves the scope to a new generation. A report is
//! only stored if its scope is still at the generation read before the report
//! was computed, so a computation racing an order write never caches stale
//! data.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::sync::Cache;
use tracing::debug;

use super::source::OrderScope;
use super::types::AnalyticsReport;
use crate::period::PeriodToken;

/// Default cache capacity (number of reports).
const DEFAULT_CACHE_CAPACITY: u64 = 500;

/// Default time-to-live for cached reports (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Cache key of a report.
pub type ReportKey = (OrderScope, PeriodToken);

/// Thread-safe cache of computed analytics reports.
#[derive(Clone)]
pub struct AnalyticsCache {
    cache: Cache<ReportKey, Arc<AnalyticsReport>>,
    /// Last generation of each invalidated scope. Values come from `clock`
    /// and never repeat; entries outlive any in-flight report computation.
    generations: Cache<OrderScope, u64>,
    clock: Arc<AtomicU64>,
}

impl AnalyticsCache {
    /// Creates a cache with default settings (500 reports, 5 minute TTL).
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();
        let generations = Cache::builder()
            .time_to_live(Duration::from_secs(ttl_secs.saturating_mul(2).max(60)))
            .build();

        Self {
            cache,
            generations,
            clock: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Current generation of `scope`; read it before computing a report.
    #[must_use]
    pub fn generation(&self, scope: OrderScope) -> u64 {
        self.generations.get(&scope).unwrap_or(0)
    }

    /// Returns the cached report, if any.
    #[must_use]
    pub fn get(&self, scope: OrderScope, token: PeriodToken) -> Option<Arc<AnalyticsReport>> {
        let hit = self.cache.get(&(scope, token));
        debug!(?scope, period = %token, hit = hit.is_some(), "Analytics cache lookup");
        hit
    }

    /// Stores a report computed at `generation`, unless `scope` has been
    /// invalidated since. Returns the shared handle either way.
    pub fn insert_if_current(
        &self,
        scope: OrderScope,
        token: PeriodToken,
        report: AnalyticsReport,
        generation: u64,
    ) -> Arc<AnalyticsReport> {
        let report = Arc::new(report);
        let key = (scope, token);

        if self.generation(scope) != generation {
            debug!(?scope, period = %token, "Skipping cache insert of stale report");
            return report;
        }
        self.cache.insert(key, Arc::clone(&report));
        // An invalidation may have landed between the check and the insert.
        if self.generation(scope) != generation {
            self.cache.invalidate(&key);
        }
        report
    }

    /// Drops every cached report of `scope` and moves it to a new generation.
    pub fn invalidate_scope(&self, scope: OrderScope) {
        let next = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        self.generations.insert(scope, next);
        for token in PeriodToken::ALL {
            self.cache.invalidate(&(scope, token));
        }
    }

    /// Evicts expired entries.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
        self.generations.run_pending_tasks();
    }
}

impl Default for AnalyticsCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnalyticsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsCache")
            .field("entry_count", &self.cache.entry_count())
            .finish()
    }
}
