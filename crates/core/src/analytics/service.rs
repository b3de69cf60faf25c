//! Analytics over an order source.

use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use pdj_shared::config::AnalyticsConfig;
use pdj_shared::types::{BusinessId, UserId};
use tracing::{debug, error, warn};

use super::customers::CustomerStats;
use super::engine::{AggregationEngine, DEFAULT_TOP_N};
use super::error::AnalyticsError;
use super::source::{OrderQuery, OrderScope, OrderSource};
use super::types::{AnalyticsReport, GroupEntry};
use crate::business::Employee;
use crate::order::Order;
use crate::period::{PeriodResolver, PeriodToken};

/// Fetches orders from an [`OrderSource`] and aggregates them.
///
/// Every fetch carries the configured deadline. A failed or late fetch aborts
/// the request; reports are never computed over partial data.
#[derive(Debug)]
pub struct AnalyticsService<S> {
    source: S,
    resolver: PeriodResolver,
    fetch_timeout: Duration,
    top_n: usize,
}

impl<S: OrderSource> AnalyticsService<S> {
    /// Creates a service bucketing in `tz` with the given fetch deadline.
    pub const fn new(source: S, tz: Tz, fetch_timeout: Duration) -> Self {
        Self {
            source,
            resolver: PeriodResolver::new(tz),
            fetch_timeout,
            top_n: DEFAULT_TOP_N,
        }
    }

    /// Creates a service from the analytics configuration section.
    pub fn from_config(source: S, config: &AnalyticsConfig) -> Self {
        Self::new(
            source,
            config.timezone,
            Duration::from_secs(config.fetch_timeout_secs),
        )
        .with_top_n(config.top_n)
    }

    /// Sets the ranking length.
    #[must_use]
    pub const fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Period resolver in the business timezone.
    pub const fn resolver(&self) -> &PeriodResolver {
        &self.resolver
    }

    /// Underlying order source.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Builds the report for `scope` over `token` resolved at `now`.
    ///
    /// The current and comparison periods are fetched concurrently.
    pub async fn report(
        &self,
        scope: OrderScope,
        token: PeriodToken,
        now: DateTime<Utc>,
    ) -> Result<AnalyticsReport, AnalyticsError> {
        let period = self.resolver.resolve(token, now)?;
        let current_query = OrderQuery::within(scope, period.current);
        let previous_query = OrderQuery::within(scope, period.previous);

        let (current, previous) =
            futures::try_join!(self.fetch(&current_query), self.fetch(&previous_query))?;

        debug!(
            ?scope,
            period = %token,
            current = current.len(),
            previous = previous.len(),
            "Building analytics report"
        );

        Ok(AggregationEngine::build_report(
            period,
            &current,
            &previous,
            self.resolver.timezone(),
            self.top_n,
        ))
    }

    /// Business-billed spend per department over `token`.
    pub async fn department_breakdown(
        &self,
        business_id: BusinessId,
        token: PeriodToken,
        now: DateTime<Utc>,
        employees: &[Employee],
    ) -> Result<Vec<GroupEntry>, AnalyticsError> {
        let interval = self.resolver.interval(token, now)?;
        let orders = self
            .fetch(&OrderQuery::within(OrderScope::Business(business_id), interval))
            .await?;
        Ok(AggregationEngine::department_breakdown(&orders, employees))
    }

    /// Lifetime statistics for each customer, in input order.
    ///
    /// Histories load concurrently. A customer whose history fails to load
    /// gets [`CustomerStats::unavailable`]; the batch always completes.
    pub async fn customer_statistics(&self, customers: &[UserId]) -> Vec<CustomerStats> {
        let loads = customers.iter().map(|&user_id| async move {
            match self.fetch(&OrderQuery::history(user_id)).await {
                Ok(orders) => CustomerStats::from_orders(user_id, &orders),
                Err(e) => {
                    warn!(%user_id, error = %e, "Customer history unavailable, using empty stats");
                    CustomerStats::unavailable(user_id)
                }
            }
        });
        join_all(loads).await
    }

    /// Fetches orders with the configured deadline.
    pub async fn fetch(&self, query: &OrderQuery) -> Result<Vec<Order>, AnalyticsError> {
        match tokio::time::timeout(self.fetch_timeout, self.source.fetch_orders(query)).await {
            Ok(Ok(orders)) => Ok(orders),
            Ok(Err(e)) => {
                error!(scope = ?query.scope, error = %e, "Order fetch failed");
                Err(AnalyticsError::SourceUnavailable(e))
            }
            Err(_) => {
                error!(
                    scope = ?query.scope,
                    timeout_secs = self.fetch_timeout.as_secs(),
                    "Order fetch timed out"
                );
                Err(AnalyticsError::Timeout(self.fetch_timeout.as_secs()))
            }
        }
    }
}
