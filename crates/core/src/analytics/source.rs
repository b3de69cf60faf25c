//! Data-fetch contract for analytics.

use async_trait::async_trait;
use pdj_shared::types::{BusinessId, UserId};

use super::error::SourceError;
use crate::order::Order;
use crate::period::DateInterval;

/// Whose orders a query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderScope {
    /// Every order.
    All,
    /// Orders placed by one customer.
    User(UserId),
    /// Orders belonging to one business.
    Business(BusinessId),
}

/// Filter for an order fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderQuery {
    /// Owner filter.
    pub scope: OrderScope,
    /// Creation-time window; `None` fetches the full history.
    pub interval: Option<DateInterval>,
    /// Only orders billed to a business.
    pub business_billed_only: bool,
}

impl OrderQuery {
    /// Orders of `scope` created within `interval`.
    ///
    /// Business scopes are restricted to business-billed orders.
    #[must_use]
    pub fn within(scope: OrderScope, interval: DateInterval) -> Self {
        Self {
            scope,
            interval: Some(interval),
            business_billed_only: matches!(scope, OrderScope::Business(_)),
        }
    }

    /// Full order history of a customer.
    #[must_use]
    pub const fn history(user_id: UserId) -> Self {
        Self {
            scope: OrderScope::User(user_id),
            interval: None,
            business_billed_only: false,
        }
    }
}

/// Source of order records with their items.
///
/// Implementations return every order matching the query; aggregation never
/// runs over a partial result.
#[async_trait]
pub trait OrderSource: Send + Sync {
    /// Fetches the orders matching `query`.
    async fn fetch_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, SourceError>;
}
