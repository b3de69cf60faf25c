//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes over the analytics and billing engine
//! - Error-to-response mapping
//! - Shared application state

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use chrono_tz::Tz;
use pdj_core::analytics::{AnalyticsCache, AnalyticsService};
use pdj_core::invoice::InvoiceService;
use pdj_db::{BudgetRepository, BusinessRepository, InvoiceRepository, OrderRepository};
use pdj_shared::AppConfig;
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// Cache of computed analytics reports.
    pub cache: AnalyticsCache,
}

impl AppState {
    /// Builds the state, sizing the report cache from configuration.
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let cache = AnalyticsCache::with_config(
            config.analytics.cache_capacity,
            config.analytics.cache_ttl_secs,
        );
        Self {
            db: Arc::new(db),
            config: Arc::new(config),
            cache,
        }
    }

    /// Business timezone.
    pub fn timezone(&self) -> Tz {
        self.config.analytics.timezone
    }

    /// Order repository numbering orders in the business timezone.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new((*self.db).clone(), self.timezone())
    }

    /// Budget repository.
    pub fn budgets(&self) -> BudgetRepository {
        BudgetRepository::new((*self.db).clone())
    }

    /// Business and employee repository.
    pub fn businesses(&self) -> BusinessRepository {
        BusinessRepository::new((*self.db).clone())
    }

    /// Analytics over the order repository.
    pub fn analytics(&self) -> AnalyticsService<OrderRepository> {
        AnalyticsService::from_config(self.orders(), &self.config.analytics)
    }

    /// Invoice repository.
    pub fn invoice_repository(&self) -> InvoiceRepository {
        InvoiceRepository::new((*self.db).clone())
    }

    /// Invoice generation and lifecycle.
    pub fn invoices(&self) -> InvoiceService<InvoiceRepository> {
        InvoiceService::new(
            self.invoice_repository(),
            self.timezone(),
            self.config.billing.payment_terms_days,
        )
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
