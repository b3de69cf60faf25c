//! PDJ API Server
//!
//! Main entry point for the order analytics and B2B billing service.

use std::time::Duration;

use chrono::Utc;
use pdj_core::schedule::ScheduledTask;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdj_api::{AppState, create_router};
use pdj_db::{connect_with, migration::Migrator};
use pdj_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdj=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect_with(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    if std::env::var("PDJ_AUTO_MIGRATE").is_ok_and(|v| v == "true") {
        Migrator::up(&db, None).await?;
        info!("Migrations applied");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let refresh = Duration::from_secs(config.analytics.refresh_interval_secs.max(1));
    info!(
        timezone = %config.analytics.timezone,
        refresh_secs = refresh.as_secs(),
        "Analytics configured"
    );

    let state = AppState::new(db, config);
    let shutdown = CancellationToken::new();

    let overdue_state = state.clone();
    let overdue_sweep =
        ScheduledTask::spawn("invoice-overdue-sweep", refresh, &shutdown, move || {
            let state = overdue_state.clone();
            async move {
                if let Err(e) = state.invoices().mark_overdue(Utc::now()).await {
                    warn!(error = %e, "Overdue sweep failed");
                }
            }
        });

    let cache = state.cache.clone();
    let cache_maintenance =
        ScheduledTask::spawn("report-cache-maintenance", refresh, &shutdown, move || {
            cache.run_pending_tasks();
            std::future::ready(())
        });

    // Create router
    let app = create_router(state);

    // Start server
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    let signal = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        error!(error = %e, "Failed to listen for shutdown signal");
                    }
                }
                () = signal.cancelled() => {}
            }
            info!("Shutdown signal received");
        })
        .await?;

    shutdown.cancel();
    for task in [overdue_sweep, cache_maintenance] {
        let name = task.name();
        if let Err(e) = task.join().await {
            error!(task = name, error = %e, "Scheduled task panicked");
        }
    }

    info!("Server stopped");
    Ok(())
}
