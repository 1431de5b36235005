//! Stock Sentiment ETL
//!
//! Daily ingestion of price bars and classified news headlines for a small
//! ticker watch-list into SQLite, plus a read-only dashboard over the result.

pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod providers;
pub mod sentiment;
pub mod services;
pub mod ticker;
pub mod workflow;

use config::AppConfig;
use db::Database;
use services::EtlContext;
use std::future::Future;
use ticker::Ticker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workflow::{DailySchedule, RetryPolicy, WorkflowDefinition, WorkflowRunner};

/// Install the global tracing subscriber; honours `RUST_LOG`
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stock_sentiment=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// Build the daily workflow runner from configuration
pub fn build_runner(config: &AppConfig) -> error::Result<WorkflowRunner> {
    let ctx = EtlContext::from_config(config)?;
    let retry = RetryPolicy {
        delay: config.retry_delay,
        ..RetryPolicy::default()
    };
    Ok(WorkflowRunner::new(
        ctx,
        WorkflowDefinition::daily(&Ticker::watchlist(), retry),
    ))
}

/// Run the ETL worker until `shutdown` resolves
pub async fn run_worker<F>(config: AppConfig, shutdown: F) -> error::Result<()>
where
    F: Future<Output = ()>,
{
    tracing::info!("Starting ETL worker (database {})", config.db_path.display());

    let runner = build_runner(&config)?;
    let schedule = DailySchedule::new(config.timezone);

    tokio::select! {
        _ = workflow::run_daily(runner, schedule, config.run_on_start) => {}
        _ = shutdown => tracing::info!("ETL worker shutting down"),
    }

    Ok(())
}

/// Run the dashboard server until `shutdown` resolves
pub async fn run_dashboard<F>(config: AppConfig, shutdown: F) -> error::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!("Starting dashboard");
    let addr = config.dashboard_addr()?;
    dashboard::serve(Database::new(config.db_path), addr, shutdown).await
}
