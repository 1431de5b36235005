//! Daily ETL worker

use anyhow::Context;
use stock_sentiment::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    stock_sentiment::init_tracing();

    let config = AppConfig::from_env().context("failed to load configuration")?;

    stock_sentiment::run_worker(config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
    .context("ETL worker failed")?;

    Ok(())
}
