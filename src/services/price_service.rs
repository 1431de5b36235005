//! Price Service
//!
//! Pulls the trailing week of daily bars for one ticker and stores them,
//! leaving already-stored dates untouched.

use super::EtlContext;
use crate::error::Result;
use crate::ticker::Ticker;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Calendar days requested from the market-data provider
pub const PRICE_WINDOW_DAYS: u32 = 7;

/// Outcome of one price ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceIngestResult {
    pub ticker: Ticker,
    pub fetched: usize,
    pub inserted: usize,
}

pub struct PriceService;

impl PriceService {
    /// Fetch and store the price window for `ticker`.
    ///
    /// An empty provider response is not an error. Storage runs as one
    /// transaction on one connection.
    pub async fn ingest(ctx: &EtlContext, ticker: &Ticker) -> Result<PriceIngestResult> {
        info!("PriceService::ingest - {} via {}", ticker, ctx.market.name());

        let bars = ctx.market.daily_bars(ticker.as_str(), PRICE_WINDOW_DAYS).await?;
        let fetched = bars.len();

        if bars.is_empty() {
            warn!("No price data returned for {}", ticker);
            return Ok(PriceIngestResult {
                ticker: ticker.clone(),
                fetched: 0,
                inserted: 0,
            });
        }

        let db = ctx.db.clone();
        let symbol = ticker.to_string();
        let inserted = tokio::task::spawn_blocking(move || db.insert_price_bars(&symbol, &bars)).await??;

        info!(
            "Stored {} new price rows for {} ({} fetched, {} already present)",
            inserted,
            ticker,
            fetched,
            fetched - inserted
        );

        Ok(PriceIngestResult {
            ticker: ticker.clone(),
            fetched,
            inserted,
        })
    }
}
