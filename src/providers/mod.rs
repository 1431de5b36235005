//! External data providers
//!
//! Market data (daily OHLCV bars) and news search are reached through traits
//! so the ingestion services can run against in-memory fakes in tests.

pub mod types;
pub mod yahoo;
pub mod newsapi;

use crate::error::Result;
use async_trait::async_trait;
pub use newsapi::NewsApiClient;
pub use types::{NewsArticle, PriceBar};
pub use yahoo::YahooFinanceClient;

/// Source of daily OHLCV bars
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Daily bars covering the trailing `days` calendar days, oldest first.
    /// An unknown or delisted symbol yields an empty vector.
    async fn daily_bars(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>>;
}

/// Free-text news search
#[async_trait]
pub trait NewsProvider: Send + Sync {
    /// Provenance tag stored alongside classified records
    fn source_tag(&self) -> &'static str;

    /// Up to `page_size` recent articles matching `query`
    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<NewsArticle>>;
}
