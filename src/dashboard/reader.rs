//! Read-only queries behind the dashboard

use crate::db::{Database, PricePoint};
use crate::error::Result;
use crate::providers::newsapi::NEWSAPI_SOURCE;
use crate::sentiment::SentimentLabel;
use crate::ticker::Ticker;
use std::collections::BTreeMap;
use tracing::error;

/// Everything the page needs for one ticker.
///
/// Query failures are kept as messages instead of failing the render.
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub sentiment: BTreeMap<SentimentLabel, i64>,
    pub prices: Vec<PricePoint>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DashboardReader {
    db: Database,
}

impl DashboardReader {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Label counts from NewsAPI for `ticker`
    pub async fn sentiment_counts(&self, ticker: &Ticker) -> Result<BTreeMap<SentimentLabel, i64>> {
        let db = self.db.clone();
        let symbol = ticker.to_string();
        tokio::task::spawn_blocking(move || db.sentiment_counts(&symbol, NEWSAPI_SOURCE)).await?
    }

    pub async fn price_series(&self, ticker: &Ticker) -> Result<Vec<PricePoint>> {
        let db = self.db.clone();
        let symbol = ticker.to_string();
        tokio::task::spawn_blocking(move || db.price_series(&symbol)).await?
    }

    /// Run both queries; each failure becomes an error line and an empty section
    pub async fn load(&self, ticker: &Ticker) -> DashboardData {
        let mut data = DashboardData::default();

        match self.sentiment_counts(ticker).await {
            Ok(counts) => data.sentiment = counts,
            Err(e) => {
                error!("Sentiment query failed for {}: {}", ticker, e);
                data.errors.push(format!("Sentiment DB Error: {}", e));
            }
        }

        match self.price_series(ticker).await {
            Ok(prices) => data.prices = prices,
            Err(e) => {
                error!("Price query failed for {}: {}", ticker, e);
                data.errors.push(format!("Price DB Error: {}", e));
            }
        }

        data
    }
}
