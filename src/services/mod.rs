//! Services Layer
//!
//! Ingestion logic invoked by the workflow runner. Each service takes the
//! shared [`EtlContext`] explicitly; nothing here keeps state between calls
//! beyond what is written to the database.

pub mod price_service;
pub mod schema_service;
pub mod sentiment_service;

#[cfg(test)]
pub(crate) mod fakes;

pub use price_service::{PriceIngestResult, PriceService, PRICE_WINDOW_DAYS};
pub use schema_service::SchemaService;
pub use sentiment_service::{SentimentIngestResult, SentimentService, ARTICLE_PAGE_SIZE};

use crate::config::AppConfig;
use crate::db::Database;
use crate::error::Result;
use crate::providers::{MarketDataProvider, NewsApiClient, NewsProvider, YahooFinanceClient};
use crate::sentiment::SentimentClassifier;
use std::sync::Arc;

/// Resources shared by every task of a workflow run.
///
/// Built once per process and cloned into tasks; the classifier and
/// providers are immutable after construction.
#[derive(Clone)]
pub struct EtlContext {
    pub db: Database,
    pub market: Arc<dyn MarketDataProvider>,
    pub news: Arc<dyn NewsProvider>,
    pub classifier: SentimentClassifier,
}

impl EtlContext {
    pub fn new(
        db: Database,
        market: Arc<dyn MarketDataProvider>,
        news: Arc<dyn NewsProvider>,
        classifier: SentimentClassifier,
    ) -> Self {
        Self {
            db,
            market,
            news,
            classifier,
        }
    }

    /// Wire the production providers from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if config.news_api_key.is_none() {
            tracing::warn!("NEWS_API_KEY is not set; sentiment tasks will fail");
        }

        let market = YahooFinanceClient::new(&config.market_data_url)?;
        let news = NewsApiClient::new(&config.news_api_url, config.news_api_key.clone())?;

        Ok(Self::new(
            Database::new(config.db_path.clone()),
            Arc::new(market),
            Arc::new(news),
            SentimentClassifier::with_lexicon(),
        ))
    }
}

impl std::fmt::Debug for EtlContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EtlContext")
            .field("db", &self.db)
            .field("market", &self.market.name())
            .field("news", &self.news.source_tag())
            .finish()
    }
}
