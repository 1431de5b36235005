//! In-memory providers for service and workflow tests

use super::EtlContext;
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::providers::{MarketDataProvider, NewsArticle, NewsProvider, PriceBar};
use crate::sentiment::SentimentClassifier;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Seven consecutive bars starting 2025-01-06
pub fn week_of_bars() -> Vec<PriceBar> {
    (0..7)
        .map(|offset| PriceBar {
            date: NaiveDate::from_ymd_opt(2025, 1, 6 + offset).unwrap(),
            open: 100.0 + offset as f64,
            high: 104.0 + offset as f64,
            low: 98.0 + offset as f64,
            close: 102.0 + offset as f64,
            volume: 1_000_000,
        })
        .collect()
}

#[derive(Default)]
struct Script {
    failures: HashMap<String, usize>,
    requests: Vec<(String, u32)>,
}

impl Script {
    fn record(&mut self, key: &str, size: u32) -> Result<()> {
        self.requests.push((key.to_string(), size));
        match self.failures.get_mut(key) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(AppError::Provider(format!("scripted failure for {}", key)))
            }
            _ => Ok(()),
        }
    }
}

/// Market provider serving a fixed week unless overridden per symbol
#[derive(Default)]
pub struct FakeMarket {
    bars: Mutex<HashMap<String, Vec<PriceBar>>>,
    script: Mutex<Script>,
}

impl FakeMarket {
    pub fn set_bars(&self, symbol: &str, bars: Vec<PriceBar>) {
        self.bars.lock().unwrap().insert(symbol.to_string(), bars);
    }

    /// Fail the next `times` requests for `symbol`
    pub fn fail_next(&self, symbol: &str, times: usize) {
        self.script.lock().unwrap().failures.insert(symbol.to_string(), times);
    }

    pub fn requests(&self) -> Vec<(String, u32)> {
        self.script.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl MarketDataProvider for FakeMarket {
    fn name(&self) -> &'static str {
        "fake-market"
    }

    async fn daily_bars(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>> {
        self.script.lock().unwrap().record(symbol, days)?;
        Ok(self
            .bars
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .unwrap_or_else(week_of_bars))
    }
}

/// News provider serving two headlines unless overridden per query
#[derive(Default)]
pub struct FakeNews {
    articles: Mutex<HashMap<String, Vec<NewsArticle>>>,
    script: Mutex<Script>,
}

impl FakeNews {
    pub fn set_articles(&self, query: &str, articles: Vec<NewsArticle>) {
        self.articles.lock().unwrap().insert(query.to_string(), articles);
    }

    pub fn fail_next(&self, query: &str, times: usize) {
        self.script.lock().unwrap().failures.insert(query.to_string(), times);
    }

    pub fn requests(&self) -> Vec<(String, u32)> {
        self.script.lock().unwrap().requests.clone()
    }
}

#[async_trait]
impl NewsProvider for FakeNews {
    fn source_tag(&self) -> &'static str {
        "NewsAPI"
    }

    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<NewsArticle>> {
        self.script.lock().unwrap().record(query, page_size)?;
        let articles = self.articles.lock().unwrap().get(query).cloned().unwrap_or_else(|| {
            vec![
                NewsArticle::with_title(format!("{} stock soars", query)),
                NewsArticle::with_title(format!("{} shares plunge", query)),
            ]
        });
        Ok(articles.into_iter().take(page_size as usize).collect())
    }
}

/// Context over a fresh temp database, schema not yet created
pub fn context() -> (TempDir, EtlContext) {
    let (dir, ctx, _, _) = context_with_handles();
    (dir, ctx)
}

pub fn context_with_handles() -> (TempDir, EtlContext, Arc<FakeMarket>, Arc<FakeNews>) {
    let dir = TempDir::new().unwrap();
    let market = Arc::new(FakeMarket::default());
    let news = Arc::new(FakeNews::default());
    let ctx = EtlContext::new(
        Database::new(dir.path().join("stock_data.db")),
        market.clone(),
        news.clone(),
        SentimentClassifier::with_lexicon(),
    );
    (dir, ctx, market, news)
}
