//! Sentiment Service
//!
//! Searches recent news for one ticker, labels every headline and appends the
//! results to the sentiment log.

use super::EtlContext;
use crate::db::NewSentimentRecord;
use crate::error::Result;
use crate::ticker::Ticker;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Articles requested per ticker
pub const ARTICLE_PAGE_SIZE: u32 = 10;

/// Outcome of one sentiment ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentIngestResult {
    pub ticker: Ticker,
    pub fetched: usize,
    pub inserted: usize,
    /// Articles dropped for lacking a title
    pub skipped: usize,
}

pub struct SentimentService;

impl SentimentService {
    /// Fetch, classify and store headlines for `ticker`.
    ///
    /// Articles without a title are skipped and counted. A provider error
    /// fails the call before anything is written; rows from earlier runs are
    /// never consulted, so overlapping articles are stored again.
    pub async fn ingest(ctx: &EtlContext, ticker: &Ticker) -> Result<SentimentIngestResult> {
        info!("SentimentService::ingest - {} via {}", ticker, ctx.news.source_tag());

        let articles = ctx.news.search(ticker.as_str(), ARTICLE_PAGE_SIZE).await?;
        let fetched = articles.len();
        let source = ctx.news.source_tag();

        let mut skipped = 0;
        let mut records = Vec::with_capacity(fetched);
        for article in articles {
            let Some(title) = article.title else {
                skipped += 1;
                warn!(
                    "Skipping {} article without a title ({})",
                    ticker,
                    article.url.as_deref().unwrap_or("no url")
                );
                continue;
            };

            records.push(NewSentimentRecord {
                ticker: ticker.to_string(),
                sentiment: ctx.classifier.classify(Some(title.as_str())),
                source: source.to_string(),
                content: title,
            });
        }

        let inserted = if records.is_empty() {
            0
        } else {
            let db = ctx.db.clone();
            tokio::task::spawn_blocking(move || db.insert_sentiment_records(&records)).await??
        };

        info!(
            "Stored {} sentiment rows for {} ({} fetched, {} skipped)",
            inserted, ticker, fetched, skipped
        );

        Ok(SentimentIngestResult {
            ticker: ticker.clone(),
            fetched,
            inserted,
            skipped,
        })
    }
}
