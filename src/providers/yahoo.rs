//! Yahoo Finance market-data client
//!
//! Fetches daily OHLCV bars from the v8 chart API. A "Not Found" chart error
//! or a result without timestamps means the provider has no data for the
//! symbol (e.g. delisted), which is reported as an empty series.

use super::types::PriceBar;
use super::MarketDataProvider;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    gmtoffset: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

/// Yahoo Finance chart API client
pub struct YahooFinanceClient {
    client: Client,
    base_url: String,
}

impl YahooFinanceClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }

    /// Convert a chart response into bars, oldest first
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<PriceBar>> {
        let data = match (resp.chart.result, resp.chart.error) {
            (Some(results), _) => match results.into_iter().next() {
                Some(data) => data,
                None => return Ok(Vec::new()),
            },
            (None, Some(err)) if err.code == "Not Found" => {
                info!("No market data for {}: {}", symbol, err.description);
                return Ok(Vec::new());
            }
            (None, Some(err)) => {
                return Err(AppError::Provider(format!(
                    "{} for {}: {}",
                    err.code, symbol, err.description
                )))
            }
            (None, None) => {
                return Err(AppError::Provider(format!(
                    "empty chart response for {}",
                    symbol
                )))
            }
        };

        let Some(timestamps) = data.timestamp else {
            info!("No trading days returned for {}", symbol);
            return Ok(Vec::new());
        };

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Provider(format!("no quote data for {}", symbol)))?;

        let offset_secs = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
        let offset = FixedOffset::east_opt(offset_secs)
            .ok_or_else(|| AppError::Provider(format!("invalid gmtoffset {}", offset_secs)))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.with_timezone(&offset).date_naive())
                .ok_or_else(|| AppError::Provider(format!("invalid timestamp: {}", ts)))?;

            let field = |values: &Vec<Option<f64>>| values.get(i).copied().flatten();
            let (Some(open), Some(high), Some(low), Some(close)) = (
                field(&quote.open),
                field(&quote.high),
                field(&quote.low),
                field(&quote.close),
            ) else {
                // holidays and partial rows carry nulls
                debug!("Skipping incomplete bar for {} on {}", symbol, date);
                continue;
            };

            bars.push(PriceBar {
                date,
                open,
                high,
                low,
                close,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            });
        }

        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Ok(bars)
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    fn name(&self) -> &'static str {
        "yahoo_finance"
    }

    async fn daily_bars(&self, symbol: &str, days: u32) -> Result<Vec<PriceBar>> {
        let response = self
            .client
            .get(self.chart_url(symbol))
            .query(&[("range", format!("{}d", days)), ("interval", "1d".to_string())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            // body usually carries the chart error object, but not always
            let body = response.text().await?;
            return match serde_json::from_str::<ChartResponse>(&body) {
                Ok(chart) => Self::parse_response(symbol, chart),
                Err(_) => {
                    info!("No chart data for {} (HTTP 404)", symbol);
                    Ok(Vec::new())
                }
            };
        }

        if !status.is_success() {
            return Err(AppError::Provider(format!("HTTP {} for {}", status, symbol)));
        }

        let chart: ChartResponse = response.json().await?;
        let bars = Self::parse_response(symbol, chart)?;
        debug!("Fetched {} daily bars for {}", bars.len(), symbol);
        Ok(bars)
    }
}
