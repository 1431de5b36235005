//! Persisted row models

use crate::sentiment::SentimentLabel;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// One stored trading day for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockPriceBar {
    pub ticker: String,
    pub trade_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Price series point served to the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price_date: NaiveDate,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
}

/// Sentiment row awaiting insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewSentimentRecord {
    pub ticker: String,
    pub sentiment: SentimentLabel,
    pub source: String,
    pub content: String,
}

/// Stored sentiment row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub id: i64,
    pub ticker: String,
    pub sentiment: SentimentLabel,
    pub source: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

impl ToSql for SentimentLabel {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SentimentLabel {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}
