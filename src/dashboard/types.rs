//! Dashboard request and response types

use crate::db::PricePoint;
use crate::error::ErrorResponse;
use crate::sentiment::SentimentLabel;
use crate::ticker::Ticker;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `?ticker=` query parameter
#[derive(Debug, Default, Deserialize)]
pub struct TickerQuery {
    pub ticker: Option<String>,
}

/// Standard JSON envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Machine-readable error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success_with_message(message: &str) -> Self {
        Self {
            status: "success".to_string(),
            message: Some(message.to_string()),
            data: None,
            code: None,
        }
    }

    pub fn success_with_data(data: T) -> Self {
        Self {
            status: "success".to_string(),
            message: None,
            data: Some(data),
            code: None,
        }
    }

    pub fn error(err: ErrorResponse) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(err.message),
            data: None,
            code: Some(err.code),
        }
    }
}

/// Empty data type for responses without data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Empty {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentData {
    pub ticker: Ticker,
    pub source: String,
    /// Labels with no rows are absent
    pub counts: BTreeMap<SentimentLabel, i64>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceData {
    pub ticker: Ticker,
    pub prices: Vec<PricePoint>,
}
