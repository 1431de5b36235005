//! Ticker watch-list

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tickers ingested by the daily workflow and offered by the dashboard.
pub const WATCHLIST: [&str; 3] = ["TSLA", "NVDA", "PLTR"];

/// A ticker symbol known to be on the watch-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse a symbol, accepting only watch-list entries (case-insensitive)
    pub fn parse(symbol: &str) -> Result<Self> {
        let upper = symbol.trim().to_ascii_uppercase();
        if WATCHLIST.contains(&upper.as_str()) {
            Ok(Self(upper))
        } else {
            Err(AppError::Validation(format!(
                "Ticker '{}' is not on the watch-list",
                symbol
            )))
        }
    }

    /// All watch-list tickers in configured order
    pub fn watchlist() -> Vec<Ticker> {
        WATCHLIST.iter().map(|s| Ticker(s.to_string())).collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Ticker::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
