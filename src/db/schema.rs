//! Table definitions
//!
//! Every statement is guarded with `IF NOT EXISTS`, so initialisation can run
//! at the start of each workflow, concurrently with itself, without touching
//! existing rows.

use crate::error::Result;
use rusqlite::{Connection, TransactionBehavior};

/// Ensure all tables and indexes exist.
///
/// Runs under `BEGIN IMMEDIATE` so a concurrent writer makes this wait on the
/// busy timeout instead of failing.
pub fn init_schema(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute_batch(CREATE_STOCK_SENTIMENT)?;
    tx.execute_batch(CREATE_STOCK_PRICES)?;
    tx.commit()?;
    tracing::debug!("Schema verified");
    Ok(())
}

const CREATE_STOCK_SENTIMENT: &str = r#"
CREATE TABLE IF NOT EXISTS stock_sentiment (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    stock_ticker VARCHAR(10),
    sentiment VARCHAR(10),
    source VARCHAR(50),
    content TEXT,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_stock_sentiment_ticker_source
    ON stock_sentiment(stock_ticker, source);
"#;

const CREATE_STOCK_PRICES: &str = r#"
CREATE TABLE IF NOT EXISTS stock_prices (
    stock_ticker VARCHAR(10),
    price_date DATE,
    open_price NUMERIC,
    high_price NUMERIC,
    low_price NUMERIC,
    close_price NUMERIC,
    volume BIGINT,
    PRIMARY KEY (stock_ticker, price_date)
);
"#;
