//! Sentiment log storage
//!
//! Append-only; the same headline fetched on two runs is stored twice.

use super::models::{NewSentimentRecord, SentimentRecord};
use crate::error::Result;
use crate::sentiment::SentimentLabel;
use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::BTreeMap;

/// Append records in a single transaction
pub fn insert_sentiment_records(conn: &mut Connection, records: &[NewSentimentRecord]) -> Result<usize> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut stmt = tx.prepare(
        "INSERT INTO stock_sentiment (stock_ticker, sentiment, source, content)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    let mut inserted = 0;
    for record in records {
        inserted += stmt.execute(params![
            record.ticker,
            record.sentiment,
            record.source,
            record.content,
        ])?;
    }

    drop(stmt);
    tx.commit()?;

    Ok(inserted)
}

/// Count rows per label for a (ticker, source) pair; labels without rows are absent
pub fn sentiment_counts(
    conn: &Connection,
    ticker: &str,
    source: &str,
) -> Result<BTreeMap<SentimentLabel, i64>> {
    let mut stmt = conn.prepare(
        "SELECT sentiment, COUNT(*)
         FROM stock_sentiment
         WHERE stock_ticker = ?1 AND source = ?2
         GROUP BY sentiment",
    )?;

    let counts = stmt
        .query_map(params![ticker, source], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<std::result::Result<BTreeMap<_, _>, _>>()?;

    Ok(counts)
}

/// Stored records for a ticker in insertion order
pub fn get_sentiment_records(conn: &Connection, ticker: &str) -> Result<Vec<SentimentRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, stock_ticker, sentiment, source, content, created_at
         FROM stock_sentiment
         WHERE stock_ticker = ?1
         ORDER BY id ASC",
    )?;

    let records = stmt
        .query_map(params![ticker], |row| {
            Ok(SentimentRecord {
                id: row.get(0)?,
                ticker: row.get(1)?,
                sentiment: row.get(2)?,
                source: row.get(3)?,
                content: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(records)
}
