//! SQLite storage for prices and sentiment

pub mod models;
mod prices;
mod schema;
mod sentiment;

use crate::error::Result;
use crate::providers::PriceBar;
use crate::sentiment::SentimentLabel;
pub use models::{NewSentimentRecord, PricePoint, SentimentRecord, StockPriceBar};
use rusqlite::{Connection, ErrorCode, OpenFlags};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Attempts at switching a fresh file to WAL before giving up
const WAL_SWITCH_ATTEMPTS: u32 = 50;

/// Handle to the database file.
///
/// Holds only the path. Every operation opens its own connection and drops it
/// before returning, so no connection outlives a single task invocation.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a read-write connection, creating the file if needed
    pub fn connect(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        // WAL lets the dashboard read while tasks write
        enable_wal(&conn)?;
        conn.execute_batch("PRAGMA synchronous=NORMAL;")?;

        Ok(conn)
    }

    /// Open a read-only connection; fails if the file does not exist
    pub fn connect_read_only(&self) -> Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    // ========== Schema ==========

    /// Create both tables if missing
    pub fn init_schema(&self) -> Result<()> {
        let mut conn = self.connect()?;
        schema::init_schema(&mut conn)
    }

    // ========== Price Methods ==========

    /// Store bars for a ticker, returning the number of new rows
    pub fn insert_price_bars(&self, ticker: &str, bars: &[PriceBar]) -> Result<usize> {
        let mut conn = self.connect()?;
        prices::insert_price_bars(&mut conn, ticker, bars)
    }

    pub fn get_price_bars(&self, ticker: &str) -> Result<Vec<StockPriceBar>> {
        let conn = self.connect_read_only()?;
        prices::get_price_bars(&conn, ticker)
    }

    /// Ascending price series for charting
    pub fn price_series(&self, ticker: &str) -> Result<Vec<PricePoint>> {
        let conn = self.connect_read_only()?;
        prices::price_series(&conn, ticker)
    }

    // ========== Sentiment Methods ==========

    /// Append classified headlines
    pub fn insert_sentiment_records(&self, records: &[NewSentimentRecord]) -> Result<usize> {
        let mut conn = self.connect()?;
        sentiment::insert_sentiment_records(&mut conn, records)
    }

    pub fn get_sentiment_records(&self, ticker: &str) -> Result<Vec<SentimentRecord>> {
        let conn = self.connect_read_only()?;
        sentiment::get_sentiment_records(&conn, ticker)
    }

    /// Per-label counts for one ticker and source
    pub fn sentiment_counts(&self, ticker: &str, source: &str) -> Result<BTreeMap<SentimentLabel, i64>> {
        let conn = self.connect_read_only()?;
        sentiment::sentiment_counts(&conn, ticker, source)
    }
}

/// Put the file in WAL mode unless it already is.
///
/// The switch on a fresh file takes an exclusive lock and can report busy
/// without consulting the busy handler, so it is retried here.
fn enable_wal(conn: &Connection) -> Result<()> {
    let mut attempt = 0;
    loop {
        let switched = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get::<_, String>(0))
            .and_then(|mode| {
                if mode.eq_ignore_ascii_case("wal") {
                    Ok(mode)
                } else {
                    conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))
                }
            });

        match switched {
            Ok(_) => return Ok(()),
            Err(e) if is_busy(&e) && attempt < WAL_SWITCH_ATTEMPTS => {
                attempt += 1;
                tracing::debug!("Journal mode switch busy, retry {}", attempt);
                std::thread::sleep(Duration::from_millis(10 * u64::from(attempt.min(10))));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn is_busy(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}
