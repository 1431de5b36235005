//! Daily price storage

use super::models::{PricePoint, StockPriceBar};
use crate::error::Result;
use crate::providers::PriceBar;
use rusqlite::{params, Connection, TransactionBehavior};

/// Insert bars for one ticker in a single transaction.
///
/// Dates already stored are skipped by the primary-key conflict clause; the
/// return value counts only newly inserted rows. Any failing statement rolls
/// back the whole batch.
pub fn insert_price_bars(conn: &mut Connection, ticker: &str, bars: &[PriceBar]) -> Result<usize> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut stmt = tx.prepare(
        "INSERT INTO stock_prices (stock_ticker, price_date, open_price, high_price, low_price, close_price, volume)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT (stock_ticker, price_date) DO NOTHING",
    )?;

    let mut inserted = 0;
    for bar in bars {
        inserted += stmt.execute(params![
            ticker,
            bar.date,
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume,
        ])?;
    }

    drop(stmt);
    tx.commit()?;

    Ok(inserted)
}

/// Price series for the dashboard, oldest first
pub fn price_series(conn: &Connection, ticker: &str) -> Result<Vec<PricePoint>> {
    let mut stmt = conn.prepare(
        "SELECT price_date, open_price, high_price, low_price, close_price
         FROM stock_prices
         WHERE stock_ticker = ?1
         ORDER BY price_date ASC",
    )?;

    let points = stmt
        .query_map(params![ticker], |row| {
            Ok(PricePoint {
                price_date: row.get(0)?,
                open_price: row.get(1)?,
                high_price: row.get(2)?,
                low_price: row.get(3)?,
                close_price: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(points)
}

/// All stored bars for a ticker, oldest first
pub fn get_price_bars(conn: &Connection, ticker: &str) -> Result<Vec<StockPriceBar>> {
    let mut stmt = conn.prepare(
        "SELECT stock_ticker, price_date, open_price, high_price, low_price, close_price, volume
         FROM stock_prices
         WHERE stock_ticker = ?1
         ORDER BY price_date ASC",
    )?;

    let bars = stmt
        .query_map(params![ticker], |row| {
            Ok(StockPriceBar {
                ticker: row.get(0)?,
                trade_date: row.get(1)?,
                open: row.get(2)?,
                high: row.get(3)?,
                low: row.get(4)?,
                close: row.get(5)?,
                volume: row.get(6)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::init_schema;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
            open: close - 1.0,
            high: close + 2.0,
            low: close - 3.0,
            close,
            volume: 1_000 * day as i64,
        }
    }

    fn create_test_db() -> Connection {
        let mut conn = Connection::open_in_memory().unwrap();
        init_schema(&mut conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_read_back() {
        let mut conn = create_test_db();
        let bars = vec![bar(6, 410.25), bar(7, 399.5)];

        assert_eq!(insert_price_bars(&mut conn, "TSLA", &bars).unwrap(), 2);

        let stored = get_price_bars(&conn, "TSLA").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].ticker, "TSLA");
        assert_eq!(stored[0].trade_date, bars[0].date);
        assert_eq!(stored[0].close, 410.25);
        assert_eq!(stored[1].volume, 7_000);
    }

    #[test]
    fn test_conflicting_dates_are_ignored_not_updated() {
        let mut conn = create_test_db();
        insert_price_bars(&mut conn, "TSLA", &[bar(6, 100.0)]).unwrap();

        let inserted = insert_price_bars(&mut conn, "TSLA", &[bar(6, 999.0), bar(7, 101.0)]).unwrap();
        assert_eq!(inserted, 1);

        let stored = get_price_bars(&conn, "TSLA").unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].close, 100.0);
    }

    #[test]
    fn test_same_date_different_tickers() {
        let mut conn = create_test_db();
        insert_price_bars(&mut conn, "TSLA", &[bar(6, 100.0)]).unwrap();
        assert_eq!(insert_price_bars(&mut conn, "NVDA", &[bar(6, 140.0)]).unwrap(), 1);
    }

    #[test]
    fn test_failed_insert_rolls_back_batch() {
        let mut conn = create_test_db();
        conn.execute_batch(
            "CREATE TRIGGER reject_jan_8 BEFORE INSERT ON stock_prices
             WHEN NEW.price_date = '2025-01-08'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

        let result = insert_price_bars(&mut conn, "TSLA", &[bar(6, 1.0), bar(7, 2.0), bar(8, 3.0)]);
        assert!(result.is_err());
        assert!(get_price_bars(&conn, "TSLA").unwrap().is_empty());
    }

    #[test]
    fn test_price_series_is_ordered_by_date() {
        let mut conn = create_test_db();
        insert_price_bars(&mut conn, "PLTR", &[bar(9, 80.0), bar(6, 70.0), bar(7, 75.0)]).unwrap();

        let series = price_series(&conn, "PLTR").unwrap();
        let closes: Vec<f64> = series.iter().map(|p| p.close_price).collect();
        assert_eq!(closes, vec![70.0, 75.0, 80.0]);
        assert!(price_series(&conn, "TSLA").unwrap().is_empty());
    }
}
