//! Read-only web dashboard
//!
//! Serves:
//! - `/` HTML page with sentiment pie, price table and close-price chart
//! - `/health`
//! - `/api/v1/sentiment` and `/api/v1/prices` JSON views of the same data

pub mod handlers;
mod reader;
pub mod types;
mod view;

pub use handlers::DashboardState;
pub use reader::{DashboardData, DashboardReader};

use crate::db::Database;
use crate::error::Result;
use axum::{routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the dashboard router over a database file
pub fn router(db: Database) -> Router {
    let state = Arc::new(DashboardState::new(DashboardReader::new(db)));

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/api/v1/sentiment", get(handlers::get_sentiment))
        .route("/api/v1/prices", get(handlers::get_prices))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until `shutdown` resolves
pub async fn serve<F>(db: Database, addr: SocketAddr, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Dashboard listening on http://{}", listener.local_addr()?);
    info!("Reading from {}", db.path().display());

    axum::serve(listener, router(db))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Dashboard stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewSentimentRecord;
    use crate::providers::PriceBar;
    use crate::sentiment::SentimentLabel;
    use chrono::NaiveDate;
    use serde_json::Value;
    use tempfile::TempDir;

    async fn spawn(db: Database) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(db)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn seeded_db(dir: &TempDir) -> Database {
        let db = Database::new(dir.path().join("stock_data.db"));
        db.init_schema().unwrap();
        db.insert_price_bars(
            "NVDA",
            &[
                PriceBar {
                    date: NaiveDate::from_ymd_opt(2025, 1, 7).unwrap(),
                    open: 140.0,
                    high: 142.0,
                    low: 137.0,
                    close: 138.5,
                    volume: 10,
                },
                PriceBar {
                    date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                    open: 136.0,
                    high: 141.0,
                    low: 135.0,
                    close: 140.0,
                    volume: 12,
                },
            ],
        )
        .unwrap();
        let record = |label| NewSentimentRecord {
            ticker: "NVDA".to_string(),
            sentiment: label,
            source: "NewsAPI".to_string(),
            content: "headline".to_string(),
        };
        db.insert_sentiment_records(&[
            record(SentimentLabel::Positive),
            record(SentimentLabel::Positive),
            record(SentimentLabel::Neutral),
        ])
        .unwrap();
        db
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let base = spawn(Database::new(dir.path().join("stock_data.db"))).await;

        let body: Value = reqwest::get(format!("{}/health", base)).await.unwrap().json().await.unwrap();
        assert_eq!(body["status"], "success");
    }

    #[tokio::test]
    async fn test_sentiment_endpoint() {
        let dir = TempDir::new().unwrap();
        let base = spawn(seeded_db(&dir)).await;

        let resp = reqwest::get(format!("{}/api/v1/sentiment?ticker=nvda", base)).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["data"]["ticker"], "NVDA");
        assert_eq!(body["data"]["counts"]["Positive"], 2);
        assert_eq!(body["data"]["counts"]["Neutral"], 1);
        assert!(body["data"]["counts"].get("Negative").is_none());
        assert_eq!(body["data"]["total"], 3);
    }

    #[tokio::test]
    async fn test_prices_endpoint_is_ascending() {
        let dir = TempDir::new().unwrap();
        let base = spawn(seeded_db(&dir)).await;

        let body: Value = reqwest::get(format!("{}/api/v1/prices?ticker=NVDA", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let prices = body["data"]["prices"].as_array().unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices[0]["price_date"], "2025-01-06");
        assert_eq!(prices[1]["close_price"], 138.5);
    }

    #[tokio::test]
    async fn test_unknown_ticker_is_bad_request() {
        let dir = TempDir::new().unwrap();
        let base = spawn(seeded_db(&dir)).await;

        let resp = reqwest::get(format!("{}/api/v1/prices?ticker=AAPL", base)).await.unwrap();
        assert_eq!(resp.status(), 400);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_missing_database_is_server_error() {
        let dir = TempDir::new().unwrap();
        let base = spawn(Database::new(dir.path().join("missing.db"))).await;

        let resp = reqwest::get(format!("{}/api/v1/sentiment?ticker=TSLA", base)).await.unwrap();
        assert_eq!(resp.status(), 500);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["code"], "DATABASE_ERROR");
    }

    #[tokio::test]
    async fn test_page_renders_selected_ticker() {
        let dir = TempDir::new().unwrap();
        let base = spawn(seeded_db(&dir)).await;

        let html = reqwest::get(format!("{}/?ticker=NVDA", base)).await.unwrap().text().await.unwrap();
        assert!(html.contains("Sentiment from NewsAPI for NVDA"));
        assert!(html.contains("Positive 66.7%"));
        assert!(html.contains("<td>2025-01-06</td>"));
    }

    #[tokio::test]
    async fn test_page_degrades_without_database() {
        let dir = TempDir::new().unwrap();
        let base = spawn(Database::new(dir.path().join("missing.db"))).await;

        let resp = reqwest::get(format!("{}/?ticker=GME", base)).await.unwrap();
        assert_eq!(resp.status(), 200);
        let html = resp.text().await.unwrap();
        assert!(html.contains("showing TSLA instead."));
        assert!(html.contains("Sentiment DB Error"));
        assert!(html.contains("No sentiment data found for TSLA from NewsAPI."));
        assert!(html.contains("No price trend chart available."));
    }
}
