//! Environment-provided configuration

use crate::error::{AppError, Result};
use chrono_tz::Tz;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org";
pub const DEFAULT_MARKET_DATA_URL: &str = "https://query2.finance.yahoo.com";

/// Runtime configuration shared by the worker and the dashboard.
///
/// The store is a local SQLite file, so both binaries must run where they can
/// reach the same `db_path` on a shared filesystem.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: PathBuf,
    pub news_api_key: Option<String>,
    pub news_api_url: String,
    pub market_data_url: String,
    pub dashboard_host: String,
    pub dashboard_port: u16,
    /// Zone whose midnight triggers the daily workflow
    pub timezone: Tz,
    pub run_on_start: bool,
    pub retry_delay: Duration,
}

impl AppConfig {
    /// Load configuration from process environment (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let db_path = match get("DB_PATH") {
            Some(path) => PathBuf::from(path),
            None => {
                let dir = get("DB_DIR").unwrap_or_else(|| ".".to_string());
                let name = get("DB_NAME").unwrap_or_else(|| "stock_data".to_string());
                PathBuf::from(dir).join(format!("{}.db", name))
            }
        };

        let news_api_url = get("NEWS_API_URL").unwrap_or_else(|| DEFAULT_NEWS_API_URL.to_string());
        let market_data_url =
            get("MARKET_DATA_URL").unwrap_or_else(|| DEFAULT_MARKET_DATA_URL.to_string());
        for (key, value) in [("NEWS_API_URL", &news_api_url), ("MARKET_DATA_URL", &market_data_url)] {
            url::Url::parse(value)
                .map_err(|e| AppError::Config(format!("{} is not a valid URL: {}", key, e)))?;
        }

        let dashboard_port = match get("DASHBOARD_PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|e| AppError::Config(format!("Invalid DASHBOARD_PORT '{}': {}", port, e)))?,
            None => 8501,
        };

        let timezone = match get("ETL_TIMEZONE") {
            Some(tz) => tz
                .parse::<Tz>()
                .map_err(|e| AppError::Config(format!("Invalid ETL_TIMEZONE '{}': {}", tz, e)))?,
            None => Tz::UTC,
        };

        let run_on_start = match get("ETL_RUN_ON_START") {
            Some(flag) => parse_bool(&flag)
                .ok_or_else(|| AppError::Config(format!("Invalid ETL_RUN_ON_START '{}'", flag)))?,
            None => true,
        };

        let retry_delay = match get("ETL_RETRY_DELAY_SECS") {
            Some(secs) => Duration::from_secs(secs.parse::<u64>().map_err(|e| {
                AppError::Config(format!("Invalid ETL_RETRY_DELAY_SECS '{}': {}", secs, e))
            })?),
            None => Duration::from_secs(5 * 60),
        };

        Ok(Self {
            db_path,
            news_api_key: get("NEWS_API_KEY"),
            news_api_url,
            market_data_url,
            dashboard_host: get("DASHBOARD_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            dashboard_port,
            timezone,
            run_on_start,
            retry_delay,
        })
    }

    /// Socket address the dashboard binds to
    pub fn dashboard_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.dashboard_host, self.dashboard_port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid dashboard address: {}", e)))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
