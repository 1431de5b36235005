//! Dashboard endpoint handlers

use super::reader::DashboardReader;
use super::types::*;
use super::view::{render_page, PageContext};
use crate::error::{AppError, ErrorResponse};
use crate::providers::newsapi::NEWSAPI_SOURCE;
use crate::ticker::Ticker;
use axum::{
    extract::{Json, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared state for dashboard handlers
pub struct DashboardState {
    pub reader: DashboardReader,
    pub watchlist: Vec<Ticker>,
}

impl DashboardState {
    pub fn new(reader: DashboardReader) -> Self {
        Self {
            reader,
            watchlist: Ticker::watchlist(),
        }
    }

    fn default_ticker(&self) -> Ticker {
        self.watchlist
            .first()
            .cloned()
            .unwrap_or_else(|| Ticker::watchlist().remove(0))
    }

    /// Resolve the query ticker; `None` means the default was requested
    fn resolve(&self, query: &TickerQuery) -> Result<Ticker, AppError> {
        match query.ticker.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(self.default_ticker()),
            Some(symbol) => Ticker::parse(symbol),
        }
    }
}

fn error_response<T: serde::Serialize>(status: StatusCode, err: &AppError) -> Response {
    (status, Json(ApiResponse::<T>::error(ErrorResponse::from(err)))).into_response()
}

// ============================================================================
// Health Check
// ============================================================================

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::<Empty>::success_with_message("Stock sentiment dashboard is running"))
}

// ============================================================================
// HTML Page
// ============================================================================

/// GET /?ticker=
pub async fn index(
    State(state): State<Arc<DashboardState>>,
    Query(query): Query<TickerQuery>,
) -> Html<String> {
    let (ticker, notice) = match state.resolve(&query) {
        Ok(ticker) => (ticker, None),
        Err(e) => {
            let fallback = state.default_ticker();
            warn!("Dashboard request for invalid ticker: {}", e);
            let notice = format!("{}; showing {} instead.", e, fallback);
            (fallback, Some(notice))
        }
    };

    info!("Rendering dashboard for {}", ticker);
    let data = state.reader.load(&ticker).await;

    Html(render_page(&PageContext {
        ticker: &ticker,
        watchlist: &state.watchlist,
        data: &data,
        extracted_on: Local::now().date_naive(),
        notice: notice.as_deref(),
    }))
}

// ============================================================================
// JSON API
// ============================================================================

/// GET /api/v1/sentiment?ticker=
pub async fn get_sentiment(
    State(state): State<Arc<DashboardState>>,
    Query(query): Query<TickerQuery>,
) -> Response {
    let ticker = match state.resolve(&query) {
        Ok(t) => t,
        Err(e) => return error_response::<SentimentData>(StatusCode::BAD_REQUEST, &e),
    };

    match state.reader.sentiment_counts(&ticker).await {
        Ok(counts) => {
            let total = counts.values().sum();
            Json(ApiResponse::success_with_data(SentimentData {
                ticker,
                source: NEWSAPI_SOURCE.to_string(),
                counts,
                total,
            }))
            .into_response()
        }
        Err(e) => {
            warn!("Sentiment API read failed for {}: {}", ticker, e);
            error_response::<SentimentData>(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}

/// GET /api/v1/prices?ticker=
pub async fn get_prices(
    State(state): State<Arc<DashboardState>>,
    Query(query): Query<TickerQuery>,
) -> Response {
    let ticker = match state.resolve(&query) {
        Ok(t) => t,
        Err(e) => return error_response::<PriceData>(StatusCode::BAD_REQUEST, &e),
    };

    match state.reader.price_series(&ticker).await {
        Ok(prices) => Json(ApiResponse::success_with_data(PriceData { ticker, prices })).into_response(),
        Err(e) => {
            warn!("Price API read failed for {}: {}", ticker, e);
            error_response::<PriceData>(StatusCode::INTERNAL_SERVER_ERROR, &e)
        }
    }
}
