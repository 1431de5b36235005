//! NewsAPI search client

use super::types::NewsArticle;
use super::NewsProvider;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Provenance tag written with every classified headline
pub const NEWSAPI_SOURCE: &str = "NewsAPI";

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    code: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

/// Client for the NewsAPI `/v2/everything` endpoint
pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("stock-sentiment/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl NewsProvider for NewsApiClient {
    fn source_tag(&self) -> &'static str {
        NEWSAPI_SOURCE
    }

    async fn search(&self, query: &str, page_size: u32) -> Result<Vec<NewsArticle>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("NEWS_API_KEY is not set".to_string()))?;

        let response = self
            .client
            .get(format!("{}/v2/everything", self.base_url))
            .header("X-Api-Key", api_key)
            .query(&[("q", query.to_string()), ("pageSize", page_size.to_string())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<EverythingResponse>(&body) {
            Ok(parsed) if parsed.status == "ok" => {
                debug!("NewsAPI returned {} articles for '{}'", parsed.articles.len(), query);
                Ok(parsed.articles.into_iter().take(page_size as usize).collect())
            }
            Ok(parsed) => Err(AppError::NewsApi {
                code: parsed.code.unwrap_or_else(|| status.as_u16().to_string()),
                message: parsed.message.unwrap_or_else(|| "request failed".to_string()),
            }),
            Err(_) if !status.is_success() => Err(AppError::NewsApi {
                code: status.as_u16().to_string(),
                message: body,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_search_returns_articles() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/everything")
            .match_header("x-api-key", "secret")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "NVDA".into()),
                Matcher::UrlEncoded("pageSize".into(), "10".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"ok","totalResults":2,"articles":[
                    {"source":{"id":null,"name":"Wire"},"title":"Nvidia shares surge","url":"https://example.com/a","publishedAt":"2025-01-06T10:00:00Z"},
                    {"source":{"id":null,"name":"Wire"},"title":null,"description":"no headline"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = NewsApiClient::new(&server.url(), Some("secret".into())).unwrap();
        let articles = client.search("NVDA", 10).await.unwrap();

        mock.assert_async().await;
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title.as_deref(), Some("Nvidia shares surge"));
        assert_eq!(articles[0].published_at.as_deref(), Some("2025-01-06T10:00:00Z"));
        assert!(articles[1].title.is_none());
    }

    #[tokio::test]
    async fn test_invalid_key_is_newsapi_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/everything")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid or incorrect."}"#,
            )
            .create_async()
            .await;

        let client = NewsApiClient::new(&server.url(), Some("bad".into())).unwrap();
        let result = client.search("NVDA", 10).await;
        assert!(matches!(result, Err(AppError::NewsApi { code, .. }) if code == "apiKeyInvalid"));
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/everything")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = NewsApiClient::new(&server.url(), None).unwrap();
        let result = client.search("TSLA", 10).await;

        assert!(matches!(result, Err(AppError::Config(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_json_error_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v2/everything")
            .match_query(Matcher::Any)
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let client = NewsApiClient::new(&server.url(), Some("k".into())).unwrap();
        let result = client.search("TSLA", 10).await;
        assert!(matches!(result, Err(AppError::NewsApi { code, .. }) if code == "502"));
    }
}
