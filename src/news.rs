//! Headline feed for the news topic

use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SEARCH_URL: &str = "https://query1.finance.yahoo.com/v1/finance/search";

/// One headline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub source: String,
    pub url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Client for the vendor news-search endpoint
pub struct NewsClient {
    client: Client,
    base_url: String,
}

impl NewsClient {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: SEARCH_URL.to_string(),
        }
    }

    /// Fetch recent headlines mentioning the symbol.
    pub async fn fetch_news(&self, symbol: &str) -> anyhow::Result<Vec<NewsItem>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", symbol), ("newsCount", "10"), ("quotesCount", "0")])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("news endpoint returned status {}", response.status());
        }

        let body: SearchResponse = response.json().await?;
        Ok(convert_news(body))
    }
}

fn convert_news(body: SearchResponse) -> Vec<NewsItem> {
    body.news
        .into_iter()
        .map(|raw| NewsItem {
            title: raw.title,
            source: raw.publisher.unwrap_or_else(|| "unknown".to_string()),
            url: raw.link,
            published_at: raw
                .provider_publish_time
                .and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    news: Vec<RawNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNews {
    title: String,
    publisher: Option<String>,
    link: Option<String>,
    provider_publish_time: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_news() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"news": [
                {"title": "Markets rally", "publisher": "Reuters",
                 "link": "https://example.com/a", "providerPublishTime": 1767628800},
                {"title": "Fed minutes"}
            ]}"#,
        )
        .unwrap();

        let items = convert_news(body);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].source, "Reuters");
        assert!(items[0].published_at.is_some());
        assert_eq!(items[1].source, "unknown");
        assert!(items[1].url.is_none());
    }

    #[test]
    fn test_empty_news_list() {
        let body: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(convert_news(body).is_empty());
    }
}
