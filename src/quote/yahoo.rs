//! Yahoo Finance quote provider
//!
//! Reads the regular-market price from the v8 chart endpoint metadata.

use super::QuoteProvider;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;

const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

pub struct YahooQuoteProvider {
    client: Client,
    base_url: String,
}

impl YahooQuoteProvider {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: YAHOO_CHART_URL.to_string(),
        }
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    async fn fetch_price(&self, symbol: &str) -> anyhow::Result<Decimal> {
        let url = format!("{}/{}", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("range", "1d"), ("interval", "1d")])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("chart endpoint returned status {}", response.status());
        }

        let body: ChartResponse = response.json().await?;
        parse_chart_price(body)
    }
}

fn parse_chart_price(body: ChartResponse) -> anyhow::Result<Decimal> {
    body.chart
        .result
        .into_iter()
        .next()
        .and_then(|r| r.meta.regular_market_price)
        .ok_or_else(|| anyhow::anyhow!("chart response carried no market price"))
}

#[derive(Debug, serde::Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, serde::Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Vec<ChartResult>,
}

#[derive(Debug, serde::Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_chart_price() {
        let body: ChartResponse = serde_json::from_str(
            r#"{"chart": {"result": [{"meta": {"regularMarketPrice": 255.43}}]}}"#,
        )
        .unwrap();
        assert_eq!(parse_chart_price(body).unwrap(), dec!(255.43));
    }

    #[test]
    fn test_parse_chart_price_missing() {
        let body: ChartResponse =
            serde_json::from_str(r#"{"chart": {"result": [{"meta": {}}]}}"#).unwrap();
        assert!(parse_chart_price(body).is_err());
    }

    #[test]
    fn test_parse_chart_price_empty_result() {
        let body: ChartResponse = serde_json::from_str(r#"{"chart": {"result": []}}"#).unwrap();
        assert!(parse_chart_price(body).is_err());
    }
}
