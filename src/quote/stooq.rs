//! Stooq quote provider
//!
//! Secondary source. Stooq serves end-of-day/delayed quotes as a small CSV
//! document; the close column is taken as the current price.

use super::QuoteProvider;
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

const STOOQ_QUOTE_URL: &str = "https://stooq.com/q/l/";

pub struct StooqQuoteProvider {
    client: Client,
    base_url: String,
}

impl StooqQuoteProvider {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: STOOQ_QUOTE_URL.to_string(),
        }
    }
}

#[async_trait]
impl QuoteProvider for StooqQuoteProvider {
    fn name(&self) -> &'static str {
        "stooq"
    }

    async fn fetch_price(&self, symbol: &str) -> anyhow::Result<Decimal> {
        // US equities are suffixed on stooq, e.g. "spy.us".
        let ticker = format!("{}.us", symbol.to_lowercase());

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("s", ticker.as_str()), ("f", "sd2t2ohlcv"), ("e", "csv")])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!("stooq returned status {}", response.status());
        }

        let body = response.text().await?;
        parse_close_price(&body)
    }
}

/// Extract the close price from a stooq one-row CSV payload.
///
/// Layout: Symbol,Date,Time,Open,High,Low,Close,Volume. Missing data comes
/// back as "N/D".
fn parse_close_price(csv: &str) -> anyhow::Result<Decimal> {
    let row = csv
        .lines()
        .find(|l| !l.is_empty() && !l.starts_with("Symbol"))
        .ok_or_else(|| anyhow::anyhow!("stooq response carried no data row"))?;

    let close = row
        .split(',')
        .nth(6)
        .ok_or_else(|| anyhow::anyhow!("stooq row too short: {}", row))?;

    Decimal::from_str(close.trim())
        .map_err(|_| anyhow::anyhow!("stooq close not numeric: {}", close))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_close_price() {
        let csv = "Symbol,Date,Time,Open,High,Low,Close,Volume\n\
                   SPY.US,2026-01-05,22:00:00,254.10,256.00,253.80,255.43,48120000\n";
        assert_eq!(parse_close_price(csv).unwrap(), dec!(255.43));
    }

    #[test]
    fn test_parse_close_price_no_data() {
        let csv = "Symbol,Date,Time,Open,High,Low,Close,Volume\n\
                   SPY.US,N/D,N/D,N/D,N/D,N/D,N/D,N/D\n";
        assert!(parse_close_price(csv).is_err());
    }

    #[test]
    fn test_parse_close_price_header_only() {
        let csv = "Symbol,Date,Time,Open,High,Low,Close,Volume\n";
        assert!(parse_close_price(csv).is_err());
    }

    #[test]
    fn test_parse_close_price_short_row() {
        assert!(parse_close_price("SPY.US,2026-01-05\n").is_err());
    }
}
