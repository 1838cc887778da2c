//! Yahoo Finance option-chain client
//!
//! Uses the unofficial v7 options endpoint. Data is delayed ~15 minutes and
//! intended for personal use. One refresh fetches the listed expirations,
//! then the chains for the few expirations nearest the pairing window.

use super::{ChainError, ChainSource, OptionChain, OptionContract, OptionKind};
use crate::config::ChainConfig;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::Duration;

/// Client for the Yahoo Finance options endpoint
pub struct YahooChainClient {
    config: ChainConfig,
    client: Client,
}

impl YahooChainClient {
    pub fn new(config: ChainConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    async fn fetch_expiry(
        &self,
        symbol: &str,
        date: Option<i64>,
    ) -> Result<OptionsResult, ChainError> {
        let url = match date {
            Some(ts) => format!("{}/options/{}?date={}", self.config.base_url, symbol, ts),
            None => format!("{}/options/{}", self.config.base_url, symbol),
        };

        tracing::debug!(url = %url, "Fetching option chain");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ChainError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ChainError::Http(format!(
                "status {} from chain endpoint",
                response.status()
            )));
        }

        let body: OptionsResponse = response
            .json()
            .await
            .map_err(|e| ChainError::Malformed(e.to_string()))?;

        body.option_chain
            .result
            .into_iter()
            .next()
            .ok_or_else(|| ChainError::Empty(symbol.to_string()))
    }
}

#[async_trait]
impl ChainSource for YahooChainClient {
    async fn fetch_chain(&self, symbol: &str) -> Result<OptionChain, ChainError> {
        let first = self.fetch_expiry(symbol, None).await?;
        let mut chain = OptionChain::default();
        merge_options(&mut chain, &first, symbol);

        // The default response covers only the nearest expiration; pull a few
        // more listed dates so the pairing window has contracts to work with.
        let extra: Vec<i64> = first
            .expiration_dates
            .iter()
            .copied()
            .filter(|ts| !first.options.iter().any(|o| o.expiration_date == *ts))
            .take(self.config.max_expirations.saturating_sub(first.options.len()))
            .collect();

        for ts in extra {
            match self.fetch_expiry(symbol, Some(ts)).await {
                Ok(result) => merge_options(&mut chain, &result, symbol),
                Err(e) => {
                    tracing::warn!(symbol, date = ts, error = %e, "Expiry fetch failed, continuing");
                }
            }
        }

        if chain.is_empty() {
            return Err(ChainError::Empty(symbol.to_string()));
        }

        tracing::debug!(
            symbol,
            calls = chain.calls.len(),
            puts = chain.puts.len(),
            "Option chain fetched"
        );

        Ok(chain)
    }
}

fn merge_options(chain: &mut OptionChain, result: &OptionsResult, symbol: &str) {
    for block in &result.options {
        for raw in &block.calls {
            if let Some(c) = convert_contract(raw, symbol, OptionKind::Call) {
                chain.calls.push(c);
            }
        }
        for raw in &block.puts {
            if let Some(c) = convert_contract(raw, symbol, OptionKind::Put) {
                chain.puts.push(c);
            }
        }
    }
}

/// Convert a raw vendor contract, dropping rows without a usable strike.
fn convert_contract(raw: &RawContract, symbol: &str, kind: OptionKind) -> Option<OptionContract> {
    let strike = raw.strike?;
    if strike <= Decimal::ZERO {
        return None;
    }

    let expiration = expiration_from_ts(raw.expiration?)?;

    Some(OptionContract {
        symbol: raw
            .contract_symbol
            .clone()
            .unwrap_or_else(|| format!("{}{}", symbol, strike)),
        kind,
        strike,
        expiration,
        bid: raw.bid.unwrap_or(Decimal::ZERO),
        ask: raw.ask.unwrap_or(Decimal::ZERO),
        last: raw.last_price.unwrap_or(Decimal::ZERO),
        volume: raw.volume.unwrap_or(0),
        open_interest: raw.open_interest.unwrap_or(0),
        implied_volatility: raw.implied_volatility.unwrap_or(0.0).max(0.0),
        in_the_money: raw.in_the_money.unwrap_or(false),
    })
}

fn expiration_from_ts(ts: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt(ts, 0).single()
}

/// Top-level options response
#[derive(Debug, serde::Deserialize)]
struct OptionsResponse {
    #[serde(rename = "optionChain")]
    option_chain: OptionChainBody,
}

#[derive(Debug, serde::Deserialize)]
struct OptionChainBody {
    #[serde(default)]
    result: Vec<OptionsResult>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsResult {
    #[serde(default)]
    expiration_dates: Vec<i64>,
    #[serde(default)]
    options: Vec<OptionsBlock>,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsBlock {
    #[serde(default)]
    expiration_date: i64,
    #[serde(default)]
    calls: Vec<RawContract>,
    #[serde(default)]
    puts: Vec<RawContract>,
}

/// Raw contract row as returned by the vendor
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContract {
    contract_symbol: Option<String>,
    strike: Option<Decimal>,
    expiration: Option<i64>,
    bid: Option<Decimal>,
    ask: Option<Decimal>,
    last_price: Option<Decimal>,
    volume: Option<u64>,
    open_interest: Option<u64>,
    implied_volatility: Option<f64>,
    in_the_money: Option<bool>,
}
