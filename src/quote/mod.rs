//! Underlying price lookup
//!
//! A priority-ordered list of providers; the first well-formed positive
//! price wins. Provider failures are logged and never surfaced: when every
//! provider fails, a configured fallback constant is served so the rest of
//! the pipeline always has a price to work with.

mod stooq;
mod yahoo;

pub use stooq::StooqQuoteProvider;
pub use yahoo::YahooQuoteProvider;

use crate::config::QuoteConfig;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for price provider implementations
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Short provider name for logs
    fn name(&self) -> &'static str;

    /// Fetch the current price of the underlying.
    async fn fetch_price(&self, symbol: &str) -> anyhow::Result<Decimal>;
}

/// Tries providers in priority order, falling back to a constant.
pub struct QuoteRouter {
    providers: Vec<Box<dyn QuoteProvider>>,
    fallback_price: Decimal,
}

impl QuoteRouter {
    pub fn new(providers: Vec<Box<dyn QuoteProvider>>, fallback_price: Decimal) -> Self {
        Self {
            providers,
            fallback_price,
        }
    }

    /// Build the provider list named by the configuration.
    ///
    /// Unknown provider names are logged and skipped.
    pub fn from_config(config: &QuoteConfig) -> Self {
        let mut providers: Vec<Box<dyn QuoteProvider>> = Vec::new();
        for name in &config.providers {
            match name.as_str() {
                "yahoo" => providers.push(Box::new(YahooQuoteProvider::new(config.timeout_secs))),
                "stooq" => providers.push(Box::new(StooqQuoteProvider::new(config.timeout_secs))),
                other => {
                    tracing::warn!(provider = other, "Unknown quote provider, skipping");
                }
            }
        }
        Self::new(providers, config.fallback_price)
    }

    /// Current underlying price: first provider returning a positive price
    /// wins; all failing yields the fallback constant.
    pub async fn current_price(&self, symbol: &str) -> Decimal {
        for provider in &self.providers {
            match provider.fetch_price(symbol).await {
                Ok(price) if price > Decimal::ZERO => {
                    tracing::debug!(provider = provider.name(), %price, "Quote fetched");
                    return price;
                }
                Ok(price) => {
                    tracing::warn!(
                        provider = provider.name(),
                        %price,
                        "Provider returned non-positive price, trying next"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %e,
                        "Quote provider failed, trying next"
                    );
                }
            }
        }

        tracing::warn!(
            symbol,
            fallback = %self.fallback_price,
            "All quote providers failed, serving fallback price"
        );
        self.fallback_price
    }
}
