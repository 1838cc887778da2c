//! Option-chain source
//!
//! Models listed option contracts for a single underlying and fetches the
//! full chain from a vendor endpoint. An empty or malformed chain is a hard
//! failure for the refresh cycle that requested it; contracts are never
//! fabricated here.

mod yahoo;

pub use yahoo::YahooChainClient;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Contract side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

/// One listed call or put, immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionContract {
    /// Contract identifier (e.g. OCC symbol)
    pub symbol: String,
    /// Call or put
    pub kind: OptionKind,
    /// Strike price
    pub strike: Decimal,
    /// Expiration instant
    pub expiration: DateTime<Utc>,
    /// Best bid
    pub bid: Decimal,
    /// Best ask
    pub ask: Decimal,
    /// Last traded price
    pub last: Decimal,
    /// Session volume
    pub volume: u64,
    /// Open interest
    pub open_interest: u64,
    /// Annualized implied volatility (typically 0–5)
    pub implied_volatility: f64,
    /// Vendor-reported moneyness flag; may be stale relative to spot
    pub in_the_money: bool,
}

impl OptionContract {
    /// Whole calendar days until expiration, stable within a trading day.
    pub fn days_to_expiration(&self) -> i64 {
        (self.expiration.date_naive() - Utc::now().date_naive()).num_days()
    }
}

/// The full set of contracts returned by one chain lookup.
#[derive(Debug, Clone, Default)]
pub struct OptionChain {
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

impl OptionChain {
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty() && self.puts.is_empty()
    }

    /// Calls and puts as one mixed collection.
    pub fn contracts(&self) -> impl Iterator<Item = &OptionContract> {
        self.calls.iter().chain(self.puts.iter())
    }
}

/// Chain lookup failures
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("chain request failed: {0}")]
    Http(String),
    #[error("chain response malformed: {0}")]
    Malformed(String),
    #[error("chain response carried no contracts for {0}")]
    Empty(String),
}

/// Trait for option-chain source implementations
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Fetch the current chain for the underlying.
    async fn fetch_chain(&self, symbol: &str) -> Result<OptionChain, ChainError>;
}
