//! Credit-spread recommendation engine
//!
//! Pairs option contracts into vertical credit spreads, scores each with a
//! probability-of-profit estimate, and filters/orders them under a risk
//! policy.

mod pairing;
mod probability;
mod ranker;

pub use pairing::SpreadBuilder;
pub use probability::{PopModel, PopParams};
pub use ranker::Ranker;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Vertical credit-spread direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadKind {
    /// Call-side credit spread: profits while price stays below the short strike
    BearCall,
    /// Put-side credit spread: profits while price stays above the short strike
    BullPut,
}

impl SpreadKind {
    pub fn is_call(&self) -> bool {
        matches!(self, SpreadKind::BearCall)
    }
}

impl std::fmt::Display for SpreadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpreadKind::BearCall => write!(f, "bear call"),
            SpreadKind::BullPut => write!(f, "bull put"),
        }
    }
}

/// An unscored candidate produced by the pairing stage
#[derive(Debug, Clone)]
pub struct SpreadCandidate {
    pub kind: SpreadKind,
    /// Strike of the sold leg
    pub short_strike: Decimal,
    /// Strike of the bought leg
    pub long_strike: Decimal,
    pub expiration: DateTime<Utc>,
    /// Net premium collected; negative for malformed/illiquid quotes
    pub credit: Decimal,
    pub max_profit: Decimal,
    pub max_loss: Decimal,
    pub breakeven: Decimal,
    pub days_to_expiration: i64,
    /// Implied vol of the short leg, consumed by scoring
    pub short_iv: f64,
    /// Implied vol of the long leg, consumed by scoring
    pub long_iv: f64,
}

impl SpreadCandidate {
    /// Leg-average implied volatility, or `None` when neither leg carries one.
    pub fn average_iv(&self) -> Option<f64> {
        let avg = (self.short_iv + self.long_iv) / 2.0;
        (avg > 0.0).then_some(avg)
    }
}

/// A scored, servable recommendation
///
/// Created fresh every computation cycle, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditSpread {
    #[serde(rename = "type")]
    pub kind: SpreadKind,
    pub short_strike: Decimal,
    pub long_strike: Decimal,
    pub expiration: DateTime<Utc>,
    pub credit_received: Decimal,
    pub max_profit: Decimal,
    pub max_loss: Decimal,
    pub breakeven: Decimal,
    /// Probability of profit, bounded to [20, 85]
    pub probability_of_profit: Decimal,
    pub risk_reward_ratio: Decimal,
    pub days_to_expiration: i64,
}

impl CreditSpread {
    /// Attach a score to a candidate.
    ///
    /// Returns `None` when max loss is non-positive: the ratio is undefined
    /// and the candidate is excluded rather than propagated.
    pub fn from_candidate(c: SpreadCandidate, probability_of_profit: Decimal) -> Option<Self> {
        if c.max_loss <= Decimal::ZERO {
            tracing::debug!(
                kind = %c.kind,
                short = %c.short_strike,
                long = %c.long_strike,
                max_loss = %c.max_loss,
                "Candidate excluded: non-positive max loss"
            );
            return None;
        }

        Some(Self {
            kind: c.kind,
            short_strike: c.short_strike,
            long_strike: c.long_strike,
            expiration: c.expiration,
            credit_received: c.credit,
            max_profit: c.max_profit,
            max_loss: c.max_loss,
            breakeven: c.breakeven,
            probability_of_profit,
            risk_reward_ratio: c.max_profit / c.max_loss,
            days_to_expiration: c.days_to_expiration,
        })
    }
}
