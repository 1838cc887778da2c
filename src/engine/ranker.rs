//! Recommendation ranking
//!
//! Applies the risk policy to scored candidates and orders the survivors by
//! risk/reward. The sort is stable: equal ratios keep their pairing order.

use super::CreditSpread;
use crate::config::RankerConfig;

/// Filters and orders scored spreads
pub struct Ranker {
    config: RankerConfig,
}

impl Ranker {
    pub fn new(config: RankerConfig) -> Self {
        Self { config }
    }

    /// Apply the policy and return at most `max_results` survivors, best
    /// risk/reward first.
    pub fn rank(&self, mut spreads: Vec<CreditSpread>) -> Vec<CreditSpread> {
        let before = spreads.len();

        spreads.retain(|s| {
            s.credit_received > self.config.min_credit
                && s.risk_reward_ratio > self.config.min_risk_reward
                && s.days_to_expiration >= self.config.min_dte
                && s.days_to_expiration <= self.config.max_dte
        });

        spreads.sort_by(|a, b| b.risk_reward_ratio.cmp(&a.risk_reward_ratio));
        spreads.truncate(self.config.max_results);

        tracing::debug!(
            scored = before,
            survivors = spreads.len(),
            "Ranking complete"
        );

        spreads
    }
}
