//! Spread pairing
//!
//! Builds vertical credit-spread candidates from a mixed set of contracts.
//! Pairing walks adjacent strikes only: for n filtered contracts on a side
//! this yields at most n−1 candidates, favoring the tightest, most liquid
//! spreads near the money. Profitability is not judged here: negative
//! credits pass through and are dropped by the ranker.

use super::{SpreadCandidate, SpreadKind};
use crate::chain::{OptionContract, OptionKind};
use crate::config::EngineConfig;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Pairs contracts into candidate verticals
pub struct SpreadBuilder {
    config: EngineConfig,
}

impl SpreadBuilder {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Build candidates from contracts expiring near the target DTE.
    ///
    /// Calls and puts may be mixed; each side is paired independently and
    /// legs always share an expiration date.
    pub fn build(
        &self,
        contracts: &[OptionContract],
        current_price: Decimal,
    ) -> Vec<SpreadCandidate> {
        let lo = self.config.target_dte - self.config.dte_window;
        let hi = self.config.target_dte + self.config.dte_window;

        let mut calls: BTreeMap<NaiveDate, Vec<&OptionContract>> = BTreeMap::new();
        let mut puts: BTreeMap<NaiveDate, Vec<&OptionContract>> = BTreeMap::new();

        for contract in contracts {
            let dte = contract.days_to_expiration();
            if dte < lo || dte > hi {
                continue;
            }

            match contract.kind {
                // Keep OTM contracts. An ITM flag with the strike still above
                // spot is stale, keep those too rather than trust the flag.
                OptionKind::Call => {
                    if !contract.in_the_money || contract.strike > current_price {
                        calls.entry(contract.expiration.date_naive()).or_default().push(contract);
                    }
                }
                OptionKind::Put => {
                    if !contract.in_the_money || contract.strike < current_price {
                        puts.entry(contract.expiration.date_naive()).or_default().push(contract);
                    }
                }
            }
        }

        let mut candidates = Vec::new();

        for legs in calls.values_mut() {
            legs.sort_by(|a, b| a.strike.cmp(&b.strike));
            for pair in legs.windows(2) {
                let (short, long) = (pair[0], pair[1]);
                // Duplicate or malformed strikes produce no pair.
                if long.strike > short.strike {
                    candidates.push(make_candidate(SpreadKind::BearCall, short, long));
                }
            }
        }

        for legs in puts.values_mut() {
            legs.sort_by(|a, b| b.strike.cmp(&a.strike));
            for pair in legs.windows(2) {
                let (short, long) = (pair[0], pair[1]);
                if long.strike < short.strike {
                    candidates.push(make_candidate(SpreadKind::BullPut, short, long));
                }
            }
        }

        tracing::debug!(
            total = contracts.len(),
            candidates = candidates.len(),
            target_dte = self.config.target_dte,
            "Spread pairing complete"
        );

        candidates
    }
}

fn make_candidate(
    kind: SpreadKind,
    short: &OptionContract,
    long: &OptionContract,
) -> SpreadCandidate {
    let credit = short.bid - long.ask;
    let width = (long.strike - short.strike).abs();
    let breakeven = match kind {
        SpreadKind::BearCall => short.strike + credit,
        SpreadKind::BullPut => short.strike - credit,
    };

    SpreadCandidate {
        kind,
        short_strike: short.strike,
        long_strike: long.strike,
        expiration: short.expiration,
        credit,
        max_profit: credit,
        max_loss: width - credit,
        breakeven,
        days_to_expiration: short.days_to_expiration(),
        short_iv: short.implied_volatility,
        long_iv: long.implied_volatility,
    }
}
