//! Probability-of-profit estimate
//!
//! Treats the breakeven as a threshold on a lognormal terminal price and
//! approximates the normal CDF with a closed-form, erf-free expression, then
//! layers two heuristic bonuses on top. The output is clamped to [20, 85];
//! the clamp, not the raw formula, is the contract callers rely on; the
//! downstream risk thresholds were tuned against exactly this distribution,
//! so the formula is kept as-is rather than swapped for a textbook model.

use super::SpreadKind;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::f64::consts::PI;

/// Floor and ceiling of every estimate
const POP_MIN: f64 = 20.0;
const POP_MAX: f64 = 85.0;

/// Parameters for one estimate
#[derive(Debug, Clone)]
pub struct PopParams {
    pub current_price: Decimal,
    pub short_strike: Decimal,
    pub credit: Decimal,
    pub kind: SpreadKind,
    /// Leg-average implied volatility; `None` falls back to the default
    pub implied_vol: Option<f64>,
    pub days_to_expiration: i64,
}

/// Probability-of-profit estimator
pub struct PopModel {
    default_iv: f64,
}

impl PopModel {
    pub fn new(default_iv: f64) -> Self {
        Self { default_iv }
    }

    /// Estimate the probability of profit, in percent within [20, 85].
    pub fn estimate(&self, params: &PopParams) -> Decimal {
        let s: f64 = params.current_price.try_into().unwrap_or(0.0);
        let strike: f64 = params.short_strike.try_into().unwrap_or(0.0);
        let credit: f64 = params.credit.try_into().unwrap_or(0.0);

        let iv = params.implied_vol.filter(|v| *v > 0.0).unwrap_or(self.default_iv);
        let dte = params.days_to_expiration.max(0);

        let breakeven = match params.kind {
            SpreadKind::BearCall => strike + credit,
            SpreadKind::BullPut => strike - credit,
        };

        // Standardized distance of breakeven from spot. Degenerate inputs
        // (non-positive prices, zero time) collapse to d = 0, i.e. a coin
        // flip before bonuses.
        let d = if s > 0.0 && breakeven > 0.0 {
            let denom = iv * (dte as f64 / 365.0).sqrt();
            let log_ratio = (s / breakeven).ln();
            if denom > 0.0 {
                log_ratio / denom
            } else if log_ratio == 0.0 {
                0.0
            } else {
                // Zero variance: the outcome is already decided.
                log_ratio.signum() * 8.0
            }
        } else {
            0.0
        };

        let cdf = 0.5 * (1.0 + d.signum() * (1.0 - (-2.0 * d * d / PI).exp()).sqrt());

        let mut pop = match params.kind {
            SpreadKind::BearCall => (1.0 - cdf) * 100.0,
            SpreadKind::BullPut => cdf * 100.0,
        };

        // Shorter-dated spreads decay faster; reward them.
        pop += ((10 - dte).max(0) * 2) as f64;

        // Flat bonus when comfortably out of the money.
        if strike > 0.0 {
            let moneyness = s / strike;
            let comfortable = match params.kind {
                SpreadKind::BearCall => moneyness < 0.95,
                SpreadKind::BullPut => moneyness > 1.05,
            };
            if comfortable {
                pop += 10.0;
            }
        }

        let clamped = pop.clamp(POP_MIN, POP_MAX);
        Decimal::try_from(clamped).unwrap_or(dec!(50)).round_dp(1)
    }
}
