//! End-to-end engine tests: pairing → scoring → ranking

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use spread_scout::chain::{OptionContract, OptionKind};
use spread_scout::config::{EngineConfig, RankerConfig};
use spread_scout::engine::{CreditSpread, PopModel, PopParams, Ranker, SpreadBuilder};

fn contract(
    kind: OptionKind,
    strike: Decimal,
    bid: Decimal,
    ask: Decimal,
    days_out: i64,
    itm: bool,
) -> OptionContract {
    OptionContract {
        symbol: format!("SPY{}", strike),
        kind,
        strike,
        expiration: Utc::now() + Duration::days(days_out) + Duration::hours(12),
        bid,
        ask,
        last: (bid + ask) / dec!(2),
        volume: 1000,
        open_interest: 4000,
        implied_volatility: 0.22,
        in_the_money: itm,
    }
}

fn score_all(contracts: &[OptionContract], current_price: Decimal) -> Vec<CreditSpread> {
    let builder = SpreadBuilder::new(EngineConfig::default());
    let model = PopModel::new(0.30);

    builder
        .build(contracts, current_price)
        .into_iter()
        .filter_map(|c| {
            let pop = model.estimate(&PopParams {
                current_price,
                short_strike: c.short_strike,
                credit: c.credit,
                kind: c.kind,
                implied_vol: c.average_iv(),
                days_to_expiration: c.days_to_expiration,
            });
            CreditSpread::from_candidate(c, pop)
        })
        .collect()
}

#[test]
fn test_reference_bear_call_survives_ranker() {
    let contracts = vec![
        contract(OptionKind::Call, dec!(260), dec!(1.50), dec!(1.60), 7, false),
        contract(OptionKind::Call, dec!(265), dec!(0.30), dec!(0.40), 7, false),
    ];

    let scored = score_all(&contracts, dec!(255));
    assert_eq!(scored.len(), 1);

    let spread = &scored[0];
    assert_eq!(spread.short_strike, dec!(260));
    assert_eq!(spread.long_strike, dec!(265));
    assert_eq!(spread.credit_received, dec!(1.10));
    assert_eq!(spread.max_profit, dec!(1.10));
    assert_eq!(spread.max_loss, dec!(3.90));
    assert_eq!(spread.breakeven, dec!(261.10));
    // 1.10 / 3.90 ≈ 0.282
    assert!(spread.risk_reward_ratio > dec!(0.282));
    assert!(spread.risk_reward_ratio < dec!(0.283));

    let ranked = Ranker::new(RankerConfig::default()).rank(scored);
    assert_eq!(ranked.len(), 1, "0.282 ratio must pass the 0.25 threshold");
}

#[test]
fn test_invariants_hold_across_a_wide_chain() {
    let mut contracts = Vec::new();
    for i in 0..8 {
        let strike = dec!(260) + Decimal::from(i * 5);
        let bid = (dec!(3.00) - Decimal::new(i * 120, 2)).max(dec!(0.01));
        contracts.push(contract(
            OptionKind::Call,
            strike,
            bid,
            bid + dec!(0.10),
            7,
            false,
        ));
    }
    for i in 0..8 {
        let strike = dec!(250) - Decimal::from(i * 5);
        let bid = (dec!(3.00) - Decimal::new(i * 120, 2)).max(dec!(0.01));
        contracts.push(contract(
            OptionKind::Put,
            strike,
            bid,
            bid + dec!(0.10),
            7,
            false,
        ));
    }

    let scored = score_all(&contracts, dec!(255));
    assert!(!scored.is_empty());

    for s in &scored {
        let width = (s.long_strike - s.short_strike).abs();
        assert_eq!(s.max_profit, s.credit_received);
        assert_eq!(s.max_loss, width - s.credit_received);
        assert_eq!(s.risk_reward_ratio, s.max_profit / s.max_loss);
        assert!(s.probability_of_profit >= dec!(20));
        assert!(s.probability_of_profit <= dec!(85));
    }

    let ranked = Ranker::new(RankerConfig::default()).rank(scored);
    assert!(ranked.len() >= 2, "tight near-the-money pairs must survive");
    assert!(ranked.len() <= 10);
    for s in &ranked {
        assert!(s.credit_received > dec!(0.15));
        assert!(s.risk_reward_ratio > dec!(0.25));
        assert!(s.days_to_expiration >= 5 && s.days_to_expiration <= 10);
    }
    for pair in ranked.windows(2) {
        assert!(pair[0].risk_reward_ratio >= pair[1].risk_reward_ratio);
    }
}

#[test]
fn test_malformed_quotes_never_reach_ranked_output() {
    // Inverted quote on the long leg produces a negative credit.
    let contracts = vec![
        contract(OptionKind::Call, dec!(260), dec!(0.10), dec!(0.20), 7, false),
        contract(OptionKind::Call, dec!(265), dec!(1.00), dec!(2.00), 7, false),
    ];

    let scored = score_all(&contracts, dec!(255));
    let ranked = Ranker::new(RankerConfig::default()).rank(scored);
    assert!(ranked.is_empty());
}

#[test]
fn test_zero_width_chain_produces_nothing() {
    let contracts = vec![contract(
        OptionKind::Call,
        dec!(260),
        dec!(1.50),
        dec!(1.60),
        7,
        false,
    )];
    assert!(score_all(&contracts, dec!(255)).is_empty());
}
