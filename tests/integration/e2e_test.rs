//! End-to-end tests: config, service fallback path, payload contract

use async_trait::async_trait;
use rust_decimal_macros::dec;
use spread_scout::cache::TtlCache;
use spread_scout::chain::{ChainError, ChainSource, OptionChain};
use spread_scout::config::Config;
use spread_scout::quote::{QuoteProvider, QuoteRouter};
use spread_scout::service::MarketService;
use std::sync::Arc;

#[test]
fn test_shipped_example_config_parses() {
    let config: Config = toml::from_str(include_str!("../../config.toml.example")).unwrap();
    assert_eq!(config.symbol, "SPY");
    assert_eq!(config.quote.fallback_price, dec!(250));
    assert_eq!(config.engine.target_dte, 7);
    assert_eq!(config.ranker.max_results, 10);
    assert_eq!(config.cache.calendar_ttl_secs, 14_400);
    assert_eq!(config.telemetry.metrics_port, 9090);
}

struct DeadQuote;

#[async_trait]
impl QuoteProvider for DeadQuote {
    fn name(&self) -> &'static str {
        "dead"
    }
    async fn fetch_price(&self, _symbol: &str) -> anyhow::Result<rust_decimal::Decimal> {
        anyhow::bail!("connection refused")
    }
}

struct MalformedChain;

#[async_trait]
impl ChainSource for MalformedChain {
    async fn fetch_chain(&self, _symbol: &str) -> Result<OptionChain, ChainError> {
        Err(ChainError::Malformed("unexpected token at line 1".into()))
    }
}

/// A chain lookup that fails and quote providers that all error must still
/// produce a well-formed, non-empty payload: fallback price, example
/// recommendations, success flag set.
#[tokio::test]
async fn test_total_upstream_failure_yields_wellformed_payload() {
    let config: Config = toml::from_str(
        r#"
        symbol = "SPY"
        [telemetry]
        metrics_port = 9090
        log_level = "info"
    "#,
    )
    .unwrap();

    let cache = Arc::new(TtlCache::new());
    let quotes = QuoteRouter::new(vec![Box::new(DeadQuote)], dec!(250));
    let service = MarketService::new(&config, cache, quotes, Arc::new(MalformedChain));

    let update = service.refresh_recommendations().await;

    assert!(update.success);
    assert_eq!(update.current_price, dec!(250));
    assert!(!update.recommendations.is_empty());

    // The payload serializes to the documented consumer shape.
    let json = serde_json::to_value(&update).unwrap();
    assert_eq!(json["success"], serde_json::json!(true));
    assert!(json["currentPrice"].is_number() || json["currentPrice"].is_string());
    assert!(json["lastUpdate"].is_string());
    assert!(json["recommendations"].as_array().is_some_and(|a| !a.is_empty()));
}

#[tokio::test]
async fn test_fallback_recommendations_satisfy_invariants() {
    let config: Config = toml::from_str(
        r#"
        symbol = "SPY"
        [telemetry]
        metrics_port = 9090
        log_level = "info"
    "#,
    )
    .unwrap();

    let cache = Arc::new(TtlCache::new());
    let quotes = QuoteRouter::new(vec![], dec!(250));
    let service = MarketService::new(&config, cache, quotes, Arc::new(MalformedChain));

    let update = service.refresh_recommendations().await;

    for rec in &update.recommendations {
        let width = (rec.long_strike - rec.short_strike).abs();
        assert_eq!(rec.max_profit, rec.credit_received);
        assert_eq!(rec.max_loss, width - rec.credit_received);
        assert_eq!(rec.risk_reward_ratio, rec.max_profit / rec.max_loss);
        assert!(rec.probability_of_profit >= dec!(20));
        assert!(rec.probability_of_profit <= dec!(85));
    }
}
