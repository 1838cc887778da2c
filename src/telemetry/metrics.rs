//! Prometheus metrics

use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Underlying quote lookup latency
    QuoteFetch,
    /// Option-chain lookup latency
    ChainFetch,
    /// Full recommendation refresh latency
    Refresh,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Current underlying price
    CurrentPrice,
    /// Recommendations served in the latest refresh
    RecommendationCount,
    /// Topics with a live refresh timer
    ActiveTopics,
}

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Memoized payload served
    CacheHit,
    /// Payload recomputed
    CacheMiss,
    /// A topic refresh failed
    FetchError,
    /// Last-good or example data served in place of fresh data
    FallbackServed,
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let name = match metric {
        LatencyMetric::QuoteFetch => "spreadscout_quote_fetch_latency_ms",
        LatencyMetric::ChainFetch => "spreadscout_chain_fetch_latency_ms",
        LatencyMetric::Refresh => "spreadscout_refresh_latency_ms",
    };
    metrics::histogram!(name).record(duration.as_millis() as f64);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let name = match metric {
        GaugeMetric::CurrentPrice => "spreadscout_current_price",
        GaugeMetric::RecommendationCount => "spreadscout_recommendation_count",
        GaugeMetric::ActiveTopics => "spreadscout_active_topics",
    };
    metrics::gauge!(name).set(value);
}

/// Increment a counter
pub fn incr_counter(metric: CounterMetric) {
    let name = match metric {
        CounterMetric::CacheHit => "spreadscout_cache_hits_total",
        CounterMetric::CacheMiss => "spreadscout_cache_misses_total",
        CounterMetric::FetchError => "spreadscout_fetch_errors_total",
        CounterMetric::FallbackServed => "spreadscout_fallbacks_served_total",
    };
    metrics::counter!(name).increment(1);
}
