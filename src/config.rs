//! Configuration types for spread-scout

use rust_decimal::Decimal;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Underlying equity symbol (e.g. "SPY")
    pub symbol: String,
    #[serde(default)]
    pub quote: QuoteConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub ranker: RankerConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    pub telemetry: TelemetryConfig,
}

/// Underlying price lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteConfig {
    /// Providers tried in priority order
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,

    /// Price served when every provider fails
    #[serde(default = "default_fallback_price")]
    pub fallback_price: Decimal,

    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_providers() -> Vec<String> {
    vec!["yahoo".to_string(), "stooq".to_string()]
}
fn default_fallback_price() -> Decimal {
    Decimal::new(250, 0)
}
fn default_http_timeout_secs() -> u64 {
    10
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            fallback_price: default_fallback_price(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Option-chain lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    /// Base URL of the options endpoint
    #[serde(default = "default_chain_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of listed expirations fetched per refresh
    #[serde(default = "default_max_expirations")]
    pub max_expirations: usize,
}

fn default_chain_base_url() -> String {
    "https://query1.finance.yahoo.com/v7/finance".to_string()
}
fn default_max_expirations() -> usize {
    3
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            base_url: default_chain_base_url(),
            timeout_secs: default_http_timeout_secs(),
            max_expirations: default_max_expirations(),
        }
    }
}

/// Spread pairing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Target days-to-expiration for candidate spreads
    #[serde(default = "default_target_dte")]
    pub target_dte: i64,

    /// Inclusive window around the target (target ± window)
    #[serde(default = "default_dte_window")]
    pub dte_window: i64,

    /// Implied volatility assumed when leg quotes carry none
    #[serde(default = "default_iv")]
    pub default_iv: f64,
}

fn default_target_dte() -> i64 {
    7
}
fn default_dte_window() -> i64 {
    2
}
fn default_iv() -> f64 {
    0.30
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_dte: 7,
            dte_window: 2,
            default_iv: 0.30,
        }
    }
}

/// Risk policy applied before recommendations are served
#[derive(Debug, Clone, Deserialize)]
pub struct RankerConfig {
    /// Minimum credit received, exclusive
    #[serde(default = "default_min_credit")]
    pub min_credit: Decimal,

    /// Minimum profit-to-loss ratio, exclusive
    #[serde(default = "default_min_risk_reward")]
    pub min_risk_reward: Decimal,

    /// Minimum days-to-expiration, inclusive
    #[serde(default = "default_min_dte")]
    pub min_dte: i64,

    /// Maximum days-to-expiration, inclusive
    #[serde(default = "default_max_dte")]
    pub max_dte: i64,

    /// Number of survivors served
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_min_credit() -> Decimal {
    Decimal::new(15, 2) // 0.15
}
fn default_min_risk_reward() -> Decimal {
    Decimal::new(25, 2) // 0.25
}
fn default_min_dte() -> i64 {
    5
}
fn default_max_dte() -> i64 {
    10
}
fn default_max_results() -> usize {
    10
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            min_credit: default_min_credit(),
            min_risk_reward: default_min_risk_reward(),
            min_dte: 5,
            max_dte: 10,
            max_results: 10,
        }
    }
}

/// Broadcast hub refresh cadence and retry policy
#[derive(Debug, Clone, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_price_interval")]
    pub price_interval_secs: u64,

    #[serde(default = "default_spreads_interval")]
    pub spreads_interval_secs: u64,

    #[serde(default = "default_news_interval")]
    pub news_interval_secs: u64,

    #[serde(default = "default_calendar_interval")]
    pub calendar_interval_secs: u64,

    /// Per-subscriber channel capacity; slow consumers are skipped, not awaited
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// First retry delay while establishing a topic feed (milliseconds)
    #[serde(default = "default_initial_retry_ms")]
    pub initial_retry_ms: u64,

    /// Retry delay cap (milliseconds)
    #[serde(default = "default_max_retry_ms")]
    pub max_retry_ms: u64,

    /// Establishment attempts before settling into tick cadence
    #[serde(default = "default_max_connect_attempts")]
    pub max_connect_attempts: u32,
}

fn default_price_interval() -> u64 {
    5
}
fn default_spreads_interval() -> u64 {
    30
}
fn default_news_interval() -> u64 {
    120
}
fn default_calendar_interval() -> u64 {
    3600
}
fn default_channel_capacity() -> usize {
    64
}
fn default_initial_retry_ms() -> u64 {
    1_000
}
fn default_max_retry_ms() -> u64 {
    16_000
}
fn default_max_connect_attempts() -> u32 {
    5
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            price_interval_secs: 5,
            spreads_interval_secs: 30,
            news_interval_secs: 120,
            calendar_interval_secs: 3600,
            channel_capacity: 64,
            initial_retry_ms: 1_000,
            max_retry_ms: 16_000,
            max_connect_attempts: 5,
        }
    }
}

/// Memoization TTLs per topic
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_price_ttl")]
    pub price_ttl_secs: u64,

    #[serde(default = "default_spreads_ttl")]
    pub spreads_ttl_secs: u64,

    #[serde(default = "default_news_ttl")]
    pub news_ttl_secs: u64,

    #[serde(default = "default_calendar_ttl")]
    pub calendar_ttl_secs: u64,

    /// Interval of the background sweep that evicts never-reread keys
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_price_ttl() -> u64 {
    30
}
fn default_spreads_ttl() -> u64 {
    30
}
fn default_news_ttl() -> u64 {
    60
}
fn default_calendar_ttl() -> u64 {
    14_400
}
fn default_sweep_interval() -> u64 {
    60
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            price_ttl_secs: 30,
            spreads_ttl_secs: 30,
            news_ttl_secs: 60,
            calendar_ttl_secs: 14_400,
            sweep_interval_secs: 60,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub metrics_port: u16,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
