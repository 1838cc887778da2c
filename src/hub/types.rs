//! Hub types

use crate::config;
use crate::service::FeedPayload;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// A named data stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Price,
    Spreads,
    News,
    Calendar,
}

impl Topic {
    pub const ALL: [Topic; 4] = [Topic::Price, Topic::Spreads, Topic::News, Topic::Calendar];

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Price => "price",
            Topic::Spreads => "spreads",
            Topic::News => "news",
            Topic::Calendar => "calendar",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(Topic::Price),
            "spreads" => Ok(Topic::Spreads),
            "news" => Ok(Topic::News),
            "calendar" => Ok(Topic::Calendar),
            other => Err(format!("unknown topic: {other}")),
        }
    }
}

/// Derived feed health, not source-of-truth state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// At least one topic is active but has not completed a fetch yet
    Connecting,
    /// All active topics served their most recent fetch successfully
    Connected,
    /// No active topics
    Disconnected,
    /// The most recent fetch of some active topic failed
    Error,
}

/// One delivery to a subscriber
#[derive(Debug, Clone)]
pub struct FeedUpdate {
    pub topic: Topic,
    /// Refresh sequence number, strictly increasing per topic
    pub seq: u64,
    pub payload: FeedPayload,
}

/// A registered consumer of one topic
pub struct Subscription {
    pub id: Uuid,
    pub topic: Topic,
    rx: mpsc::Receiver<FeedUpdate>,
}

impl Subscription {
    pub(crate) fn new(id: Uuid, topic: Topic, rx: mpsc::Receiver<FeedUpdate>) -> Self {
        Self { id, topic, rx }
    }

    /// Receive the next update; `None` once the topic task is gone.
    pub async fn recv(&mut self) -> Option<FeedUpdate> {
        self.rx.recv().await
    }
}

/// Refresh cadence and retry policy, resolved to durations
#[derive(Debug, Clone)]
pub struct HubSettings {
    pub price_interval: Duration,
    pub spreads_interval: Duration,
    pub news_interval: Duration,
    pub calendar_interval: Duration,
    pub channel_capacity: usize,
    pub initial_retry: Duration,
    pub max_retry: Duration,
    pub max_connect_attempts: u32,
}

impl HubSettings {
    pub fn interval_for(&self, topic: Topic) -> Duration {
        match topic {
            Topic::Price => self.price_interval,
            Topic::Spreads => self.spreads_interval,
            Topic::News => self.news_interval,
            Topic::Calendar => self.calendar_interval,
        }
    }
}

impl From<&config::HubConfig> for HubSettings {
    fn from(c: &config::HubConfig) -> Self {
        Self {
            price_interval: Duration::from_secs(c.price_interval_secs),
            spreads_interval: Duration::from_secs(c.spreads_interval_secs),
            news_interval: Duration::from_secs(c.news_interval_secs),
            calendar_interval: Duration::from_secs(c.calendar_interval_secs),
            channel_capacity: c.channel_capacity,
            initial_retry: Duration::from_millis(c.initial_retry_ms),
            max_retry: Duration::from_millis(c.max_retry_ms),
            max_connect_attempts: c.max_connect_attempts,
        }
    }
}
