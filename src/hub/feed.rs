//! Broadcast hub
//!
//! Simulates a push feed over periodic pulls. Each topic runs one refresh
//! task that exists only while the topic has subscribers: created on first
//! subscribe (with an immediate first refresh so nobody waits a full
//! interval), destroyed on last unsubscribe. Refreshes for a topic are
//! serialized (the fetch is awaited inside the task and missed ticks are
//! skipped) and every result carries a sequence number so stale data is
//! never delivered after fresher data.

use super::types::{ConnectionStatus, FeedUpdate, HubSettings, Subscription, Topic};
use crate::service::FeedSource;
use crate::telemetry::{incr_counter, set_gauge, CounterMetric, GaugeMetric};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval_at, sleep, Instant, MissedTickBehavior};
use uuid::Uuid;

/// Most recent fetch outcome per active topic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchHealth {
    Pending,
    Healthy,
    Failed,
}

struct TopicState {
    subscribers: HashMap<Uuid, mpsc::Sender<FeedUpdate>>,
    task: tokio::task::JoinHandle<()>,
}

/// What one refresh attempt did
enum RefreshOutcome {
    Delivered,
    Failed,
    /// Every receiver is gone; the topic task should end itself
    Abandoned,
}

/// Per-topic publish/subscribe over periodic pulls
pub struct FeedHub {
    source: Arc<dyn FeedSource>,
    settings: HubSettings,
    topics: Arc<Mutex<HashMap<Topic, TopicState>>>,
    health: Arc<Mutex<HashMap<Topic, FetchHealth>>>,
}

impl FeedHub {
    pub fn new(source: Arc<dyn FeedSource>, settings: HubSettings) -> Self {
        Self {
            source,
            settings,
            topics: Arc::new(Mutex::new(HashMap::new())),
            health: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Register a subscriber; an idle topic gets its refresh task started and
    /// an immediate first refresh.
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        let (tx, rx) = mpsc::channel(self.settings.channel_capacity);
        let id = Uuid::new_v4();

        let mut topics = self.topics.lock();
        match topics.get_mut(&topic) {
            Some(state) => {
                state.subscribers.insert(id, tx);
                tracing::debug!(%topic, subscribers = state.subscribers.len(), "Subscriber added");
            }
            None => {
                self.health.lock().insert(topic, FetchHealth::Pending);
                let mut subscribers = HashMap::new();
                subscribers.insert(id, tx);
                let task = self.spawn_topic_task(topic);
                topics.insert(topic, TopicState { subscribers, task });
                tracing::info!(%topic, "Topic activated");
            }
        }
        set_gauge(GaugeMetric::ActiveTopics, topics.len() as f64);

        Subscription::new(id, topic, rx)
    }

    /// Remove a subscriber; the last one out cancels the topic's refresh
    /// task. An in-flight fetch is dropped rather than broadcast.
    pub fn unsubscribe(&self, sub: &Subscription) {
        let mut topics = self.topics.lock();
        let now_empty = match topics.get_mut(&sub.topic) {
            Some(state) => {
                state.subscribers.remove(&sub.id);
                state.subscribers.is_empty()
            }
            None => false,
        };
        if now_empty {
            if let Some(state) = topics.remove(&sub.topic) {
                state.task.abort();
                self.health.lock().remove(&sub.topic);
                tracing::info!(topic = %sub.topic, "Topic idle, refresh task cancelled");
            }
        }
        set_gauge(GaugeMetric::ActiveTopics, topics.len() as f64);
    }

    /// Number of topics with a live refresh task.
    pub fn active_topics(&self) -> usize {
        self.topics.lock().len()
    }

    /// Derived status: reflects whether any topic is active and whether the
    /// most recent fetch attempts succeeded.
    pub fn connection_status(&self) -> ConnectionStatus {
        let topics = self.topics.lock();
        if topics.is_empty() {
            return ConnectionStatus::Disconnected;
        }

        let health = self.health.lock();
        let mut pending = false;
        for topic in topics.keys() {
            match health.get(topic) {
                Some(FetchHealth::Failed) => return ConnectionStatus::Error,
                Some(FetchHealth::Healthy) => {}
                _ => pending = true,
            }
        }

        if pending {
            ConnectionStatus::Connecting
        } else {
            ConnectionStatus::Connected
        }
    }

    fn spawn_topic_task(&self, topic: Topic) -> tokio::task::JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let topics = Arc::clone(&self.topics);
        let health = Arc::clone(&self.health);
        let every = self.settings.interval_for(topic);
        let initial_retry = self.settings.initial_retry;
        let max_retry = self.settings.max_retry;
        let max_attempts = self.settings.max_connect_attempts;

        tokio::spawn(async move {
            let mut seq: u64 = 0;
            let mut last_delivered: u64 = 0;

            // Establishment phase: refresh immediately, retrying with a
            // doubling delay. Failures past the attempt cap fall through to
            // the tick cadence below.
            let mut delay = initial_retry;
            let mut attempt: u32 = 0;
            loop {
                seq += 1;
                match refresh_once(&source, topic, seq, &topics, &health, &mut last_delivered)
                    .await
                {
                    RefreshOutcome::Delivered => break,
                    RefreshOutcome::Abandoned => {
                        remove_topic(&topics, &health, topic);
                        return;
                    }
                    RefreshOutcome::Failed => {
                        attempt += 1;
                        if attempt >= max_attempts {
                            tracing::warn!(
                                %topic,
                                attempts = attempt,
                                "Feed not established, settling into tick cadence"
                            );
                            break;
                        }
                        sleep(delay).await;
                        delay = (delay * 2).min(max_retry);
                    }
                }
            }

            // Steady state: one fetch per tick. The fetch is awaited here, so
            // a slow refresh cannot overlap the next one; Skip drops the
            // backlog instead of bursting.
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                seq += 1;
                if let RefreshOutcome::Abandoned =
                    refresh_once(&source, topic, seq, &topics, &health, &mut last_delivered).await
                {
                    remove_topic(&topics, &health, topic);
                    return;
                }
            }
        })
    }
}

fn remove_topic(
    topics: &Mutex<HashMap<Topic, TopicState>>,
    health: &Mutex<HashMap<Topic, FetchHealth>>,
    topic: Topic,
) {
    topics.lock().remove(&topic);
    health.lock().remove(&topic);
    tracing::info!(%topic, "All receivers gone, topic deactivated");
}

/// One refresh attempt: fetch, then fan out to current subscribers.
async fn refresh_once(
    source: &Arc<dyn FeedSource>,
    topic: Topic,
    seq: u64,
    topics: &Mutex<HashMap<Topic, TopicState>>,
    health: &Mutex<HashMap<Topic, FetchHealth>>,
    last_delivered: &mut u64,
) -> RefreshOutcome {
    let payload = match source.fetch(topic).await {
        Ok(payload) => payload,
        Err(e) => {
            health.lock().insert(topic, FetchHealth::Failed);
            incr_counter(CounterMetric::FetchError);
            tracing::warn!(%topic, seq, error = %e, "Refresh failed, next tick retries");
            return RefreshOutcome::Failed;
        }
    };

    health.lock().insert(topic, FetchHealth::Healthy);

    // Freshness guard: never deliver behind what subscribers already saw.
    if seq <= *last_delivered {
        tracing::debug!(%topic, seq, last_delivered = *last_delivered, "Stale refresh discarded");
        return RefreshOutcome::Delivered;
    }
    *last_delivered = seq;

    let mut topics = topics.lock();
    let Some(state) = topics.get_mut(&topic) else {
        // Unsubscribed while the fetch was in flight: drop the result.
        return RefreshOutcome::Abandoned;
    };
    if state.subscribers.is_empty() {
        tracing::debug!(%topic, seq, "Result dropped, no subscribers");
        return RefreshOutcome::Abandoned;
    }

    let mut dead = Vec::new();
    for (id, tx) in &state.subscribers {
        let update = FeedUpdate {
            topic,
            seq,
            payload: payload.clone(),
        };
        match tx.try_send(update) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(%topic, subscriber = %id, "Slow subscriber, update skipped");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                dead.push(*id);
            }
        }
    }
    for id in dead {
        state.subscribers.remove(&id);
    }

    if state.subscribers.is_empty() {
        return RefreshOutcome::Abandoned;
    }

    RefreshOutcome::Delivered
}
