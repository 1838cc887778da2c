//! Integration tests for the broadcast hub lifecycle

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal_macros::dec;
use spread_scout::hub::{ConnectionStatus, FeedHub, HubSettings, Topic};
use spread_scout::service::{FeedPayload, FeedSource, PriceUpdate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct CountingSource {
    fetches: AtomicUsize,
}

#[async_trait]
impl FeedSource for CountingSource {
    async fn fetch(&self, _topic: Topic) -> anyhow::Result<FeedPayload> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(FeedPayload::Price(PriceUpdate {
            symbol: "SPY".to_string(),
            price: dec!(255),
            last_update: Utc::now(),
        }))
    }
}

fn settings() -> HubSettings {
    HubSettings {
        price_interval: Duration::from_secs(5),
        spreads_interval: Duration::from_secs(30),
        news_interval: Duration::from_secs(120),
        calendar_interval: Duration::from_secs(3600),
        channel_capacity: 16,
        initial_retry: Duration::from_millis(100),
        max_retry: Duration::from_secs(2),
        max_connect_attempts: 5,
    }
}

#[tokio::test(start_paused = true)]
async fn test_subscribe_deliver_unsubscribe_cycle() {
    let source = Arc::new(CountingSource {
        fetches: AtomicUsize::new(0),
    });
    let hub = FeedHub::new(source.clone() as Arc<dyn FeedSource>, settings());

    assert_eq!(hub.connection_status(), ConnectionStatus::Disconnected);

    let mut sub = hub.subscribe(Topic::Price);
    let first = sub.recv().await.unwrap();
    assert_eq!(first.seq, 1);
    assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    assert_eq!(hub.connection_status(), ConnectionStatus::Connected);

    // Monotonic freshness across ticks.
    let second = sub.recv().await.unwrap();
    assert!(second.seq > first.seq);

    hub.unsubscribe(&sub);
    assert_eq!(hub.active_topics(), 0);
    assert_eq!(hub.connection_status(), ConnectionStatus::Disconnected);

    let settled = source.fetches.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(source.fetches.load(Ordering::SeqCst), settled);
}

#[tokio::test(start_paused = true)]
async fn test_each_topic_gets_its_own_cadence() {
    let source = Arc::new(CountingSource {
        fetches: AtomicUsize::new(0),
    });
    let hub = FeedHub::new(source.clone() as Arc<dyn FeedSource>, settings());

    let mut price = hub.subscribe(Topic::Price);
    let mut news = hub.subscribe(Topic::News);

    // Both topics refresh immediately on activation.
    price.recv().await.unwrap();
    news.recv().await.unwrap();
    assert_eq!(source.fetches.load(Ordering::SeqCst), 2);

    // Over a minute the 5s price topic refreshes far more often than the
    // 120s news topic, which has not ticked again yet.
    let mut price_updates = 0;
    while price_updates < 5 {
        price.recv().await.unwrap();
        price_updates += 1;
    }

    hub.unsubscribe(&price);
    hub.unsubscribe(&news);
}
