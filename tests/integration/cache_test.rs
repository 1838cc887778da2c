//! Integration tests for the TTL cache

use spread_scout::cache::{spawn_sweeper, TtlCache};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_round_trip() {
    let cache: TtlCache<String> = TtlCache::new();
    cache.set("spreads:SPY", "payload".to_string(), Duration::from_secs(30));
    assert_eq!(cache.get("spreads:SPY"), Some("payload".to_string()));
}

#[test]
fn test_expiry_is_enforced_by_get() {
    let cache: TtlCache<u32> = TtlCache::new();
    cache.set("k", 1, Duration::from_millis(10));
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(cache.get("k"), None);
}

#[test]
fn test_cleanup_idempotent() {
    let cache: TtlCache<u32> = TtlCache::new();
    cache.set("a", 1, Duration::from_millis(10));
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(cache.cleanup(), 1);
    assert_eq!(cache.cleanup(), 0);
}

#[tokio::test]
async fn test_background_sweeper_bounds_growth() {
    let cache: Arc<TtlCache<u32>> = Arc::new(TtlCache::new());
    for i in 0..50 {
        cache.set(format!("k{i}"), i, Duration::from_millis(5));
    }
    assert_eq!(cache.len(), 50);

    let handle = spawn_sweeper(Arc::clone(&cache), Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(80)).await;
    handle.abort();

    assert!(cache.is_empty());
}
