//! Polling-based publish/subscribe hub
//!
//! Per-topic subscriber sets with a single scheduled refresh timer per
//! topic, alive only while subscribers exist.

mod feed;
mod types;

pub use feed::FeedHub;
pub use types::{ConnectionStatus, FeedUpdate, HubSettings, Subscription, Topic};
