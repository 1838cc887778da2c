//! Run command implementation

use crate::cache::{spawn_sweeper, TtlCache};
use crate::config::Config;
use crate::hub::{FeedHub, FeedUpdate, HubSettings, Topic};
use crate::service::{FeedPayload, MarketService};
use clap::Args;
use futures_util::future::select_all;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Topics to subscribe, comma-separated (price, spreads, news, calendar)
    #[arg(long, default_value = "price,spreads,news")]
    pub topics: String,
}

impl RunArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let topics = self
            .topics
            .split(',')
            .map(Topic::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| anyhow::anyhow!(e))?;

        let cache = Arc::new(TtlCache::new());
        let _sweeper = spawn_sweeper(
            Arc::clone(&cache),
            Duration::from_secs(config.cache.sweep_interval_secs),
        );

        let service = Arc::new(MarketService::from_config(config, cache));
        let hub = FeedHub::new(service, HubSettings::from(&config.hub));

        let mut subscriptions: Vec<_> = topics.iter().map(|t| hub.subscribe(*t)).collect();
        tracing::info!(
            symbol = %config.symbol,
            topics = %self.topics,
            "Feed started, ctrl-c to stop"
        );

        loop {
            let next = {
                let recvs: Vec<_> = subscriptions
                    .iter_mut()
                    .map(|s| Box::pin(s.recv()))
                    .collect();

                tokio::select! {
                    (update, _, _) = select_all(recvs) => update,
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Shutting down");
                        break;
                    }
                }
            };

            match next {
                Some(update) => print_update(&update),
                None => break,
            }
        }

        for sub in &subscriptions {
            hub.unsubscribe(sub);
        }

        Ok(())
    }
}

fn print_update(update: &FeedUpdate) {
    match &update.payload {
        FeedPayload::Price(price) => {
            tracing::info!(topic = %update.topic, seq = update.seq, price = %price.price, "Price update");
        }
        FeedPayload::Spreads(rec) => {
            tracing::info!(
                topic = %update.topic,
                seq = update.seq,
                count = rec.recommendations.len(),
                price = %rec.current_price,
                "Recommendations update"
            );
            for spread in &rec.recommendations {
                println!(
                    "  {} {}/{} exp {}  credit {}  max loss {}  breakeven {}  pop {}%  r/r {}",
                    spread.kind,
                    spread.short_strike,
                    spread.long_strike,
                    spread.expiration.format("%Y-%m-%d"),
                    spread.credit_received,
                    spread.max_loss,
                    spread.breakeven,
                    spread.probability_of_profit,
                    spread.risk_reward_ratio.round_dp(3),
                );
            }
        }
        FeedPayload::News(items) => {
            tracing::info!(topic = %update.topic, seq = update.seq, count = items.len(), "News update");
            for item in items.iter().take(5) {
                println!("  [{}] {}", item.source, item.title);
            }
        }
        FeedPayload::Calendar(events) => {
            tracing::info!(topic = %update.topic, seq = update.seq, count = events.len(), "Calendar update");
        }
    }
}
