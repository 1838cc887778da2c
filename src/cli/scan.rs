//! Scan command implementation

use crate::cache::TtlCache;
use crate::config::Config;
use crate::service::MarketService;
use clap::Args;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Print the raw JSON payload instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ScanArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let cache = Arc::new(TtlCache::new());
        let service = MarketService::from_config(config, cache);

        let update = service.refresh_recommendations().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&update)?);
            return Ok(());
        }

        println!(
            "{} @ {}  ({} recommendations, as of {})",
            update.symbol,
            update.current_price,
            update.recommendations.len(),
            update.last_update.format("%Y-%m-%d %H:%M:%S UTC"),
        );

        for (i, spread) in update.recommendations.iter().enumerate() {
            println!(
                "{:>2}. {} {}/{}  exp {} ({}d)  credit {}  max loss {}  breakeven {}  pop {}%  r/r {}",
                i + 1,
                spread.kind,
                spread.short_strike,
                spread.long_strike,
                spread.expiration.format("%Y-%m-%d"),
                spread.days_to_expiration,
                spread.credit_received,
                spread.max_loss,
                spread.breakeven,
                spread.probability_of_profit,
                spread.risk_reward_ratio.round_dp(3),
            );
        }

        Ok(())
    }
}
