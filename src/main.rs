use clap::Parser;
use spread_scout::cli::{Cli, Commands};
use spread_scout::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    // Initialize telemetry
    let _guard = spread_scout::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!(symbol = %config.symbol, "Starting live feed");
            args.execute(&config).await?;
        }
        Commands::Scan(args) => {
            tracing::info!(symbol = %config.symbol, "Running one-shot scan");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Symbol: {}", config.symbol);
            println!(
                "  Quote: providers={:?} fallback={}",
                config.quote.providers, config.quote.fallback_price
            );
            println!(
                "  Engine: target_dte={} window=±{}",
                config.engine.target_dte, config.engine.dte_window
            );
            println!(
                "  Ranker: credit>{} r/r>{} dte {}..={} top {}",
                config.ranker.min_credit,
                config.ranker.min_risk_reward,
                config.ranker.min_dte,
                config.ranker.max_dte,
                config.ranker.max_results
            );
            println!(
                "  Hub: price {}s, spreads {}s, news {}s, calendar {}s",
                config.hub.price_interval_secs,
                config.hub.spreads_interval_secs,
                config.hub.news_interval_secs,
                config.hub.calendar_interval_secs
            );
        }
    }

    Ok(())
}
