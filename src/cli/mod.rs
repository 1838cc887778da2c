//! CLI interface for spread-scout
//!
//! Provides subcommands for:
//! - `run`: Start the live recommendation feed
//! - `scan`: One-shot recommendation computation
//! - `config`: Show effective configuration

mod run;
mod scan;

pub use run::RunArgs;
pub use scan::ScanArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "spread-scout")]
#[command(about = "Ranked vertical credit-spread recommendation feed for a single equity")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the live feed
    Run(RunArgs),
    /// Compute recommendations once and print them
    Scan(ScanArgs),
    /// Show effective configuration
    Config,
}
