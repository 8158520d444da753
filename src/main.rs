use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use config::ConfigError;
use defi_scorer::{
    config::Settings,
    models::{BehaviorMetrics, Chain, ScoreRequest, SystemClock, TransactionTiming},
    scoring::{classify, ScoreCalculator, WeightTable},
    sources::{CachedSource, FileFormat, FileSource},
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(name = "defi-scorer")]
#[clap(about = "Risk and Health scores for DeFi wallets", long_about = None)]
struct Cli {
    /// Settings file, layered over built-in defaults
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a wallet from portfolio data saved on disk
    Score {
        /// Wallet address (0x + 40 hex digits)
        #[clap(short, long)]
        address: String,

        /// Chain ID or name (ethereum, polygon, optimism, arbitrum, base)
        #[clap(short, long, default_value = "1")]
        chain_id: String,

        /// JSON file with portfolio data
        #[clap(short, long)]
        snapshot: PathBuf,

        /// Layout of the snapshot file (oneinch, snapshot)
        #[clap(short, long, default_value = "oneinch")]
        format: String,

        /// Score as of this RFC 3339 time instead of now
        #[clap(long)]
        now: Option<String>,

        /// Print the per-metric breakdown instead of the report
        #[clap(long)]
        explain: bool,
    },

    /// Show the configured weight tables
    Weights,

    /// Classify a user type from behavior metrics
    Classify {
        /// Swaps per month
        #[clap(long, default_value = "0")]
        swap_frequency: f64,

        /// Fraction of trades placed as limit orders
        #[clap(long, default_value = "0")]
        limit_order_ratio: f64,

        /// peak, off-peak or mixed
        #[clap(long, default_value = "mixed")]
        timing: String,

        /// Fraction of transactions touching unknown tokens
        #[clap(long, default_value = "0")]
        new_token_ratio: f64,

        /// Fraction of transactions sent at low gas prices
        #[clap(long, default_value = "0")]
        gas_optimization_ratio: f64,
    },
}

/// An explicit `--config` must load. Without one, a broken default layer
/// falls back to built-in settings and the error is kept for logging once
/// tracing is up.
fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<(Settings, Option<ConfigError>)> {
    match path {
        Some(path) => {
            let settings = Settings::from_file(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?;
            Ok((settings, None))
        }
        None => Ok(settings_or_default(Settings::new())),
    }
}

fn settings_or_default(loaded: Result<Settings, ConfigError>) -> (Settings, Option<ConfigError>) {
    match loaded {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    }
}

fn parse_chain(value: &str) -> anyhow::Result<u64> {
    if let Ok(id) = value.parse::<u64>() {
        return Ok(id);
    }
    Chain::from_str(value)
        .map(|c| c.chain_id())
        .ok_or_else(|| anyhow::anyhow!("Unknown chain: {}", value))
}

fn print_table(table: &WeightTable) {
    println!("{} weights:", table.name());
    for (kind, weight) in table.entries() {
        println!("  {:<24} {:.2}", kind.display_name(), weight);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (settings, load_error) = load_settings(cli.config.as_ref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.app.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(e) = load_error {
        warn!("Failed to load settings, using defaults: {}", e);
    }

    if let Err(e) = settings.validate() {
        error!("Invalid settings: {}", e);
        return Err(anyhow::anyhow!(e));
    }

    match cli.command {
        Commands::Score {
            address,
            chain_id,
            snapshot,
            format,
            now,
            explain,
        } => {
            let format = FileFormat::from_str(&format)
                .ok_or_else(|| anyhow::anyhow!("Unknown snapshot format: {}", format))?;
            let now = match now {
                Some(now) => DateTime::parse_from_rfc3339(&now)
                    .with_context(|| format!("Invalid --now time: {}", now))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };

            let source = CachedSource::from_settings(
                FileSource::new(&snapshot, format),
                SystemClock,
                &settings.source,
            );
            let calculator = ScoreCalculator::new(Arc::new(source), settings)?;
            let request = ScoreRequest::new(address, parse_chain(&chain_id)?);

            info!("Scoring {} from {}", request.wallet_address, snapshot.display());
            if explain {
                let analysis = calculator.analyze_wallet_at(&request, now).await?;
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                let report = calculator.calculate_wallet_score_at(&request, now).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        Commands::Weights => {
            print_table(&settings.scoring.risk_weights.table()?);
            println!();
            print_table(&settings.scoring.health_weights.table()?);
        }

        Commands::Classify {
            swap_frequency,
            limit_order_ratio,
            timing,
            new_token_ratio,
            gas_optimization_ratio,
        } => {
            let transaction_timing = TransactionTiming::from_str(&timing)
                .ok_or_else(|| anyhow::anyhow!("Unknown timing: {}", timing))?;
            let behavior = BehaviorMetrics {
                swap_frequency,
                limit_order_usage_ratio: limit_order_ratio,
                transaction_timing,
                new_token_interaction_ratio: new_token_ratio,
                gas_optimization_ratio,
            };

            println!("{}", classify(&behavior));
        }
    }

    Ok(())
}
