//! Ethereum-anchored lottery CLI
//!
//! Draws winners from the hash of the first block mined after a draw time,
//! and lets anyone verify a published result.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eth_lottery::{rank, OversubscriptionPolicy};
use eth_lottery_cli::{
    anchor::{AnchorSource, EtherscanSource, FixedAnchor},
    config::LotteryConfig,
    draw::{audit_result, draw, format_draw_time, unix_now, verify_result},
    record::{load_result, save_result},
    report::{audit_report, ranking_table},
};

#[derive(Parser)]
#[command(name = "eth-lottery")]
#[command(about = "Verifiable lottery draws anchored to an Ethereum block hash")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for the draw time, fetch the anchor block and draw winners
    Draw {
        /// Path to the lottery definition
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,

        /// Draw time as a Unix timestamp (defaults to now)
        #[arg(short, long)]
        time: Option<u64>,

        /// Where to write the draw result
        #[arg(short, long, default_value = "result.json")]
        result_file: PathBuf,

        /// Use this block hash instead of querying the explorer
        #[arg(long, requires = "block_number")]
        block_hash: Option<String>,

        /// Block number recorded alongside --block-hash
        #[arg(long, requires = "block_hash")]
        block_number: Option<u64>,
    },

    /// Recompute the winners of a published result and compare
    Verify {
        /// Path to the published result
        #[arg(short, long, default_value = "result.json")]
        result_file: PathBuf,

        /// Fail when the result draws more prizes than participants
        #[arg(long)]
        strict: bool,
    },

    /// Print the participant ranking for a lottery
    Rank {
        /// Path to the lottery definition
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,
    },

    /// Replay a published result step by step
    Audit {
        /// Path to the published result
        #[arg(short, long, default_value = "result.json")]
        result_file: PathBuf,

        /// Fail when the result draws more prizes than participants
        #[arg(long)]
        strict: bool,
    },

    /// Validate a lottery definition
    ValidateConfig {
        /// Path to the lottery definition
        #[arg(short, long, default_value = "config.json")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Draw {
            config,
            time,
            result_file,
            block_hash,
            block_number,
        } => {
            let anchor = block_hash.zip(block_number);
            run_draw(&config, time, &result_file, anchor).await
        }
        Commands::Verify {
            result_file,
            strict,
        } => run_verify(&result_file, policy(strict)),
        Commands::Rank { config } => show_ranking(&config),
        Commands::Audit {
            result_file,
            strict,
        } => run_audit(&result_file, policy(strict)),
        Commands::ValidateConfig { config } => match LotteryConfig::from_file(&config) {
            Ok(config) => {
                println!("Configuration is valid.");
                println!("  Lottery: {}", config.lottery_id);
                println!("  Participants: {}", config.participants.len());
                println!("  Prizes: {}", config.prizes);
                println!("  Over-subscription: {:?}", config.oversubscription);
                println!(
                    "  Explorer: {} (chain {})",
                    config.explorer.api_url, config.explorer.chain_id
                );
                Ok(())
            }
            Err(e) => {
                eprintln!("Configuration validation failed: {:#}", e);
                std::process::exit(1);
            }
        },
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

fn policy(strict: bool) -> OversubscriptionPolicy {
    if strict {
        OversubscriptionPolicy::Reject
    } else {
        OversubscriptionPolicy::Clamp
    }
}

async fn run_draw(
    config_path: &Path,
    time: Option<u64>,
    result_file: &Path,
    anchor: Option<(String, u64)>,
) -> Result<()> {
    let config = LotteryConfig::from_file(config_path)?;
    let timestamp = time.unwrap_or_else(unix_now);

    tracing::info!(
        "Lottery {}: {} participants, {} prizes, draw time {}",
        config.lottery_id,
        config.participants.len(),
        config.prizes,
        format_draw_time(timestamp)
    );

    let source: Box<dyn AnchorSource> = match anchor {
        Some((hash, number)) => {
            tracing::info!("Using fixed anchor block {}", number);
            Box::new(FixedAnchor::new(&hash, number))
        }
        None => Box::new(EtherscanSource::new(&config.explorer)?),
    };

    let result = draw(&config, timestamp, source.as_ref()).await?;
    save_result(&result, result_file)?;

    tracing::info!("Block number: {}", result.block_num);
    tracing::info!("Winners: {:?}", result.winners);
    tracing::info!("Result written to {}", result_file.display());
    Ok(())
}

fn run_verify(result_file: &Path, policy: OversubscriptionPolicy) -> Result<()> {
    let result = load_result(result_file)?;
    verify_result(&result, policy)?;
    println!("Verified {} winners of {}", result.winners.len(), result.lottery_id);
    Ok(())
}

fn show_ranking(config_path: &Path) -> Result<()> {
    let config = LotteryConfig::from_file(config_path)?;
    let ranking = rank(&config.lottery_id, &config.participants);
    println!("{}", ranking_table(&ranking));
    Ok(())
}

fn run_audit(result_file: &Path, policy: OversubscriptionPolicy) -> Result<()> {
    let result = load_result(result_file)?;
    let trace = audit_result(&result, policy)?;

    println!();
    println!("{}", audit_report(&result, &trace));
    println!("Matches the published winners.");
    Ok(())
}
