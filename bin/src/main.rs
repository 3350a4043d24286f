//! Lectura CLI binary.
//!
//! Provides the command-line interface for the Lectura backtester.

mod cmd;
mod data;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lectura")]
#[command(about = "Quantile portfolio backtests of filing-change scores", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug diagnostics (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full backtest
    Backtest {
        /// Scores file (cik,quarter,metric,score)
        #[arg(long)]
        scores: PathBuf,

        /// Daily prices file (ticker,date,price,market_cap)
        #[arg(long)]
        prices: PathBuf,

        /// CIK to ticker lookup file (cik,ticker)
        #[arg(long)]
        lookup: PathBuf,

        /// Benchmark index levels (date,close)
        #[arg(long)]
        index: Option<PathBuf>,

        /// Settings file (JSON); defaults apply to missing fields
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory receiving buckets.csv and portfolio_values.csv
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write bucket membership without simulating
    Buckets {
        /// Scores file (cik,quarter,metric,score)
        #[arg(long)]
        scores: PathBuf,

        /// Settings file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output file
        #[arg(short, long)]
        out: PathBuf,
    },

    /// Show the quarters of the configured horizon
    Quarters {
        /// Settings file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// How reports are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    #[default]
    Text,
    /// JSON document
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Backtest {
            scores,
            prices,
            lookup,
            index,
            config,
            out,
            format,
        } => {
            let inputs = data::InputPaths {
                scores,
                prices,
                lookup,
                index,
            };
            cmd::backtest::run_backtest(&inputs, config.as_deref(), out.as_deref(), format)?;
        }
        Commands::Buckets {
            scores,
            config,
            out,
        } => {
            cmd::buckets::write_buckets(&scores, config.as_deref(), &out)?;
        }
        Commands::Quarters { config } => {
            cmd::quarters::show_quarters(config.as_deref())?;
        }
    }

    Ok(())
}
