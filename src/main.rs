//! Card Arbitrage Tracker
//!
//! Loads the current card-price snapshot, compares it against the earliest
//! dated snapshot in the history directory, derives grading cost and profit
//! margin per card, and prints/exports the cards passing the configured
//! filters.

mod config;
mod constants;
mod engine;
mod error;
mod history;
mod report;
mod snapshot;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::{Config, FileConfig, Overrides};
use history::BaselineLookup;

/// Default config file path
const CONFIG_FILE: &str = "config.toml";

#[derive(Parser, Debug)]
#[command(name = "card-arbitrage")]
#[command(about = "Arbitrage tracking for graded trading-card prices")]
struct Args {
    /// Current snapshot CSV (default: latest_data.csv, or [data] in config.toml)
    #[arg(short, long, global = true)]
    data: Option<PathBuf>,

    /// Directory of dated historical snapshots (default: daily_tracker)
    #[arg(long, global = true)]
    history_dir: Option<PathBuf>,

    /// Output directory for the CSV export
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: PathBuf,

    /// Config file path
    #[arg(long, default_value = CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,

    /// Grading fee in USD
    #[arg(long)]
    fee: Option<f64>,

    /// Maximum raw price in USD
    #[arg(long)]
    max_raw: Option<f64>,

    /// Maximum PSA 10 price in USD
    #[arg(long)]
    max_graded: Option<f64>,

    /// Minimum profit margin in USD
    #[arg(long)]
    min_margin: Option<f64>,

    /// Restrict to a set (repeatable)
    #[arg(long = "set")]
    sets: Vec<String>,

    /// Card name must contain one of these, case-insensitive (repeatable)
    #[arg(long = "name-contains")]
    name_substrings: Vec<String>,

    /// Card name search query, case-insensitive
    #[arg(long)]
    query: Option<String>,

    /// Skip trend computation even when history exists
    #[arg(long)]
    no_trends: bool,

    /// Print results without writing the CSV export
    #[arg(long)]
    no_export: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the dated history snapshots found
    History,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let file_config = FileConfig::load_or_default(&args.config)?;
    let overrides = Overrides {
        snapshot: args.data.clone(),
        history_dir: args.history_dir.clone(),
        grading_fee: args.fee,
        max_raw_price: args.max_raw,
        max_graded_price: args.max_graded,
        min_profit_margin: args.min_margin,
        allowed_sets: args.sets.clone(),
        name_substrings: args.name_substrings.clone(),
        name_query: args.query.clone(),
    };
    let config = Config::resolve(&file_config, overrides);

    if let Some(command) = args.command {
        return handle_command(command, &config);
    }

    run_pipeline(&args, &config)
}

/// Handle subcommands
fn handle_command(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::History => {
            let snapshots = history::collect_snapshots(&config.history_dir, &config.history_prefix)
                .with_context(|| {
                    format!("Failed to scan history in {}", config.history_dir.display())
                })?;

            if snapshots.is_empty() {
                println!("No history snapshots in {}", config.history_dir.display());
                println!(
                    "\nFiles must be named {}_<YYYY-MM-DD>.csv to be picked up",
                    config.history_prefix
                );
            } else {
                println!("{:<14} {:>8}", "Date", "Cards");
                println!("{}", "-".repeat(24));
                for snapshot in &snapshots {
                    println!("{:<14} {:>8}", snapshot.as_of.to_string(), snapshot.rows.len());
                }
                println!("{}", "-".repeat(24));
                println!("{} snapshot(s) found", snapshots.len());
            }
            Ok(())
        }
    }
}

/// Run the full load -> derive -> filter -> export pipeline
fn run_pipeline(args: &Args, config: &Config) -> Result<()> {
    println!("Card Arbitrage Tracker");
    println!("=============================================\n");
    println!("Snapshot: {}", config.snapshot.display());
    println!("History:  {}\n", config.history_dir.display());

    // Step 1: Load the current snapshot
    println!("Loading snapshot...");
    let rows = snapshot::load_snapshot(&config.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", config.snapshot.display()))?;
    println!("  Loaded {} rows\n", rows.len());

    // Step 2: Build the trend baseline from the earliest history file.
    // A failed scan is reported but never blocks the current snapshot.
    let baseline: Option<BaselineLookup> = if args.no_trends {
        None
    } else {
        println!("Scanning history...");
        match history::scan_history(&config.history_dir, &config.history_prefix) {
            Ok(Some(scan)) => {
                println!(
                    "  Baseline {} through {}\n",
                    scan.earliest.as_of, scan.latest.as_of
                );
                Some(history::baseline_lookup(&scan.earliest))
            }
            Ok(None) => {
                println!("  No history found; trends disabled\n");
                None
            }
            Err(e) => {
                eprintln!("  Warning: {e}");
                eprintln!("  Continuing without trends\n");
                None
            }
        }
    };

    // Step 3: Derive and filter
    let results = engine::evaluate(&rows, baseline.as_ref(), &config.params)?;
    report::print_results(&results, config.params.grading_fee);

    // Step 4: Export
    if !args.no_export {
        std::fs::create_dir_all(&args.output_dir)?;
        let path = args.output_dir.join(constants::EXPORT_FILENAME);
        report::write_csv(&path, &results, config.params.grading_fee)?;
        println!("\nExported: {}", path.display());
    }

    Ok(())
}
