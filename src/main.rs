//! Radar-Harvest main entry point
//!
//! This is the command-line interface for the Radar-Harvest stock snapshot
//! harvester.

use clap::Parser;
use radar_harvest::config::{load_config_with_hash, Config, ExistingDataPolicy, RunConfiguration};
use radar_harvest::crawler::run_harvest;
use radar_harvest::output::export_checkpoint;
use radar_harvest::storage::{open_checkpoint, CheckpointStore};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Radar-Harvest: a resumable stock snapshot harvester
///
/// Harvests price, market capitalization, ten-year profit, revenue and
/// dividend history and balance-sheet items for every listed symbol, and
/// writes them to a CSV table. Progress is checkpointed after every symbol.
#[derive(Parser, Debug)]
#[command(name = "radar-harvest")]
#[command(version)]
#[command(about = "Scrapes the essential stock data into a CSV table", long_about = None)]
struct Cli {
    /// Start harvesting where the previous run stopped
    #[arg(short = 'c', long = "continue", conflicts_with = "select")]
    resume: bool,

    /// Harvest only the selected symbols
    #[arg(short, long, value_name = "SYMBOL", num_args = 1..)]
    select: Vec<String>,

    /// Delete saved progress without asking
    #[arg(long, conflicts_with_all = ["resume", "select"])]
    fresh: bool,

    /// Do not pause after each request
    #[arg(long)]
    no_wait: bool,

    /// Print progress messages (-v), more with -vv and -vvv
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the path of the exported CSV table
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Export saved records and exit without harvesting
    #[arg(long, conflicts_with_all = ["resume", "select", "fresh"])]
    export_only: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_configuration(cli.config.as_deref())?;
    if let Some(output) = &cli.output {
        config.output.export_path = output.display().to_string();
    }

    if cli.export_only {
        return handle_export_only(&config);
    }

    let policy = if cli.fresh {
        ExistingDataPolicy::Clear
    } else {
        ExistingDataPolicy::Prompt
    };
    let run = RunConfiguration::new(cli.resume, cli.select, cli.no_wait, cli.verbose > 0, policy)?;

    handle_harvest(config, run).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 | 1 => EnvFilter::new("radar_harvest=info,warn"),
            2 => EnvFilter::new("radar_harvest=debug,info"),
            _ => EnvFilter::new("radar_harvest=trace,debug"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    match load_config_with_hash(path) {
        Ok((config, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            Err(e.into())
        }
    }
}

/// Handles the --export-only mode: writes the CSV from saved records
fn handle_export_only(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_checkpoint(Path::new(&config.output.checkpoint_path))?;
    tracing::info!(
        "Exporting {} saved records from {}",
        store.len()?,
        config.output.checkpoint_path
    );

    let rows = export_checkpoint(&store, Path::new(&config.output.export_path))?;
    println!("✓ {} rows exported to: {}", rows, config.output.export_path);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: Config,
    run: RunConfiguration,
) -> Result<(), Box<dyn std::error::Error>> {
    if run.resume {
        tracing::info!("Continuing the previous harvest");
    } else if run.has_selection() {
        tracing::info!("Harvesting {} selected symbols", run.selection.len());
    }
    if run.no_wait {
        tracing::warn!("Request pacing disabled");
    }

    let store = open_checkpoint(Path::new(&config.output.checkpoint_path))?;
    let summary = run_harvest(config, run, store).await?;

    if !summary.skipped.is_empty() {
        tracing::info!(
            "Skipped symbols: {:?}",
            summary
                .skipped
                .iter()
                .map(|(symbol, _)| symbol.as_str())
                .collect::<Vec<_>>()
        );
    }

    Ok(())
}
