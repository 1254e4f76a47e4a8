//! Adsweep main entry point
//!
//! This is the command-line interface for the Adsweep classified-ad price
//! surveyor. Results go to stdout as JSON; logs go to stderr.

use adsweep::config::{load_config_with_hash, validate, Config};
use adsweep::crawler::run_harvest;
use adsweep::model::ErrorResponse;
use adsweep::output::{
    detect_outliers_with, print_summary, write_json, write_json_file, OutlierPolicy,
};
use anyhow::Context;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Adsweep: a classified-ad price surveyor
///
/// Adsweep walks a paginated search-results feed starting at SEED_URL,
/// scrapes every listing's detail page, and prints the listings with their
/// price statistics as JSON.
#[derive(Parser, Debug)]
#[command(name = "adsweep")]
#[command(version)]
#[command(about = "A classified-ad price surveyor", long_about = None)]
struct Cli {
    /// Search-results URL to start from
    #[arg(value_name = "SEED_URL")]
    seed_url: String,

    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write the JSON result to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Print a price summary with outliers to stderr
    #[arg(long)]
    summary: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    match handle_run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Run failed: {:#}", e);

            let body = ErrorResponse {
                error: format!("{:#}", e),
            };
            if let Err(write_err) = write_json(&mut io::stdout().lock(), &body, cli.pretty) {
                tracing::error!("Failed to write error response: {}", write_err);
            }
            ExitCode::FAILURE
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs always go to stderr so stdout carries only the JSON payload.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("adsweep=info,warn"),
            1 => EnvFilter::new("adsweep=debug,info"),
            2 => EnvFilter::new("adsweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        let config = Config::default();
        validate(&config)?;
        return Ok(config);
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles a complete run: scrape, summarize, write
async fn handle_run(cli: &Cli) -> anyhow::Result<()> {
    let config = load_configuration(cli.config.as_ref())?;
    let policy = OutlierPolicy::from_config(&config.stats);

    tracing::info!(
        "Detail concurrency: {}, page delay: {}ms, batch delay: {}ms",
        config.scheduler.concurrency,
        config.crawler.page_delay_ms,
        config.scheduler.batch_delay_ms
    );

    let report = run_harvest(config, &cli.seed_url).await?;

    if cli.summary {
        let outliers = detect_outliers_with(&report.run.items, &policy);
        print_summary(&report, &outliers);
    }

    match &cli.output {
        Some(path) => write_json_file(path, &report.run, cli.pretty)?,
        None => write_json(&mut io::stdout().lock(), &report.run, cli.pretty)?,
    }

    Ok(())
}
