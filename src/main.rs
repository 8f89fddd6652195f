//! Grid trading signals - main entry point
//!
//! This binary provides two subcommands:
//! - signals: Build the grid and list buy/sell crossings for one or more symbols
//! - download: Download daily closes from Yahoo Finance into CSV files

use anyhow::Result;
use clap::{Parser, Subcommand};
use grid_signals::Period;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "grid-signals")]
#[command(about = "Grid trading buy/sell signals over historical closing prices", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build grid levels and list crossing signals
    Signals {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/default.json")]
        config: String,

        /// Symbols to scan (comma-separated, overrides config). E.g., "2330.TW,AAPL"
        #[arg(short, long)]
        symbols: Option<String>,

        /// Lookback period: 1mo, 3mo, 6mo or 1y (overrides config)
        #[arg(short, long)]
        period: Option<Period>,

        /// Number of grid levels, 3-20 (overrides config)
        #[arg(short, long)]
        grid_count: Option<usize>,

        /// Read closes from this CSV file instead of the configured source
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write signals as CSV and JSON to the results directory
        #[arg(long)]
        export: bool,
    },

    /// Download daily closes from Yahoo Finance
    Download {
        /// Symbols to download (comma-separated). E.g., "2330.TW,2317.TW"
        #[arg(short, long)]
        symbols: String,

        /// Lookback period: 1mo, 3mo, 6mo or 1y
        #[arg(short, long, default_value = "6mo")]
        period: Period,

        /// Output directory
        #[arg(short, long, default_value = "data")]
        output: String,
    },
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // Create log file with naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Set log level - filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    // File layer - same format but without ANSI colors
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let command_name = match &cli.command {
        Commands::Signals { .. } => "signals",
        Commands::Download { .. } => "download",
    };

    setup_logging(cli.verbose, command_name)?;

    match cli.command {
        Commands::Signals {
            config,
            symbols,
            period,
            grid_count,
            csv,
            export,
        } => commands::signals::run(config, symbols, period, grid_count, csv, export),

        Commands::Download {
            symbols,
            period,
            output,
        } => commands::download::run(symbols, period, output),
    }
}
