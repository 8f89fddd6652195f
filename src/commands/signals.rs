//! Signals command implementation

use anyhow::{Context, Result};
use grid_signals::data::{self, CsvSource, DataSource, PriceSource, SeriesCache, YahooDataFetcher};
use grid_signals::error::is_no_data;
use grid_signals::grid::GridAnalysis;
use grid_signals::report::{self, SignalReport};
use grid_signals::{Config, Period, PriceSeries, Symbol};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub fn run(
    config_path: String,
    symbols_override: Option<String>,
    period_override: Option<Period>,
    grid_count_override: Option<usize>,
    csv_file: Option<PathBuf>,
    export: bool,
) -> Result<()> {
    info!("Starting grid signal scan");

    let mut config = load_config(&config_path)?;
    let symbols_given = symbols_override.is_some();

    // Apply overrides
    if let Some(symbols) = symbols_override {
        config.symbols = symbols.split(',').map(|s| s.trim().to_string()).collect();
    }
    if let Some(period) = period_override {
        info!("Overriding period to: {}", period);
        config.period = period;
    }
    if let Some(grid_count) = grid_count_override {
        info!("Overriding grid count to: {}", grid_count);
        config.grid.grid_count = grid_count;
    }
    config.validate()?;

    let loaded = match csv_file {
        Some(path) => {
            let explicit = if symbols_given {
                config.symbols().into_iter().next()
            } else {
                None
            };
            let (symbol, file_period) = csv_label(&path, explicit);
            if let (None, Some(file_period)) = (period_override, file_period) {
                config.period = file_period;
            }
            vec![load_file(symbol, &path)?]
        }
        None => fetch_all(&config)?,
    };

    let period = config.period;
    let grid_count = config.grid.grid_count;
    debug!("Symbols: {:?}, period: {}, grid_count: {}", config.symbols, period, grid_count);

    if loaded.is_empty() {
        anyhow::bail!("No data loaded for any symbol");
    }

    info!("Analysing {} series", loaded.len());
    let reports: Vec<SignalReport> = loaded
        .par_iter()
        .map(|(symbol, series)| {
            let analysis = GridAnalysis::run(series, grid_count);
            SignalReport::new(symbol.clone(), period, grid_count, series.len(), &analysis)
        })
        .collect();

    for report in &reports {
        if report.levels.is_empty() {
            warn!(
                "{} closed at a single price over {}; no grid could be built",
                report.symbol, period
            );
        }
        report::print_report(report);

        if export {
            let (csv_path, json_path) = report::export(report, &config.output.results_dir)?;
            println!("Saved: {}", csv_path.display());
            println!("Saved: {}", json_path.display());
        }
    }

    info!("Signal scan completed successfully");
    Ok(())
}

fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        let config = Config::from_file(config_path)?;
        info!("Loaded configuration from: {}", config_path);
        return Ok(config);
    }

    warn!("Config file {} not found, using defaults", config_path);
    let mut config = Config::default();
    config.apply_env()?;
    Ok(config)
}

/// Symbol and period for a CSV given on the command line.
///
/// `--symbols` wins for the symbol; otherwise a `{symbol}_{period}.csv` name
/// supplies both, and any other name labels the series with its stem.
fn csv_label(path: &Path, explicit: Option<Symbol>) -> (Symbol, Option<Period>) {
    let parsed = data::parse_series_filename(path);
    let file_period = parsed.as_ref().map(|(_, period)| *period);

    let symbol = explicit
        .or_else(|| parsed.map(|(symbol, _)| symbol))
        .or_else(|| {
            path.file_stem()
                .map(|stem| Symbol::new(stem.to_string_lossy()))
        })
        .unwrap_or_else(|| Symbol::new("CSV"));

    (symbol, file_period)
}

/// Single series from an explicit CSV file
fn load_file(symbol: Symbol, path: &Path) -> Result<(Symbol, PriceSeries)> {
    let series = data::load_csv(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    if series.is_empty() {
        anyhow::bail!("No valid prices in {}", path.display());
    }

    info!("Loaded {} closes for {} from {}", series.len(), symbol, path.display());
    Ok((symbol, series))
}

/// Resolve every configured symbol through the configured source.
/// Symbols without data are reported and skipped.
fn fetch_all(config: &Config) -> Result<Vec<(Symbol, PriceSeries)>> {
    let source: Box<dyn PriceSource> = match config.data.source {
        DataSource::Yahoo => Box::new(SeriesCache::new(
            YahooDataFetcher::new(&config.data.data_dir)?,
            config.data.cache_ttl_secs,
        )?),
        DataSource::Csv => Box::new(CsvSource::new(&config.data.data_dir)),
    };
    info!("Loading data from: {}", source.name());

    let rt = tokio::runtime::Runtime::new()?;
    let mut loaded = Vec::new();

    for symbol in config.symbols() {
        match rt.block_on(source.fetch(&symbol, config.period)) {
            Ok(series) => loaded.push((symbol, series)),
            Err(e) if is_no_data(&e) => {
                println!("  ✗ No data found for {}. Check that the symbol is correct.", symbol);
                warn!("No data for {}: {}", symbol, e);
            }
            Err(e) => {
                println!("  ✗ Failed to load {}: {:#}", symbol, e);
                warn!("Failed to load {}: {:#}", symbol, e);
            }
        }
    }

    Ok(loaded)
}
