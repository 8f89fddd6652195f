//! Console and file reports for grid analyses

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::grid::GridAnalysis;
use crate::{Period, Signal, Symbol};

/// Everything exported for one symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalReport {
    pub symbol: Symbol,
    pub period: Period,
    pub grid_count: usize,
    pub observations: usize,
    pub low: f64,
    pub high: f64,
    pub spacing: Option<f64>,
    pub levels: Vec<f64>,
    pub buy_count: usize,
    pub sell_count: usize,
    pub signals: Vec<Signal>,
}

impl SignalReport {
    pub fn new(
        symbol: Symbol,
        period: Period,
        grid_count: usize,
        observations: usize,
        analysis: &GridAnalysis,
    ) -> Self {
        SignalReport {
            symbol,
            period,
            grid_count,
            observations,
            low: analysis.low,
            high: analysis.high,
            spacing: analysis.spacing(),
            levels: analysis.grid.levels().to_vec(),
            buy_count: analysis.buy_count(),
            sell_count: analysis.sell_count(),
            signals: analysis.signals(),
        }
    }

    /// Base file name for exports, e.g. `2330.TW_6mo_signals`
    pub fn file_stem(&self) -> String {
        format!("{}_{}_signals", self.symbol, self.period)
    }
}

/// Summary block: range, signal counts and grid spacing
pub fn format_summary(report: &SignalReport) -> String {
    let mut out = String::new();
    let spacing = report
        .spacing
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "n/a".to_string());

    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(
        out,
        "GRID SIGNALS: {} ({}, {} grids)",
        report.symbol, report.period, report.grid_count
    );
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out, "Observations:       {}", report.observations);
    let _ = writeln!(out, "Range High:         {:.2}", report.high);
    let _ = writeln!(out, "Range Low:          {:.2}", report.low);
    let _ = writeln!(out, "Grid Spacing:       {}", spacing);
    let _ = writeln!(out, "Buy Signals:        {}", report.buy_count);
    let _ = writeln!(out, "Sell Signals:       {}", report.sell_count);
    let _ = write!(out, "{}", "-".repeat(60));
    out
}

/// Chronological signal table (date, price, action)
pub fn format_signal_table(signals: &[Signal]) -> String {
    if signals.is_empty() {
        return "No grid signals triggered in this period.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "{:<12} {:>12}  {}", "Date", "Price", "Action");
    for signal in signals {
        let _ = writeln!(
            out,
            "{:<12} {:>12.2}  {}",
            signal.datetime.format("%Y-%m-%d"),
            signal.price,
            signal.side
        );
    }
    out.trim_end().to_string()
}

pub fn print_report(report: &SignalReport) {
    println!("\n{}", format_summary(report));
    println!("{}", format_signal_table(&report.signals));
    println!("{}", "=".repeat(60));
}

/// Write `date,price,action` rows
pub fn write_signals_csv(signals: &[Signal], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).context("Failed to create signals file")?;
    writer.write_record(["date", "price", "action"])?;

    for signal in signals {
        writer.write_record([
            signal.datetime.format("%Y-%m-%d").to_string(),
            signal.price.to_string(),
            signal.side.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Export a report as CSV and pretty JSON under `results_dir`
pub fn export(report: &SignalReport, results_dir: impl AsRef<Path>) -> Result<(PathBuf, PathBuf)> {
    let results_dir = results_dir.as_ref();
    fs::create_dir_all(results_dir).context("Failed to create results directory")?;

    let csv_path = results_dir.join(format!("{}.csv", report.file_stem()));
    write_signals_csv(&report.signals, &csv_path)?;

    let json_path = results_dir.join(format!("{}.json", report.file_stem()));
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(&json_path, json).context("Failed to write report JSON")?;

    info!(
        "Exported {} signals for {} to {}",
        report.signals.len(),
        report.symbol,
        results_dir.display()
    );

    Ok((csv_path, json_path))
}
