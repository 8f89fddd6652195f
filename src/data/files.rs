//! CSV persistence for closing-price series

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{clean_series, PriceSource};
use crate::error::DataError;
use crate::{Period, PricePoint, PriceSeries, Symbol};

/// File name used for a cached download, e.g. `2330.TW_6mo.csv`
pub fn series_filename(symbol: &Symbol, period: Period) -> String {
    format!("{}_{}.csv", symbol.as_str(), period)
}

/// Inverse of [`series_filename`]: `AAPL_1y.csv` gives `(AAPL, 1y)`
pub fn parse_series_filename(path: impl AsRef<Path>) -> Option<(Symbol, Period)> {
    let stem = path.as_ref().file_stem()?.to_str()?;
    let (symbol, period) = stem.rsplit_once('_')?;
    if symbol.is_empty() {
        return None;
    }
    Some((Symbol::new(symbol), period.parse().ok()?))
}

/// Parse a date string (RFC 3339, YYYY-MM-DD HH:MM:SS or YYYY-MM-DD) to DateTime<Utc>
pub fn parse_datetime(date_str: &str) -> Result<DateTime<Utc>> {
    let date_str = date_str.trim();

    if let Ok(dt) = date_str.parse::<DateTime<Utc>>() {
        return Ok(dt);
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(date_str, "%Y-%m-%d %H:%M:%S") {
        return Ok(ndt.and_utc());
    }

    if let Some(ndt) = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .ok()
        .and_then(|nd| nd.and_hms_opt(0, 0, 0))
    {
        return Ok(ndt.and_utc());
    }

    anyhow::bail!(
        "Failed to parse date: {}. Use YYYY-MM-DD or YYYY-MM-DD HH:MM:SS format",
        date_str
    )
}

/// Load a closing-price series from CSV.
///
/// Uses the `datetime`/`date` column (else the first) and the `close` column
/// (else the second), so both `datetime,close` files and full OHLCV exports
/// load. Rows with invalid prices are skipped with a warning.
pub fn load_csv(path: impl AsRef<Path>) -> Result<PriceSeries> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).context("Failed to open CSV file")?;

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let find = |names: &[&str]| {
        headers
            .iter()
            .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
    };
    let dt_idx = find(&["datetime", "date"]).unwrap_or(0);
    let close_idx = find(&["close"]).unwrap_or(1);

    let mut points = Vec::new();
    let mut invalid_count = 0;

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.context(format!("Failed to read row {}", row_idx + 1))?;

        let dt_str = record.get(dt_idx).context("Missing datetime column")?;
        let datetime = parse_datetime(dt_str)?;

        let close: f64 = record
            .get(close_idx)
            .context("Missing close column")?
            .trim()
            .parse()
            .context(format!("Failed to parse close at row {}", row_idx + 1))?;

        match PricePoint::new(datetime, close) {
            Ok(point) => points.push(point),
            Err(e) => {
                invalid_count += 1;
                warn!(
                    "Skipping invalid price at row {} in {:?}: {}",
                    row_idx + 2, // +2 for 1-indexed and header row
                    path.file_name().unwrap_or_default(),
                    e
                );
            }
        }
    }

    if invalid_count > 0 {
        warn!(
            "Skipped {} invalid rows out of {} in {:?}",
            invalid_count,
            invalid_count + points.len(),
            path.file_name().unwrap_or_default()
        );
    }

    Ok(clean_series(points))
}

/// Write a series as `datetime,close`
pub fn save_csv(series: &PriceSeries, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    let mut writer = csv::Writer::from_path(path).context("Failed to create output file")?;
    writer.write_record(["datetime", "close"])?;

    for point in series.points() {
        writer.write_record([
            point.datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
            point.price.to_string(),
        ])?;
    }
    writer.flush()?;

    info!("Saved {} rows to {}", series.len(), path.display());
    Ok(())
}

/// Reads previously downloaded `{symbol}_{period}.csv` files from a directory
#[derive(Debug, Clone)]
pub struct CsvSource {
    data_dir: PathBuf,
}

impl CsvSource {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        CsvSource {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, symbol: &Symbol, period: Period) -> PathBuf {
        self.data_dir.join(series_filename(symbol, period))
    }
}

#[async_trait]
impl PriceSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn fetch(&self, symbol: &Symbol, period: Period) -> Result<PriceSeries> {
        let path = self.path_for(symbol, period);

        if !path.exists() {
            warn!("Data file not found: {}", path.display());
            return Err(DataError::no_data(symbol.as_str()).into());
        }

        let series =
            load_csv(&path).with_context(|| format!("Failed to load data for {}", symbol))?;
        if series.is_empty() {
            return Err(DataError::no_data(symbol.as_str()).into());
        }

        info!("Loaded {} closes for {} {}", series.len(), symbol, period);
        Ok(series)
    }
}
