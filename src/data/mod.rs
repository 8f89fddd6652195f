//! Data loading and management
//!
//! Everything the signal engine assumes about its input is established here:
//! series arrive chronological, deduplicated by timestamp and free of NaN or
//! negative prices. Sources are pluggable through [`PriceSource`]; the
//! [`SeriesCache`] wraps any source with a TTL keyed by (symbol, period).

mod cache;
mod fetcher;
mod files;

pub use cache::{SeriesCache, DEFAULT_TTL_SECS};
pub use fetcher::YahooDataFetcher;
pub use files::{
    load_csv, parse_datetime, parse_series_filename, save_csv, series_filename, CsvSource,
};

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

use crate::{Period, PricePoint, PriceSeries, Symbol};

/// Data source enum for selecting where series come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Yahoo,
    Csv,
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "yahoo" => Ok(DataSource::Yahoo),
            "csv" => Ok(DataSource::Csv),
            _ => Err(format!("Unknown data source: {}. Use 'yahoo' or 'csv'", s)),
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Yahoo => write!(f, "yahoo"),
            DataSource::Csv => write!(f, "csv"),
        }
    }
}

/// Anything that can resolve a clean closing-price series.
///
/// Implementations return [`crate::error::DataError::NoData`] rather than an
/// empty series.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &str;

    async fn fetch(&self, symbol: &Symbol, period: Period) -> Result<PriceSeries>;
}

/// Drop invalid prices, sort by datetime and keep the last observation per
/// timestamp.
pub fn clean_series(points: Vec<PricePoint>) -> PriceSeries {
    let total = points.len();

    let mut valid: Vec<PricePoint> = points
        .into_iter()
        .filter(|p| match p.validate() {
            Ok(()) => true,
            Err(e) => {
                warn!("Dropping price at {}: {}", p.datetime, e);
                false
            }
        })
        .collect();
    let invalid_count = total - valid.len();

    valid.sort_by_key(|p| p.datetime);

    let mut cleaned: Vec<PricePoint> = Vec::with_capacity(valid.len());
    for point in valid {
        match cleaned.last_mut() {
            Some(last) if last.datetime == point.datetime => *last = point,
            _ => cleaned.push(point),
        }
    }
    let duplicate_count = total - invalid_count - cleaned.len();

    if invalid_count > 0 || duplicate_count > 0 {
        warn!(
            "Cleaned series: {} invalid and {} duplicate rows dropped out of {}",
            invalid_count, duplicate_count, total
        );
    }

    PriceSeries::new(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn point(day: u32, price: f64) -> PricePoint {
        PricePoint {
            datetime: Utc.with_ymd_and_hms(2024, 3, day, 0, 0, 0).unwrap(),
            price,
        }
    }

    #[test]
    fn test_clean_series_sorts_and_dedups() {
        let cleaned = clean_series(vec![
            point(3, 30.0),
            point(1, 10.0),
            point(2, 20.0),
            point(2, 21.0),
        ]);

        let prices: Vec<f64> = cleaned.points().iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![10.0, 21.0, 30.0]);
    }

    #[test]
    fn test_clean_series_drops_invalid() {
        let cleaned = clean_series(vec![
            point(1, 10.0),
            point(2, f64::NAN),
            point(3, -5.0),
            point(4, f64::INFINITY),
            point(5, 12.0),
        ]);

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.high(), Some(12.0));
    }

    #[test]
    fn test_clean_series_empty() {
        assert!(clean_series(Vec::new()).is_empty());
    }

    #[test]
    fn test_data_source_parse() {
        assert_eq!("Yahoo".parse::<DataSource>(), Ok(DataSource::Yahoo));
        assert_eq!("csv".parse::<DataSource>(), Ok(DataSource::Csv));
        assert!("binance".parse::<DataSource>().is_err());
        assert_eq!(DataSource::Csv.to_string(), "csv");
    }
}
