//! Yahoo Finance backed price source and CSV downloader

use anyhow::Result;
use async_trait::async_trait;
use chrono::DateTime;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{clean_series, save_csv, series_filename, PriceSource};
use crate::error::DataError;
use crate::yahoo::YahooClient;
use crate::{Period, PricePoint, PriceSeries, Symbol};

/// Daily bars; the grid works on closing prices only
const DAILY_INTERVAL: &str = "1d";

/// Fetches daily closes from Yahoo Finance and optionally persists them
#[derive(Debug, Clone)]
pub struct YahooDataFetcher {
    client: YahooClient,
    pub data_dir: PathBuf,
}

impl YahooDataFetcher {
    pub fn new(data_dir: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::with_client(YahooClient::new()?, data_dir))
    }

    pub fn with_client(client: YahooClient, data_dir: impl AsRef<Path>) -> Self {
        YahooDataFetcher {
            client,
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Fetch and clean the closing-price series for one symbol
    pub async fn fetch_series(&self, symbol: &Symbol, period: Period) -> Result<PriceSeries> {
        info!("Fetching {} {} closes from Yahoo Finance", symbol, period);

        let chart = self
            .client
            .get_chart(symbol.as_str(), period.as_str(), DAILY_INTERVAL)
            .await?;

        let mut points = Vec::new();
        let mut invalid_count = 0;

        for (ts, close) in chart.closes() {
            let Some(datetime) = DateTime::from_timestamp(ts, 0) else {
                invalid_count += 1;
                continue;
            };
            match PricePoint::new(datetime, close) {
                Ok(point) => points.push(point),
                Err(e) => {
                    invalid_count += 1;
                    warn!("Skipping invalid close for {}: {}", symbol, e);
                }
            }
        }

        if invalid_count > 0 {
            warn!(
                "Skipped {} invalid closes out of {} for {}",
                invalid_count,
                invalid_count + points.len(),
                symbol
            );
        }

        let series = clean_series(points);
        if series.is_empty() {
            return Err(DataError::no_data(symbol.as_str()).into());
        }

        info!("Fetched {} closes for {} {}", series.len(), symbol, period);
        Ok(series)
    }

    /// Download a series and save it as `{symbol}_{period}.csv` under `data_dir`.
    /// Returns the file path and the number of closes written.
    pub async fn download(&self, symbol: &Symbol, period: Period) -> Result<(PathBuf, usize)> {
        let series = self.fetch_series(symbol, period).await?;
        let filepath = self.data_dir.join(series_filename(symbol, period));
        save_csv(&series, &filepath)?;
        Ok((filepath, series.len()))
    }
}

#[async_trait]
impl PriceSource for YahooDataFetcher {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &Symbol, period: Period) -> Result<PriceSeries> {
        self.fetch_series(symbol, period).await
    }
}
