//! Yahoo Finance chart API client
//!
//! - Automatic retry with exponential backoff on 429/5xx and network errors
//! - Symbols without data map to [`DataError::NoData`] and are never retried
//!
//! # Example
//! ```no_run
//! use grid_signals::yahoo::YahooClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = YahooClient::new()?;
//!     let chart = client.get_chart("2330.TW", "6mo", "1d").await?;
//!     println!("Fetched {} closes", chart.closes().len());
//!     Ok(())
//! }
//! ```

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::types::{ChartResponse, ChartResult};
use crate::error::DataError;

/// Base URL for the Yahoo Finance API
pub const YAHOO_API_BASE: &str = "https://query1.finance.yahoo.com";

/// The chart endpoint rejects requests without a browser-like agent
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) grid-signals";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Request timeout duration
    pub timeout: Duration,
    /// First backoff delay, doubled on each retry
    pub retry_base_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            timeout: Duration::from_secs(30),
            retry_base_delay: Duration::from_secs(1),
        }
    }
}

impl ClientConfig {
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }
}

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: Client,
    base_url: String,
    config: ClientConfig,
}

impl YahooClient {
    /// Create a new client against the public endpoint
    pub fn new() -> Result<Self> {
        Self::with_config(YAHOO_API_BASE, ClientConfig::default())
    }

    /// Create a client against a custom base URL (mirrors, test servers)
    pub fn with_config(base_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(YahooClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a chart for `symbol`
    ///
    /// # Arguments
    /// * `symbol` - Yahoo ticker (e.g., "2330.TW", "AAPL")
    /// * `range` - Lookback (e.g., "1mo", "6mo", "1y")
    /// * `interval` - Bar size (e.g., "1d")
    pub async fn get_chart(&self, symbol: &str, range: &str, interval: &str) -> Result<ChartResult> {
        let mut attempt = 0;

        loop {
            match self.request_chart(symbol, range, interval).await {
                Ok(chart) => return Ok(chart),
                Err(e) if attempt < self.config.max_retries && is_retryable(&e) => {
                    let delay = self.config.retry_base_delay * 2u32.pow(attempt);
                    attempt += 1;
                    warn!(
                        "Request for {} failed (attempt {}/{}): {}",
                        symbol,
                        attempt,
                        self.config.max_retries + 1,
                        e
                    );
                    debug!("Retrying after {}ms", delay.as_millis());
                    sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn request_chart(&self, symbol: &str, range: &str, interval: &str) -> Result<ChartResult> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let params = [("range", range), ("interval", interval)];

        debug!(
            "Fetching chart: symbol={}, range={}, interval={}",
            symbol, range, interval
        );

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .context("Failed to send request to Yahoo Finance")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read Yahoo Finance response")?;
        let parsed = serde_json::from_str::<ChartResponse>(&body);

        if status == StatusCode::NOT_FOUND {
            return Err(DataError::no_data(symbol).into());
        }

        if !status.is_success() {
            let message = match parsed.ok().and_then(|r| r.chart.error) {
                Some(err) => format!("{}: {}", err.code, err.description),
                None => body,
            };
            return Err(DataError::Api {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let parsed = parsed.map_err(|e| DataError::Parse(e.to_string()))?;
        parsed
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| DataError::no_data(symbol).into())
    }
}

/// Transport failures and throttling/server errors are worth another try
fn is_retryable(err: &anyhow::Error) -> bool {
    match err.downcast_ref::<DataError>() {
        Some(data_err) => data_err.is_transient(),
        None => true,
    }
}
