//! Core data types used across the signal engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for raw price observations
#[derive(Debug, Error, PartialEq)]
pub enum PriceValidationError {
    #[error("price must be finite, got {0}")]
    NonFinitePrice(f64),

    #[error("price ({0}) must be >= 0")]
    NegativePrice(f64),
}

/// A single closing price observation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub datetime: DateTime<Utc>,
    pub price: f64,
}

impl PricePoint {
    /// Create a new price point with validation
    pub fn new(datetime: DateTime<Utc>, price: f64) -> Result<Self, PriceValidationError> {
        let point = Self { datetime, price };
        point.validate()?;
        Ok(point)
    }

    /// Validate the price value
    pub fn validate(&self) -> Result<(), PriceValidationError> {
        if !self.price.is_finite() {
            return Err(PriceValidationError::NonFinitePrice(self.price));
        }
        if self.price < 0.0 {
            return Err(PriceValidationError::NegativePrice(self.price));
        }
        Ok(())
    }
}

/// Chronologically ordered closing prices for one symbol.
///
/// The engine only ever borrows a series. Ordering and deduplication are the
/// data layer's job (see [`crate::data::clean_series`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceSeries(Vec<PricePoint>);

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        PriceSeries(points)
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.0
    }

    pub fn into_points(self) -> Vec<PricePoint> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.0.last()
    }

    /// Lowest price in the series, `None` when empty
    pub fn low(&self) -> Option<f64> {
        self.0.iter().map(|p| p.price).reduce(f64::min)
    }

    /// Highest price in the series, `None` when empty
    pub fn high(&self) -> Option<f64> {
        self.0.iter().map(|p| p.price).reduce(f64::max)
    }
}

impl From<Vec<PricePoint>> for PriceSeries {
    fn from(points: Vec<PricePoint>) -> Self {
        PriceSeries(points)
    }
}

impl FromIterator<PricePoint> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PricePoint>>(iter: I) -> Self {
        PriceSeries(iter.into_iter().collect())
    }
}

/// Ticker symbol (e.g. "2330.TW", "AAPL")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(s: impl Into<String>) -> Self {
        Symbol(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lookback window for historical prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
}

impl Period {
    pub const ALL: [Period; 4] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
    ];

    /// Range string understood by the market data API
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
        }
    }
}

impl std::str::FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            _ => Err(format!(
                "Unknown period: {}. Use one of 1mo, 3mo, 6mo, 1y",
                s
            )),
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Trade direction implied by a grid crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A detected grid crossing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub datetime: DateTime<Utc>,
    /// Price of the observation that completed the crossing, not the level itself
    pub price: f64,
    pub side: Side,
}
