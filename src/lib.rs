//! Grid Trading Signals
//!
//! Partitions the observed closing-price range of a series into evenly spaced
//! grid levels and flags every downward crossing as a buy and every upward
//! crossing as a sell.
//!
//! The engine ([`grid`]) is pure: it reads a [`PriceSeries`] and returns a
//! [`grid::GridSet`] plus buy and sell [`Signal`] lists. Fetching, caching and
//! reporting live in [`data`], [`yahoo`] and [`report`].
//!
//! ## Example
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use grid_signals::grid::{build_grid, scan_crossings};
//! use grid_signals::{PricePoint, PriceSeries};
//!
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! let series: PriceSeries = [10.0, 12.0, 8.0, 8.0, 15.0]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, &price)| PricePoint { datetime: start + Duration::days(i as i64), price })
//!     .collect();
//!
//! let grid = build_grid(&series, 3);
//! assert_eq!(grid.levels(), &[9.75, 11.5, 13.25]);
//!
//! let (buys, sells) = scan_crossings(&series, &grid);
//! assert_eq!((buys.len(), sells.len()), (2, 4));
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod grid;
pub mod report;
pub mod types;
pub mod yahoo;

pub use config::Config;
pub use error::DataError;
pub use grid::{build_grid, scan_crossings, GridAnalysis, GridSet};
pub use types::*;

// Re-export the market data client for convenience
pub use yahoo::YahooClient;
