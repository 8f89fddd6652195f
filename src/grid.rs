//! Grid construction and crossing detection
//!
//! The observed price range is split into `grid_count + 1` equal bands and the
//! interior boundaries become grid levels. Each consecutive pair of closes is
//! then checked against every level:
//! 1. Price falls through a level (or lands on it from above) → BUY
//! 2. Price rises through a level (or lands on it from below) → SELL
//!
//! A step that jumps several levels emits one signal per level crossed.
//! Everything here is a pure function of its inputs.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{PriceSeries, Side, Signal};

/// Ascending, evenly spaced price levels strictly inside the series range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GridSet(Vec<f64>);

impl GridSet {
    pub fn levels(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Distance between adjacent levels, `None` with fewer than two levels
    pub fn spacing(&self) -> Option<f64> {
        match self.0.as_slice() {
            [first, second, ..] => Some(second - first),
            _ => None,
        }
    }
}

impl From<Vec<f64>> for GridSet {
    fn from(levels: Vec<f64>) -> Self {
        GridSet(levels)
    }
}

/// Build `grid_count` interior levels between the series' low and high.
///
/// Returns an empty grid when the series is empty or flat (`low == high`).
pub fn build_grid(series: &PriceSeries, grid_count: usize) -> GridSet {
    let (low, high) = match (series.low(), series.high()) {
        (Some(low), Some(high)) => (low, high),
        _ => return GridSet::default(),
    };

    if low == high {
        return GridSet::default();
    }

    let spacing = (high - low) / (grid_count + 1) as f64;
    let levels = (1..=grid_count)
        .map(|k| low + k as f64 * spacing)
        .collect();

    GridSet(levels)
}

/// Scan consecutive closes for grid crossings.
///
/// Returns `(buys, sells)`, each in chronological order. Signals from the same
/// step follow the grid's ascending level order.
pub fn scan_crossings(series: &PriceSeries, grid: &GridSet) -> (Vec<Signal>, Vec<Signal>) {
    let mut buys = Vec::new();
    let mut sells = Vec::new();

    if grid.is_empty() {
        return (buys, sells);
    }

    for (prev, curr) in series.points().iter().tuple_windows() {
        for &level in grid.levels() {
            // Boundary belongs to the side price arrived on
            if prev.price > level && curr.price <= level {
                buys.push(Signal {
                    datetime: curr.datetime,
                    price: curr.price,
                    side: Side::Buy,
                });
            }
            if prev.price < level && curr.price >= level {
                sells.push(Signal {
                    datetime: curr.datetime,
                    price: curr.price,
                    side: Side::Sell,
                });
            }
        }
    }

    (buys, sells)
}

/// Grid plus detected signals for one series, with the summary figures
/// shown alongside a backtest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridAnalysis {
    pub low: f64,
    pub high: f64,
    pub grid: GridSet,
    pub buys: Vec<Signal>,
    pub sells: Vec<Signal>,
}

impl GridAnalysis {
    pub fn run(series: &PriceSeries, grid_count: usize) -> Self {
        let grid = build_grid(series, grid_count);
        let (buys, sells) = scan_crossings(series, &grid);

        GridAnalysis {
            low: series.low().unwrap_or_default(),
            high: series.high().unwrap_or_default(),
            grid,
            buys,
            sells,
        }
    }

    pub fn buy_count(&self) -> usize {
        self.buys.len()
    }

    pub fn sell_count(&self) -> usize {
        self.sells.len()
    }

    pub fn spacing(&self) -> Option<f64> {
        self.grid.spacing()
    }

    /// Buys and sells merged into one list, stably sorted by datetime.
    /// Same-timestamp buys come before sells.
    pub fn signals(&self) -> Vec<Signal> {
        let mut merged: Vec<Signal> = self.buys.iter().chain(&self.sells).copied().collect();
        merged.sort_by_key(|s| s.datetime);
        merged
    }
}
