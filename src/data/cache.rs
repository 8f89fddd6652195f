//! Time-to-live cache in front of a [`PriceSource`]

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

use super::PriceSource;
use crate::{Period, PriceSeries, Symbol};

/// Default lifetime of a cached series (one hour)
pub const DEFAULT_TTL_SECS: i64 = 3600;

#[derive(Debug, Clone)]
struct CachedSeries {
    series: PriceSeries,
    fetched_at: DateTime<Utc>,
}

type CacheKey = (Symbol, Period);

/// Caches series per (symbol, period) and refetches once an entry is older
/// than the TTL. Failed fetches are never cached.
pub struct SeriesCache<S> {
    source: S,
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CachedSeries>>,
}

impl<S: PriceSource> SeriesCache<S> {
    /// Fails when `ttl_seconds` does not fit a [`Duration`]
    pub fn new(source: S, ttl_seconds: i64) -> Result<Self> {
        let ttl = Duration::try_seconds(ttl_seconds)
            .with_context(|| format!("Cache TTL of {}s is out of range", ttl_seconds))?;
        Ok(Self::with_ttl(source, ttl))
    }

    pub fn with_ttl(source: S, ttl: Duration) -> Self {
        SeriesCache {
            source,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl(source: S) -> Self {
        Self::with_ttl(source, Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fresh cached series, `None` if missing or expired
    pub fn get(&self, symbol: &Symbol, period: Period) -> Option<PriceSeries> {
        let key = (symbol.clone(), period);
        let entries = self.entries();
        let fresh = entries
            .get(&key)
            .filter(|cached| Utc::now() - cached.fetched_at < self.ttl)
            .map(|cached| cached.series.clone());
        fresh
    }

    pub fn needs_refresh(&self, symbol: &Symbol, period: Period) -> bool {
        self.get(symbol, period).is_none()
    }

    pub fn insert(&self, symbol: Symbol, period: Period, series: PriceSeries) {
        self.entries().insert(
            (symbol, period),
            CachedSeries {
                series,
                fetched_at: Utc::now(),
            },
        );
    }

    pub fn invalidate(&self, symbol: &Symbol, period: Period) {
        self.entries().remove(&(symbol.clone(), period));
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, CachedSeries>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl<S: PriceSource> PriceSource for SeriesCache<S> {
    fn name(&self) -> &str {
        self.source.name()
    }

    async fn fetch(&self, symbol: &Symbol, period: Period) -> Result<PriceSeries> {
        if let Some(series) = self.get(symbol, period) {
            debug!("Cache hit for {} {}", symbol, period);
            return Ok(series);
        }

        debug!(
            "Cache miss for {} {}, fetching from {}",
            symbol,
            period,
            self.source.name()
        );
        let series = self.source.fetch(symbol, period).await?;
        self.insert(symbol.clone(), period, series.clone());
        Ok(series)
    }
}
