//! Integration tests for the grid-signals system
//!
//! These tests verify that the data layer, the grid engine and the reports
//! work together correctly.

use chrono::{Duration, TimeZone, Utc};
use std::time::Duration as StdDuration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use grid_signals::data::{PriceSource, SeriesCache, YahooDataFetcher};
use grid_signals::error::is_no_data;
use grid_signals::grid::{build_grid, scan_crossings, GridAnalysis};
use grid_signals::report::SignalReport;
use grid_signals::yahoo::{ClientConfig, YahooClient};
use grid_signals::{GridSet, Period, PricePoint, PriceSeries, Side, Symbol};

// =============================================================================
// Test Utilities
// =============================================================================

/// Oscillating closes around `base_price` so the grid sees both directions
fn generate_oscillating_series(count: usize, base_price: f64, amplitude: f64) -> PriceSeries {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    (0..count)
        .map(|i| {
            let phase = i as f64 * 0.7;
            PricePoint {
                datetime: start + Duration::days(i as i64),
                price: base_price + amplitude * phase.sin(),
            }
        })
        .collect()
}

fn chart_body(symbol: &str, timestamps: &[i64], closes: &[Option<f64>]) -> serde_json::Value {
    serde_json::json!({
        "chart": {
            "result": [{
                "meta": {"symbol": symbol, "currency": "TWD"},
                "timestamp": timestamps,
                "indicators": {"quote": [{"close": closes}]}
            }],
            "error": null
        }
    })
}

fn test_fetcher(server: &MockServer) -> YahooDataFetcher {
    let config = ClientConfig::default()
        .with_max_retries(2)
        .with_retry_base_delay(StdDuration::from_millis(1));
    let client = YahooClient::with_config(server.uri(), config).unwrap();
    YahooDataFetcher::with_client(client, std::env::temp_dir())
}

// =============================================================================
// Grid Engine
// =============================================================================

#[test]
fn test_every_signal_price_comes_from_series() {
    let series = generate_oscillating_series(120, 100.0, 8.0);
    let analysis = GridAnalysis::run(&series, 10);

    assert_eq!(analysis.grid.len(), 10);
    assert!(analysis.buy_count() > 0);
    assert!(analysis.sell_count() > 0);

    for signal in analysis.signals() {
        let point = series
            .points()
            .iter()
            .find(|p| p.datetime == signal.datetime)
            .expect("signal timestamp must exist in series");
        assert_eq!(point.price, signal.price);
    }
}

#[test]
fn test_signal_totals_match_per_level_scan() {
    let series = generate_oscillating_series(200, 50.0, 5.0);
    let grid = build_grid(&series, 6);
    let (buys, sells) = scan_crossings(&series, &grid);

    // Scanning each level on its own must account for every signal
    let mut buy_total = 0;
    let mut sell_total = 0;
    for &level in grid.levels() {
        let single = GridSet::from(vec![level]);
        let (b, s) = scan_crossings(&series, &single);
        assert!(b.iter().all(|sig| sig.side == Side::Buy));
        assert!(s.iter().all(|sig| sig.side == Side::Sell));
        buy_total += b.len();
        sell_total += s.len();
    }

    assert_eq!(buy_total, buys.len());
    assert_eq!(sell_total, sells.len());
}

#[test]
fn test_degenerate_series_end_to_end() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let series: PriceSeries = (0..10)
        .map(|i| PricePoint {
            datetime: start + Duration::days(i),
            price: 42.0,
        })
        .collect();

    let analysis = GridAnalysis::run(&series, 10);
    let report = SignalReport::new(Symbol::new("FLAT"), Period::OneMonth, 10, 10, &analysis);

    assert!(report.levels.is_empty());
    assert_eq!(report.spacing, None);
    assert!(report.signals.is_empty());
}

// =============================================================================
// Data Layer
// =============================================================================

#[tokio::test]
async fn test_yahoo_fetch_to_signals() {
    let server = MockServer::start().await;
    let day = 86_400;
    let base = 1_704_153_600;
    let timestamps: Vec<i64> = (0..6).map(|i| base + i * day).collect();
    // The null close must be dropped
    let closes = [
        Some(10.0),
        Some(12.0),
        None,
        Some(8.0),
        Some(8.0),
        Some(15.0),
    ];

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/2330.TW"))
        .and(query_param("range", "6mo"))
        .and(query_param("interval", "1d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(
            "2330.TW",
            &timestamps,
            &closes,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let cache = SeriesCache::with_default_ttl(test_fetcher(&server));
    let symbol = Symbol::new("2330.TW");

    let series = cache.fetch(&symbol, Period::SixMonths).await.unwrap();
    // Second call is served from the cache; the mock expects one request
    let again = cache.fetch(&symbol, Period::SixMonths).await.unwrap();
    assert_eq!(series, again);

    let prices: Vec<f64> = series.points().iter().map(|p| p.price).collect();
    assert_eq!(prices, vec![10.0, 12.0, 8.0, 8.0, 15.0]);

    let analysis = GridAnalysis::run(&series, 3);
    assert_eq!(analysis.grid.levels(), &[9.75, 11.5, 13.25]);
    assert_eq!(analysis.buy_count(), 2);
    assert_eq!(analysis.sell_count(), 4);
}

#[tokio::test]
async fn test_unknown_symbol_is_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE.TW"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = test_fetcher(&server);
    let err = fetcher
        .fetch(&Symbol::new("NOPE.TW"), Period::OneMonth)
        .await
        .unwrap_err();

    assert!(is_no_data(&err));
}

#[tokio::test]
async fn test_all_null_closes_is_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/EMPTY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(
            "EMPTY",
            &[1_704_153_600, 1_704_240_000],
            &[None, None],
        )))
        .mount(&server)
        .await;

    let err = test_fetcher(&server)
        .fetch_series(&Symbol::new("EMPTY"), Period::OneMonth)
        .await
        .unwrap_err();

    assert!(is_no_data(&err));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = test_fetcher(&server)
        .fetch_series(&Symbol::new("AAPL"), Period::OneMonth)
        .await
        .unwrap_err();

    assert!(!is_no_data(&err));
    assert!(format!("{:#}", err).contains("503"));
}

#[tokio::test]
async fn test_download_writes_loadable_csv() {
    let server = MockServer::start().await;
    let dir = std::env::temp_dir().join(format!("grid_signals_download_{}", std::process::id()));

    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(
            "AAPL",
            &[1_704_153_600, 1_704_240_000, 1_704_326_400],
            &[Some(185.6), Some(184.25), Some(181.9)],
        )))
        .mount(&server)
        .await;

    let client = YahooClient::with_config(server.uri(), ClientConfig::default()).unwrap();
    let fetcher = YahooDataFetcher::with_client(client, &dir);
    let (path, closes) = fetcher
        .download(&Symbol::new("AAPL"), Period::OneMonth)
        .await
        .unwrap();

    assert!(path.ends_with("AAPL_1mo.csv"));
    assert_eq!(closes, 3);
    let series = grid_signals::data::load_csv(&path).unwrap();
    assert_eq!(series.len(), 3);
    assert_eq!(series.last().unwrap().price, 181.9);

    std::fs::remove_dir_all(dir).ok();
}
