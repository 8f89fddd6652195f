//! Yahoo Finance chart API types

use serde::Deserialize;

/// Top-level body of `/v8/finance/chart/{symbol}`
#[derive(Debug, Clone, Deserialize)]
pub struct ChartResponse {
    pub chart: Chart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// API-level error object (returned alongside a non-2xx status)
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    /// Bar open times in unix seconds; missing entirely when no bars exist
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    pub symbol: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exchange_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

/// OHLCV columns; only closes are consumed
#[derive(Debug, Clone, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub close: Vec<Option<f64>>,
}

impl ChartResult {
    /// Pair timestamps with closes, skipping bars whose close is null
    pub fn closes(&self) -> Vec<(i64, f64)> {
        let closes = match self.indicators.quote.first() {
            Some(q) => &q.close,
            None => return Vec::new(),
        };

        self.timestamp
            .iter()
            .zip(closes)
            .filter_map(|(&ts, close)| close.map(|c| (ts, c)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chart_with_nulls() {
        let body = r#"{
            "chart": {
                "result": [{
                    "meta": {"symbol": "2330.TW", "currency": "TWD", "exchangeName": "TAI"},
                    "timestamp": [1704153600, 1704240000, 1704326400],
                    "indicators": {"quote": [{"close": [593.0, null, 586.0], "open": [590.0, 592.0, 584.0]}]}
                }],
                "error": null
            }
        }"#;

        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        let result = &parsed.chart.result.unwrap()[0];
        assert_eq!(result.meta.symbol, "2330.TW");
        assert_eq!(result.meta.currency.as_deref(), Some("TWD"));
        assert_eq!(
            result.closes(),
            vec![(1704153600, 593.0), (1704326400, 586.0)]
        );
    }

    #[test]
    fn test_parse_chart_error() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;

        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.chart.result.is_none());
        assert_eq!(parsed.chart.error.unwrap().code, "Not Found");
    }

    #[test]
    fn test_closes_without_bars() {
        let body = r#"{"chart": {"result": [{"meta": {"symbol": "X"}, "indicators": {"quote": [{}]}}]}}"#;

        let parsed: ChartResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.chart.result.unwrap()[0].closes().is_empty());
    }
}
