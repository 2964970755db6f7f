//! Yahoo Finance integration: daily close history and quote summaries.
//!
//! Two endpoints are used:
//!
//! - `v8/finance/chart/{symbol}` for the close series over a resolved range
//! - `v10/finance/quoteSummary/{symbol}` for company profile, trading
//!   metrics, and analyst upgrade/downgrade history
//!
//! Both return an envelope with a `result` array and an `error` object; a
//! missing result is a provider error, while missing fields inside a result
//! degrade to `None` so one sparse module doesn't sink the whole render.

use chrono::{DateTime, NaiveDate};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::{CompanyInfo, GradeRecord, KeyMetrics, PricePoint, PriceSeries};
use crate::error::AppError;
use crate::timeframe::DateRange;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SUMMARY_URL: &str = "https://query1.finance.yahoo.com/v10/finance/quoteSummary";
const SUMMARY_MODULES: &str = "assetProfile,price,summaryDetail,upgradeDowngradeHistory";

// Yahoo rejects reqwest's default agent string.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) quotedeck/0.1";

/// Company facts, metrics, and the full analyst action history for a symbol.
#[derive(Debug, Clone)]
pub struct TickerSummary {
    pub info: CompanyInfo,
    pub metrics: KeyMetrics,
    pub grades: Vec<GradeRecord>,
}

pub struct YahooClient {
    client: Client,
}

impl YahooClient {
    pub fn new() -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Fetch the daily close series for `symbol` over `range`.
    ///
    /// An empty series is not an error: a `1D` request against a closed
    /// market legitimately has no rows, and the renderers explain that.
    pub fn fetch_history(&self, symbol: &str, range: &DateRange) -> Result<PriceSeries, AppError> {
        let url = format!("{CHART_URL}/{symbol}");
        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", range.start_epoch().to_string()),
                ("period2", range.end_epoch().to_string()),
                ("interval", "1d".to_string()),
            ])
            .send()
            .map_err(|e| AppError::new(4, format!("Chart request for {symbol} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Chart request for {symbol} failed with status {}.", resp.status()),
            ));
        }

        let body: ChartResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse chart response: {e}")))?;

        let result = body
            .chart
            .into_result()
            .map_err(|reason| AppError::new(4, format!("Chart data for {symbol}: {reason}")))?;

        Ok(decode_series(&result))
    }

    /// Fetch company facts, key metrics, and analyst actions for `symbol`.
    pub fn fetch_summary(&self, symbol: &str) -> Result<TickerSummary, AppError> {
        let url = format!("{SUMMARY_URL}/{symbol}");
        let resp = self
            .client
            .get(&url)
            .query(&[("modules", SUMMARY_MODULES)])
            .send()
            .map_err(|e| AppError::new(4, format!("Summary request for {symbol} failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!(
                    "Summary request for {symbol} failed with status {}.",
                    resp.status()
                ),
            ));
        }

        let body: SummaryResponse = resp
            .json()
            .map_err(|e| AppError::new(4, format!("Failed to parse summary response: {e}")))?;

        let result = body
            .quote_summary
            .into_result()
            .map_err(|reason| AppError::new(4, format!("Summary data for {symbol}: {reason}")))?;

        Ok(decode_summary(result))
    }
}

fn decode_series(result: &ChartResult) -> PriceSeries {
    let timestamps = result.timestamp.as_deref().unwrap_or(&[]);
    let closes = result
        .indicators
        .quote
        .first()
        .and_then(|q| q.close.as_deref())
        .unwrap_or(&[]);

    let mut points = Vec::with_capacity(timestamps.len());
    for (ts, close) in timestamps.iter().zip(closes.iter()) {
        let Some(close) = close.filter(|v| v.is_finite()) else {
            continue;
        };
        let Some(date) = parse_epoch_date(*ts) else {
            continue;
        };
        points.push(PricePoint { date, close });
    }
    points.sort_by_key(|p| p.date);

    PriceSeries { points }
}

fn decode_summary(result: SummaryResult) -> TickerSummary {
    let profile = result.asset_profile.unwrap_or_default();
    let price = result.price.unwrap_or_default();
    let detail = result.summary_detail.unwrap_or_default();

    let info = CompanyInfo {
        long_name: price.long_name,
        short_name: price.short_name,
        symbol: price.symbol,
        exchange: price.exchange_name,
        sector: profile.sector,
        industry: profile.industry,
    };

    let metrics = KeyMetrics {
        open: price.regular_market_open.and_then(RawNum::value),
        previous_close: price.regular_market_previous_close.and_then(RawNum::value),
        day_high: price.regular_market_day_high.and_then(RawNum::value),
        day_low: price.regular_market_day_low.and_then(RawNum::value),
        fifty_two_week_high: detail.fifty_two_week_high.and_then(RawNum::value),
        fifty_two_week_low: detail.fifty_two_week_low.and_then(RawNum::value),
        volume: price.regular_market_volume.and_then(RawNum::value),
        market_cap: price.market_cap.and_then(RawNum::value),
    };

    let mut grades: Vec<GradeRecord> = result
        .upgrade_downgrade_history
        .map(|h| h.history)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            let date = parse_epoch_date(entry.epoch_grade_date?)?;
            Some(GradeRecord {
                date,
                firm: entry.firm.unwrap_or_default(),
                from_grade: entry.from_grade.unwrap_or_default(),
                to_grade: entry.to_grade.unwrap_or_default(),
            })
        })
        .collect();
    // Most recent first; the provider usually sends this order but does not
    // guarantee it.
    grades.sort_by(|a, b| b.date.cmp(&a.date));

    TickerSummary {
        info,
        metrics,
        grades,
    }
}

/// Convert epoch seconds to a calendar date (UTC). Out-of-range values are
/// dropped rather than propagated.
fn parse_epoch_date(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Envelope<ChartResult>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(rename = "quoteSummary")]
    quote_summary: Envelope<SummaryResult>,
}

/// Yahoo's shared `{ result: [...], error: {...} }` envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    result: Option<Vec<T>>,
    error: Option<ApiError>,
}

impl<T> Envelope<T> {
    /// First result row, or the provider's own error description.
    fn into_result(self) -> Result<T, String> {
        if let Some(err) = self.error {
            return Err(err
                .description
                .or(err.code)
                .unwrap_or_else(|| "provider returned an error".to_string()));
        }
        self.result
            .and_then(|mut rows| {
                if rows.is_empty() {
                    None
                } else {
                    Some(rows.remove(0))
                }
            })
            .ok_or_else(|| "provider returned no result".to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Debug, Deserialize)]
struct QuoteBlock {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResult {
    asset_profile: Option<AssetProfile>,
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetail>,
    upgrade_downgrade_history: Option<UpgradeDowngradeHistory>,
}

#[derive(Debug, Default, Deserialize)]
struct AssetProfile {
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    long_name: Option<String>,
    short_name: Option<String>,
    symbol: Option<String>,
    exchange_name: Option<String>,
    regular_market_open: Option<RawNum>,
    regular_market_previous_close: Option<RawNum>,
    regular_market_day_high: Option<RawNum>,
    regular_market_day_low: Option<RawNum>,
    regular_market_volume: Option<RawNum>,
    market_cap: Option<RawNum>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetail {
    fifty_two_week_high: Option<RawNum>,
    fifty_two_week_low: Option<RawNum>,
}

#[derive(Debug, Deserialize)]
struct UpgradeDowngradeHistory {
    #[serde(default)]
    history: Vec<GradeEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GradeEntry {
    epoch_grade_date: Option<i64>,
    firm: Option<String>,
    to_grade: Option<String>,
    from_grade: Option<String>,
}

/// Yahoo wraps numerics as `{ "raw": 123.4, "fmt": "123.40" }`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct RawNum {
    raw: Option<f64>,
}

impl RawNum {
    fn value(self) -> Option<f64> {
        self.raw.filter(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_epoch_date_known_value() {
        // 2024-06-14 00:00:00 UTC
        let date = parse_epoch_date(1_718_323_200).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
    }

    #[test]
    fn chart_decoding_skips_null_closes() {
        let raw = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1718323200, 1718409600, 1718496000],
                    "indicators": { "quote": [{ "close": [214.2, null, 216.7] }] }
                }],
                "error": null
            }
        }"#;
        let body: ChartResponse = serde_json::from_str(raw).unwrap();
        let result = body.chart.into_result().unwrap();
        let series = decode_series(&result);
        assert_eq!(series.points.len(), 2);
        assert!((series.points[0].close - 214.2).abs() < 1e-9);
        assert!((series.points[1].close - 216.7).abs() < 1e-9);
        assert!(series.points[0].date < series.points[1].date);
    }

    #[test]
    fn chart_error_envelope_is_reported() {
        let raw = r#"{
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }"#;
        let body: ChartResponse = serde_json::from_str(raw).unwrap();
        let err = body.chart.into_result().unwrap_err();
        assert!(err.contains("delisted"));
    }

    #[test]
    fn summary_decoding_extracts_all_sections() {
        let raw = r#"{
            "quoteSummary": {
                "result": [{
                    "assetProfile": { "sector": "Technology", "industry": "Consumer Electronics" },
                    "price": {
                        "longName": "Apple Inc.",
                        "shortName": "Apple",
                        "symbol": "AAPL",
                        "exchangeName": "NasdaqGS",
                        "regularMarketOpen": { "raw": 213.6 },
                        "regularMarketPreviousClose": { "raw": 212.5 },
                        "regularMarketDayHigh": { "raw": 215.2 },
                        "regularMarketDayLow": { "raw": 211.9 },
                        "regularMarketVolume": { "raw": 51000000 },
                        "marketCap": { "raw": 3300000000000 }
                    },
                    "summaryDetail": {
                        "fiftyTwoWeekHigh": { "raw": 237.2 },
                        "fiftyTwoWeekLow": { "raw": 164.1 }
                    },
                    "upgradeDowngradeHistory": {
                        "history": [
                            { "epochGradeDate": 1718323200, "firm": "Morgan Stanley", "toGrade": "Overweight", "fromGrade": "Equal-Weight", "action": "up" },
                            { "epochGradeDate": 1718236800, "firm": "Baird", "toGrade": "Outperform", "fromGrade": "Outperform", "action": "main" }
                        ]
                    }
                }],
                "error": null
            }
        }"#;
        let body: SummaryResponse = serde_json::from_str(raw).unwrap();
        let summary = decode_summary(body.quote_summary.into_result().unwrap());

        assert_eq!(summary.info.long_name.as_deref(), Some("Apple Inc."));
        assert_eq!(summary.info.exchange.as_deref(), Some("NasdaqGS"));
        assert_eq!(summary.info.sector.as_deref(), Some("Technology"));
        assert_eq!(summary.metrics.open, Some(213.6));
        assert_eq!(summary.metrics.market_cap, Some(3_300_000_000_000.0));
        assert_eq!(summary.grades.len(), 2);
        assert_eq!(summary.grades[0].firm, "Morgan Stanley");
        assert_eq!(summary.grades[0].to_grade, "Overweight");
        assert!(summary.grades[0].date > summary.grades[1].date);
    }

    #[test]
    fn summary_with_missing_modules_degrades_to_defaults() {
        let raw = r#"{
            "quoteSummary": {
                "result": [{ "price": { "symbol": "NVDA" } }],
                "error": null
            }
        }"#;
        let body: SummaryResponse = serde_json::from_str(raw).unwrap();
        let summary = decode_summary(body.quote_summary.into_result().unwrap());
        assert_eq!(summary.info.symbol.as_deref(), Some("NVDA"));
        assert!(summary.info.sector.is_none());
        assert!(summary.metrics.open.is_none());
        assert!(summary.grades.is_empty());
    }
}
