//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API. Handles rate limiting,
//! retries with exponential backoff, response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveTime};
use serde::Deserialize;
use tracing::{debug, info};

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataSource, FetchResult, MarketDataProvider};
use crate::domain::{DateRange, PriceBar, PriceSeries};

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance data provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    base_url: String,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Point the provider at a different chart endpoint (mirrors, local fixtures).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Chart API URL covering `[start 00:00:00, end 23:59:59]` UTC.
    fn chart_url(&self, symbol: &str, range: DateRange) -> String {
        let start_ts = range.start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = range
            .end
            .checked_add_days(Days::new(1))
            .map(|next| next.and_time(NaiveTime::MIN).and_utc().timestamp() - 1)
            .unwrap_or(i64::MAX);
        format!(
            "{}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d&includeAdjustedClose=true",
            self.base_url
        )
    }

    /// Parse the chart API response into bars.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<PriceBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // No timestamps: the range held no trading days.
        let Some(timestamps) = data.timestamp else {
            return Ok(Vec::new());
        };

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let bar = PriceBar {
                date,
                open: cell(&quote.open, i),
                high: cell(&quote.high, i),
                low: cell(&quote.low, i),
                close: cell(&quote.close, i),
                adj_close: adj_closes.as_deref().and_then(|v| cell(v, i)),
                volume: cell(&quote.volume, i),
            };

            // All-empty rows are holidays Yahoo pads into the grid.
            if !bar.is_void() {
                bars.push(bar);
            }
        }

        Ok(bars)
    }

    fn blocked(&self) -> DataError {
        DataError::CircuitBreakerTripped {
            retry_after_secs: self.circuit_breaker.remaining_cooldown().as_secs(),
        }
    }

    /// Execute the request with retry and circuit breaker logic.
    fn fetch_with_retry(&self, symbol: &str, range: DateRange) -> Result<Vec<PriceBar>, DataError> {
        if !self.circuit_breaker.is_allowed() {
            return Err(self.blocked());
        }

        let url = self.chart_url(symbol, range);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying chart request");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(self.blocked());
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();

            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(self.blocked());
            }

            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(DataError::AuthenticationRequired(
                    "Yahoo Finance requires authentication".into(),
                ));
            }

            // Yahoo answers unknown symbols with 404 and a JSON error body.
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }

            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let chart: ChartResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
            })?;

            let bars = Self::parse_response(symbol, chart)?;
            self.circuit_breaker.record_success();
            return Ok(bars);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, range: DateRange) -> Result<FetchResult, DataError> {
        if range.is_inverted() {
            debug!(symbol, start = %range.start, end = %range.end, "inverted range, skipping request");
            return Ok(FetchResult {
                series: PriceSeries::empty(symbol),
                source: DataSource::YahooFinance,
            });
        }

        let bars = self.fetch_with_retry(symbol, range)?;
        info!(symbol, rows = bars.len(), "fetched daily bars");
        Ok(FetchResult {
            series: PriceSeries::new(symbol, bars).restrict(range),
            source: DataSource::YahooFinance,
        })
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }

    fn cooldown(&self) -> Duration {
        self.circuit_breaker.remaining_cooldown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse(json: &str) -> Result<Vec<PriceBar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_response("AAPL", resp)
    }

    #[test]
    fn parses_quote_and_adjclose() {
        // 2023-01-03 and 2023-01-04 14:30 UTC
        let json = r#"{"chart":{"result":[{"timestamp":[1672756200,1672842600],
            "indicators":{"quote":[{"open":[130.28,126.89],"high":[130.9,128.66],
            "low":[124.17,125.08],"close":[125.07,126.36],"volume":[112117500,89113600]}],
            "adjclose":[{"adjclose":[124.05,125.33]}]}}],"error":null}}"#;
        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
        assert_eq!(bars[0].open, Some(130.28));
        assert_eq!(bars[1].adj_close, Some(125.33));
        assert_eq!(bars[1].volume, Some(89_113_600.0));
    }

    #[test]
    fn null_cells_become_absent_and_void_rows_are_skipped() {
        let json = r#"{"chart":{"result":[{"timestamp":[1672756200,1672842600],
            "indicators":{"quote":[{"open":[null,126.89],"high":[null,128.66],
            "low":[null,125.08],"close":[null,126.36],"volume":[null,null]}]}}],"error":null}}"#;
        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].volume, None);
        assert_eq!(bars[0].adj_close, None);
    }

    #[test]
    fn missing_timestamps_mean_no_rows() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse(json).unwrap().is_empty());
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found",
            "description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(parse(json), Err(DataError::SymbolNotFound { .. })));
    }

    #[test]
    fn other_errors_map_to_format_changed() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Bad Request","description":"x"}}}"#;
        assert!(matches!(parse(json), Err(DataError::ResponseFormatChanged(_))));
    }

    #[test]
    fn chart_url_covers_whole_end_day() {
        let provider = YahooProvider::new(Arc::new(CircuitBreaker::default_provider()))
            .unwrap()
            .with_base_url("http://localhost:9/chart/");
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
        );
        let url = provider.chart_url("AAPL", range);
        assert_eq!(
            url,
            "http://localhost:9/chart/AAPL?period1=1672704000&period2=1672963199&interval=1d&includeAdjustedClose=true"
        );
    }

    #[test]
    fn inverted_range_returns_empty_without_network() {
        let provider = YahooProvider::new(Arc::new(CircuitBreaker::default_provider()))
            .unwrap()
            .with_base_url("http://127.0.0.1:9/unreachable");
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
        );
        let result = provider.fetch("AAPL", range).unwrap();
        assert!(result.series.is_empty());
    }

    #[test]
    fn open_breaker_reports_remaining_cooldown() {
        let breaker = Arc::new(CircuitBreaker::new(Duration::from_secs(600), 3));
        let provider = YahooProvider::new(Arc::clone(&breaker))
            .unwrap()
            .with_base_url("http://127.0.0.1:9/unreachable");
        breaker.trip();

        assert!(!provider.is_available());
        assert!(provider.cooldown() > Duration::from_secs(590));
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2023, 1, 3).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
        );
        match provider.fetch("AAPL", range) {
            Err(DataError::CircuitBreakerTripped { retry_after_secs }) => {
                assert!(retry_after_secs > 590 && retry_after_secs <= 600);
            }
            other => panic!("expected breaker error, got {other:?}"),
        }
    }
}
