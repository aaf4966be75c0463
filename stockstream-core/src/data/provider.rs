//! Market data provider trait and structured error types.
//!
//! The `MarketDataProvider` trait abstracts over data sources (Yahoo Finance,
//! the Parquet cache decorator, test doubles) so the panel controller never
//! knows where bars come from.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{DateRange, PriceSeries};

/// Structured error types for data operations.
///
/// These are designed to be displayable in both CLI and TUI contexts.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("data provider has blocked requests (circuit breaker open, retry in {retry_after_secs}s)")]
    CircuitBreakerTripped { retry_after_secs: u64 },

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("parquet I/O error: {0}")]
    ParquetError(String),

    #[error("no cached data for symbol '{symbol}'; run `stockstream download {symbol}` first")]
    NoCachedData { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Errors that mean "this symbol has no data", as opposed to a failed request.
    pub fn is_missing_data(&self) -> bool {
        matches!(
            self,
            DataError::SymbolNotFound { .. } | DataError::NoCachedData { .. }
        )
    }
}

/// Result of a successful fetch for a single symbol.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub series: PriceSeries,
    pub source: DataSource,
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    YahooFinance,
    Cache,
    Fixture,
}

/// A source of daily OHLCV bars.
///
/// Implementations return every bar they have inside the inclusive range.
/// An inverted range yields an empty series, never an error.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for a symbol over a date range.
    fn fetch(&self, symbol: &str, range: DateRange) -> Result<FetchResult, DataError>;

    /// Check if the provider is currently available (not rate-limited, not blocked).
    fn is_available(&self) -> bool {
        true
    }

    /// Time until a blocked provider accepts requests again.
    fn cooldown(&self) -> Duration {
        Duration::ZERO
    }
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, symbol: &str, range: DateRange) -> Result<FetchResult, DataError> {
        (**self).fetch(symbol, range)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn cooldown(&self) -> Duration {
        (**self).cooldown()
    }
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self, symbol: &str, range: DateRange) -> Result<FetchResult, DataError> {
        (**self).fetch(symbol, range)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn cooldown(&self) -> Duration {
        (**self).cooldown()
    }
}

/// Progress callback for multi-symbol downloads.
pub trait DownloadProgress {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes.
    fn on_complete(&self, symbol: &str, result: &Result<usize, DataError>);

    /// Called when the entire batch is done.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(&self, symbol: &str, result: &Result<usize, DataError>) {
        match result {
            Ok(rows) => println!("  OK: {symbol} ({rows} rows)"),
            Err(e) => println!("  FAIL: {symbol}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nDownload complete: {succeeded}/{total} succeeded, {failed} failed");
    }
}
