//! Download orchestrator: coordinates multi-symbol downloads with progress reporting.

use tracing::info;

use super::cache::{CoverageResult, ParquetCache};
use super::provider::{DataError, DownloadProgress, MarketDataProvider};
use crate::domain::DateRange;

/// Download multiple symbols into the cache.
///
/// Returns a summary of successes and failures.
pub fn download_symbols<S: AsRef<str>>(
    provider: &dyn MarketDataProvider,
    cache: &ParquetCache,
    symbols: &[S],
    range: DateRange,
    force: bool,
    progress: &dyn DownloadProgress,
) -> DownloadSummary {
    let total = symbols.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut errors: Vec<(String, DataError)> = Vec::new();

    for (i, symbol) in symbols.iter().enumerate() {
        let symbol = symbol.as_ref();
        progress.on_start(symbol, i, total);

        if !force && cache.covers_range(symbol, range) == CoverageResult::FullyCovered {
            let rows = cache.get_meta(symbol).map_or(0, |m| m.bar_count);
            progress.on_complete(symbol, &Ok(rows));
            succeeded += 1;
            continue;
        }

        let result = download_single(provider, cache, symbol, range);
        progress.on_complete(symbol, &result);

        match result {
            Ok(_) => succeeded += 1,
            Err(e) => {
                errors.push((symbol.to_string(), e));
                failed += 1;
            }
        }

        if !provider.is_available() {
            let retry_after_secs = provider.cooldown().as_secs();
            for sym in &symbols[(i + 1)..total] {
                errors.push((
                    sym.as_ref().to_string(),
                    DataError::CircuitBreakerTripped { retry_after_secs },
                ));
                failed += 1;
            }
            break;
        }
    }

    progress.on_batch_complete(succeeded, failed, total);
    info!(total, succeeded, failed, "download batch finished");

    DownloadSummary {
        total,
        succeeded,
        failed,
        errors,
    }
}

fn download_single(
    provider: &dyn MarketDataProvider,
    cache: &ParquetCache,
    symbol: &str,
    range: DateRange,
) -> Result<usize, DataError> {
    let fetched = provider.fetch(symbol, range)?;
    if fetched.series.is_empty() {
        return Err(DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        });
    }
    cache.write(symbol, range, fetched.series.bars())?;
    Ok(fetched.series.len())
}

/// Summary of a batch download operation.
#[derive(Debug)]
pub struct DownloadSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub errors: Vec<(String, DataError)>,
}

impl DownloadSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::NaiveDate;

    use super::*;
    use crate::data::provider::{DataSource, FetchResult};
    use crate::domain::{PriceBar, PriceSeries};

    struct FixedProvider;

    impl MarketDataProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        fn fetch(&self, symbol: &str, range: DateRange) -> Result<FetchResult, DataError> {
            if symbol == "NOPE" {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.into(),
                });
            }
            let mut bar = PriceBar::empty(range.start);
            bar.close = Some(10.0);
            bar.adj_close = Some(10.0);
            Ok(FetchResult {
                series: PriceSeries::new(symbol, vec![bar]),
                source: DataSource::Fixture,
            })
        }
    }

    struct BlockedProvider;

    impl MarketDataProvider for BlockedProvider {
        fn name(&self) -> &str {
            "blocked"
        }

        fn fetch(&self, _symbol: &str, _range: DateRange) -> Result<FetchResult, DataError> {
            Err(DataError::CircuitBreakerTripped {
                retry_after_secs: 45,
            })
        }

        fn is_available(&self) -> bool {
            false
        }

        fn cooldown(&self) -> std::time::Duration {
            std::time::Duration::from_secs(45)
        }
    }

    #[derive(Default)]
    struct Recorder {
        completed: RefCell<Vec<String>>,
    }

    impl DownloadProgress for Recorder {
        fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

        fn on_complete(&self, symbol: &str, _result: &Result<usize, DataError>) {
            self.completed.borrow_mut().push(symbol.to_string());
        }

        fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
    }

    #[test]
    fn downloads_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let recorder = Recorder::default();

        let summary = download_symbols(
            &FixedProvider,
            &cache,
            &["AAPL", "NOPE"],
            DateRange::new(day, day),
            false,
            &recorder,
        );

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.all_succeeded());
        assert_eq!(*recorder.completed.borrow(), vec!["AAPL", "NOPE"]);
        assert!(cache.get_meta("AAPL").is_some());
    }

    #[test]
    fn range_between_cached_intervals_is_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        let day = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        let recorder = Recorder::default();

        for start in [day(1, 2), day(3, 4)] {
            download_symbols(
                &FixedProvider,
                &cache,
                &["AAPL"],
                DateRange::new(start, start),
                false,
                &recorder,
            );
        }
        assert_eq!(cache.get_meta("AAPL").unwrap().bar_count, 2);

        download_symbols(
            &FixedProvider,
            &cache,
            &["AAPL"],
            DateRange::new(day(2, 1), day(2, 1)),
            false,
            &recorder,
        );
        let meta = cache.get_meta("AAPL").unwrap();
        assert_eq!(meta.bar_count, 3);
        assert_eq!(meta.covered.len(), 3);
    }

    #[test]
    fn blocked_provider_skips_remaining_symbols() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ParquetCache::new(dir.path());
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let recorder = Recorder::default();

        let summary = download_symbols(
            &BlockedProvider,
            &cache,
            &["AAPL", "MSFT", "NVDA"],
            DateRange::new(day, day),
            false,
            &recorder,
        );

        assert_eq!(summary.failed, 3);
        assert_eq!(*recorder.completed.borrow(), vec!["AAPL"]);
        assert!(summary.errors.iter().all(|(_, e)| matches!(
            e,
            DataError::CircuitBreakerTripped {
                retry_after_secs: 45
            }
        )));
    }
}
