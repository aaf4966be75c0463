//! Cache-first provider decorator.
//!
//! A range inside one of the cache's fetched intervals is served from disk.
//! Anything else goes to the wrapped provider and the result is merged back
//! into the cache.

use std::time::Duration;

use tracing::{debug, warn};

use super::cache::{CoverageResult, ParquetCache};
use super::provider::{DataError, DataSource, FetchResult, MarketDataProvider};
use crate::domain::{DateRange, PriceSeries};

pub struct CachedProvider<P> {
    inner: P,
    cache: ParquetCache,
}

impl<P: MarketDataProvider> CachedProvider<P> {
    pub fn new(inner: P, cache: ParquetCache) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &ParquetCache {
        &self.cache
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: MarketDataProvider> MarketDataProvider for CachedProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn fetch(&self, symbol: &str, range: DateRange) -> Result<FetchResult, DataError> {
        if range.is_inverted() {
            return Ok(FetchResult {
                series: PriceSeries::empty(symbol),
                source: DataSource::Cache,
            });
        }

        if self.cache.covers_range(symbol, range) == CoverageResult::FullyCovered {
            match self.cache.load_range(symbol, range) {
                Ok(bars) => {
                    debug!(symbol, bars = bars.len(), "served from cache");
                    return Ok(FetchResult {
                        series: PriceSeries::new(symbol, bars),
                        source: DataSource::Cache,
                    });
                }
                Err(e) => warn!(symbol, error = %e, "cache read failed, refetching"),
            }
        }

        let fetched = self.inner.fetch(symbol, range)?;
        if !fetched.series.is_empty() {
            if let Err(e) = self.cache.write(symbol, range, fetched.series.bars()) {
                warn!(symbol, error = %e, "failed to update cache");
            }
        }
        Ok(fetched)
    }

    fn is_available(&self) -> bool {
        self.inner.is_available()
    }

    fn cooldown(&self) -> Duration {
        self.inner.cooldown()
    }
}
