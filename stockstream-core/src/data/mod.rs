//! Market data: provider abstraction, Yahoo client, Parquet cache.

pub mod cache;
pub mod cached;
pub mod circuit_breaker;
pub mod download;
pub mod fetch;
pub mod provider;
pub mod yahoo;

use std::sync::Arc;

pub use cache::{CacheMeta, CacheStatus, CoverageResult, ParquetCache};
pub use cached::CachedProvider;
pub use circuit_breaker::CircuitBreaker;
pub use download::{download_symbols, DownloadSummary};
pub use fetch::fetch_table;
pub use provider::{
    DataError, DataSource, DownloadProgress, FetchResult, MarketDataProvider, StdoutProgress,
};
pub use yahoo::YahooProvider;

use crate::config::AppConfig;

/// Build the provider stack described by the configuration.
pub fn build_provider(config: &AppConfig) -> Result<Box<dyn MarketDataProvider>, DataError> {
    let yahoo = YahooProvider::new(Arc::new(CircuitBreaker::default_provider()))?;
    if config.use_cache {
        let cache = ParquetCache::new(&config.cache_dir);
        Ok(Box::new(CachedProvider::new(yahoo, cache)))
    } else {
        Ok(Box::new(yahoo))
    }
}
