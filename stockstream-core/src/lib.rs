//! StockStream core: ticker directory, market data, relative returns,
//! forecasting and the panel controller.
//!
//! This crate holds everything the dashboard front-ends share:
//! - Domain types (price bars, series, multi-symbol tables, return series)
//! - Ticker directory loaded from the company/symbol reference CSV
//! - Market data providers (Yahoo Finance, Parquet cache decorator)
//! - The cumulative relative-return transform
//! - An additive time-series forecaster behind the `Forecaster` trait
//! - The panel controller that turns a panel request into a view model

pub mod config;
pub mod dashboard;
pub mod data;
pub mod directory;
pub mod domain;
pub mod export;
pub mod forecast;
pub mod returns;

pub use config::{AppConfig, ConfigError};
pub use dashboard::{Dashboard, PanelError, PanelKind, PanelRequest, PanelView, Session};
pub use directory::{DirectoryError, TickerDirectory};
pub use domain::{DateRange, PriceBar, PriceField, PriceSeries, PriceTable, ReturnSeries, TimeValue};
pub use forecast::{AdditiveForecaster, Forecast, ForecastError, Forecaster};
pub use returns::{cumulative_return, relative_returns, ReturnsError};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: shared types can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<PriceBar>();
        require_sync::<PriceBar>();
        require_send::<PriceSeries>();
        require_sync::<PriceSeries>();
        require_send::<PriceTable>();
        require_sync::<PriceTable>();
        require_send::<ReturnSeries>();
        require_sync::<ReturnSeries>();
        require_send::<TickerDirectory>();
        require_sync::<TickerDirectory>();
        require_send::<Forecast>();
        require_sync::<Forecast>();
        require_send::<PanelView>();
        require_sync::<PanelView>();
        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
    }

    /// The provider trait is object safe so binaries can box their provider stack.
    #[test]
    fn provider_trait_is_object_safe() {
        fn _check(provider: &dyn data::MarketDataProvider, range: DateRange) {
            let _ = provider.fetch("AAPL", range);
        }
    }
}
