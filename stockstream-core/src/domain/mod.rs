//! Domain types: price bars, per-symbol series, multi-symbol tables and
//! cumulative return series.

pub mod bar;
pub mod series;

pub use bar::{PriceBar, PriceField};
pub use series::{DateRange, PriceSeries, PriceTable, ReturnSeries, TimeValue};
