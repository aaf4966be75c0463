//! Reusable widgets for the dashboard panels.

pub mod candle_chart;
pub mod price_table;
pub mod series_chart;

pub use candle_chart::CandleChart;
pub use price_table::PriceTableWidget;
pub use series_chart::SeriesChart;
