//! Panel controller and its request/view types.
//!
//! Each user interaction builds a `PanelRequest` and evaluates it against the
//! `Session`. Evaluation fetches at most once and returns a `PanelView` the
//! front-ends render without further data access.

mod controller;
pub mod request;
mod session;
pub mod view;

use thiserror::Error;

use crate::data::DataError;
use crate::forecast::ForecastError;

pub use controller::Dashboard;
pub use request::{ChartStyle, HorizonYears, PanelKind, PanelRequest, PriceChartStyle};
pub use session::Session;
pub use view::{
    ComparisonView, ForecastOutcome, Line, PanelView, PredictionView, RealTimeView, ABOUT_TEXT,
};

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error("forecast failed: {0}")]
    Forecast(#[from] ForecastError),

    #[error("forecast horizon must be 1 to 4 years, got {0}")]
    HorizonOutOfRange(u8),
}
