//! Time-series forecasting behind a narrow trait.
//!
//! A forecaster consumes `(date, value)` history and returns one row per
//! history date followed by one row per calendar day of the horizon, plus
//! the seasonal component profiles used for the components chart.

pub mod additive;

use chrono::{NaiveDate, Weekday};
use serde::Serialize;
use thiserror::Error;

use crate::domain::TimeValue;

pub use additive::AdditiveForecaster;

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("need at least 2 data points to forecast, got {points}")]
    InsufficientData { points: usize },

    #[error("non-finite value on {date}")]
    NonFiniteInput { date: NaiveDate },

    #[error("forecast model could not be fitted (singular system)")]
    SingularSystem,

    #[error("interval width must be strictly between 0 and 1, got {width}")]
    InvalidIntervalWidth { width: f64 },
}

pub trait Forecaster: Send + Sync {
    fn name(&self) -> &str;

    /// Fit on `history` and project `periods_days` calendar days past its last date.
    fn forecast(
        &self,
        history: &[(NaiveDate, f64)],
        periods_days: u32,
    ) -> Result<Forecast, ForecastError>;
}

impl<F: Forecaster + ?Sized> Forecaster for Box<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn forecast(
        &self,
        history: &[(NaiveDate, f64)],
        periods_days: u32,
    ) -> Result<Forecast, ForecastError> {
        (**self).forecast(history, periods_days)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub trend: f64,
    pub weekly: f64,
    pub yearly: f64,
}

/// Seasonal profiles over one cycle. Empty when the component was not fitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Components {
    pub weekly: Vec<(Weekday, f64)>,
    /// Indexed by day of year, starting Jan 1.
    pub yearly: Vec<(u32, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    rows: Vec<ForecastRow>,
    history_len: usize,
    components: Components,
}

impl Forecast {
    pub fn new(rows: Vec<ForecastRow>, history_len: usize, components: Components) -> Self {
        let history_len = history_len.min(rows.len());
        Self {
            rows,
            history_len,
            components,
        }
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn history(&self) -> &[ForecastRow] {
        &self.rows[..self.history_len]
    }

    pub fn future(&self) -> &[ForecastRow] {
        &self.rows[self.history_len..]
    }

    pub fn history_len(&self) -> usize {
        self.history_len
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn yhat_points(&self) -> Vec<(NaiveDate, f64)> {
        self.rows.iter().map(|r| (r.date, r.yhat)).collect()
    }

    pub fn lower_points(&self) -> Vec<(NaiveDate, f64)> {
        self.rows.iter().map(|r| (r.date, r.yhat_lower)).collect()
    }

    pub fn upper_points(&self) -> Vec<(NaiveDate, f64)> {
        self.rows.iter().map(|r| (r.date, r.yhat_upper)).collect()
    }

    pub fn trend_points(&self) -> Vec<(NaiveDate, f64)> {
        self.rows.iter().map(|r| (r.date, r.trend)).collect()
    }

    pub fn yhat_feed(&self) -> Vec<TimeValue> {
        self.rows
            .iter()
            .map(|r| TimeValue {
                time: r.date,
                value: r.yhat,
            })
            .collect()
    }
}
