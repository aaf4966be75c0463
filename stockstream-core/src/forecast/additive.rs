//! Additive trend + seasonality model.
//!
//! `y(t) = trend(t) + weekly(t) + yearly(t)` where the trend is linear in
//! scaled time and both seasonalities are Fourier series. Coefficients come
//! from ridge-regularised least squares on max-abs scaled values.

use chrono::{Datelike, Days, NaiveDate};
use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

use super::{Components, Forecast, ForecastError, ForecastRow, Forecaster};

const WEEK_PERIOD: f64 = 7.0;
const YEAR_PERIOD: f64 = 365.25;

#[derive(Debug, Clone)]
pub struct AdditiveForecaster {
    pub weekly_order: usize,
    pub yearly_order: usize,
    /// Minimum history span (days) before the weekly term is fitted.
    pub weekly_min_span: i64,
    /// Minimum history span (days) before the yearly term is fitted.
    pub yearly_min_span: i64,
    /// Prior scale on seasonal coefficients; penalty is `1 / scale²`.
    pub seasonality_prior_scale: f64,
    /// Coverage of the uncertainty interval around `yhat`.
    pub interval_width: f64,
}

impl Default for AdditiveForecaster {
    fn default() -> Self {
        Self {
            weekly_order: 3,
            yearly_order: 10,
            weekly_min_span: 14,
            yearly_min_span: 730,
            seasonality_prior_scale: 10.0,
            interval_width: 0.8,
        }
    }
}

/// Coefficients of a fitted model, in scaled units.
#[derive(Debug, Clone)]
struct FittedModel {
    origin: NaiveDate,
    span_days: f64,
    y_scale: f64,
    weekly_order: usize,
    yearly_order: usize,
    beta: DVector<f64>,
    sigma: f64,
}

impl FittedModel {
    /// `(trend, weekly, yearly)` in original units.
    fn components(&self, date: NaiveDate) -> (f64, f64, f64) {
        let days = (date - self.origin).num_days() as f64;
        let t = days / self.span_days;
        let trend = self.beta[0] + self.beta[1] * t;

        let abs_day = epoch_days(date);
        let coefs = self.beta.as_slice();
        let mut idx = 2;
        let weekly = fourier_dot(&coefs[idx..], abs_day, WEEK_PERIOD, self.weekly_order);
        idx += 2 * self.weekly_order;
        let yearly = fourier_dot(&coefs[idx..], abs_day, YEAR_PERIOD, self.yearly_order);

        (
            trend * self.y_scale,
            weekly * self.y_scale,
            yearly * self.y_scale,
        )
    }

    fn row(&self, date: NaiveDate, z: f64) -> ForecastRow {
        let (trend, weekly, yearly) = self.components(date);
        let yhat = trend + weekly + yearly;
        let half_width = z * self.sigma;
        ForecastRow {
            date,
            yhat,
            yhat_lower: yhat - half_width,
            yhat_upper: yhat + half_width,
            trend,
            weekly,
            yearly,
        }
    }
}

impl AdditiveForecaster {
    fn fit(&self, history: &[(NaiveDate, f64)]) -> Result<FittedModel, ForecastError> {
        let (Some(&(origin, _)), Some(&(last, _))) = (history.first(), history.last()) else {
            return Err(ForecastError::InsufficientData { points: 0 });
        };
        let span = (last - origin).num_days();
        let span_days = if span > 0 { span as f64 } else { 1.0 };

        let weekly_order = if span >= self.weekly_min_span {
            self.weekly_order
        } else {
            0
        };
        let yearly_order = if span >= self.yearly_min_span {
            self.yearly_order
        } else {
            0
        };

        let y_scale = history
            .iter()
            .map(|(_, y)| y.abs())
            .fold(0.0_f64, f64::max);
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };

        let width = 2 + 2 * weekly_order + 2 * yearly_order;
        let n = history.len();
        let design = DMatrix::from_row_iterator(
            n,
            width,
            history.iter().flat_map(|&(date, _)| {
                let t = (date - origin).num_days() as f64 / span_days;
                let abs_day = epoch_days(date);
                let mut row = Vec::with_capacity(width);
                row.push(1.0);
                row.push(t);
                push_fourier(&mut row, abs_day, WEEK_PERIOD, weekly_order);
                push_fourier(&mut row, abs_day, YEAR_PERIOD, yearly_order);
                row
            }),
        );
        let target = DVector::from_iterator(n, history.iter().map(|(_, y)| y / y_scale));

        // (XᵀX + Λ) β = Xᵀy
        let seasonal_penalty = 1.0 / (self.seasonality_prior_scale * self.seasonality_prior_scale);
        let penalty = DVector::from_fn(width, |i, _| if i < 2 { 1e-10 } else { seasonal_penalty });
        let gram = design.transpose() * &design + DMatrix::from_diagonal(&penalty);
        let beta = solve_ridge(gram, design.transpose() * &target)?;

        let residuals = &target - &design * &beta;
        let sigma = (residuals.norm_squared() / n as f64).sqrt() * y_scale;

        debug!(
            points = history.len(),
            span,
            weekly_order,
            yearly_order,
            sigma,
            "additive model fitted"
        );

        Ok(FittedModel {
            origin,
            span_days,
            y_scale,
            weekly_order,
            yearly_order,
            beta,
            sigma,
        })
    }
}

impl Forecaster for AdditiveForecaster {
    fn name(&self) -> &str {
        "additive"
    }

    fn forecast(
        &self,
        history: &[(NaiveDate, f64)],
        periods_days: u32,
    ) -> Result<Forecast, ForecastError> {
        if let Some(&(date, _)) = history.iter().find(|(_, y)| !y.is_finite()) {
            return Err(ForecastError::NonFiniteInput { date });
        }
        let mut history = history.to_vec();
        history.sort_by_key(|(d, _)| *d);
        history.dedup_by_key(|(d, _)| *d);
        if history.len() < 2 {
            return Err(ForecastError::InsufficientData {
                points: history.len(),
            });
        }

        let z = interval_z(self.interval_width)?;
        let model = self.fit(&history)?;

        let mut rows: Vec<ForecastRow> = history
            .iter()
            .map(|&(date, _)| model.row(date, z))
            .collect();
        let last = history[history.len() - 1].0;
        rows.extend(
            last.iter_days()
                .skip(1)
                .take(periods_days as usize)
                .map(|date| model.row(date, z)),
        );

        Ok(Forecast::new(rows, history.len(), component_profiles(&model)))
    }
}

fn component_profiles(model: &FittedModel) -> Components {
    let mut components = Components::default();

    if model.weekly_order > 0 {
        // Any Monday works; the weekly term depends only on the weekday.
        let monday = model
            .origin
            .checked_sub_days(Days::new(model.origin.weekday().num_days_from_monday() as u64))
            .unwrap_or(model.origin);
        let mut day = monday;
        for _ in 0..7 {
            components.weekly.push((day.weekday(), model.components(day).1));
            day = day.succ_opt().unwrap_or(day);
        }
    }

    if model.yearly_order > 0 {
        if let Some(jan1) = NaiveDate::from_ymd_opt(model.origin.year(), 1, 1) {
            components.yearly = jan1
                .iter_days()
                .take(365)
                .enumerate()
                .map(|(i, date)| (i as u32, model.components(date).2))
                .collect();
        }
    }

    components
}

fn epoch_days(date: NaiveDate) -> f64 {
    (date - chrono::DateTime::UNIX_EPOCH.date_naive()).num_days() as f64
}

fn push_fourier(row: &mut Vec<f64>, day: f64, period: f64, order: usize) {
    for k in 1..=order {
        let x = 2.0 * std::f64::consts::PI * k as f64 * day / period;
        row.push(x.sin());
        row.push(x.cos());
    }
}

fn fourier_dot(coefs: &[f64], day: f64, period: f64, order: usize) -> f64 {
    (1..=order)
        .map(|k| {
            let x = 2.0 * std::f64::consts::PI * k as f64 * day / period;
            coefs[2 * (k - 1)] * x.sin() + coefs[2 * (k - 1) + 1] * x.cos()
        })
        .sum()
}

/// Solve the symmetric positive-definite ridge system.
fn solve_ridge(gram: DMatrix<f64>, rhs: DVector<f64>) -> Result<DVector<f64>, ForecastError> {
    let beta = gram
        .cholesky()
        .ok_or(ForecastError::SingularSystem)?
        .solve(&rhs);
    if beta.iter().all(|b| b.is_finite()) {
        Ok(beta)
    } else {
        Err(ForecastError::SingularSystem)
    }
}

/// Two-sided standard normal quantile for an interval of the given coverage.
fn interval_z(width: f64) -> Result<f64, ForecastError> {
    if !(width > 0.0 && width < 1.0) {
        return Err(ForecastError::InvalidIntervalWidth { width });
    }
    let normal =
        Normal::new(0.0, 1.0).map_err(|_| ForecastError::InvalidIntervalWidth { width })?;
    Ok(normal.inverse_cdf(0.5 + width / 2.0))
}
