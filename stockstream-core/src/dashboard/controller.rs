//! Panel controller: evaluates one panel request against the session.

use std::time::Duration;

use tracing::{debug, info};

use super::request::{ChartStyle, HorizonYears, PanelKind, PanelRequest, PriceChartStyle};
use super::session::Session;
use super::view::{
    ComparisonView, ForecastOutcome, PanelView, PredictionView, RealTimeView, ENTER_STOCK_PROMPT,
    SEARCH_PROMPT, SELECT_ASSET_PROMPT,
};
use super::PanelError;
use crate::data::{fetch_table, DataError, MarketDataProvider};
use crate::directory::TickerDirectory;
use crate::domain::{DateRange, PriceField, PriceSeries, PriceTable};
use crate::forecast::{ForecastError, Forecaster};
use crate::returns::relative_returns;

pub struct Dashboard<P, F> {
    directory: TickerDirectory,
    provider: P,
    forecaster: F,
    loading_delay: Duration,
}

impl<P: MarketDataProvider, F: Forecaster> Dashboard<P, F> {
    pub fn new(directory: TickerDirectory, provider: P, forecaster: F) -> Self {
        Self {
            directory,
            provider,
            forecaster,
            loading_delay: Duration::ZERO,
        }
    }

    /// Pause before each fetch.
    pub fn with_loading_delay(mut self, delay: Duration) -> Self {
        self.loading_delay = delay;
        self
    }

    pub fn directory(&self) -> &TickerDirectory {
        &self.directory
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Evaluate a request top to bottom. At most one fetch per call.
    pub fn evaluate(
        &self,
        request: &PanelRequest,
        session: &mut Session,
    ) -> Result<PanelView, PanelError> {
        debug!(panel = ?request.kind(), "evaluating panel");
        match request {
            PanelRequest::Comparison {
                companies,
                range,
                style,
            } => self.comparison(companies, *range, *style),
            PanelRequest::RealTime {
                company,
                range,
                style,
                search_clicked,
            } => {
                if *search_clicked {
                    session.trigger_fetch();
                }
                if !session.fetch_triggered {
                    return Ok(PanelView::prompt(PanelKind::RealTime, SEARCH_PROMPT));
                }
                self.real_time(company.as_deref(), *range, *style)
            }
            PanelRequest::Prediction {
                company,
                range,
                horizon,
            } => self.prediction(company.as_deref(), *range, *horizon),
            PanelRequest::About => Ok(PanelView::About),
        }
    }

    fn comparison(
        &self,
        companies: &[String],
        range: DateRange,
        style: ChartStyle,
    ) -> Result<PanelView, PanelError> {
        let mut resolved = Vec::new();
        let mut symbols: Vec<String> = Vec::new();
        for company in companies {
            match self.directory.lookup(company) {
                Some(symbol) if symbols.iter().any(|s| s == symbol) => {
                    debug!(company = %company, symbol, "symbol already selected");
                }
                Some(symbol) => {
                    resolved.push(company.clone());
                    symbols.push(symbol.to_string());
                }
                None => debug!(company = %company, "dropping unresolved company"),
            }
        }
        if symbols.is_empty() {
            return Ok(PanelView::prompt(
                PanelKind::Comparison,
                SELECT_ASSET_PROMPT,
            ));
        }

        let prices = self.fetch(&symbols, range)?;
        let returns = relative_returns(&prices);

        Ok(PanelView::Comparison(ComparisonView {
            companies: resolved,
            symbols,
            style,
            prices,
            returns,
        }))
    }

    fn real_time(
        &self,
        company: Option<&str>,
        range: DateRange,
        style: PriceChartStyle,
    ) -> Result<PanelView, PanelError> {
        let (company, symbol) = match self.resolve_single(PanelKind::RealTime, company, SEARCH_PROMPT)
        {
            Ok(pair) => pair,
            Err(prompt) => return Ok(prompt),
        };
        let series = self.fetch_single(&symbol, range)?;

        Ok(PanelView::RealTime(RealTimeView {
            company,
            symbol,
            style,
            series,
        }))
    }

    fn prediction(
        &self,
        company: Option<&str>,
        range: DateRange,
        horizon: HorizonYears,
    ) -> Result<PanelView, PanelError> {
        let (company, symbol) =
            match self.resolve_single(PanelKind::Prediction, company, ENTER_STOCK_PROMPT) {
                Ok(pair) => pair,
                Err(prompt) => return Ok(prompt),
            };
        let series = self.fetch_single(&symbol, range)?;

        let history = series.points(PriceField::Close);
        let forecast = match self.forecaster.forecast(&history, horizon.days()) {
            Ok(forecast) => {
                info!(
                    symbol = %symbol,
                    forecaster = self.forecaster.name(),
                    years = horizon.years(),
                    rows = forecast.rows().len(),
                    "forecast ready"
                );
                ForecastOutcome::Ready(forecast)
            }
            Err(ForecastError::InsufficientData { points }) => ForecastOutcome::Unavailable(
                format!(
                    "Not enough price history to forecast {company}: {points} closing price(s), need at least 2"
                ),
            ),
            Err(e) => return Err(e.into()),
        };

        Ok(PanelView::Prediction(PredictionView {
            company,
            symbol,
            horizon,
            series,
            forecast,
        }))
    }

    /// `(company, symbol)` or the prompt to show instead.
    fn resolve_single(
        &self,
        panel: PanelKind,
        company: Option<&str>,
        empty_prompt: &str,
    ) -> Result<(String, String), PanelView> {
        let company = company.map(str::trim).unwrap_or_default();
        if company.is_empty() {
            return Err(PanelView::prompt(panel, empty_prompt));
        }
        match self.directory.lookup(company) {
            Some(symbol) => Ok((company.to_string(), symbol.to_string())),
            None => {
                debug!(company, "no ticker symbol for company");
                Err(PanelView::prompt(
                    panel,
                    format!("No ticker symbol found for \"{company}\""),
                ))
            }
        }
    }

    fn fetch_single(&self, symbol: &str, range: DateRange) -> Result<PriceSeries, DataError> {
        let table = self.fetch(&[symbol], range)?;
        Ok(table
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| PriceSeries::empty(symbol)))
    }

    fn fetch<S: AsRef<str>>(&self, symbols: &[S], range: DateRange) -> Result<PriceTable, DataError> {
        if !self.loading_delay.is_zero() {
            std::thread::sleep(self.loading_delay);
        }
        fetch_table(&self.provider, symbols, range)
    }
}
