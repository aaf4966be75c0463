//! Renderable view models produced by the panel controller.

use chrono::NaiveDate;

use super::request::{ChartStyle, HorizonYears, PanelKind, PriceChartStyle};
use crate::domain::{PriceField, PriceSeries, PriceTable, ReturnSeries};
use crate::forecast::Forecast;

pub const SELECT_ASSET_PROMPT: &str = "Please select at least one asset";
pub const SEARCH_PROMPT: &str = "Click Search to Search for a Company";
pub const ENTER_STOCK_PROMPT: &str = "Enter a Stock Name";

pub const ABOUT_TEXT: &str = "StockStream lets you compare the historical performance of \
several stocks, inspect recent prices for a single company, and project a company's closing \
price into the future with an additive trend and seasonality model. Pick companies from the \
ticker reference list, adjust the date range, and switch between panels to explore.";

/// A named line on a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone)]
pub struct ComparisonView {
    /// Companies that resolved, in selection order. Parallel to `symbols`:
    /// a company whose symbol was already picked under another name is left out.
    pub companies: Vec<String>,
    pub symbols: Vec<String>,
    pub style: ChartStyle,
    pub prices: PriceTable,
    pub returns: Vec<ReturnSeries>,
}

impl ComparisonView {
    pub fn return_lines(&self) -> Vec<Line> {
        self.returns
            .iter()
            .map(|r| Line {
                label: r.symbol.clone(),
                points: r.points.clone(),
            })
            .collect()
    }

    /// Adjusted close per symbol.
    pub fn closing_price_lines(&self) -> Vec<Line> {
        self.field_lines(PriceField::AdjClose)
    }

    pub fn volume_lines(&self) -> Vec<Line> {
        self.field_lines(PriceField::Volume)
    }

    fn field_lines(&self, field: PriceField) -> Vec<Line> {
        self.prices
            .series()
            .iter()
            .map(|s| Line {
                label: s.symbol.clone(),
                points: s.points(field),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct RealTimeView {
    pub company: String,
    pub symbol: String,
    pub style: PriceChartStyle,
    pub series: PriceSeries,
}

impl RealTimeView {
    pub fn open_close_lines(&self) -> Vec<Line> {
        open_close_lines(&self.series)
    }
}

#[derive(Debug, Clone)]
pub enum ForecastOutcome {
    Ready(Forecast),
    /// Not enough history; the message is shown in place of the forecast.
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct PredictionView {
    pub company: String,
    pub symbol: String,
    pub horizon: HorizonYears,
    pub series: PriceSeries,
    pub forecast: ForecastOutcome,
}

impl PredictionView {
    pub fn open_close_lines(&self) -> Vec<Line> {
        open_close_lines(&self.series)
    }

    pub fn forecast(&self) -> Option<&Forecast> {
        match &self.forecast {
            ForecastOutcome::Ready(f) => Some(f),
            ForecastOutcome::Unavailable(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PanelView {
    Prompt { panel: PanelKind, message: String },
    Comparison(ComparisonView),
    RealTime(RealTimeView),
    Prediction(PredictionView),
    About,
}

impl PanelView {
    pub fn prompt(panel: PanelKind, message: impl Into<String>) -> Self {
        PanelView::Prompt {
            panel,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> PanelKind {
        match self {
            PanelView::Prompt { panel, .. } => *panel,
            PanelView::Comparison(_) => PanelKind::Comparison,
            PanelView::RealTime(_) => PanelKind::RealTime,
            PanelView::Prediction(_) => PanelKind::Prediction,
            PanelView::About => PanelKind::About,
        }
    }

    pub fn prompt_message(&self) -> Option<&str> {
        match self {
            PanelView::Prompt { message, .. } => Some(message),
            _ => None,
        }
    }
}

fn open_close_lines(series: &PriceSeries) -> Vec<Line> {
    vec![
        Line {
            label: "stock_open".into(),
            points: series.points(PriceField::Open),
        },
        Line {
            label: "stock_close".into(),
            points: series.points(PriceField::Close),
        },
    ]
}
