//! Application state for the four-panel dashboard.
//!
//! Control values live here; the core `Dashboard` turns them into a
//! `PanelView` whenever an interaction changes them.

use std::collections::VecDeque;

use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use tracing::warn;

use stockstream_core::dashboard::{
    ChartStyle, HorizonYears, PanelKind, PanelRequest, PanelView, PriceChartStyle, Session,
};
use stockstream_core::data::{DataError, MarketDataProvider};
use stockstream_core::{Dashboard, DateRange, Forecaster, PanelError};

const ERROR_HISTORY_CAP: usize = 50;

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// An error record for the error history overlay.
#[derive(Debug, Clone)]
pub struct ErrorRecord {
    pub timestamp: NaiveDateTime,
    pub category: ErrorCategory,
    pub message: String,
    pub context: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Forecast,
    Other,
}

impl ErrorCategory {
    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Network => "NET",
            ErrorCategory::Data => "DATA",
            ErrorCategory::Forecast => "FCST",
            ErrorCategory::Other => "ERR",
        }
    }

    fn of(err: &PanelError) -> Self {
        match err {
            PanelError::Data(
                DataError::NetworkUnreachable(_)
                | DataError::RateLimited { .. }
                | DataError::CircuitBreakerTripped { .. }
                | DataError::AuthenticationRequired(_),
            ) => ErrorCategory::Network,
            PanelError::Data(_) => ErrorCategory::Data,
            PanelError::Forecast(_) => ErrorCategory::Forecast,
            PanelError::HorizonOutOfRange(_) => ErrorCategory::Other,
        }
    }
}

/// Which overlay (if any) is shown on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Help,
    ErrorHistory,
}

/// Multi-select company list for the comparison panel.
#[derive(Debug, Default)]
pub struct ComparisonState {
    pub cursor: usize,
    /// Selected companies in the order they were picked.
    pub selected: Vec<String>,
    pub style: ChartStyle,
    pub scroll: usize,
}

impl ComparisonState {
    pub fn toggle(&mut self, company: &str) {
        if let Some(pos) = self.selected.iter().position(|c| c == company) {
            self.selected.remove(pos);
        } else {
            self.selected.push(company.to_string());
        }
    }

    pub fn is_selected(&self, company: &str) -> bool {
        self.selected.iter().any(|c| c == company)
    }
}

/// Single-select company list shared by the real-time and prediction panels.
#[derive(Debug, Default)]
pub struct SingleCompanyState {
    pub cursor: usize,
    pub chosen: Option<String>,
    pub scroll: usize,
}

#[derive(Debug, Default)]
pub struct RealTimeState {
    pub company: SingleCompanyState,
    pub style: PriceChartStyle,
    /// Search pressed since the last evaluation.
    pub search_pending: bool,
}

#[derive(Debug, Default)]
pub struct PredictionState {
    pub company: SingleCompanyState,
    pub horizon: HorizonYears,
}

pub struct AppState {
    pub active_panel: PanelKind,
    pub running: bool,

    pub companies: Vec<String>,
    pub range: DateRange,
    pub today: NaiveDate,

    pub comparison: ComparisonState,
    pub realtime: RealTimeState,
    pub prediction: PredictionState,

    pub session: Session,
    pub view: Option<PanelView>,
    /// Controls changed since the view was last evaluated.
    pub dirty: bool,

    pub status_message: Option<(String, StatusLevel)>,
    pub error_history: VecDeque<ErrorRecord>,
    pub error_scroll: usize,
    pub overlay: Overlay,
}

impl AppState {
    pub fn new(companies: Vec<String>, start: NaiveDate, today: NaiveDate) -> Self {
        Self {
            active_panel: PanelKind::Comparison,
            running: true,
            companies,
            range: DateRange::new(start, today),
            today,
            comparison: ComparisonState::default(),
            realtime: RealTimeState::default(),
            prediction: PredictionState::default(),
            session: Session::new(),
            view: None,
            dirty: true,
            status_message: None,
            error_history: VecDeque::with_capacity(ERROR_HISTORY_CAP),
            error_scroll: 0,
            overlay: Overlay::None,
        }
    }

    pub fn switch_panel(&mut self, panel: PanelKind) {
        if panel != self.active_panel {
            self.active_panel = panel;
            self.dirty = true;
        }
    }

    /// Company under the cursor of the active panel's list.
    pub fn cursor_company(&self) -> Option<&str> {
        let cursor = match self.active_panel {
            PanelKind::Comparison => self.comparison.cursor,
            PanelKind::RealTime => self.realtime.company.cursor,
            PanelKind::Prediction => self.prediction.company.cursor,
            PanelKind::About => return None,
        };
        self.companies.get(cursor).map(String::as_str)
    }

    pub fn cursor_mut(&mut self) -> Option<&mut usize> {
        match self.active_panel {
            PanelKind::Comparison => Some(&mut self.comparison.cursor),
            PanelKind::RealTime => Some(&mut self.realtime.company.cursor),
            PanelKind::Prediction => Some(&mut self.prediction.company.cursor),
            PanelKind::About => None,
        }
    }

    pub fn shift_start(&mut self, step: DateStep) {
        if let Some(start) = step.apply(self.range.start) {
            self.range.start = start;
            self.dirty = true;
        }
    }

    pub fn shift_end(&mut self, step: DateStep) {
        if let Some(end) = step.apply(self.range.end) {
            self.range.end = end.min(self.today);
            self.dirty = true;
        }
    }

    pub fn reset_end(&mut self) {
        self.range.end = self.today;
        self.dirty = true;
    }

    /// Control values of the active panel as a request.
    pub fn request(&self) -> PanelRequest {
        match self.active_panel {
            PanelKind::Comparison => PanelRequest::Comparison {
                companies: self.comparison.selected.clone(),
                range: self.range,
                style: self.comparison.style,
            },
            PanelKind::RealTime => PanelRequest::RealTime {
                company: self.realtime.company.chosen.clone(),
                range: self.range,
                style: self.realtime.style,
                search_clicked: self.realtime.search_pending,
            },
            PanelKind::Prediction => PanelRequest::Prediction {
                company: self.prediction.company.chosen.clone(),
                range: self.range,
                horizon: self.prediction.horizon,
            },
            PanelKind::About => PanelRequest::About,
        }
    }

    /// Evaluate the active panel if its controls changed.
    pub fn refresh<P, F>(&mut self, dashboard: &Dashboard<P, F>)
    where
        P: MarketDataProvider,
        F: Forecaster,
    {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let request = self.request();
        self.realtime.search_pending = false;

        match dashboard.evaluate(&request, &mut self.session) {
            Ok(view) => {
                self.set_status(format!("{} updated", self.active_panel.label()));
                self.view = Some(view);
            }
            Err(e) => {
                warn!(panel = ?self.active_panel, error = %e, "panel evaluation failed");
                let category = ErrorCategory::of(&e);
                self.view = None;
                self.push_error(category, e.to_string(), self.active_panel.label().to_string());
            }
        }
    }

    /// Push an error to the history, capping its length.
    pub fn push_error(&mut self, category: ErrorCategory, message: String, context: String) {
        let record = ErrorRecord {
            timestamp: chrono::Local::now().naive_local(),
            category,
            message: message.clone(),
            context,
        };
        self.error_history.push_front(record);
        if self.error_history.len() > ERROR_HISTORY_CAP {
            self.error_history.pop_back();
        }
        self.status_message = Some((message, StatusLevel::Error));
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }
}

/// One press of a date key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStep {
    Days(i32),
    Months(i32),
}

impl DateStep {
    fn apply(self, date: NaiveDate) -> Option<NaiveDate> {
        match self {
            DateStep::Days(n) => {
                let delta = Days::new(u64::from(n.unsigned_abs()));
                if n >= 0 {
                    date.checked_add_days(delta)
                } else {
                    date.checked_sub_days(delta)
                }
            }
            DateStep::Months(n) => {
                let delta = Months::new(n.unsigned_abs());
                if n >= 0 {
                    date.checked_add_months(delta)
                } else {
                    date.checked_sub_months(delta)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{d, test_app, test_dashboard};
    use stockstream_core::dashboard::PanelView;

    #[test]
    fn error_history_caps() {
        let mut app = test_app();
        for i in 0..60 {
            app.push_error(ErrorCategory::Other, format!("error {i}"), String::new());
        }
        assert_eq!(app.error_history.len(), ERROR_HISTORY_CAP);
        assert!(app.error_history[0].message.contains("59"));
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Error);
    }

    #[test]
    fn comparison_toggle_keeps_pick_order() {
        let mut state = ComparisonState::default();
        state.toggle("Microsoft Corporation");
        state.toggle("Apple Inc");
        assert_eq!(state.selected, vec!["Microsoft Corporation", "Apple Inc"]);
        state.toggle("Microsoft Corporation");
        assert_eq!(state.selected, vec!["Apple Inc"]);
        assert!(state.is_selected("Apple Inc"));
    }

    #[test]
    fn end_date_never_passes_today() {
        let mut app = test_app();
        app.shift_end(DateStep::Months(3));
        assert_eq!(app.range.end, app.today);
        app.shift_end(DateStep::Days(2));
        assert_eq!(app.range.end, app.today);
        app.shift_end(DateStep::Months(-1));
        assert_eq!(app.range.end, d(2023, 2, 28));
        app.reset_end();
        assert_eq!(app.range.end, app.today);
    }

    #[test]
    fn start_can_pass_end() {
        let mut app = test_app();
        app.shift_start(DateStep::Months(24));
        assert!(app.range.is_inverted());
    }

    #[test]
    fn day_steps_reach_any_date() {
        let mut app = test_app();
        app.shift_start(DateStep::Months(12));
        app.shift_start(DateStep::Days(2));
        assert_eq!(app.range.start, d(2023, 1, 3));

        app.shift_end(DateStep::Months(-2));
        assert_eq!(app.range.end, d(2023, 1, 31));
        for _ in 0..26 {
            app.shift_end(DateStep::Days(-1));
        }
        assert_eq!(app.range.end, d(2023, 1, 5));
        app.shift_start(DateStep::Days(-3));
        assert_eq!(app.range.start, d(2022, 12, 31));
    }

    #[test]
    fn refresh_only_when_dirty() {
        let dashboard = test_dashboard();
        let mut app = test_app();
        app.refresh(&dashboard);
        assert!(matches!(
            app.view,
            Some(PanelView::Prompt {
                panel: PanelKind::Comparison,
                ..
            })
        ));

        app.comparison.toggle("Apple Inc");
        app.refresh(&dashboard);
        assert!(matches!(app.view, Some(PanelView::Prompt { .. })));

        app.dirty = true;
        app.refresh(&dashboard);
        assert!(matches!(app.view, Some(PanelView::Comparison(_))));
    }

    #[test]
    fn search_is_one_shot_but_session_remembers() {
        let dashboard = test_dashboard();
        let mut app = test_app();
        app.switch_panel(PanelKind::RealTime);
        app.realtime.company.chosen = Some("Apple Inc".into());
        app.realtime.search_pending = true;
        app.refresh(&dashboard);

        assert!(!app.realtime.search_pending);
        assert!(app.session.fetch_triggered);
        assert!(matches!(app.view, Some(PanelView::RealTime(_))));
    }
}
