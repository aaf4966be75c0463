//! Panel 3: history, forecast and forecast components for one company.

use chrono::{Duration, NaiveDate};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use stockstream_core::dashboard::{ForecastOutcome, Line, PredictionView};
use stockstream_core::forecast::{Components, Forecast};
use stockstream_core::PriceField;

use crate::app::AppState;
use crate::theme::THEME;
use crate::ui::realtime_panel::bars_table;
use crate::ui::render_prompt;
use crate::ui::widgets::price_table::cell;
use crate::ui::widgets::{PriceTableWidget, SeriesChart};

pub fn render(f: &mut Frame, area: Rect, app: &AppState, view: &PredictionView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .split(area);
    let halves = |r: Rect| {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(r)
    };

    let raw = halves(rows[0]);
    let title = format!("Raw Data: {} ({})", view.company, view.symbol);
    let (headers, table_rows) = bars_table(&view.series);
    f.render_widget(
        PriceTableWidget::new(&title, headers, table_rows, &THEME)
            .scroll(app.prediction.company.scroll),
        raw[0],
    );

    let open_close = view.open_close_lines();
    let colors = [THEME.positive, THEME.negative];
    f.render_widget(
        SeriesChart::new("Time Series Data", &open_close, &THEME).colors(&colors),
        raw[1],
    );

    let forecast = match &view.forecast {
        ForecastOutcome::Ready(forecast) => forecast,
        ForecastOutcome::Unavailable(reason) => {
            render_prompt(f, rows[1], reason);
            return;
        }
    };

    let fc = halves(rows[1]);
    let (headers, table_rows) = forecast_table(forecast);
    let forecast_title = format!("Forecast Data ({} years)", view.horizon.years());
    f.render_widget(
        PriceTableWidget::new(&forecast_title, headers, table_rows, &THEME)
            .scroll(app.prediction.company.scroll),
        fc[0],
    );

    let lines = forecast_lines(view, forecast);
    let colors = [THEME.text_primary, THEME.accent, THEME.muted, THEME.muted];
    let chart_title = format!("Forecast Plot for {} Years", view.horizon.years());
    f.render_widget(
        SeriesChart::new(&chart_title, &lines, &THEME).colors(&colors),
        fc[1],
    );

    let comp = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[2]);

    let trend = vec![Line {
        label: "trend".into(),
        points: forecast.trend_points(),
    }];
    f.render_widget(SeriesChart::new("Trend", &trend, &THEME), comp[0]);

    let (weekly, yearly) = component_lines(forecast.components());
    f.render_widget(
        SeriesChart::new("Weekly", &weekly, &THEME).x_labels(["Mon", "Thu", "Sun"]),
        comp[1],
    );
    f.render_widget(
        SeriesChart::new("Yearly", &yearly, &THEME).x_labels(["Jan", "Jul", "Dec"]),
        comp[2],
    );
}

/// Forecast rows past the end of the history.
fn forecast_table(forecast: &Forecast) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = ["ds", "yhat", "yhat_lower", "yhat_upper", "trend"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = forecast
        .future()
        .iter()
        .map(|r| {
            vec![
                r.date.format("%Y-%m-%d").to_string(),
                cell(Some(r.yhat), 2),
                cell(Some(r.yhat_lower), 2),
                cell(Some(r.yhat_upper), 2),
                cell(Some(r.trend), 2),
            ]
        })
        .collect();
    (headers, rows)
}

fn forecast_lines(view: &PredictionView, forecast: &Forecast) -> Vec<Line> {
    vec![
        Line {
            label: "Close".into(),
            points: view.series.points(PriceField::Close),
        },
        Line {
            label: "yhat".into(),
            points: forecast.yhat_points(),
        },
        Line {
            label: "yhat_lower".into(),
            points: forecast.lower_points(),
        },
        Line {
            label: "yhat_upper".into(),
            points: forecast.upper_points(),
        },
    ]
}

/// Seasonal profiles laid on reference dates so they share the date chart.
fn component_lines(components: &Components) -> (Vec<Line>, Vec<Line>) {
    // 2024-01-01 is a Monday; 2023 is not a leap year.
    let week_origin = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let year_origin = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();

    let weekly = components
        .weekly
        .iter()
        .map(|&(day, v)| {
            let offset = day.num_days_from_monday() as i64;
            (week_origin + Duration::days(offset), v)
        })
        .collect();
    let yearly = components
        .yearly
        .iter()
        .map(|&(day, v)| (year_origin + Duration::days(day as i64), v))
        .collect();

    (
        vec![Line {
            label: "weekly".into(),
            points: weekly,
        }],
        vec![Line {
            label: "yearly".into(),
            points: yearly,
        }],
    )
}
