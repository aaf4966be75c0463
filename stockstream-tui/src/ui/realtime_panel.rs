//! Panel 2: raw bars for one company as a table and a price chart.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use stockstream_core::dashboard::{PriceChartStyle, RealTimeView};
use stockstream_core::PriceSeries;

use crate::app::AppState;
use crate::theme::THEME;
use crate::ui::widgets::candle_chart::Candle;
use crate::ui::widgets::price_table::cell;
use crate::ui::widgets::{CandleChart, PriceTableWidget, SeriesChart};

pub fn render(f: &mut Frame, area: Rect, app: &AppState, view: &RealTimeView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let title = format!("{} ({})", view.company, view.symbol);
    let (headers, table_rows) = bars_table(&view.series);
    f.render_widget(
        PriceTableWidget::new(&title, headers, table_rows, &THEME)
            .scroll(app.realtime.company.scroll),
        rows[0],
    );

    match view.style {
        PriceChartStyle::Candlestick => {
            let candles = Candle::from_bars(view.series.bars());
            f.render_widget(CandleChart::new(&candles, &view.symbol, &THEME), rows[1]);
        }
        PriceChartStyle::Line => {
            let lines = view.open_close_lines();
            let colors = [THEME.positive, THEME.negative];
            let chart_title = format!("{} Open / Close", view.symbol);
            f.render_widget(
                SeriesChart::new(&chart_title, &lines, &THEME).colors(&colors),
                rows[1],
            );
        }
    }
}

/// Date, OHLC, adjusted close and volume per bar.
pub fn bars_table(series: &PriceSeries) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = ["Date", "Open", "High", "Low", "Close", "Adj Close", "Volume"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows = series
        .bars()
        .iter()
        .map(|b| {
            vec![
                b.date.format("%Y-%m-%d").to_string(),
                cell(b.open, 2),
                cell(b.high, 2),
                cell(b.low, 2),
                cell(b.close, 2),
                cell(b.adj_close, 2),
                cell(b.volume, 0),
            ]
        })
        .collect();
    (headers, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bars_from, d};

    #[test]
    fn bars_table_has_all_columns() {
        let mut bars = bars_from(d(2023, 1, 3), &[100.0, 101.0]);
        bars[1].volume = None;
        let (headers, rows) = bars_table(&PriceSeries::new("AAPL", bars));
        assert_eq!(headers.len(), 7);
        assert_eq!(rows[0][0], "2023-01-03");
        assert_eq!(rows[0][4], "100.00");
        assert_eq!(rows[0][6], "1000000");
        assert_eq!(rows[1][6], "-");
    }
}
