//! Panel 1: raw prices, relative returns and price/volume charts for the
//! selected companies.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use stockstream_core::dashboard::{ChartStyle, ComparisonView};
use stockstream_core::PriceTable;

use crate::app::AppState;
use crate::theme::THEME;
use crate::ui::widgets::price_table::cell;
use crate::ui::widgets::{PriceTableWidget, SeriesChart};

pub fn render(f: &mut Frame, area: Rect, app: &AppState, view: &ComparisonView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(35),
            Constraint::Percentage(30),
        ])
        .split(area);
    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    let (headers, table_rows) = prices_table(&view.prices);
    f.render_widget(
        PriceTableWidget::new("Raw Prices", headers, table_rows, &THEME)
            .scroll(app.comparison.scroll),
        rows[0],
    );

    let returns = view.return_lines();
    f.render_widget(
        SeriesChart::new("Cumulative Return", &returns, &THEME).style(view.style),
        rows[1],
    );

    let closes = view.closing_price_lines();
    f.render_widget(
        SeriesChart::new("Closing Prices", &closes, &THEME).style(view.style),
        bottom[0],
    );

    // Volume is drawn as bars unless lines are requested.
    let volume_style = match view.style {
        ChartStyle::Line => ChartStyle::Line,
        ChartStyle::Area | ChartStyle::Bar => ChartStyle::Bar,
    };
    let volumes = view.volume_lines();
    f.render_widget(
        SeriesChart::new("Volume", &volumes, &THEME).style(volume_style),
        bottom[1],
    );
}

/// Long table: one row per (date, symbol) bar, symbols in selection order.
fn prices_table(table: &PriceTable) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = [
        "Date", "Symbol", "Open", "High", "Low", "Close", "Adj Close", "Volume",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();

    let mut keyed: Vec<_> = table
        .series()
        .iter()
        .enumerate()
        .flat_map(|(col, series)| {
            series
                .bars()
                .iter()
                .map(move |bar| ((bar.date, col), series.symbol.as_str(), bar))
        })
        .collect();
    keyed.sort_by_key(|(key, _, _)| *key);

    let rows = keyed
        .into_iter()
        .map(|((date, _), symbol, b)| {
            vec![
                date.format("%Y-%m-%d").to_string(),
                symbol.to_string(),
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
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use stockstream_core::dashboard::PanelView;
    use stockstream_core::{PriceBar, PriceSeries};

    use super::*;
    use crate::test_support::{bars_from, buffer_text, d, test_app, test_dashboard};

    #[test]
    fn prices_table_interleaves_symbols_by_date() {
        let mut msft = bars_from(d(2023, 1, 4), &[250.0]);
        msft[0].volume = None;
        let table = PriceTable::new(vec![
            PriceSeries::new("AAPL", bars_from(d(2023, 1, 3), &[100.0, 102.0])),
            PriceSeries::new("MSFT", msft),
            PriceSeries::new("GHST", Vec::<PriceBar>::new()),
        ]);

        let (headers, rows) = prices_table(&table);
        assert_eq!(headers.len(), 8);
        assert_eq!(headers[6], "Adj Close");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][..2], ["2023-01-03", "AAPL"]);
        assert_eq!(rows[1][..2], ["2023-01-04", "AAPL"]);
        assert_eq!(rows[2][..2], ["2023-01-04", "MSFT"]);
        assert_eq!(rows[2][5], "250.00");
        assert_eq!(rows[2][7], "-");
    }

    #[test]
    fn panel_shows_raw_price_table() {
        let dashboard = test_dashboard();
        let mut app = test_app();
        app.comparison.toggle("Apple Inc");
        app.refresh(&dashboard);
        let Some(PanelView::Comparison(view)) = app.view.as_ref() else {
            panic!("expected comparison view");
        };

        let mut terminal = Terminal::new(TestBackend::new(110, 45)).unwrap();
        terminal
            .draw(|f| render(f, f.area(), &app, view))
            .unwrap();
        let text = buffer_text(terminal.backend().buffer());

        assert!(text.contains("Raw Prices"));
        assert!(text.contains("Adj Close"));
        assert!(text.contains("Symbol"));
        assert!(text.contains("AAPL"));
        assert!(text.contains("Cumulative Return"));
    }
}
