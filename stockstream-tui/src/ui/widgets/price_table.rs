//! Scrollable data table for bars, returns and forecast rows.

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph, Row, Table, Widget},
};

use crate::theme::Theme;

pub struct PriceTableWidget<'a> {
    title: &'a str,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    scroll: usize,
    theme: &'a Theme,
}

impl<'a> PriceTableWidget<'a> {
    pub fn new(
        title: &'a str,
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            title,
            headers,
            rows,
            scroll: 0,
            theme,
        }
    }

    /// First row to show; clamped so the last page stays full.
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

/// Format an optional cell value.
pub fn cell(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.decimals$}"),
        _ => "-".to_string(),
    }
}

impl<'a> Widget for PriceTableWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.muted));

        if self.rows.is_empty() {
            Paragraph::new(Span::styled(
                "No rows in range",
                Style::default().fg(self.theme.muted),
            ))
            .block(block.title(format!(" {} ", self.title)))
            .render(area, buf);
            return;
        }

        // Border plus header row.
        let visible = area.height.saturating_sub(3) as usize;
        let max_start = self.rows.len().saturating_sub(visible);
        let start = self.scroll.min(max_start);
        let end = (start + visible).min(self.rows.len());

        let title = format!(
            " {} [{}-{} of {}] ",
            self.title,
            start + 1,
            end,
            self.rows.len()
        );

        let header = Row::new(self.headers.iter().cloned()).style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        );
        let body: Vec<Row> = self.rows[start..end]
            .iter()
            .map(|r| Row::new(r.iter().cloned()).style(Style::default().fg(self.theme.text_primary)))
            .collect();

        let first_width = self
            .rows
            .iter()
            .map(|r| r.first().map_or(0, String::len))
            .chain(self.headers.first().map(String::len))
            .max()
            .unwrap_or(10) as u16;
        let widths: Vec<Constraint> = std::iter::once(Constraint::Length(first_width))
            .chain(
                self.headers
                    .iter()
                    .skip(1)
                    .map(|_| Constraint::Min(10)),
            )
            .collect();

        Table::new(body, widths)
            .header(header)
            .block(block.title(title))
            .column_spacing(2)
            .render(area, buf);
    }
}
