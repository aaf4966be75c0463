//! Multi-line date chart in line, area or bar style.
//!
//! Dates map to x = days since the earliest date on the chart, so gaps in
//! trading days keep their calendar spacing.

use chrono::{Duration, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use stockstream_core::dashboard::{ChartStyle, Line};

use crate::theme::Theme;

pub struct SeriesChart<'a> {
    title: &'a str,
    lines: &'a [Line],
    style: ChartStyle,
    theme: &'a Theme,
    colors: Option<&'a [Color]>,
    x_labels: Option<[&'a str; 3]>,
}

impl<'a> SeriesChart<'a> {
    pub fn new(title: &'a str, lines: &'a [Line], theme: &'a Theme) -> Self {
        Self {
            title,
            lines,
            style: ChartStyle::Line,
            theme,
            colors: None,
            x_labels: None,
        }
    }

    pub fn style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    /// Fixed colors per line instead of the series palette.
    pub fn colors(mut self, colors: &'a [Color]) -> Self {
        self.colors = Some(colors);
        self
    }

    /// Fixed x-axis labels for charts whose dates stand in for another axis.
    pub fn x_labels(mut self, labels: [&'a str; 3]) -> Self {
        self.x_labels = Some(labels);
        self
    }

    fn color(&self, index: usize) -> Color {
        self.colors
            .and_then(|c| c.get(index).copied())
            .unwrap_or_else(|| self.theme.series_color(index))
    }
}

/// Earliest date and the y extent over every point, `None` when nothing to draw.
fn bounds(lines: &[Line]) -> Option<(NaiveDate, f64, f64, f64)> {
    let mut points = lines.iter().flat_map(|l| l.points.iter());
    let &(first_date, first_value) = points.next()?;
    let mut origin = first_date;
    let mut last = first_date;
    let (mut y_min, mut y_max) = (first_value, first_value);
    for &(date, value) in points {
        origin = origin.min(date);
        last = last.max(date);
        y_min = y_min.min(value);
        y_max = y_max.max(value);
    }
    let x_max = (last - origin).num_days() as f64;
    Some((origin, x_max, y_min, y_max))
}

fn format_value(v: f64) -> String {
    let magnitude = v.abs();
    if magnitude >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if magnitude >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if magnitude >= 1e3 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

impl<'a> Widget for SeriesChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some((origin, x_max, y_min, y_max)) = bounds(self.lines) else {
            let block = Block::default()
                .title(format!(" {} [No Data] ", self.title))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.muted));
            Paragraph::new(Span::styled(
                "No data in range",
                Style::default().fg(self.theme.muted),
            ))
            .block(block)
            .render(area, buf);
            return;
        };

        // Bars and areas hang from zero.
        let (y_min, y_max) = match self.style {
            ChartStyle::Line => (y_min, y_max),
            ChartStyle::Area | ChartStyle::Bar => (y_min.min(0.0), y_max.max(0.0)),
        };
        let y_range = y_max - y_min;
        let y_pad = if y_range > 0.0 { y_range * 0.05 } else { 1.0 };
        let y_lower = y_min - y_pad;
        let y_upper = y_max + y_pad;

        let data: Vec<Vec<(f64, f64)>> = self
            .lines
            .iter()
            .map(|line| {
                line.points
                    .iter()
                    .map(|&(date, v)| ((date - origin).num_days() as f64, v))
                    .collect()
            })
            .collect();

        let (graph_type, marker) = match self.style {
            ChartStyle::Line => (GraphType::Line, symbols::Marker::Braille),
            ChartStyle::Area => (GraphType::Bar, symbols::Marker::Braille),
            ChartStyle::Bar => (GraphType::Bar, symbols::Marker::Bar),
        };

        let datasets: Vec<Dataset> = self
            .lines
            .iter()
            .zip(&data)
            .enumerate()
            .map(|(i, (line, points))| {
                Dataset::default()
                    .name(line.label.clone())
                    .marker(marker)
                    .graph_type(graph_type)
                    .style(Style::default().fg(self.color(i)))
                    .data(points)
            })
            .collect();

        let x_labels: Vec<Span> = match self.x_labels {
            Some(labels) => labels.iter().map(|l| Span::raw(*l)).collect(),
            None => {
                let mid_date = origin + Duration::days((x_max / 2.0) as i64);
                let last_date = origin + Duration::days(x_max as i64);
                [origin, mid_date, last_date]
                    .iter()
                    .map(|date| Span::raw(date.format("%Y-%m-%d").to_string()))
                    .collect()
            }
        };
        let y_labels = vec![
            Span::raw(format_value(y_lower)),
            Span::raw(format_value((y_lower + y_upper) / 2.0)),
            Span::raw(format_value(y_upper)),
        ];

        let chart = Chart::new(datasets)
            .block(
                Block::default()
                    .title(format!(" {} ", self.title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.accent)),
            )
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([0.0, x_max.max(1.0)])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([y_lower, y_upper])
                    .labels(y_labels),
            );

        chart.render(area, buf);
    }
}
