//! Candlestick chart rendered with direct buffer writes.
//!
//! - Each candle = 1 terminal column
//! - Body: block char, green if close >= open, pink otherwise
//! - Wicks: vertical line chars to high/low
//!
//! When there are more bars than columns the most recent bars are shown.

use chrono::NaiveDate;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Widget},
};

use stockstream_core::PriceBar;

use crate::theme::Theme;

/// OHLC candle with its date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Candle {
    /// Candles for every bar with a complete OHLC set.
    pub fn from_bars(bars: &[PriceBar]) -> Vec<Candle> {
        bars.iter()
            .filter_map(|b| {
                b.ohlc().map(|(open, high, low, close)| Candle {
                    date: b.date,
                    open,
                    high,
                    low,
                    close,
                })
            })
            .collect()
    }

    fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

pub struct CandleChart<'a> {
    candles: &'a [Candle],
    symbol: &'a str,
    theme: &'a Theme,
}

impl<'a> CandleChart<'a> {
    pub fn new(candles: &'a [Candle], symbol: &'a str, theme: &'a Theme) -> Self {
        Self {
            candles,
            symbol,
            theme,
        }
    }
}

/// Map a price to a row in the plot area (0 = top).
fn price_to_y(price: f64, y_min: f64, y_max: f64, plot_height: u16) -> u16 {
    if (y_max - y_min).abs() < 1e-9 || plot_height == 0 {
        return 0;
    }
    let frac = (price - y_min) / (y_max - y_min);
    let y = plot_height.saturating_sub(1) as f64 * (1.0 - frac);
    y.round().max(0.0).min(plot_height.saturating_sub(1) as f64) as u16
}

impl<'a> Widget for CandleChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.candles.is_empty() {
            let block = Block::default()
                .title(format!(" {} Candlestick [No Data] ", self.symbol))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(self.theme.muted));
            block.render(area, buf);
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent));
        let inner = block.inner(area);

        // Y-axis labels (8 chars) on the left, dates on the bottom row.
        let label_width: u16 = 8;
        let plot_left = inner.x + label_width;
        let plot_top = inner.y;
        let plot_width = inner.width.saturating_sub(label_width);
        let plot_height = inner.height.saturating_sub(1);

        let start = self.candles.len().saturating_sub(plot_width as usize);
        let visible = &self.candles[start..];

        let up_count = visible.iter().filter(|c| c.is_up()).count();
        let title = format!(
            " {} | {} candles | {} up {} down ",
            self.symbol,
            visible.len(),
            up_count,
            visible.len() - up_count,
        );
        block.title(title).render(area, buf);

        if plot_width == 0 || plot_height == 0 {
            return;
        }

        let y_min = visible.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
        let y_max = visible
            .iter()
            .map(|c| c.high)
            .fold(f64::NEG_INFINITY, f64::max);
        let range = y_max - y_min;
        let pad = if range > 0.0 { range * 0.05 } else { 1.0 };
        let y_lower = y_min - pad;
        let y_upper = y_max + pad;

        let muted = Style::default().fg(self.theme.muted);
        let y_labels = [y_upper, (y_upper + y_lower) / 2.0, y_lower];
        let y_positions = [0u16, plot_height / 2, plot_height.saturating_sub(1)];
        for (value, y_pos) in y_labels.iter().zip(y_positions) {
            buf.set_string(inner.x, plot_top + y_pos, format!("{:>7.1}", value), muted);
        }

        for (i, candle) in visible.iter().enumerate() {
            let x = plot_left + i as u16;
            if x >= inner.right() {
                break;
            }

            let color = if candle.is_up() {
                self.theme.positive
            } else {
                self.theme.negative
            };
            let style = Style::default().fg(color);

            let high_y = price_to_y(candle.high, y_lower, y_upper, plot_height);
            let low_y = price_to_y(candle.low, y_lower, y_upper, plot_height);
            let body_top_y =
                price_to_y(candle.open.max(candle.close), y_lower, y_upper, plot_height);
            let body_bot_y =
                price_to_y(candle.open.min(candle.close), y_lower, y_upper, plot_height);

            for y in high_y..body_top_y {
                buf.set_string(x, plot_top + y, "\u{2502}", style);
            }

            // full block up, medium shade down
            let body_char = if candle.is_up() { "\u{2588}" } else { "\u{2593}" };
            for y in body_top_y..=body_bot_y {
                buf.set_string(x, plot_top + y, body_char, style);
            }

            for y in (body_bot_y + 1)..=low_y {
                buf.set_string(x, plot_top + y, "\u{2502}", style);
            }
        }

        let axis_y = plot_top + plot_height;
        if axis_y < inner.bottom() {
            if let (Some(first), Some(last)) = (visible.first(), visible.last()) {
                let first_label = first.date.format("%Y-%m-%d").to_string();
                let last_label = last.date.format("%Y-%m-%d").to_string();
                buf.set_string(plot_left, axis_y, &first_label, muted);
                let last_x = inner
                    .right()
                    .saturating_sub(last_label.len() as u16)
                    .max(plot_left + first_label.len() as u16 + 1);
                if last_x + last_label.len() as u16 <= inner.right() {
                    buf.set_string(last_x, axis_y, &last_label, muted);
                }
            }
        }
    }
}
