//! Panel 4: static description.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use stockstream_core::dashboard::ABOUT_TEXT;

use crate::theme;

pub fn render(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("StockStream", theme::accent_bold())),
        Line::from(""),
        Line::from(Span::styled(ABOUT_TEXT, theme::text())),
        Line::from(""),
        Line::from(Span::styled(
            "Market data: Yahoo Finance daily bars. Press ? for keyboard shortcuts.",
            theme::muted(),
        )),
    ];
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}
