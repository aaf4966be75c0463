//! Bottom status bar: panel hints and the last status message.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use stockstream_core::dashboard::PanelKind;

use crate::app::{AppState, StatusLevel};
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let mut spans: Vec<Span> = Vec::new();

    for panel in PanelKind::ALL {
        let style = if panel == app.active_panel {
            theme::accent_bold()
        } else {
            theme::muted()
        };
        spans.push(Span::styled(
            format!(" {}:{}", panel.index() + 1, short_label(panel)),
            style,
        ));
    }
    spans.push(Span::styled(" ?:help e:errors q:quit", theme::muted()));

    spans.push(Span::raw(" | "));

    if let Some((msg, level)) = &app.status_message {
        let style = match level {
            StatusLevel::Info => theme::accent(),
            StatusLevel::Warning => theme::warning(),
            StatusLevel::Error => theme::negative(),
        };
        spans.push(Span::styled(msg.as_str(), style));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn short_label(panel: PanelKind) -> &'static str {
    match panel {
        PanelKind::Comparison => "Compare",
        PanelKind::RealTime => "Real-Time",
        PanelKind::Prediction => "Predict",
        PanelKind::About => "About",
    }
}
