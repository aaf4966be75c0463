//! Sidebar: date range, panel controls and the company list.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use stockstream_core::dashboard::PanelKind;

use crate::app::AppState;
use crate::theme;

pub fn render(f: &mut Frame, area: Rect, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(3)])
        .split(area);

    render_controls(f, chunks[0], app);
    render_companies(f, chunks[1], app);
}

fn render_controls(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(" Controls ")
        .title_style(theme::accent_bold());

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Start  ", theme::muted()),
            Span::styled(app.range.start.format("%Y-%m-%d").to_string(), theme::text()),
            Span::styled("  [ ] , .", theme::muted()),
        ]),
        Line::from(vec![
            Span::styled("End    ", theme::muted()),
            Span::styled(app.range.end.format("%Y-%m-%d").to_string(), theme::text()),
            Span::styled("  { } < > t", theme::muted()),
        ]),
    ];
    if app.range.is_inverted() {
        lines.push(Line::from(Span::styled(
            "Start is after end",
            theme::warning(),
        )));
    }

    let (label, value) = match app.active_panel {
        PanelKind::Comparison => ("Chart  ", app.comparison.style.label().to_string()),
        PanelKind::RealTime => ("Chart  ", app.realtime.style.label().to_string()),
        PanelKind::Prediction => (
            "Years  ",
            format!("{}  (h/l)", app.prediction.horizon.years()),
        ),
        PanelKind::About => ("", String::new()),
    };
    lines.push(Line::from(vec![
        Span::styled(label, theme::muted()),
        Span::styled(value, theme::accent()),
    ]));

    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_companies(f: &mut Frame, area: Rect, app: &AppState) {
    let (cursor, hint) = match app.active_panel {
        PanelKind::Comparison => (app.comparison.cursor, "Space: toggle"),
        PanelKind::RealTime => (app.realtime.company.cursor, "Enter: search"),
        PanelKind::Prediction => (app.prediction.company.cursor, "Enter: choose"),
        PanelKind::About => (0, ""),
    };

    let items: Vec<ListItem> = app
        .companies
        .iter()
        .map(|company| {
            let (marker, picked) = marker(app, company);
            let style = if picked {
                theme::accent()
            } else {
                theme::text()
            };
            ListItem::new(Line::from(vec![
                Span::styled(marker, theme::neutral()),
                Span::styled(company.as_str(), style),
            ]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::muted())
        .title(format!(" Companies ({}) {} ", app.companies.len(), hint))
        .title_style(theme::accent_bold());

    let list = List::new(items)
        .block(block)
        .highlight_style(theme::accent_bold().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    if !app.companies.is_empty() {
        state.select(Some(cursor.min(app.companies.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

/// Checkbox for the multi-select list, radio button for the single-select ones.
fn marker(app: &AppState, company: &str) -> (&'static str, bool) {
    match app.active_panel {
        PanelKind::Comparison => {
            if app.comparison.is_selected(company) {
                ("[x] ", true)
            } else {
                ("[ ] ", false)
            }
        }
        PanelKind::RealTime | PanelKind::Prediction => {
            let chosen = if app.active_panel == PanelKind::RealTime {
                app.realtime.company.chosen.as_deref()
            } else {
                app.prediction.company.chosen.as_deref()
            };
            if chosen == Some(company) {
                ("(*) ", true)
            } else {
                ("( ) ", false)
            }
        }
        PanelKind::About => ("", false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_app;

    #[test]
    fn markers_follow_panel() {
        let mut app = test_app();
        app.comparison.toggle("Apple Inc");
        assert_eq!(marker(&app, "Apple Inc"), ("[x] ", true));
        assert_eq!(marker(&app, "Ghost Holdings"), ("[ ] ", false));

        app.switch_panel(PanelKind::Prediction);
        app.prediction.company.chosen = Some("Ghost Holdings".into());
        assert_eq!(marker(&app, "Ghost Holdings"), ("(*) ", true));
        assert_eq!(marker(&app, "Apple Inc"), ("( ) ", false));
    }
}
