//! Top-level UI layout: sidebar, active panel and status bar.

pub mod about_panel;
pub mod comparison_panel;
pub mod overlays;
pub mod prediction_panel;
pub mod realtime_panel;
pub mod sidebar;
pub mod status_bar;
pub mod widgets;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use stockstream_core::dashboard::{PanelKind, PanelView};

use crate::app::{AppState, Overlay};
use crate::theme;

const SIDEBAR_WIDTH: u16 = 34;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    let columns = if app.active_panel == PanelKind::About {
        vec![main_area]
    } else {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
            .split(main_area)
            .to_vec()
    };

    if let [sidebar_area, panel_area] = columns[..] {
        sidebar::render(f, sidebar_area, app);
        draw_panel(f, panel_area, app);
    } else {
        draw_panel(f, main_area, app);
    }

    status_bar::render(f, status_area, app);

    match app.overlay {
        Overlay::Help => overlays::render_help(f, main_area),
        Overlay::ErrorHistory => overlays::render_error_history(f, main_area, app),
        Overlay::None => {}
    }
}

/// Draw the active panel with its border.
fn draw_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let panel = app.active_panel;

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(true))
        .title(format!(" {} [{}] ", panel.label(), panel.index() + 1))
        .title_style(theme::panel_title(true));

    let inner = block.inner(area);
    f.render_widget(block, area);

    // A view left over from another panel is stale until the next refresh.
    let view = app.view.as_ref().filter(|v| v.kind() == panel);

    match view {
        Some(PanelView::Prompt { message, .. }) => render_prompt(f, inner, message),
        Some(PanelView::Comparison(view)) => comparison_panel::render(f, inner, app, view),
        Some(PanelView::RealTime(view)) => realtime_panel::render(f, inner, app, view),
        Some(PanelView::Prediction(view)) => prediction_panel::render(f, inner, app, view),
        Some(PanelView::About) => about_panel::render(f, inner),
        None if app.dirty => render_prompt(f, inner, "Loading..."),
        None => render_prompt(f, inner, "Could not load this panel. Press e for details."),
    }
}

/// Centered one-message body used for prompts and placeholders.
pub fn render_prompt(f: &mut Frame, area: Rect, message: &str) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let para = Paragraph::new(Line::from(Span::styled(message, theme::warning())))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(para, rows[1]);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
