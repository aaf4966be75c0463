//! Overlay widgets: keyboard help and error history.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::AppState;
use crate::theme;
use crate::ui::centered_rect;

pub fn render_help(f: &mut Frame, area: Rect) {
    let popup = centered_rect(70, 80, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::accent())
        .title(" Keyboard Shortcuts [any key]close ")
        .title_style(theme::accent_bold());

    let mut lines: Vec<Line> = Vec::new();

    section(&mut lines, "Global");
    key(&mut lines, "1-4", "Switch to panel by number");
    key(&mut lines, "Tab / Shift+Tab", "Cycle panels forward / back");
    key(&mut lines, "e", "Open error history");
    key(&mut lines, "?", "This help");
    key(&mut lines, "q", "Quit");
    lines.push(Line::from(""));

    section(&mut lines, "Date range");
    key(&mut lines, "[ / ]", "Move start date back / forward one month");
    key(&mut lines, ", / .", "Move start date back / forward one day");
    key(&mut lines, "{ / }", "Move end date back / forward one month");
    key(&mut lines, "< / >", "Move end date back / forward one day");
    key(&mut lines, "t", "Reset end date to today");
    lines.push(Line::from(""));

    section(&mut lines, "Company list");
    key(&mut lines, "j / k", "Move cursor down / up");
    key(&mut lines, "PgDn / PgUp", "Scroll the data table");
    lines.push(Line::from(""));

    section(&mut lines, "Comparison");
    key(&mut lines, "Space / Enter", "Toggle company selection");
    key(&mut lines, "x", "Clear selection");
    key(&mut lines, "c", "Cycle chart style (line, area, bar)");
    lines.push(Line::from(""));

    section(&mut lines, "Real-Time");
    key(&mut lines, "Space", "Choose company");
    key(&mut lines, "Enter", "Choose company and search");
    key(&mut lines, "c", "Toggle candlestick / line chart");
    lines.push(Line::from(""));

    section(&mut lines, "Prediction");
    key(&mut lines, "Space / Enter", "Choose company");
    key(&mut lines, "h / l", "Fewer / more years of prediction (1-4)");

    f.render_widget(Paragraph::new(lines).block(block), popup);
}

/// Error history overlay.
pub fn render_error_history(f: &mut Frame, area: Rect, app: &AppState) {
    let popup = centered_rect(80, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::negative())
        .title(format!(
            " Error History ({}) [Esc]close [j/k]scroll ",
            app.error_history.len()
        ))
        .title_style(theme::negative());

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if app.error_history.is_empty() {
        let text = Paragraph::new(Span::styled("No errors recorded.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (i, err) in app
        .error_history
        .iter()
        .enumerate()
        .skip(app.error_scroll)
        .take(inner.height as usize)
    {
        let style = if i == app.error_scroll {
            theme::negative().add_modifier(Modifier::BOLD)
        } else {
            theme::muted()
        };

        lines.push(Line::from(vec![
            Span::styled(
                format!("[{}] ", err.timestamp.format("%H:%M:%S")),
                theme::muted(),
            ),
            Span::styled(format!("[{}] ", err.category.label()), theme::warning()),
            Span::styled(err.message.as_str(), style),
        ]));

        if !err.context.is_empty() {
            lines.push(Line::from(vec![
                Span::raw("  "),
                Span::styled(err.context.as_str(), theme::muted()),
            ]));
        }
    }

    f.render_widget(Paragraph::new(lines), inner);
}

fn section(lines: &mut Vec<Line<'_>>, title: &str) {
    lines.push(Line::from(Span::styled(title.to_string(), theme::accent_bold())));
}

fn key(lines: &mut Vec<Line<'_>>, keys: &str, desc: &str) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:>16}  ", keys), theme::accent()),
        Span::styled(desc.to_string(), theme::muted()),
    ]));
}
