//! Keyboard input dispatch: overlays, then global keys, then panel handlers.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use stockstream_core::dashboard::PanelKind;

use crate::app::{AppState, DateStep, Overlay};

const PAGE: usize = 10;

pub fn handle_key(app: &mut AppState, key: KeyEvent) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    match app.overlay {
        Overlay::ErrorHistory => {
            handle_error_overlay(app, key);
            return;
        }
        Overlay::Help => {
            app.overlay = Overlay::None;
            return;
        }
        Overlay::None => {}
    }

    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            if let Some(panel) = PanelKind::from_index(index) {
                app.switch_panel(panel);
            }
            return;
        }
        KeyCode::Tab => {
            let panel = if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.active_panel.prev()
            } else {
                app.active_panel.next()
            };
            app.switch_panel(panel);
            return;
        }
        KeyCode::BackTab => {
            app.switch_panel(app.active_panel.prev());
            return;
        }
        KeyCode::Char('?') => {
            app.overlay = Overlay::Help;
            return;
        }
        KeyCode::Char('e') => {
            app.error_scroll = 0;
            app.overlay = Overlay::ErrorHistory;
            return;
        }
        _ => {}
    }

    if app.active_panel == PanelKind::About {
        return;
    }

    if handle_date_key(app, key) || handle_list_key(app, key) {
        return;
    }

    match app.active_panel {
        PanelKind::Comparison => handle_comparison_key(app, key),
        PanelKind::RealTime => handle_realtime_key(app, key),
        PanelKind::Prediction => handle_prediction_key(app, key),
        PanelKind::About => {}
    }
}

fn handle_error_overlay(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('e') => {
            app.overlay = Overlay::None;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if app.error_scroll + 1 < app.error_history.len() {
                app.error_scroll += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.error_scroll = app.error_scroll.saturating_sub(1);
        }
        _ => {}
    }
}

/// Date range controls shared by the data panels.
fn handle_date_key(app: &mut AppState, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('[') => app.shift_start(DateStep::Months(-1)),
        KeyCode::Char(']') => app.shift_start(DateStep::Months(1)),
        KeyCode::Char(',') => app.shift_start(DateStep::Days(-1)),
        KeyCode::Char('.') => app.shift_start(DateStep::Days(1)),
        KeyCode::Char('{') => app.shift_end(DateStep::Months(-1)),
        KeyCode::Char('}') => app.shift_end(DateStep::Months(1)),
        KeyCode::Char('<') => app.shift_end(DateStep::Days(-1)),
        KeyCode::Char('>') => app.shift_end(DateStep::Days(1)),
        KeyCode::Char('t') => app.reset_end(),
        _ => return false,
    }
    true
}

/// Cursor movement in the company list and table scrolling.
fn handle_list_key(app: &mut AppState, key: KeyEvent) -> bool {
    let last = app.companies.len().saturating_sub(1);
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(cursor) = app.cursor_mut() {
                *cursor = (*cursor + 1).min(last);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(cursor) = app.cursor_mut() {
                *cursor = cursor.saturating_sub(1);
            }
        }
        KeyCode::PageDown => {
            if let Some(scroll) = scroll_mut(app) {
                *scroll += PAGE;
            }
        }
        KeyCode::PageUp => {
            if let Some(scroll) = scroll_mut(app) {
                *scroll = scroll.saturating_sub(PAGE);
            }
        }
        _ => return false,
    }
    true
}

fn scroll_mut(app: &mut AppState) -> Option<&mut usize> {
    match app.active_panel {
        PanelKind::Comparison => Some(&mut app.comparison.scroll),
        PanelKind::RealTime => Some(&mut app.realtime.company.scroll),
        PanelKind::Prediction => Some(&mut app.prediction.company.scroll),
        PanelKind::About => None,
    }
}

fn handle_comparison_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => {
            if let Some(company) = app.cursor_company().map(str::to_owned) {
                app.comparison.toggle(&company);
                app.comparison.scroll = 0;
                app.dirty = true;
            }
        }
        KeyCode::Char('x') => {
            if !app.comparison.selected.is_empty() {
                app.comparison.selected.clear();
                app.dirty = true;
            }
        }
        KeyCode::Char('c') => {
            app.comparison.style = app.comparison.style.next();
            app.dirty = true;
        }
        _ => {}
    }
}

fn handle_realtime_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char(' ') => {
            choose_company(app);
        }
        KeyCode::Enter => {
            choose_company(app);
            app.realtime.search_pending = true;
            app.dirty = true;
        }
        KeyCode::Char('c') => {
            app.realtime.style = app.realtime.style.next();
            app.dirty = true;
        }
        _ => {}
    }
}

fn handle_prediction_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Char(' ') | KeyCode::Enter => choose_company(app),
        KeyCode::Char('l') | KeyCode::Right => {
            let next = app.prediction.horizon.increment();
            if next != app.prediction.horizon {
                app.prediction.horizon = next;
                app.dirty = true;
            }
        }
        KeyCode::Char('h') | KeyCode::Left => {
            let prev = app.prediction.horizon.decrement();
            if prev != app.prediction.horizon {
                app.prediction.horizon = prev;
                app.dirty = true;
            }
        }
        _ => {}
    }
}

/// Make the company under the cursor the active one for a single-company panel.
fn choose_company(app: &mut AppState) {
    let Some(company) = app.cursor_company().map(str::to_owned) else {
        return;
    };
    let state = match app.active_panel {
        PanelKind::RealTime => &mut app.realtime.company,
        PanelKind::Prediction => &mut app.prediction.company,
        _ => return,
    };
    if state.chosen.as_deref() != Some(company.as_str()) {
        state.chosen = Some(company);
        state.scroll = 0;
        app.dirty = true;
    }
}
