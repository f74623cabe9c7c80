use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, Focus};
use crate::tui::AppEvent;

/// Rows moved per mouse wheel notch
const WHEEL_ROWS: u16 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        // Viewport size is refreshed on the next draw
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply { generation, outcome } => app.apply_reply(generation, outcome),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any focus
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('n') => app.new_chat(),
            KeyCode::Char('b') => app.toggle_sidebar(),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::PageUp => return app.scroll_up(app.page_rows()),
        KeyCode::PageDown => return app.scroll_down(app.page_rows()),
        KeyCode::Tab | KeyCode::BackTab => return app.toggle_focus(),
        _ => {}
    }

    match app.focus.target {
        Focus::Composer => handle_composer(app, key),
        Focus::Suggestions => handle_suggestions(app, key),
    }
}

fn handle_suggestions(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.move_suggestion(0, -1),
        KeyCode::Right | KeyCode::Char('l') => app.move_suggestion(0, 1),
        KeyCode::Up | KeyCode::Char('k') => app.move_suggestion(-1, 0),
        KeyCode::Down | KeyCode::Char('j') => app.move_suggestion(1, 0),
        KeyCode::Enter => app.choose_suggestion(app.focus.suggestion),
        KeyCode::Esc => app.focus.target = Focus::Composer,
        _ => {}
    }
}

fn handle_composer(app: &mut App, key: KeyEvent) {
    // Transcript scrolling stays available while a reply is pending
    match key.code {
        KeyCode::Up => return app.scroll_up(1),
        KeyCode::Down => return app.scroll_down(1),
        _ => {}
    }

    // The composer is disabled until the reply lands
    if app.session.is_pending() {
        return;
    }

    match key.code {
        KeyCode::Enter if !key.modifiers.contains(KeyModifiers::SHIFT) => app.submit(),
        KeyCode::Backspace => {
            if app.composer_cursor > 0 {
                app.composer_cursor -= 1;
                let draft = app.session.draft_mut();
                let byte_pos = char_to_byte_index(draft, app.composer_cursor);
                draft.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let draft = app.session.draft_mut();
            if app.composer_cursor < draft.chars().count() {
                let byte_pos = char_to_byte_index(draft, app.composer_cursor);
                draft.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.composer_cursor = app.composer_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.session.draft().chars().count();
            app.composer_cursor = (app.composer_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.composer_cursor = 0;
        }
        KeyCode::End => {
            app.composer_cursor = app.session.draft().chars().count();
        }
        KeyCode::Char(c) => {
            let draft = app.session.draft_mut();
            let byte_pos = char_to_byte_index(draft, app.composer_cursor);
            draft.insert(byte_pos, c);
            app.composer_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if app.chat_area.is_some_and(|r| point_in_rect(x, y, r)) {
                app.scroll_down(WHEEL_ROWS);
            }
        }
        MouseEventKind::ScrollUp => {
            if app.chat_area.is_some_and(|r| point_in_rect(x, y, r)) {
                app.scroll_up(WHEEL_ROWS);
            }
        }
        MouseEventKind::Down(MouseButton::Left) => {
            if app.new_chat_area.is_some_and(|r| point_in_rect(x, y, r)) {
                app.new_chat();
            } else if app.send_area.is_some_and(|r| point_in_rect(x, y, r)) {
                app.submit();
            } else if let Some(index) = app
                .suggestion_areas
                .iter()
                .position(|r| point_in_rect(x, y, *r))
            {
                app.choose_suggestion(index);
            }
        }
        _ => {}
    }
}
