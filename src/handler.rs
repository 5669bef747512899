use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::{App, FocusPane};
use crate::tui::AppEvent;

const WHEEL_ROWS: u16 = 3;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => app.sync_scroll(),
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Answer(outcome) => app.on_answer(outcome),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any pane
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Tab => return app.focus_next(),
        KeyCode::BackTab => return app.focus_prev(),
        KeyCode::PageDown => return app.scroll_down(app.half_page()),
        KeyCode::PageUp => return app.scroll_up(app.half_page()),
        _ => {}
    }

    match app.view().focus {
        FocusPane::Input => handle_input_key(app, key),
        FocusPane::Send => handle_send_key(app, key),
        FocusPane::Transcript => handle_transcript_key(app, key),
    }
}

fn handle_input_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // Commit key
        KeyCode::Enter => {
            app.submit();
        }
        KeyCode::Esc => app.view_mut().focus = FocusPane::Transcript,
        KeyCode::Backspace => app.session.input_mut().backspace(),
        KeyCode::Delete => app.session.input_mut().delete(),
        KeyCode::Left => app.session.input_mut().move_left(),
        KeyCode::Right => app.session.input_mut().move_right(),
        KeyCode::Home => app.session.input_mut().move_home(),
        KeyCode::End => app.session.input_mut().move_end(),
        // Shift is fine (uppercase), other chords are not text
        KeyCode::Char(c)
            if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            app.session.input_mut().insert_char(c)
        }
        _ => {}
    }
}

fn handle_send_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => {
            app.submit();
        }
        KeyCode::Esc => app.view_mut().focus = FocusPane::Input,
        _ => {}
    }
}

fn handle_transcript_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::Char('d') if ctrl => app.scroll_down(app.half_page()),
        KeyCode::Char('u') if ctrl => app.scroll_up(app.half_page()),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),

        // Back to typing
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('i') => {
            app.view_mut().focus = FocusPane::Input
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

    let view = app.view();
    let in_chat = view.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_input = view.input_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_send = view.send_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        // Only one scrollable pane, so the wheel always scrolls the transcript
        MouseEventKind::ScrollDown => app.scroll_down(WHEEL_ROWS),
        MouseEventKind::ScrollUp => app.scroll_up(WHEEL_ROWS),
        MouseEventKind::Down(MouseButton::Left) => {
            if in_send {
                app.view_mut().focus = FocusPane::Send;
                app.submit();
            } else if in_input {
                app.view_mut().focus = FocusPane::Input;
            } else if in_chat {
                app.view_mut().focus = FocusPane::Transcript;
            }
        }
        _ => {}
    }
}
