//! Input handling
//!
//! Maps keyboard events to state transitions with context-sensitive bindings.

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::state::{AppState, Control, FocusedWidget};
use crate::style::StyleId;

/// Handle an input event
pub fn handle_event(event: Event, state: &mut AppState) -> Result<()> {
    match event {
        Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
            handle_key_event(key_event, state)
        }
        Event::Paste(text) => {
            handle_paste(&text, state);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Handle a key event
fn handle_key_event(key: KeyEvent, state: &mut AppState) -> Result<()> {
    if state.show_help {
        return handle_help_input(key, state);
    }

    if state.avatar_prompt_active {
        return handle_avatar_prompt_input(key, state);
    }

    if state.editing.is_some() {
        return handle_text_input(key, state);
    }

    // Global shortcuts
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            state.should_quit = true;
            return Ok(());
        }
        KeyCode::Char('?') => {
            state.show_help = true;
            return Ok(());
        }
        KeyCode::Tab => {
            state.focus = state.focus.next();
            return Ok(());
        }
        KeyCode::BackTab => {
            state.focus = state.focus.prev();
            return Ok(());
        }
        KeyCode::Char('1') => state.set_style(StyleId::TgAndroid),
        KeyCode::Char('2') => state.set_style(StyleId::TgIos),
        KeyCode::Char('3') => state.set_style(StyleId::Vk),
        KeyCode::Char('e') | KeyCode::Char('E') if state.focus == FocusedWidget::Preview => {
            state.trigger_export()
        }
        KeyCode::Char('E') => state.trigger_export(),
        KeyCode::Char('c') | KeyCode::Char('C') => state.copy_last_export(),
        KeyCode::Char('z') | KeyCode::Char('Z') => state.toggle_zoom(),
        _ => {
            if state.focus == FocusedWidget::Controls {
                handle_control_panel_input(key, state);
            }
        }
    }
    Ok(())
}

/// Handle input when help overlay is shown
fn handle_help_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Char('?') | KeyCode::Esc | KeyCode::Enter => {
            state.show_help = false;
        }
        _ => {}
    }
    Ok(())
}

/// Keystrokes while a text field is being edited
fn handle_text_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Esc => state.finish_edit(),
        KeyCode::Enter => {
            // Alt+Enter finishes a multi-line field, plain Enter adds a line
            if key.modifiers.contains(KeyModifiers::ALT) || !state.edit_newline() {
                state.finish_edit();
            }
        }
        KeyCode::Backspace => state.edit_pop(),
        KeyCode::Char('j') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            state.edit_newline();
        }
        KeyCode::Char(c) => state.edit_push(c),
        _ => {}
    }
    Ok(())
}

/// Handle input for the avatar path prompt
fn handle_avatar_prompt_input(key: KeyEvent, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Esc => state.cancel_avatar_prompt(),
        KeyCode::Enter => state.submit_avatar_prompt(),
        KeyCode::Backspace => {
            state.avatar_prompt_input.pop();
        }
        KeyCode::Char(c) => state.avatar_prompt_input.push(c),
        _ => {}
    }
    Ok(())
}

/// Bracketed paste goes into whatever is being typed
fn handle_paste(text: &str, state: &mut AppState) {
    if state.avatar_prompt_active {
        state.avatar_prompt_input.push_str(text.trim());
    } else if state.editing.is_some() {
        for c in text.chars() {
            match c {
                '\r' => {}
                '\n' => {
                    state.edit_newline();
                }
                c => state.edit_push(c),
            }
        }
    }
}

/// Handle input for the control panel
fn handle_control_panel_input(key: KeyEvent, state: &mut AppState) {
    let control = state.selected_control();
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.prev_control(),
        KeyCode::Down | KeyCode::Char('j') => state.next_control(),

        KeyCode::Left | KeyCode::Char('h') if control == Control::Style => state.prev_style(),
        KeyCode::Right | KeyCode::Char('l') if control == Control::Style => state.next_style(),

        KeyCode::Char(' ') | KeyCode::Enter => activate_control(control, state),
        _ => {}
    }
}

fn activate_control(control: Control, state: &mut AppState) {
    if let Some(field) = control.field() {
        state.begin_edit(field);
        return;
    }
    match control {
        Control::Style => state.next_style(),
        Control::Read => state.toggle_read(),
        Control::Avatar => state.start_avatar_prompt(),
        Control::Export => state.trigger_export(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crossbeam_channel::unbounded;
    use crossterm::event::KeyEvent;

    fn press(state: &mut AppState, code: KeyCode) {
        handle_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)), state).unwrap();
    }

    fn type_str(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_type_message_with_line_break() {
        let (tx, _rx) = unbounded();
        let mut state = AppState::new(Config::default(), tx);

        press(&mut state, KeyCode::Down);
        press(&mut state, KeyCode::Down);
        assert_eq!(state.selected_control(), Control::Message);
        press(&mut state, KeyCode::Enter);
        type_str(&mut state, "line1");
        press(&mut state, KeyCode::Enter);
        type_str(&mut state, "line2");
        press(&mut state, KeyCode::Esc);

        assert_eq!(state.controller.node().body, "line1\nline2");
        assert!(state.editing.is_none());
    }

    #[test]
    fn test_quit_is_literal_while_editing() {
        let (tx, _rx) = unbounded();
        let mut state = AppState::new(Config::default(), tx);
        state.begin_edit(crate::draft::Field::SenderName);
        type_str(&mut state, "Qq");
        assert!(!state.should_quit);
        assert_eq!(state.controller.node().name, "Qq");
    }

    #[test]
    fn test_style_shortcuts_and_read_toggle() {
        let (tx, _rx) = unbounded();
        let mut state = AppState::new(Config::default(), tx);
        press(&mut state, KeyCode::Char('3'));
        assert_eq!(state.controller.style(), StyleId::Vk);
        press(&mut state, KeyCode::Right);
        assert_eq!(state.controller.style(), StyleId::TgAndroid);

        for _ in 0..4 {
            press(&mut state, KeyCode::Down);
        }
        assert_eq!(state.selected_control(), Control::Read);
        press(&mut state, KeyCode::Char(' '));
        assert!(state.controller.draft().is_read);
    }

    #[test]
    fn test_paste_into_message() {
        let (tx, _rx) = unbounded();
        let mut state = AppState::new(Config::default(), tx);
        state.begin_edit(crate::draft::Field::BodyText);
        handle_event(Event::Paste("a\r\nb".to_string()), &mut state).unwrap();
        assert_eq!(state.controller.node().body, "a\nb");
    }
}
