//! Tests for the crossterm terminal

use super::*;
use crossterm::event::KeyEventState;

fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

#[test]
fn test_terminal_new_is_inert() {
    // Dropping a terminal that was never initialized must not touch the tty state
    let terminal = Terminal::new();
    assert!(!terminal.raw_mode_enabled);
    assert!(!terminal.alternate_screen_enabled);
}

#[test]
fn test_translate_key_event() {
    assert_eq!(
        translate_key_event(press(KeyCode::Char('a'), KeyModifiers::empty())),
        Some(KeyDescriptor::char('a'))
    );
    // Shift is already in the character
    assert_eq!(
        translate_key_event(press(KeyCode::Char('G'), KeyModifiers::SHIFT)),
        Some(KeyDescriptor::char('G'))
    );
    assert_eq!(
        translate_key_event(press(KeyCode::Char('R'), KeyModifiers::CONTROL)),
        Some(KeyDescriptor::ctrl('r'))
    );
    assert_eq!(
        translate_key_event(press(KeyCode::Up, KeyModifiers::empty())),
        Some(KeyDescriptor::plain(Key::ArrowUp))
    );
    assert_eq!(
        translate_key_event(press(KeyCode::Esc, KeyModifiers::empty())),
        Some(KeyDescriptor::plain(Key::Escape))
    );
}

#[test]
fn test_translate_enter_variants() {
    for code in [KeyCode::Enter, KeyCode::Char('\r'), KeyCode::Char('\n')] {
        assert_eq!(
            translate_key_event(press(code, KeyModifiers::empty())),
            Some(KeyDescriptor::plain(Key::Enter))
        );
    }
}

#[test]
fn test_translate_unknown_keys() {
    assert_eq!(translate_key_event(press(KeyCode::F(5), KeyModifiers::empty())), None);
    assert_eq!(translate_key_event(press(KeyCode::Insert, KeyModifiers::empty())), None);
}

#[test]
fn test_scroll_top() {
    assert_eq!(scroll_top(0, 5, 10), 0);
    assert_eq!(scroll_top(0, 10, 10), 1);
    assert_eq!(scroll_top(8, 3, 10), 3);
    assert_eq!(scroll_top(0, 4, 0), 4);
}

#[test]
fn test_display_col_counts_cells() {
    assert_eq!(display_col("abc", 2), 2);
    assert_eq!(display_col("日本語", 2), 4);
    assert_eq!(display_col("ab", 9), 2);
}

#[test]
fn test_fit_to_width() {
    assert_eq!(fit_to_width("hello", 3), "hel");
    assert_eq!(fit_to_width("hello", 10), "hello");
    assert_eq!(fit_to_width("日本語", 5), "日本");
    assert_eq!(fit_to_width("abc", 0), "");
}
