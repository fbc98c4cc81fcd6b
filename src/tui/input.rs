use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Represents the result of handling a key event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Quit the application
    Quit,
    /// Next card
    Next,
    /// Previous card
    Previous,
    /// Turn the card over
    Flip,
    /// Save or unsave the current image
    ToggleFavorite,
    /// Open the current image in the system viewer
    Open,
    /// Leave the session for the selection screen
    Back,
    /// Move the selection cursor up
    Up,
    /// Move the selection cursor down
    Down,
    /// Start a session from the highlighted card
    Select,
    /// Toggle help overlay
    Help,
    /// No action
    None,
}

fn is_quit(key: &KeyEvent) -> bool {
    matches!(
        (key.code, key.modifiers),
        (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Char('c'), KeyModifiers::CONTROL)
    )
}

/// Maps keyboard events on the card screen
pub fn handle_card_key(key: KeyEvent) -> KeyAction {
    if is_quit(&key) {
        return KeyAction::Quit;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Right, KeyModifiers::NONE) => KeyAction::Next,
        (KeyCode::Char('l'), KeyModifiers::NONE) => KeyAction::Next,

        (KeyCode::Left, KeyModifiers::NONE) => KeyAction::Previous,
        (KeyCode::Char('h'), KeyModifiers::NONE) => KeyAction::Previous,

        (KeyCode::Char(' '), KeyModifiers::NONE) => KeyAction::Flip,
        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::Flip,
        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Flip,
        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::Flip,

        (KeyCode::Char('f'), KeyModifiers::NONE) => KeyAction::ToggleFavorite,
        (KeyCode::Char('o'), KeyModifiers::NONE) => KeyAction::Open,

        (KeyCode::Char('b'), KeyModifiers::NONE) => KeyAction::Back,
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Back,
        (KeyCode::Backspace, KeyModifiers::NONE) => KeyAction::Back,

        (KeyCode::Char('?'), _) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

/// Maps keyboard events on the selection screen
pub fn handle_selection_key(key: KeyEvent) -> KeyAction {
    if is_quit(&key) {
        return KeyAction::Quit;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Esc, KeyModifiers::NONE) => KeyAction::Quit,

        (KeyCode::Up, KeyModifiers::NONE) => KeyAction::Up,
        (KeyCode::Char('k'), KeyModifiers::NONE) => KeyAction::Up,
        (KeyCode::BackTab, _) => KeyAction::Up,

        (KeyCode::Down, KeyModifiers::NONE) => KeyAction::Down,
        (KeyCode::Char('j'), KeyModifiers::NONE) => KeyAction::Down,
        (KeyCode::Tab, KeyModifiers::NONE) => KeyAction::Down,

        (KeyCode::Enter, KeyModifiers::NONE) => KeyAction::Select,
        (KeyCode::Char(' '), KeyModifiers::NONE) => KeyAction::Select,
        (KeyCode::Right, KeyModifiers::NONE) => KeyAction::Select,

        (KeyCode::Char('?'), _) => KeyAction::Help,

        _ => KeyAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    mod card_key_tests {
        use super::*;

        #[test]
        fn test_key_quit() {
            assert_eq!(handle_card_key(key(KeyCode::Char('q'))), KeyAction::Quit);
            assert_eq!(
                handle_card_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
                KeyAction::Quit
            );
        }

        #[test]
        fn test_key_navigation() {
            assert_eq!(handle_card_key(key(KeyCode::Right)), KeyAction::Next);
            assert_eq!(handle_card_key(key(KeyCode::Char('l'))), KeyAction::Next);
            assert_eq!(handle_card_key(key(KeyCode::Left)), KeyAction::Previous);
            assert_eq!(handle_card_key(key(KeyCode::Char('h'))), KeyAction::Previous);
        }

        #[test]
        fn test_key_flip() {
            assert_eq!(handle_card_key(key(KeyCode::Char(' '))), KeyAction::Flip);
            assert_eq!(handle_card_key(key(KeyCode::Enter)), KeyAction::Flip);
            assert_eq!(handle_card_key(key(KeyCode::Up)), KeyAction::Flip);
        }

        #[test]
        fn test_key_favorite_and_open() {
            assert_eq!(
                handle_card_key(key(KeyCode::Char('f'))),
                KeyAction::ToggleFavorite
            );
            assert_eq!(handle_card_key(key(KeyCode::Char('o'))), KeyAction::Open);
        }

        #[test]
        fn test_key_back() {
            assert_eq!(handle_card_key(key(KeyCode::Esc)), KeyAction::Back);
            assert_eq!(handle_card_key(key(KeyCode::Char('b'))), KeyAction::Back);
        }

        #[test]
        fn test_key_help_with_shift() {
            // Some terminals report '?' with SHIFT
            assert_eq!(
                handle_card_key(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT)),
                KeyAction::Help
            );
        }

        #[test]
        fn test_key_none() {
            assert_eq!(handle_card_key(key(KeyCode::Char('x'))), KeyAction::None);
            assert_eq!(
                handle_card_key(KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL)),
                KeyAction::None
            );
        }
    }

    mod selection_key_tests {
        use super::*;

        #[test]
        fn test_cursor_keys() {
            assert_eq!(handle_selection_key(key(KeyCode::Up)), KeyAction::Up);
            assert_eq!(handle_selection_key(key(KeyCode::Char('k'))), KeyAction::Up);
            assert_eq!(handle_selection_key(key(KeyCode::Down)), KeyAction::Down);
            assert_eq!(handle_selection_key(key(KeyCode::Char('j'))), KeyAction::Down);
        }

        #[test]
        fn test_select_keys() {
            assert_eq!(handle_selection_key(key(KeyCode::Enter)), KeyAction::Select);
            assert_eq!(handle_selection_key(key(KeyCode::Char(' '))), KeyAction::Select);
        }

        #[test]
        fn test_escape_quits_from_selection() {
            assert_eq!(handle_selection_key(key(KeyCode::Esc)), KeyAction::Quit);
            assert_eq!(handle_selection_key(key(KeyCode::Char('q'))), KeyAction::Quit);
        }

        #[test]
        fn test_card_only_keys_do_nothing() {
            assert_eq!(handle_selection_key(key(KeyCode::Char('f'))), KeyAction::None);
            assert_eq!(handle_selection_key(key(KeyCode::Char('o'))), KeyAction::None);
        }
    }
}
