use std::collections::HashSet;

use glam::Vec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Platform independent identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Function(u8),
}

impl KeyCode {
    /// Parses short key names such as `Space`, `a`, `7` or `F12`.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(Self::Character(ch.to_ascii_uppercase()));
            }
            if ch.is_ascii_digit() {
                return Some(Self::Digit(ch as u8 - b'0'));
            }
        }
        if let Some(function) = name.strip_prefix('F').or_else(|| name.strip_prefix('f')) {
            if let Ok(index) = function.parse::<u8>() {
                if (1..=25).contains(&index) {
                    return Some(Self::Function(index));
                }
            }
        }
        None
    }

    /// Parses browser `KeyboardEvent.code` values (`KeyW`, `Digit3`,
    /// `ArrowUp`, `ShiftLeft`, ...), falling back to [`KeyCode::from_name`].
    pub fn from_code(code: &str) -> Option<Self> {
        if let Some(letter) = code.strip_prefix("Key") {
            return Self::from_name(letter).filter(|key| matches!(key, Self::Character(_)));
        }
        if let Some(digit) = code
            .strip_prefix("Digit")
            .or_else(|| code.strip_prefix("Numpad"))
        {
            if let Some(key @ Self::Digit(_)) = Self::from_name(digit) {
                return Some(key);
            }
        }
        let named = match code {
            "ArrowLeft" => NamedKey::Left,
            "ArrowRight" => NamedKey::Right,
            "ArrowUp" => NamedKey::Up,
            "ArrowDown" => NamedKey::Down,
            "ShiftLeft" => NamedKey::LeftShift,
            "ShiftRight" => NamedKey::RightShift,
            "ControlLeft" => NamedKey::LeftCtrl,
            "ControlRight" => NamedKey::RightCtrl,
            "AltLeft" => NamedKey::LeftAlt,
            "AltRight" => NamedKey::RightAlt,
            "MetaLeft" | "OSLeft" => NamedKey::LeftMeta,
            "MetaRight" | "OSRight" => NamedKey::RightMeta,
            "NumpadEnter" => NamedKey::Enter,
            _ => {
                return punctuation_from_code(code)
                    .map(Self::Character)
                    .or_else(|| Self::from_name(code))
            }
        };
        Some(Self::Named(named))
    }
}

fn punctuation_from_code(code: &str) -> Option<char> {
    let ch = match code {
        "Minus" | "NumpadSubtract" => '-',
        "Equal" | "NumpadEqual" => '=',
        "Comma" | "NumpadComma" => ',',
        "Period" | "NumpadDecimal" => '.',
        "Slash" | "NumpadDivide" => '/',
        "Semicolon" => ';',
        "Quote" => '\'',
        "Backquote" => '`',
        "BracketLeft" => '[',
        "BracketRight" => ']',
        "Backslash" => '\\',
        "NumpadAdd" => '+',
        "NumpadMultiply" => '*',
        _ => return None,
    };
    Some(ch)
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Space" => Space,
        "Enter" | "Return" => Enter,
        "Tab" => Tab,
        "Left" => Left,
        "Right" => Right,
        "Up" => Up,
        "Down" => Down,
        "Escape" | "Esc" => Escape,
        "Backspace" => Backspace,
        "Delete" | "Del" => Delete,
        "Insert" => Insert,
        "CapsLock" => CapsLock,
        "Home" => Home,
        "End" => End,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        "LeftShift" | "LShift" => LeftShift,
        "RightShift" | "RShift" => RightShift,
        "LeftCtrl" | "LControl" => LeftCtrl,
        "RightCtrl" | "RControl" => RightCtrl,
        "LeftAlt" | "LAlt" => LeftAlt,
        "RightAlt" | "RAlt" => RightAlt,
        "LeftMeta" | "LWin" => LeftMeta,
        "RightMeta" | "RWin" => RightMeta,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

/// Friendly names for the non-printable keys the demos react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    Delete,
    Insert,
    CapsLock,
    Home,
    End,
    PageUp,
    PageDown,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
    LeftMeta,
    RightMeta,
}

/// Identifier for a mouse button (left button is zero).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Bit set of held buttons in the DOM `MouseEvent.buttons` layout: primary
/// is bit 0, secondary bit 1, auxiliary bit 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MouseButtons(u16);

impl MouseButtons {
    pub const NONE: Self = Self(0);
    pub const PRIMARY: Self = Self(1);

    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u16 {
        self.0
    }

    /// True when the primary button and nothing else is held.
    pub fn is_primary_only(self) -> bool {
        self == Self::PRIMARY
    }

    fn bit(button: MouseButton) -> u16 {
        1u16.checked_shl(button.index() as u32).unwrap_or(0)
    }

    fn with(self, button: MouseButton) -> Self {
        Self(self.0 | Self::bit(button))
    }

    fn without(self, button: MouseButton) -> Self {
        Self(self.0 & !Self::bit(button))
    }
}

/// Pressed keys and pointer state, updated from input events and queried on
/// demand.
///
/// Only keys that map to a [`KeyCode`] are tracked. Front ends drop events
/// for anything else (IME composition, media keys, `IntlBackslash`, ...).
#[derive(Debug, Default)]
pub struct KeyState {
    keys: RwLock<HashSet<KeyCode>>,
    buttons: RwLock<MouseButtons>,
    mouse_position: RwLock<Option<Vec2>>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&self, key: KeyCode) {
        self.keys.write().insert(key);
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.read().contains(&key)
    }

    /// Looks a key up by its short name; unknown names are never pressed.
    pub fn is_key_down_by_name(&self, name: &str) -> bool {
        KeyCode::from_name(name).is_some_and(|key| self.is_key_down(key))
    }

    pub fn set_mouse_button_down(&self, button: MouseButton) {
        let mut buttons = self.buttons.write();
        *buttons = buttons.with(button);
    }

    pub fn set_mouse_button_up(&self, button: MouseButton) {
        let mut buttons = self.buttons.write();
        *buttons = buttons.without(button);
    }

    pub fn mouse_buttons(&self) -> MouseButtons {
        *self.buttons.read()
    }

    /// Records an absolute pointer position and returns the movement since
    /// the previous one. The first position yields no movement.
    pub fn move_mouse_to(&self, position: Vec2) -> Vec2 {
        let previous = self.mouse_position.write().replace(position);
        previous.map_or(Vec2::ZERO, |previous| position - previous)
    }

    /// Forgets the last pointer position, so the next one starts a fresh
    /// drag instead of jumping from where the pointer left.
    pub fn clear_mouse_position(&self) {
        self.mouse_position.write().take();
    }

    pub fn mouse_position(&self) -> Option<Vec2> {
        *self.mouse_position.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_character_keys() {
        assert_eq!(
            KeyCode::from_name("Space"),
            Some(KeyCode::Named(NamedKey::Space))
        );
        assert_eq!(KeyCode::from_name("a"), Some(KeyCode::Character('A')));
        assert_eq!(KeyCode::from_name("F12"), Some(KeyCode::Function(12)));
        assert_eq!(KeyCode::from_name("F30"), None);
    }

    #[test]
    fn parses_dom_codes() {
        assert_eq!(KeyCode::from_code("KeyW"), Some(KeyCode::Character('W')));
        assert_eq!(KeyCode::from_code("Digit3"), Some(KeyCode::Digit(3)));
        assert_eq!(KeyCode::from_code("Numpad7"), Some(KeyCode::Digit(7)));
        assert_eq!(
            KeyCode::from_code("ArrowUp"),
            Some(KeyCode::Named(NamedKey::Up))
        );
        assert_eq!(
            KeyCode::from_code("ShiftLeft"),
            Some(KeyCode::Named(NamedKey::LeftShift))
        );
        assert_eq!(
            KeyCode::from_code("Escape"),
            Some(KeyCode::Named(NamedKey::Escape))
        );
        assert_eq!(KeyCode::from_code("Minus"), Some(KeyCode::Character('-')));
        assert_eq!(KeyCode::from_code("Comma"), Some(KeyCode::Character(',')));
        assert_eq!(
            KeyCode::from_code("Delete"),
            Some(KeyCode::Named(NamedKey::Delete))
        );
        assert_eq!(
            KeyCode::from_code("MetaLeft"),
            Some(KeyCode::Named(NamedKey::LeftMeta))
        );
        assert_eq!(KeyCode::from_code("KeyWW"), None);
        assert_eq!(KeyCode::from_code("IntlBackslash"), None);
    }

    #[test]
    fn key_state_tracks_keys() {
        let state = KeyState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Space));
        assert!(state.is_key_down_by_name("Space"));
        state.set_key_up(KeyCode::Named(NamedKey::Space));
        assert!(!state.is_key_down_by_name("Space"));
        assert!(!state.is_key_down_by_name("NotAKey"));
    }

    #[test]
    fn buttons_use_dom_bit_layout() {
        let state = KeyState::new();
        state.set_mouse_button_down(MouseButton::LEFT);
        assert!(state.mouse_buttons().is_primary_only());
        state.set_mouse_button_down(MouseButton::RIGHT);
        assert_eq!(state.mouse_buttons().bits(), 0b011);
        assert!(!state.mouse_buttons().is_primary_only());
        state.set_mouse_button_down(MouseButton::MIDDLE);
        assert_eq!(state.mouse_buttons().bits(), 0b111);
        state.set_mouse_button_up(MouseButton::RIGHT);
        state.set_mouse_button_up(MouseButton::MIDDLE);
        assert_eq!(state.mouse_buttons(), MouseButtons::PRIMARY);
    }

    #[test]
    fn mouse_movement_is_relative_to_last_position() {
        let state = KeyState::new();
        assert_eq!(state.move_mouse_to(Vec2::new(10.0, 10.0)), Vec2::ZERO);
        assert_eq!(state.move_mouse_to(Vec2::new(15.0, 7.0)), Vec2::new(5.0, -3.0));
        assert_eq!(state.mouse_position(), Some(Vec2::new(15.0, 7.0)));
    }

    #[test]
    fn leaving_resets_mouse_movement() {
        let state = KeyState::new();
        state.move_mouse_to(Vec2::new(10.0, 10.0));
        state.clear_mouse_position();
        assert_eq!(state.mouse_position(), None);
        assert_eq!(state.move_mouse_to(Vec2::new(700.0, 400.0)), Vec2::ZERO);
        assert_eq!(state.move_mouse_to(Vec2::new(702.0, 401.0)), Vec2::new(2.0, 1.0));
    }
}
