//! Key representation for editor input
//!
//! Hosts describe a key press with a character string (either the typed
//! text or a named key such as `"Escape"` or `"LeftArrow"`) plus a modifier
//! bitmask. Bindings are written in a bracket notation (`"gg"`, `"<C-r>"`,
//! `"<Esc>"`) that parses into the same [`KeyDescriptor`] values.

use std::fmt;

use crate::constants::errors;
use crate::error::{ErrorType, WeftError};

/// Represents a key press, without modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character
    Char(char),
    /// Arrow keys
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    /// Navigation keys
    Home,
    End,
    PageUp,
    PageDown,
    /// Editing keys
    Backspace,
    Delete,
    Enter,
    Escape,
    Tab,
}

impl Key {
    /// Resolve a named key as sent by the host
    fn from_name(name: &str) -> Option<Key> {
        let key = match name {
            "Escape" => Key::Escape,
            "Backspace" => Key::Backspace,
            "Delete" => Key::Delete,
            "Enter" => Key::Enter,
            "Tab" => Key::Tab,
            "LeftArrow" => Key::ArrowLeft,
            "RightArrow" => Key::ArrowRight,
            "UpArrow" => Key::ArrowUp,
            "DownArrow" => Key::ArrowDown,
            "Home" => Key::Home,
            "End" => Key::End,
            "PageUp" => Key::PageUp,
            "PageDown" => Key::PageDown,
            _ => return None,
        };
        Some(key)
    }

    /// Resolve the name inside `<...>` binding notation
    fn from_notation(name: &str) -> Option<Key> {
        let key = match name.to_ascii_lowercase().as_str() {
            "esc" | "escape" => Key::Escape,
            "bs" | "backspace" => Key::Backspace,
            "del" | "delete" => Key::Delete,
            "cr" | "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "left" => Key::ArrowLeft,
            "right" => Key::ArrowRight,
            "up" => Key::ArrowUp,
            "down" => Key::ArrowDown,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" => Key::PageUp,
            "pagedown" => Key::PageDown,
            "space" => Key::Char(' '),
            "lt" => Key::Char('<'),
            _ => return None,
        };
        Some(key)
    }

    fn notation(&self) -> Option<&'static str> {
        let name = match self {
            Key::Char(_) => return None,
            Key::ArrowUp => "Up",
            Key::ArrowDown => "Down",
            Key::ArrowLeft => "Left",
            Key::ArrowRight => "Right",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::Backspace => "BS",
            Key::Delete => "Del",
            Key::Enter => "CR",
            Key::Escape => "Esc",
            Key::Tab => "Tab",
        };
        Some(name)
    }
}

/// Modifier keys held during a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub cmd: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        cmd: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        alt: false,
        cmd: false,
    };

    /// Bit positions of the host's modifier flags
    pub const CTRL_MASK: u32 = 1 << 18;
    pub const ALT_MASK: u32 = 1 << 19;
    pub const CMD_MASK: u32 = 1 << 20;

    /// Decode a host modifier bitmask. Unknown bits (shift, caps lock) are ignored;
    /// shift is already reflected in the typed characters.
    #[must_use]
    pub fn from_mask(mask: u32) -> Self {
        Modifiers {
            ctrl: mask & Self::CTRL_MASK != 0,
            alt: mask & Self::ALT_MASK != 0,
            cmd: mask & Self::CMD_MASK != 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.ctrl && !self.alt && !self.cmd
    }
}

/// A key together with the modifiers held while it was pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyDescriptor {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyDescriptor {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        let key = match key {
            // Ctrl combinations are case-insensitive
            Key::Char(c) if modifiers.ctrl => Key::Char(c.to_ascii_lowercase()),
            other => other,
        };
        Self { key, modifiers }
    }

    pub fn plain(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    pub fn char(c: char) -> Self {
        Self::plain(Key::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::CTRL)
    }

    /// Build a descriptor from what the host reports for a key press
    pub fn from_host(characters: &str, modifier_mask: u32) -> Result<Self, WeftError> {
        let modifiers = Modifiers::from_mask(modifier_mask);
        if let Some(key) = Key::from_name(characters) {
            return Ok(Self::new(key, modifiers));
        }

        let mut chars = characters.chars();
        match (chars.next(), chars.next()) {
            (Some('\t'), None) => Ok(Self::new(Key::Tab, modifiers)),
            (Some('\r'), None) | (Some('\n'), None) => Ok(Self::new(Key::Enter, modifiers)),
            (Some(c), None) => Ok(Self::new(Key::Char(c), modifiers)),
            _ => Err(WeftError::new(
                ErrorType::Protocol,
                errors::INVALID_KEY,
                format!("Cannot interpret key {characters:?}"),
            )),
        }
    }

    /// Parse a key sequence written in binding notation, e.g. `"dd"`, `"<C-r>"`, `"<Esc>"`
    pub fn parse_sequence(notation: &str) -> Result<Vec<KeyDescriptor>, WeftError> {
        let invalid = |msg: String| WeftError::new(ErrorType::Config, errors::INVALID_KEY, msg);

        let mut keys = Vec::new();
        let mut rest = notation;
        while let Some(c) = rest.chars().next() {
            if c == '<' {
                if let Some(close) = rest.find('>') {
                    let inner = &rest[1..close];
                    keys.push(Self::parse_bracketed(inner).ok_or_else(|| {
                        invalid(format!("Unknown key <{inner}> in {notation:?}"))
                    })?);
                    rest = &rest[close + 1..];
                    continue;
                }
            }
            keys.push(Self::char(c));
            rest = &rest[c.len_utf8()..];
        }

        if keys.is_empty() {
            return Err(invalid("Empty key sequence".to_string()));
        }
        Ok(keys)
    }

    fn parse_bracketed(inner: &str) -> Option<KeyDescriptor> {
        let mut modifiers = Modifiers::NONE;
        let mut name = inner;
        while name.len() > 2 && name.as_bytes()[1] == b'-' {
            match name.as_bytes()[0].to_ascii_uppercase() {
                b'C' => modifiers.ctrl = true,
                b'A' | b'M' => modifiers.alt = true,
                b'D' => modifiers.cmd = true,
                _ => return None,
            }
            name = &name[2..];
        }

        let mut chars = name.chars();
        let key = match (chars.next(), chars.next()) {
            (Some(c), None) if !modifiers.is_empty() => Key::Char(c),
            _ => Key::from_notation(name)?,
        };
        Some(Self::new(key, modifiers))
    }

    /// Whether this key should be inserted as text when nothing is bound to it
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !self.modifiers.ctrl && !self.modifiers.cmd && !c.is_control() => {
                Some(c)
            }
            _ => None,
        }
    }
}

impl fmt::Display for KeyDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            return match (self.key, self.key.notation()) {
                (Key::Char('<'), _) => write!(f, "<lt>"),
                (Key::Char(c), _) => write!(f, "{c}"),
                (_, Some(name)) => write!(f, "<{name}>"),
                (_, None) => Ok(()),
            };
        }

        write!(f, "<")?;
        if self.modifiers.ctrl {
            write!(f, "C-")?;
        }
        if self.modifiers.alt {
            write!(f, "A-")?;
        }
        if self.modifiers.cmd {
            write!(f, "D-")?;
        }
        match (self.key, self.key.notation()) {
            (Key::Char(c), _) => write!(f, "{c}>"),
            (_, Some(name)) => write!(f, "{name}>"),
            (_, None) => write!(f, ">"),
        }
    }
}
