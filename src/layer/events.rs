//! Pointer and keyboard events delivered by the host.

use crate::geometry::Point2;

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };

    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
    };
}

/// A pointer event at a canvas position.
///
/// Canvas positions use the same axis order as the displayed data axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub position: Point2,
    pub modifiers: Modifiers,
}

impl MouseEvent {
    pub fn new(position: Point2) -> Self {
        Self {
            position,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(position: Point2, modifiers: Modifiers) -> Self {
        Self {
            position,
            modifiers,
        }
    }
}

/// Keys the layer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Shift,
    Backspace,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    /// Auto-repeat events while the key is held
    pub repeat: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self { key, repeat: false }
    }

    pub fn repeated(key: Key) -> Self {
        Self { key, repeat: true }
    }
}
