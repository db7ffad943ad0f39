//! Toolkit-independent input events.

use crate::geometry::Point;

/// Keyboard keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Regular character key (a-z, 0-9, symbols)
    Char(char),
    Escape,
    Return,
    Backspace,
    Delete,
    /// Unmapped or unrecognized key
    Unknown,
}

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }
}

/// Pointer positions are in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pos: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    PointerMove {
        pos: Point,
    },
    PointerUp {
        pos: Point,
        button: MouseButton,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
    /// Wheel movement in notches; positive zooms in.
    Scroll {
        delta: f64,
        pos: Point,
    },
}
