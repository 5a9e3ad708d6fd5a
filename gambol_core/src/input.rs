// Copyright 2026 the Gambol Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Typed input events.

use core::fmt;

use kurbo::Point;

/// A keyboard key code.
///
/// Codes follow the host library; the constants cover the keys the frame
/// loop itself binds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub u32);

impl Key {
    /// Backspace.
    pub const BACKSPACE: Self = Self(8);
    /// Tab.
    pub const TAB: Self = Self(9);
    /// Return / Enter.
    pub const RETURN: Self = Self(13);
    /// Escape.
    pub const ESCAPE: Self = Self(27);
    /// Space bar.
    pub const SPACE: Self = Self(32);
    /// Up arrow.
    pub const UP: Self = Self(273);
    /// Down arrow.
    pub const DOWN: Self = Self(274);
    /// Right arrow.
    pub const RIGHT: Self = Self(275);
    /// Left arrow.
    pub const LEFT: Self = Self(276);

    /// The key for an ASCII character, lowercased.
    #[must_use]
    pub const fn from_char(c: char) -> Self {
        Self(c.to_ascii_lowercase() as u32)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self.0)
    }
}

/// A mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Any other button, by host index.
    Other(u8),
}

/// An event from the input source.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// A key was pressed.
    KeyDown(Key),
    /// A key was released.
    KeyUp(Key),
    /// A mouse button was pressed at `pos`.
    MouseButtonDown {
        /// Which button.
        button: MouseButton,
        /// Pointer position in target pixels.
        pos: Point,
    },
    /// A mouse button was released at `pos`.
    MouseButtonUp {
        /// Which button.
        button: MouseButton,
        /// Pointer position in target pixels.
        pos: Point,
    },
    /// The user asked to quit.
    Quit,
}

impl InputEvent {
    /// The key involved, for keyboard events.
    #[must_use]
    pub const fn key(&self) -> Option<Key> {
        match self {
            Self::KeyDown(k) | Self::KeyUp(k) => Some(*k),
            _ => None,
        }
    }
}
