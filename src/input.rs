//! Input abstraction layer.
//!
//! Normalizes host pointer and keyboard events into a small vocabulary the
//! [`crate::editor::Editor`] understands, so the interaction logic does not
//! depend on any particular windowing toolkit.

use egui::Pos2;

/// Modifier keys relevant to canvas interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift: additive selection
    pub shift: bool,
    /// Ctrl on Windows/Linux, Cmd on macOS: draw an edge from the pressed node
    pub command: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        command: false,
    };

    /// Only Shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        command: false,
    };

    /// Only Ctrl/Cmd held.
    pub const COMMAND: Self = Self {
        shift: false,
        command: true,
    };
}

impl From<egui::Modifiers> for Modifiers {
    fn from(m: egui::Modifiers) -> Self {
        Self {
            shift: m.shift,
            command: m.command,
        }
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    /// Delete the selection
    Delete,
    /// Same as Delete
    Backspace,
}

/// A normalized input event. Positions are in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button pressed.
    PointerDown {
        /// Pointer position
        pos: Pos2,
        /// Modifiers held at press time
        modifiers: Modifiers,
    },
    /// Pointer moved (with or without a button held).
    PointerMove {
        /// Pointer position
        pos: Pos2,
    },
    /// Primary button released.
    PointerUp {
        /// Pointer position
        pos: Pos2,
    },
    /// Pointer capture lost; abandon the current gesture.
    PointerCancel,
    /// Primary button double-clicked.
    DoubleClick {
        /// Pointer position
        pos: Pos2,
    },
    /// Mouse wheel; only the sign of `delta_y` matters.
    Wheel {
        /// Vertical scroll amount
        delta_y: f32,
        /// Zoom anchor; `None` keeps the translation unchanged
        anchor: Option<Pos2>,
    },
    /// Key press.
    Key(EditorKey),
}
