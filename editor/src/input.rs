//! Input model: editing modes, pointer and key events, and the gesture state machine.
//!
//! This module defines the types consumed by the input engine. `Mode` and
//! `Modifiers` capture the user's intent at the time of an event.
//! `InputState` is the gesture being tracked between pointer-down and
//! pointer-up, carrying the context needed to compute deltas from the gesture
//! start and to abort cleanly when a second finger lands.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::camera::{PinchAnchor, Point};
use crate::consts::{LONG_PRESS_MOVE_TOLERANCE_PX, LONG_PRESS_MS};
use crate::doc::{MaskId, Rect};
use crate::hit::ResizeAnchor;

/// What a primary-button drag on the canvas does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Drag out new masks (default).
    #[default]
    Add,
    /// Select, move and resize existing masks.
    Edit,
    /// Drag pans the view.
    Pan,
}

/// Kind of device behind a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Host-assigned identifier of an active pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointerId(pub u32);

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Button {
    /// Left mouse button, or any touch / pen contact.
    #[default]
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

/// A pointer event in canvas CSS pixels.
#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub id: PointerId,
    pub kind: PointerKind,
    pub screen: Point,
    pub button: Button,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Primary-button event with no modifiers.
    #[must_use]
    pub fn new(id: u32, kind: PointerKind, screen: Point) -> Self {
        Self { id: PointerId(id), kind, screen, button: Button::Primary, modifiers: Modifiers::default() }
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `" "`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// A key press or release.
#[derive(Debug, Clone)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Focus is in a text field; editor shortcuts are suppressed.
    pub typing: bool,
    /// Event timestamp in milliseconds, used to coalesce nudges.
    pub time_ms: f64,
}

impl KeyEvent {
    #[must_use]
    pub fn new(key: &str, time_ms: f64) -> Self {
        Self { key: Key(key.to_owned()), modifiers: Modifiers::default(), typing: false, time_ms }
    }

    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    fn is(&self, name: &str) -> bool {
        self.key.0 == name
    }

    /// Case-insensitive single-character match.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        let mut chars = self.key.0.chars();
        matches!((chars.next(), chars.next()), (Some(k), None) if k.eq_ignore_ascii_case(&c))
    }

    #[must_use]
    pub fn is_space(&self) -> bool {
        self.is(" ")
    }

    #[must_use]
    pub fn is_undo(&self) -> bool {
        self.modifiers.command() && !self.modifiers.shift && self.is_char('z')
    }

    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.is("Delete") || self.is("Backspace")
    }

    #[must_use]
    pub fn is_escape(&self) -> bool {
        self.is("Escape")
    }

    /// Unit direction for an arrow key.
    #[must_use]
    pub fn arrow(&self) -> Option<(f64, f64)> {
        match self.key.0.as_str() {
            "ArrowLeft" => Some((-1.0, 0.0)),
            "ArrowRight" => Some((1.0, 0.0)),
            "ArrowUp" => Some((0.0, -1.0)),
            "ArrowDown" => Some((0.0, 1.0)),
            _ => None,
        }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}

/// Touch safety thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchRules {
    /// Hold time before a touch press in add mode starts creating.
    pub long_press_ms: u32,
    /// Finger travel in CSS pixels that turns a pending long press into a tap.
    pub move_tolerance_px: f64,
}

impl Default for TouchRules {
    fn default() -> Self {
        Self { long_press_ms: LONG_PRESS_MS, move_tolerance_px: LONG_PRESS_MOVE_TOLERANCE_PX }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Current editing mode.
    pub mode: Mode,
    /// Mode to restore when the Space key is released, while Space-pan is held.
    pub space_pan_prev: Option<Mode>,
    /// Kind of the most recent pointer, for handle sizing.
    pub pointer_kind: PointerKind,
}

/// Internal state for the input state machine.
///
/// Each active variant carries gesture context needed to compute deltas from
/// the gesture start and emit final actions on pointer-up.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Touch press in add mode on empty space, waiting for the long-press timer.
    LongPressPending {
        /// The pressing finger.
        pointer: PointerId,
        /// Where the finger went down, in screen space.
        start_screen: Point,
    },
    /// Dragging out a new mask. Nothing is committed until release.
    Creating {
        pointer: PointerId,
        /// Image-space corner where the drag started.
        anchor: Point,
        /// Image-space position of the pointer now.
        current: Point,
    },
    /// Moving an existing mask.
    Moving {
        pointer: PointerId,
        id: MaskId,
        /// Image-space pointer position at the start of the drag.
        start: Point,
        /// Mask rectangle at the start of the drag.
        origin: Rect,
        /// A history entry has been pushed for this gesture.
        changed: bool,
    },
    /// Resizing a mask by one of its eight handles.
    Resizing {
        pointer: PointerId,
        id: MaskId,
        anchor: ResizeAnchor,
        /// Mask rectangle at the start of the resize.
        origin: Rect,
        /// A history entry has been pushed for this gesture.
        changed: bool,
    },
    /// Panning the view with one pointer.
    Panning {
        pointer: PointerId,
        /// Screen-space position where the pan began.
        start_screen: Point,
        start_pan_x: f64,
        start_pan_y: f64,
    },
    /// Two-finger pinch zoom and pan.
    Pinching { anchor: PinchAnchor },
}

impl InputState {
    /// The single pointer driving this gesture, if any.
    #[must_use]
    pub fn pointer(&self) -> Option<PointerId> {
        match self {
            Self::LongPressPending { pointer, .. }
            | Self::Creating { pointer, .. }
            | Self::Moving { pointer, .. }
            | Self::Resizing { pointer, .. }
            | Self::Panning { pointer, .. } => Some(*pointer),
            Self::Idle | Self::Pinching { .. } => None,
        }
    }

    /// In-progress creation rectangle for the overlay.
    #[must_use]
    pub fn draft_rect(&self) -> Option<Rect> {
        match self {
            Self::Creating { anchor, current, .. } => Some(Rect::from_points(*anchor, *current)),
            _ => None,
        }
    }
}
