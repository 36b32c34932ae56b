#![forbid(unsafe_code)]

//! Canonical input events.
//!
//! The splash only reacts to a handful of inputs: key presses (the vibrant
//! chord and a few navigation keys), mouse presses/releases/motion (the
//! long-press gesture and the launcher), resizes, and the runtime's timer
//! tick. Everything else the terminal can report is dropped at the mapping
//! boundary.
//!
//! # Design Notes
//!
//! - Mouse coordinates are 0-indexed cells.
//! - `KeyEventKind` defaults to `Press` when the terminal cannot tell.
//! - `Modifiers` use bitflags for easy combination.

use bitflags::bitflags;
#[cfg(not(target_arch = "wasm32"))]
use crossterm::event as cte;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A mouse event.
    Mouse(MouseEvent),

    /// Terminal was resized.
    Resize {
        /// New terminal width in columns.
        width: u16,
        /// New terminal height in rows.
        height: u16,
    },

    /// Focus gained (`true`) or lost (`false`).
    Focus(bool),

    /// A timer deadline elapsed.
    ///
    /// The runtime delivers this when the model's earliest pending timer is
    /// due. The model fires every due timer in deadline order.
    Tick,
}

impl Event {
    /// Convert a Crossterm event into a splash [`Event`].
    ///
    /// Returns `None` for inputs the splash has no use for (paste, unknown
    /// keys).
    #[must_use]
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_crossterm(event: cte::Event) -> Option<Self> {
        map_crossterm_event_internal(event)
    }
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Press or auto-repeat; release events never trigger bindings.
    #[must_use]
    pub const fn is_press(&self) -> bool {
        matches!(self.kind, KeyEventKind::Press | KeyEventKind::Repeat)
    }
}

/// Key codes the splash distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Tab key.
    Tab,

    /// Any other key the terminal reported.
    Other,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// The type of mouse event.
    pub kind: MouseEventKind,

    /// X coordinate (0-indexed, leftmost column is 0).
    pub x: u16,

    /// Y coordinate (0-indexed, topmost row is 0).
    pub y: u16,
}

impl MouseEvent {
    /// Create a new mouse event.
    #[must_use]
    pub const fn new(kind: MouseEventKind, x: u16, y: u16) -> Self {
        Self { kind, x, y }
    }

    /// Get the position as a tuple.
    #[must_use]
    pub const fn position(&self) -> (u16, u16) {
        (self.x, self.y)
    }
}

/// The type of mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    /// Mouse button pressed down.
    Down(MouseButton),

    /// Mouse button released.
    Up(MouseButton),

    /// Mouse dragged while button held.
    Drag(MouseButton),

    /// Mouse moved (no button pressed).
    Moved,

    /// Any wheel movement.
    Scroll,
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Left mouse button.
    Left,

    /// Right mouse button.
    Right,

    /// Middle mouse button (scroll wheel click).
    Middle,
}

#[cfg(not(target_arch = "wasm32"))]
fn map_crossterm_event_internal(event: cte::Event) -> Option<Event> {
    match event {
        cte::Event::Key(key) => Some(Event::Key(map_key_event(key))),
        cte::Event::Mouse(mouse) => Some(Event::Mouse(map_mouse_event(mouse))),
        cte::Event::Resize(width, height) => Some(Event::Resize { width, height }),
        cte::Event::FocusGained => Some(Event::Focus(true)),
        cte::Event::FocusLost => Some(Event::Focus(false)),
        cte::Event::Paste(_) => None,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_event(event: cte::KeyEvent) -> KeyEvent {
    KeyEvent {
        code: map_key_code(event.code),
        modifiers: map_modifiers(event.modifiers),
        kind: map_key_kind(event.kind),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_kind(kind: cte::KeyEventKind) -> KeyEventKind {
    match kind {
        cte::KeyEventKind::Press => KeyEventKind::Press,
        cte::KeyEventKind::Repeat => KeyEventKind::Repeat,
        cte::KeyEventKind::Release => KeyEventKind::Release,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_key_code(code: cte::KeyCode) -> KeyCode {
    match code {
        cte::KeyCode::Char(c) => KeyCode::Char(c),
        cte::KeyCode::Enter => KeyCode::Enter,
        cte::KeyCode::Esc => KeyCode::Escape,
        cte::KeyCode::Tab => KeyCode::Tab,
        _ => KeyCode::Other,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn map_modifiers(modifiers: cte::KeyModifiers) -> Modifiers {
    let mut mapped = Modifiers::NONE;
    if modifiers.contains(cte::KeyModifiers::SHIFT) {
        mapped |= Modifiers::SHIFT;
    }
    if modifiers.contains(cte::KeyModifiers::ALT) {
        mapped |= Modifiers::ALT;
    }
    if modifiers.contains(cte::KeyModifiers::CONTROL) {
        mapped |= Modifiers::CTRL;
    }
    if modifiers.contains(cte::KeyModifiers::SUPER)
        || modifiers.contains(cte::KeyModifiers::HYPER)
        || modifiers.contains(cte::KeyModifiers::META)
    {
        mapped |= Modifiers::SUPER;
    }
    mapped
}

#[cfg(not(target_arch = "wasm32"))]
fn map_mouse_event(event: cte::MouseEvent) -> MouseEvent {
    let kind = match event.kind {
        cte::MouseEventKind::Down(button) => MouseEventKind::Down(map_mouse_button(button)),
        cte::MouseEventKind::Up(button) => MouseEventKind::Up(map_mouse_button(button)),
        cte::MouseEventKind::Drag(button) => MouseEventKind::Drag(map_mouse_button(button)),
        cte::MouseEventKind::Moved => MouseEventKind::Moved,
        cte::MouseEventKind::ScrollUp
        | cte::MouseEventKind::ScrollDown
        | cte::MouseEventKind::ScrollLeft
        | cte::MouseEventKind::ScrollRight => MouseEventKind::Scroll,
    };

    MouseEvent::new(kind, event.column, event.row)
}

#[cfg(not(target_arch = "wasm32"))]
fn map_mouse_button(button: cte::MouseButton) -> MouseButton {
    match button {
        cte::MouseButton::Left => MouseButton::Left,
        cte::MouseButton::Right => MouseButton::Right,
        cte::MouseButton::Middle => MouseButton::Middle,
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crossterm::event as ct_event;

    #[test]
    fn key_event_is_char() {
        let event = KeyEvent::new(KeyCode::Char('q'));
        assert!(event.is_char('q'));
        assert!(!event.is_char('x'));
    }

    #[test]
    fn key_event_modifier_queries() {
        let event = KeyEvent::new(KeyCode::Char('r'))
            .with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(event.ctrl());
        assert!(event.shift());
    }

    #[test]
    fn release_is_not_press() {
        let event = KeyEvent::new(KeyCode::Enter).with_kind(KeyEventKind::Release);
        assert!(!event.is_press());
        assert!(KeyEvent::new(KeyCode::Enter)
            .with_kind(KeyEventKind::Repeat)
            .is_press());
    }

    #[test]
    fn map_key_event_ctrl_shift_r() {
        let ct = ct_event::KeyEvent {
            code: ct_event::KeyCode::Char('R'),
            modifiers: ct_event::KeyModifiers::CONTROL | ct_event::KeyModifiers::SHIFT,
            kind: ct_event::KeyEventKind::Press,
            state: ct_event::KeyEventState::NONE,
        };
        let mapped = map_key_event(ct);
        assert_eq!(mapped.code, KeyCode::Char('R'));
        assert!(mapped.ctrl());
        assert!(mapped.shift());
        assert_eq!(mapped.kind, KeyEventKind::Press);
    }

    #[test]
    fn map_unknown_key_to_other() {
        let ct = ct_event::KeyEvent {
            code: ct_event::KeyCode::F(5),
            modifiers: ct_event::KeyModifiers::NONE,
            kind: ct_event::KeyEventKind::Press,
            state: ct_event::KeyEventState::NONE,
        };
        assert_eq!(map_key_event(ct).code, KeyCode::Other);
    }

    #[test]
    fn map_mouse_down_and_up() {
        let down = ct_event::MouseEvent {
            kind: ct_event::MouseEventKind::Down(ct_event::MouseButton::Left),
            column: 10,
            row: 5,
            modifiers: ct_event::KeyModifiers::NONE,
        };
        let mapped = map_mouse_event(down);
        assert_eq!(mapped.kind, MouseEventKind::Down(MouseButton::Left));
        assert_eq!(mapped.position(), (10, 5));

        let up = ct_event::MouseEvent {
            kind: ct_event::MouseEventKind::Up(ct_event::MouseButton::Right),
            column: 20,
            row: 15,
            modifiers: ct_event::KeyModifiers::NONE,
        };
        assert_eq!(
            map_mouse_event(up).kind,
            MouseEventKind::Up(MouseButton::Right)
        );
    }

    #[test]
    fn map_scroll_collapses() {
        let scroll = ct_event::MouseEvent {
            kind: ct_event::MouseEventKind::ScrollLeft,
            column: 0,
            row: 0,
            modifiers: ct_event::KeyModifiers::NONE,
        };
        assert_eq!(map_mouse_event(scroll).kind, MouseEventKind::Scroll);
    }

    #[test]
    fn map_crossterm_resize_and_focus() {
        assert_eq!(
            map_crossterm_event_internal(ct_event::Event::Resize(80, 24)),
            Some(Event::Resize {
                width: 80,
                height: 24
            })
        );
        assert_eq!(
            map_crossterm_event_internal(ct_event::Event::FocusLost),
            Some(Event::Focus(false))
        );
    }

    #[test]
    fn paste_is_dropped() {
        let paste = ct_event::Event::Paste("hola".to_string());
        assert!(map_crossterm_event_internal(paste).is_none());
    }
}
