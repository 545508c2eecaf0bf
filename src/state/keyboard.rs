//! Keyboard Module - key events and routing into the focused component
//!
//! Terminal key events arrive as crossterm [`KeyEvent`]s. They are converted
//! into [`KeyboardEvent`]s and routed as `alloy.keydown` to whichever
//! component the [`System`] has focused, bubbling up through its ancestors.
//!
//! # API
//!
//! - `KeyboardEvent::from(key_event)` - convert a crossterm event
//! - `payload(event)` / `KeyboardEvent::from_payload(value)` - carry an event on a simulated event
//! - `route(system, event)` - dispatch to the focused component
//!
//! # Example
//!
//! ```ignore
//! use spark_compose::state::keyboard;
//!
//! if let Event::Key(key) = crossterm::event::read()? {
//!     let consumed = keyboard::route(&system, KeyboardEvent::from(key));
//! }
//! ```

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::schema::Value;
use crate::system::{events, System};

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }

    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<KeyModifiers> for Modifiers {
    fn from(mods: KeyModifiers) -> Self {
        Modifiers {
            ctrl: mods.contains(KeyModifiers::CONTROL),
            alt: mods.contains(KeyModifiers::ALT),
            shift: mods.contains(KeyModifiers::SHIFT),
            meta: mods.contains(KeyModifiers::SUPER) || mods.contains(KeyModifiers::META),
        }
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// The key that was pressed (e.g., "a", "Enter", "ArrowUp", " ")
    pub key: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    pub fn is_press(&self) -> bool {
        self.state == KeyState::Press
    }

    /// The keyboard event carried by a simulated event's payload.
    pub fn from_payload(payload: &Value) -> Option<&KeyboardEvent> {
        payload.as_opaque::<KeyboardEvent>()
    }
}

impl From<KeyEvent> for KeyboardEvent {
    fn from(event: KeyEvent) -> Self {
        let key = match event.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::BackTab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Esc => "Escape".to_string(),
            KeyCode::Up => "ArrowUp".to_string(),
            KeyCode::Down => "ArrowDown".to_string(),
            KeyCode::Left => "ArrowLeft".to_string(),
            KeyCode::Right => "ArrowRight".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PageUp".to_string(),
            KeyCode::PageDown => "PageDown".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            KeyCode::Insert => "Insert".to_string(),
            _ => String::new(),
        };

        let mut modifiers = Modifiers::from(event.modifiers);
        if event.code == KeyCode::BackTab {
            modifiers.shift = true;
        }

        let state = match event.kind {
            KeyEventKind::Press => KeyState::Press,
            KeyEventKind::Repeat => KeyState::Repeat,
            KeyEventKind::Release => KeyState::Release,
        };

        KeyboardEvent { key, modifiers, state }
    }
}

/// Wrap a keyboard event for a simulated event payload.
pub fn payload(event: KeyboardEvent) -> Value {
    Value::opaque(event)
}

// =============================================================================
// ROUTING
// =============================================================================

/// Route a key press to the focused component.
///
/// Tab and Shift+Tab move focus when nothing consumed the key. Returns true
/// if the event was consumed. Only press events are routed.
pub fn route(system: &System, event: KeyboardEvent) -> bool {
    if !event.is_press() {
        return false;
    }

    let is_tab = event.key == "Tab";
    let backwards = event.modifiers.shift;

    let consumed = match system.focused() {
        Some(focused) => system
            .trigger_event(&focused, events::KEY_DOWN, payload(event))
            .is_stopped(),
        None => false,
    };
    if consumed {
        return true;
    }

    if is_tab {
        return if backwards {
            system.focus_previous()
        } else {
            system.focus_next()
        };
    }
    false
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Spec;
    use crate::system::{handler, Component, SimulatedEvent};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn focusable(system: &System, uid: &str) -> Component {
        let component = system
            .build(&Spec::from(json!({
                "uid": uid,
                "dom": { "tag": "button" },
                "behaviours": { "focusing": true }
            })))
            .unwrap();
        system.mount(&component);
        component
    }

    #[test]
    fn test_convert_crossterm_event() {
        let event = KeyboardEvent::from(KeyEvent::new(KeyCode::Up, KeyModifiers::CONTROL));
        assert_eq!(event.key, "ArrowUp");
        assert!(event.modifiers.ctrl);
        assert!(event.is_press());

        let event = KeyboardEvent::from(KeyEvent::new(KeyCode::BackTab, KeyModifiers::NONE));
        assert_eq!(event.key, "Tab");
        assert!(event.modifiers.shift);

        let event = KeyboardEvent::from(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE));
        assert_eq!(event.key, " ");
    }

    #[test]
    fn test_route_reaches_focused_component() {
        let system = System::new();
        let keys = Rc::new(RefCell::new(Vec::new()));
        let seen = keys.clone();
        let component = system
            .build(
                &Spec::from(json!({ "dom": { "tag": "input" }, "behaviours": { "focusing": true } })).with(
                    "events",
                    Value::from(
                        [(
                            events::KEY_DOWN.to_string(),
                            handler(move |_, event: &mut SimulatedEvent| {
                                if let Some(key) = KeyboardEvent::from_payload(event.payload()) {
                                    seen.borrow_mut().push(key.key.clone());
                                }
                                event.stop();
                            }),
                        )]
                        .into_iter()
                        .collect::<crate::schema::Object>(),
                    ),
                ),
            )
            .unwrap();
        system.mount(&component);

        assert!(!route(&system, KeyboardEvent::new("a")));
        system.focus(&component);
        assert!(route(&system, KeyboardEvent::new("a")));
        assert_eq!(*keys.borrow(), vec!["a"]);
    }

    #[test]
    fn test_tab_cycles_focus() {
        let system = System::new();
        let first = focusable(&system, "first");
        let second = focusable(&system, "second");

        assert!(route(&system, KeyboardEvent::new("Tab")));
        assert!(system.is_focused(&first));
        assert!(route(&system, KeyboardEvent::new("Tab")));
        assert!(system.is_focused(&second));
        assert!(route(&system, KeyboardEvent::with_modifiers("Tab", Modifiers::shift())));
        assert!(system.is_focused(&first));
    }

    #[test]
    fn test_release_is_ignored() {
        let system = System::new();
        let _first = focusable(&system, "first");
        let mut event = KeyboardEvent::new("Tab");
        event.state = KeyState::Release;
        assert!(!route(&system, event));
        assert!(system.focused().is_none());
    }
}
