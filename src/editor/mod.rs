//! Editor host - the editor-side registries the component runtime serves.
//!
//! An [`Editor`] owns:
//!
//! - its [`Options`](options::Options) registry
//! - its [`ModeRegistry`](mode::ModeRegistry) and the read-only flag modes drive
//! - a listener list for [`EditorEvent`]s
//! - the [`System`] its dialogs, toolbars and menus are built in
//!
//! Work requested before [`Editor::init`] (such as a mode switch) is queued
//! and runs when the editor initializes.
//!
//! # Example
//!
//! ```ignore
//! let editor = Editor::from_json("editor-1", &json!({ "readonly": true }))?;
//! let cleanup = editor.on(|_, event| println!("{event:?}"));
//! editor.init();
//! assert_eq!(editor.mode(), "readonly");
//! cleanup();
//! ```

pub mod autocomplete;
pub mod mode;
pub mod options;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::system::System;
use autocomplete::AutocompleteItem;
use mode::{ModeApi, ModeError, ModeRegistry};
use options::{OptionError, Options};

/// Cleanup function returned by [`Editor::on`].
pub type Cleanup = Box<dyn FnOnce()>;

/// Listener for editor events.
pub type Listener = Rc<dyn Fn(&Editor, &EditorEvent)>;

type InitCallback = Box<dyn FnOnce(&Editor)>;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    Init,
    SwitchMode {
        mode: String,
    },
    ReadOnlyChange {
        read_only: bool,
    },
    AutocompleteStart {
        trigger_char: String,
        text: String,
        items: Vec<AutocompleteItem>,
    },
    AutocompleteEnd,
}

struct EditorInner {
    id: String,
    options: RefCell<Options>,
    modes: RefCell<ModeRegistry>,
    initialized: Cell<bool>,
    read_only: Cell<bool>,
    listeners: RefCell<Vec<(usize, Listener)>>,
    next_listener: Cell<usize>,
    init_queue: RefCell<Vec<InitCallback>>,
    system: System,
}

#[derive(Clone)]
pub struct Editor(Rc<EditorInner>);

/// Non-owning handle for deferred work.
#[derive(Clone)]
pub struct WeakEditor(Weak<EditorInner>);

impl WeakEditor {
    pub fn upgrade(&self) -> Option<Editor> {
        self.0.upgrade().map(Editor)
    }
}

impl Editor {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self::with_options(Options::new(id.as_str()))
    }

    /// Build an editor from raw options. Invalid option values are logged and skipped.
    pub fn from_json(id: impl Into<String>, raw: &serde_json::Value) -> Result<Self, OptionError> {
        Ok(Self::with_options(Options::from_json(id, raw)?))
    }

    pub fn with_options(options: Options) -> Self {
        let editor = Editor(Rc::new(EditorInner {
            id: options.editor_id().to_string(),
            options: RefCell::new(options),
            modes: RefCell::new(ModeRegistry::new()),
            initialized: Cell::new(false),
            read_only: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
            init_queue: RefCell::new(Vec::new()),
            system: System::new(),
        }));

        if editor.option_bool("readonly") {
            if let Err(err) = editor.set_mode(mode::READONLY) {
                tracing::warn!(editor = editor.id(), %err, "could not start in readonly mode");
            }
        }
        editor
    }

    pub fn id(&self) -> &str {
        &self.0.id
    }

    pub fn system(&self) -> &System {
        &self.0.system
    }

    pub fn downgrade(&self) -> WeakEditor {
        WeakEditor(Rc::downgrade(&self.0))
    }

    // =========================================================================
    // Options
    // =========================================================================

    pub fn option(&self, name: &str) -> Option<crate::schema::Value> {
        self.0.options.borrow().get(name)
    }

    pub fn option_bool(&self, name: &str) -> bool {
        self.0.options.borrow().get_bool(name)
    }

    pub fn set_option(&self, name: &str, value: impl Into<crate::schema::Value>) -> Result<(), OptionError> {
        self.0.options.borrow_mut().set(name, value)
    }

    /// Run `f` with mutable access to the option registry.
    pub fn with_options_mut<R>(&self, f: impl FnOnce(&mut Options) -> R) -> R {
        f(&mut self.0.options.borrow_mut())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn is_initialized(&self) -> bool {
        self.0.initialized.get()
    }

    /// Mark the editor initialized, run queued init work, then fire `Init`.
    pub fn init(&self) {
        if self.is_initialized() {
            return;
        }
        self.0.initialized.set(true);
        let queued: Vec<InitCallback> = self.0.init_queue.borrow_mut().drain(..).collect();
        debug!(editor = self.id(), queued = queued.len(), "editor initialized");
        for callback in queued {
            callback(self);
        }
        self.fire(&EditorEvent::Init);
    }

    /// Run `f` now if initialized, else when [`init`](Self::init) runs.
    pub fn on_init(&self, f: impl FnOnce(&Editor) + 'static) {
        if self.is_initialized() {
            f(self);
        } else {
            self.0.init_queue.borrow_mut().push(Box::new(f));
        }
    }

    /// Tear down the editor's system.
    pub fn remove(&self) {
        self.0.system.teardown();
        self.0.listeners.borrow_mut().clear();
    }

    // =========================================================================
    // Read-only and modes
    // =========================================================================

    pub fn is_read_only(&self) -> bool {
        self.0.read_only.get()
    }

    pub(crate) fn set_read_only(&self, read_only: bool) {
        if self.0.read_only.replace(read_only) != read_only {
            self.fire(&EditorEvent::ReadOnlyChange { read_only });
        }
    }

    /// The active mode.
    pub fn mode(&self) -> String {
        self.0.modes.borrow().active().to_string()
    }

    pub fn set_mode(&self, mode: &str) -> Result<(), ModeError> {
        mode::set_mode(self, mode)
    }

    pub fn register_mode(&self, mode: &str, api: ModeApi) -> Result<(), ModeError> {
        self.0.modes.borrow_mut().register(mode, api)
    }

    pub fn modes(&self) -> ModeRegistry {
        self.0.modes.borrow().clone()
    }

    pub(crate) fn update_modes(&self, f: impl FnOnce(&mut ModeRegistry)) {
        f(&mut self.0.modes.borrow_mut());
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Listen to editor events. Call the returned cleanup to stop listening.
    pub fn on(&self, listener: impl Fn(&Editor, &EditorEvent) + 'static) -> Cleanup {
        let id = self.0.next_listener.get();
        self.0.next_listener.set(id + 1);
        self.0.listeners.borrow_mut().push((id, Rc::new(listener)));

        let editor = self.downgrade();
        Box::new(move || {
            if let Some(editor) = editor.upgrade() {
                editor.0.listeners.borrow_mut().retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    pub fn fire(&self, event: &EditorEvent) {
        let listeners: Vec<Listener> = self.0.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(self, event);
        }
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("id", &self.0.id)
            .field("mode", &self.mode())
            .field("initialized", &self.is_initialized())
            .field("read_only", &self.is_read_only())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mode::ReadOnly;
    use serde_json::json;

    fn record(editor: &Editor) -> (Rc<RefCell<Vec<EditorEvent>>>, Cleanup) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let seen = events.clone();
        let cleanup = editor.on(move |_, event| seen.borrow_mut().push(event.clone()));
        (events, cleanup)
    }

    #[test]
    fn test_switch_before_init_is_deferred() {
        let editor = Editor::new("e1");
        let (events, _cleanup) = record(&editor);

        editor.set_mode(mode::READONLY).unwrap();
        assert_eq!(editor.mode(), mode::DESIGN);
        assert!(!editor.is_read_only());

        editor.init();
        assert_eq!(editor.mode(), mode::READONLY);
        assert!(editor.is_read_only());
        assert_eq!(
            *events.borrow(),
            vec![
                EditorEvent::ReadOnlyChange { read_only: true },
                EditorEvent::SwitchMode { mode: "readonly".into() },
                EditorEvent::Init,
            ]
        );
    }

    #[test]
    fn test_same_mode_is_noop() {
        let editor = Editor::new("e1");
        editor.init();
        let (events, _cleanup) = record(&editor);
        editor.set_mode(mode::DESIGN).unwrap();
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_readonly_option_starts_readonly() {
        let editor = Editor::from_json("e1", &json!({ "readonly": true })).unwrap();
        editor.init();
        assert_eq!(editor.mode(), mode::READONLY);
        assert!(editor.is_read_only());
    }

    #[test]
    fn test_custom_mode_selection_is_read_only() {
        let editor = Editor::new("e1");
        editor.init();
        editor.register_mode("review", ModeApi::new(ReadOnly::Selection)).unwrap();
        editor.set_mode("review").unwrap();
        assert!(editor.is_read_only());
        editor.set_mode(mode::READONLY).unwrap();
        assert!(editor.is_read_only());
    }

    #[test]
    fn test_cleanup_stops_listening() {
        let editor = Editor::new("e1");
        let (events, cleanup) = record(&editor);
        cleanup();
        editor.init();
        assert!(events.borrow().is_empty());
    }
}
