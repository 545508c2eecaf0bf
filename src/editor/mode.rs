//! Editor modes.
//!
//! An editor is always in exactly one mode. `design` and `readonly` are
//! always present and cannot be replaced; hosts add more with
//! [`Editor::register_mode`]. A mode has `activate`/`deactivate` callbacks
//! and decides whether the editor body is read-only while it is active.
//!
//! Switching runs `deactivate` on the old mode, then `activate` on the new
//! one:
//!
//! - a failing `deactivate` aborts the switch; the old mode stays active and
//!   `activate` is never called
//! - a failing `activate` is logged and the switch stops there; the old mode
//!   (already deactivated) stays recorded as active
//!
//! # Example
//!
//! ```ignore
//! editor.register_mode("review", ModeApi::new(ReadOnly::Selection)
//!     .on_activate(|| { show_comments(); Ok(()) }))?;
//! editor.set_mode("review")?;
//! ```

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, error};

use super::{Editor, EditorEvent};

pub const DESIGN: &str = "design";
pub const READONLY: &str = "readonly";

/// Modes every editor has.
pub const DEFAULT_MODES: [&str; 2] = [DESIGN, READONLY];

pub type ModeCallback = Rc<dyn Fn() -> anyhow::Result<()>>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModeError {
    #[error("Editor mode '{0}' is invalid")]
    Invalid(String),

    #[error("Cannot override default mode {0}")]
    DefaultMode(String),
}

/// How a mode treats the editor body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOnly {
    Flag(bool),
    /// Read-only, but the selection still works.
    Selection,
}

impl ReadOnly {
    pub fn is_read_only(self) -> bool {
        match self {
            ReadOnly::Flag(flag) => flag,
            ReadOnly::Selection => true,
        }
    }
}

#[derive(Clone)]
pub struct ModeApi {
    pub activate: ModeCallback,
    pub deactivate: ModeCallback,
    pub editor_read_only: ReadOnly,
}

impl ModeApi {
    pub fn new(editor_read_only: ReadOnly) -> Self {
        Self {
            activate: Rc::new(|| Ok(())),
            deactivate: Rc::new(|| Ok(())),
            editor_read_only,
        }
    }

    pub fn on_activate(mut self, f: impl Fn() -> anyhow::Result<()> + 'static) -> Self {
        self.activate = Rc::new(f);
        self
    }

    pub fn on_deactivate(mut self, f: impl Fn() -> anyhow::Result<()> + 'static) -> Self {
        self.deactivate = Rc::new(f);
        self
    }
}

impl fmt::Debug for ModeApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModeApi")
            .field("editor_read_only", &self.editor_read_only)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug, Clone)]
pub struct ModeRegistry {
    available: IndexMap<String, ModeApi>,
    active: String,
}

impl Default for ModeRegistry {
    fn default() -> Self {
        let mut available = IndexMap::new();
        available.insert(DESIGN.to_string(), ModeApi::new(ReadOnly::Flag(false)));
        available.insert(READONLY.to_string(), ModeApi::new(ReadOnly::Flag(true)));
        Self {
            available,
            active: DESIGN.to_string(),
        }
    }
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn contains(&self, mode: &str) -> bool {
        self.available.contains_key(mode)
    }

    pub fn get(&self, mode: &str) -> Option<ModeApi> {
        self.available.get(mode).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.available.keys().map(String::as_str)
    }

    /// Add a custom mode. Registering a name again replaces the earlier mode.
    pub fn register(&mut self, mode: &str, api: ModeApi) -> Result<(), ModeError> {
        if DEFAULT_MODES.contains(&mode) {
            return Err(ModeError::DefaultMode(mode.to_string()));
        }
        self.available.insert(mode.to_string(), wrap(mode, api));
        Ok(())
    }

    pub(crate) fn set_active(&mut self, mode: &str) {
        self.active = mode.to_string();
    }
}

/// Tag a custom mode's callback failures with the mode name.
fn wrap(mode: &str, api: ModeApi) -> ModeApi {
    let name = mode.to_string();
    let deactivate = api.deactivate.clone();
    ModeApi {
        deactivate: Rc::new(move || {
            deactivate().map_err(|err| err.context(format!("custom mode '{name}' failed to deactivate")))
        }),
        ..api
    }
}

// =============================================================================
// Switching
// =============================================================================

/// Switch `editor` to `mode`, deferring until init when needed.
pub(crate) fn set_mode(editor: &Editor, mode: &str) -> Result<(), ModeError> {
    let modes = editor.modes();
    if mode == modes.active() {
        return Ok(());
    }
    if !modes.contains(mode) {
        return Err(ModeError::Invalid(mode.to_string()));
    }

    if editor.is_initialized() {
        switch_to(editor, mode);
    } else {
        let mode = mode.to_string();
        debug!(editor = editor.id(), mode, "mode switch deferred until init");
        editor.on_init(move |editor| switch_to(editor, &mode));
    }
    Ok(())
}

fn switch_to(editor: &Editor, mode: &str) {
    let modes = editor.modes();
    let old_name = modes.active().to_string();
    let (Some(old), Some(new)) = (modes.get(&old_name), modes.get(mode)) else {
        return;
    };

    if let Err(err) = (old.deactivate)() {
        error!(editor = editor.id(), mode = %old_name, error = %format!("{err:#}"), "problem while deactivating editor mode");
        return;
    }
    if let Err(err) = (new.activate)() {
        error!(editor = editor.id(), mode, error = %format!("{err:#}"), "problem while activating editor mode");
        return;
    }

    if old.editor_read_only != new.editor_read_only {
        editor.set_read_only(new.editor_read_only.is_read_only());
    }
    editor.update_modes(|modes| modes.set_active(mode));
    editor.fire(&EditorEvent::SwitchMode { mode: mode.to_string() });
}
