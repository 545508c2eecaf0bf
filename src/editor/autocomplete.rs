//! Autocompleter - drives one autocomplete session at a time.
//!
//! The text matching itself belongs to the editing engine, which supplies an
//! [`AutocompleteLookup`]. The autocompleter only decides when a session
//! starts and ends:
//!
//! - no lookup result ends the active session
//! - a lookup result starts a session if none is active, then waits for the
//!   lookup data
//! - data is applied only if the session is still active with the same
//!   trigger character and the request is the newest one
//! - ten characters typed without a match end the session
//!
//! # Example
//!
//! ```ignore
//! let autocompleter = Autocompleter::new(&editor, MentionLookup::new(users));
//! editor.on(|_, event| if let EditorEvent::AutocompleteStart { items, .. } = event { show(items) });
//!
//! autocompleter.load(); // on every keypress
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use tracing::debug;

use super::{Editor, EditorEvent};
use crate::system::LastWins;

/// Characters typed without a match before the session closes.
pub const MAX_UNMATCHED: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteItem {
    pub value: String,
    pub text: String,
}

impl AutocompleteItem {
    pub fn new(value: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
        }
    }
}

/// The text typed after a trigger character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocompleteContext {
    pub trigger_char: String,
    pub text: String,
}

pub struct LookupInfo {
    pub context: AutocompleteContext,
    pub data: LocalBoxFuture<'static, Vec<AutocompleteItem>>,
}

/// Supplied by the editing engine.
pub trait AutocompleteLookup {
    /// Look up at the caret. `active` is the trigger character of the
    /// running session, if there is one.
    fn lookup(&self, active: Option<&str>) -> Option<LookupInfo>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveAutocompleter {
    pub trigger_char: String,
    pub match_length: usize,
}

pub struct Autocompleter {
    editor: Editor,
    lookup: Rc<dyn AutocompleteLookup>,
    active: Rc<RefCell<Option<ActiveAutocompleter>>>,
    requests: LastWins,
}

impl Autocompleter {
    pub fn new(editor: &Editor, lookup: impl AutocompleteLookup + 'static) -> Self {
        Self {
            editor: editor.clone(),
            lookup: Rc::new(lookup),
            active: Rc::new(RefCell::new(None)),
            requests: LastWins::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.borrow().is_some()
    }

    pub fn active(&self) -> Option<ActiveAutocompleter> {
        self.active.borrow().clone()
    }

    /// Re-run the lookup and start, update or end the session.
    pub fn load(&self) {
        let trigger = self.active().map(|ac| ac.trigger_char);
        let Some(info) = self.lookup.lookup(trigger.as_deref()) else {
            self.cancel();
            return;
        };

        if !self.is_active() {
            *self.active.borrow_mut() = Some(ActiveAutocompleter {
                trigger_char: info.context.trigger_char.clone(),
                match_length: info.context.text.chars().count(),
            });
        }

        let ticket = self.requests.issue();
        let editor = self.editor.downgrade();
        let active = self.active.clone();
        let context = info.context;
        let data = info.data;

        self.editor.system().spawn(async move {
            let items = data.await;
            let Some(editor) = editor.upgrade() else {
                return;
            };
            if !ticket.is_current() {
                debug!(editor = editor.id(), "discarding stale autocomplete data");
                return;
            }
            apply(&editor, &active, context, items);
        });
    }

    /// End the active session, if any.
    pub fn cancel(&self) {
        self.requests.cancel();
        end(&self.editor, &self.active);
    }
}

fn end(editor: &Editor, active: &RefCell<Option<ActiveAutocompleter>>) {
    let was_active = active.borrow_mut().take().is_some();
    if was_active {
        editor.fire(&EditorEvent::AutocompleteEnd);
    }
}

fn apply(
    editor: &Editor,
    active: &RefCell<Option<ActiveAutocompleter>>,
    context: AutocompleteContext,
    items: Vec<AutocompleteItem>,
) {
    let length = context.text.chars().count();
    let unmatched = {
        let mut current = active.borrow_mut();
        let Some(ac) = current.as_mut() else {
            return;
        };
        if ac.trigger_char != context.trigger_char {
            return;
        }
        let unmatched = length.saturating_sub(ac.match_length);
        if !items.is_empty() {
            ac.match_length = length;
        }
        unmatched
    };

    if items.is_empty() {
        if unmatched >= MAX_UNMATCHED {
            end(editor, active);
        }
        return;
    }
    editor.fire(&EditorEvent::AutocompleteStart {
        trigger_char: context.trigger_char,
        text: context.text,
        items,
    });
}
