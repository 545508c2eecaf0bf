//! Editor options - a flat key / processor / default registry.
//!
//! Options reuse the schema [`Processor`] contract: a processor either
//! accepts (and may transform) a raw value or rejects it with a message.
//! Reading an option returns its set value, else its default. Setting an
//! unregistered option is remembered and applied once the option is
//! registered.
//!
//! # Example
//!
//! ```ignore
//! let mut options = Options::new("editor-1");
//! options.register("toolbar_sticky", Processor::Boolean, false)?;
//! options.set("toolbar_sticky", true)?;
//! assert_eq!(options.get("toolbar_sticky"), Some(Value::Bool(true)));
//! ```

use indexmap::IndexMap;
use thiserror::Error;
use tracing::warn;

use crate::schema::{Processed, Processor, Value};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionError {
    #[error("option '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("invalid default for option '{name}': {message}")]
    InvalidDefault { name: String, message: String },

    #[error("invalid value for option '{name}': {message}")]
    InvalidValue { name: String, message: String },

    #[error("editor options must be an object")]
    NotAnObject,
}

#[derive(Debug, Clone)]
struct Registered {
    processor: Processor,
    default: Value,
}

#[derive(Debug, Clone)]
pub struct Options {
    editor_id: String,
    registered: IndexMap<String, Registered>,
    values: IndexMap<String, Value>,
    /// Raw values set before their option was registered.
    pending: IndexMap<String, Value>,
}

impl Options {
    /// Options for the editor `editor_id`, with the built-in options registered.
    pub fn new(editor_id: impl Into<String>) -> Self {
        let mut options = Self::empty(editor_id);
        options.register_builtins();
        options
    }

    pub fn empty(editor_id: impl Into<String>) -> Self {
        Self {
            editor_id: editor_id.into(),
            registered: IndexMap::new(),
            values: IndexMap::new(),
            pending: IndexMap::new(),
        }
    }

    /// Built-in options, populated from a JSON object of raw values.
    ///
    /// Invalid values are logged and left unset.
    pub fn from_json(editor_id: impl Into<String>, raw: &serde_json::Value) -> Result<Self, OptionError> {
        let serde_json::Value::Object(map) = raw else {
            return Err(OptionError::NotAnObject);
        };
        let mut options = Self::new(editor_id);
        for (name, value) in map {
            if let Err(err) = options.set(name, Value::from(value.clone())) {
                warn!(editor = options.editor_id.as_str(), %err, "ignoring editor option");
            }
        }
        Ok(options)
    }

    fn register_builtins(&mut self) {
        let id = self.editor_id.clone();
        let builtins = [
            ("id", Processor::String, Value::from(id.as_str())),
            ("inline", Processor::Boolean, Value::Bool(false)),
            ("readonly", Processor::Boolean, Value::Bool(false)),
            ("body_id", body_option(&id, "tinymce"), Value::from("tinymce")),
            ("body_class", body_option(&id, ""), Value::from("")),
            ("iframe_attrs", Processor::Object, Value::object()),
        ];
        for (name, processor, default) in builtins {
            if let Err(err) = self.register(name, processor, default) {
                warn!(%err, "failed to register built-in editor option");
            }
        }
    }

    pub fn editor_id(&self) -> &str {
        &self.editor_id
    }

    pub fn register(&mut self, name: &str, processor: Processor, default: impl Into<Value>) -> Result<(), OptionError> {
        if self.registered.contains_key(name) {
            return Err(OptionError::AlreadyRegistered(name.to_string()));
        }
        let default = match processor.process(&default.into()) {
            Processed::Valid(value) => value,
            Processed::Invalid(message) => {
                return Err(OptionError::InvalidDefault {
                    name: name.to_string(),
                    message,
                })
            }
        };
        self.registered.insert(name.to_string(), Registered { processor, default });

        if let Some(raw) = self.pending.shift_remove(name) {
            self.set(name, raw)?;
        }
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registered.contains_key(name)
    }

    /// Set a value through the option's processor.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), OptionError> {
        let value = value.into();
        let Some(option) = self.registered.get(name) else {
            self.pending.insert(name.to_string(), value);
            return Ok(());
        };
        match option.processor.process(&value) {
            Processed::Valid(value) => {
                self.values.insert(name.to_string(), value);
                Ok(())
            }
            Processed::Invalid(message) => Err(OptionError::InvalidValue {
                name: name.to_string(),
                message,
            }),
        }
    }

    /// The set value, else the default. `None` for unregistered options.
    pub fn get(&self, name: &str) -> Option<Value> {
        let option = self.registered.get(name)?;
        Some(self.values.get(name).cloned().unwrap_or_else(|| option.default.clone()))
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).and_then(|v| v.as_bool()).unwrap_or(false)
    }

    pub fn get_string(&self, name: &str) -> Option<String> {
        self.get(name).and_then(|v| v.as_str().map(str::to_string))
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Forget a set value. Returns whether there was one.
    pub fn unset(&mut self, name: &str) -> bool {
        self.values.shift_remove(name).is_some() || self.pending.shift_remove(name).is_some()
    }
}

// =============================================================================
// Per-editor hash values
// =============================================================================

/// Parse `key=value;key2=value2` (or `,`-separated) into pairs.
///
/// An item without `=` maps to itself.
pub fn parse_hash(value: &str) -> IndexMap<String, String> {
    let items: Vec<&str> = if value.contains('=') {
        value.split([';', ',']).collect()
    } else {
        value.split(',').collect()
    };
    items
        .into_iter()
        .filter(|item| !item.trim().is_empty())
        .map(|item| match item.split_once('=') {
            Some((key, val)) => (key.trim().to_string(), val.trim().to_string()),
            None => (item.trim().to_string(), item.trim().to_string()),
        })
        .collect()
}

/// A string option that may hold per-editor values keyed by editor id.
fn body_option(editor_id: &str, fallback: &str) -> Processor {
    let editor_id = editor_id.to_string();
    let fallback = fallback.to_string();
    Processor::custom(move |value| {
        let Some(text) = value.as_str() else {
            return Processed::invalid("Must be a string.");
        };
        if text.contains('=') {
            let hash = parse_hash(text);
            let picked = hash.get(&editor_id).cloned().unwrap_or_else(|| fallback.clone());
            Processed::Valid(Value::from(picked))
        } else {
            Processed::Valid(value.clone())
        }
    })
}
