//! Field rules.
//!
//! Each [`FieldSchema`] pairs a field name with a presence rule (required,
//! defaulted, optional) and a kind (a processor, or a nested schema).

use std::fmt;
use std::rc::Rc;

use super::processor::Processor;
use super::value::{Spec, Value};
use super::Schema;

/// Default thunk, evaluated once per validated spec.
pub type DefaultFn = Rc<dyn Fn(&Spec) -> Value>;

/// What happens when the field is absent.
#[derive(Clone)]
pub enum Presence {
    /// Absent is a failure naming the field.
    Required,
    /// Absent takes this value.
    Defaulted(Value),
    /// Absent takes the thunk's result, computed from the whole spec.
    DefaultedWith(DefaultFn),
    /// Absent is recorded as `Value::Null` in the detail.
    AsOption,
}

/// How a present value is checked.
#[derive(Clone)]
pub enum FieldKind {
    Value(Processor),
    /// Nested object validated against its own schema.
    Object(Schema),
}

/// A single field rule.
#[derive(Clone)]
pub struct FieldSchema {
    name: String,
    presence: Presence,
    kind: FieldKind,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, presence: Presence, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            presence,
            kind,
        }
    }

    // -------------------------------------------------------------------------
    // Required
    // -------------------------------------------------------------------------

    pub fn required(name: impl Into<String>) -> Self {
        Self::required_of(name, Processor::Any)
    }

    pub fn required_of(name: impl Into<String>, processor: Processor) -> Self {
        Self::new(name, Presence::Required, FieldKind::Value(processor))
    }

    pub fn required_string(name: impl Into<String>) -> Self {
        Self::required_of(name, Processor::String)
    }

    pub fn required_number(name: impl Into<String>) -> Self {
        Self::required_of(name, Processor::Number)
    }

    pub fn required_function(name: impl Into<String>) -> Self {
        Self::required_of(name, Processor::Function)
    }

    pub fn required_object(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, Presence::Required, FieldKind::Object(schema))
    }

    // -------------------------------------------------------------------------
    // Defaulted
    // -------------------------------------------------------------------------

    pub fn defaulted(name: impl Into<String>, default: impl Into<Value>) -> Self {
        Self::defaulted_of(name, default, Processor::Any)
    }

    pub fn defaulted_of(name: impl Into<String>, default: impl Into<Value>, processor: Processor) -> Self {
        Self::new(name, Presence::Defaulted(default.into()), FieldKind::Value(processor))
    }

    /// Default computed from the spec being validated.
    pub fn defaulted_with(name: impl Into<String>, default: impl Fn(&Spec) -> Value + 'static) -> Self {
        Self::new(
            name,
            Presence::DefaultedWith(Rc::new(default)),
            FieldKind::Value(Processor::Any),
        )
    }

    /// Nested object; absent validates `{}` so inner defaults still apply.
    pub fn defaulted_object(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, Presence::Defaulted(Value::object()), FieldKind::Object(schema))
    }

    // -------------------------------------------------------------------------
    // Optional
    // -------------------------------------------------------------------------

    pub fn option(name: impl Into<String>) -> Self {
        Self::option_of(name, Processor::Any)
    }

    pub fn option_of(name: impl Into<String>, processor: Processor) -> Self {
        Self::new(name, Presence::AsOption, FieldKind::Value(processor))
    }

    pub fn option_object(name: impl Into<String>, schema: Schema) -> Self {
        Self::new(name, Presence::AsOption, FieldKind::Object(schema))
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn presence(&self) -> &Presence {
        &self.presence
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        matches!(self.presence, Presence::Required)
    }
}

impl fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let presence = match self.presence {
            Presence::Required => "required",
            Presence::Defaulted(_) | Presence::DefaultedWith(_) => "defaulted",
            Presence::AsOption => "option",
        };
        f.debug_struct("FieldSchema")
            .field("name", &self.name)
            .field("presence", &presence)
            .finish()
    }
}
