//! Field processors.
//!
//! A processor receives the raw field value and answers with a discriminated
//! result: valid with the (possibly normalised) value, or invalid with a
//! human-readable message. A processor that panics is a defect and the panic
//! is not caught.

use std::fmt;
use std::rc::Rc;

use super::value::Value;

/// Result of running a processor.
#[derive(Debug, Clone, PartialEq)]
pub enum Processed {
    Valid(Value),
    Invalid(String),
}

impl Processed {
    pub fn invalid(message: impl Into<String>) -> Self {
        Processed::Invalid(message.into())
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Processed::Valid(_))
    }
}

/// Custom processor function.
pub type ProcessorFn = Rc<dyn Fn(&Value) -> Processed>;

/// Built-in and custom field processors.
#[derive(Clone)]
pub enum Processor {
    Any,
    String,
    Number,
    Boolean,
    Object,
    Array,
    /// Opaque callback or factory.
    Function,
    StringArray,
    ObjectArray,
    /// String restricted to a fixed set.
    OneOf(Vec<String>),
    Custom(ProcessorFn),
}

impl Processor {
    pub fn custom(f: impl Fn(&Value) -> Processed + 'static) -> Self {
        Processor::Custom(Rc::new(f))
    }

    pub fn one_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Processor::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Look up a processor by the names used in option registration.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "any" => Some(Processor::Any),
            "string" => Some(Processor::String),
            "number" => Some(Processor::Number),
            "boolean" => Some(Processor::Boolean),
            "object" => Some(Processor::Object),
            "array" => Some(Processor::Array),
            "function" => Some(Processor::Function),
            "string[]" => Some(Processor::StringArray),
            "object[]" => Some(Processor::ObjectArray),
            _ => None,
        }
    }

    pub fn process(&self, value: &Value) -> Processed {
        match self {
            Processor::Any => Processed::Valid(value.clone()),
            Processor::String => expect(value, Value::as_str, "Must be a string."),
            Processor::Number => expect(value, Value::as_f64, "Must be a number."),
            Processor::Boolean => expect(value, Value::as_bool, "Must be a boolean."),
            Processor::Object => expect(value, Value::as_object, "Must be an object."),
            Processor::Array => expect(value, Value::as_array, "Must be an array."),
            Processor::Function => match value {
                Value::Opaque(_) => Processed::Valid(value.clone()),
                _ => Processed::invalid("Must be a function."),
            },
            Processor::StringArray => match value.as_array() {
                Some(items) if items.iter().all(|item| item.as_str().is_some()) => {
                    Processed::Valid(value.clone())
                }
                _ => Processed::invalid("Must be an array of strings."),
            },
            Processor::ObjectArray => match value.as_array() {
                Some(items) if items.iter().all(|item| item.as_object().is_some()) => {
                    Processed::Valid(value.clone())
                }
                _ => Processed::invalid("Must be an array of objects."),
            },
            Processor::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => Processed::Valid(value.clone()),
                _ => Processed::invalid(format!("Must be one of: {}.", allowed.join(", "))),
            },
            Processor::Custom(f) => f(value),
        }
    }
}

fn expect<'a, T>(value: &'a Value, check: impl Fn(&'a Value) -> Option<T>, message: &str) -> Processed {
    match check(value) {
        Some(_) => Processed::Valid(value.clone()),
        None => Processed::invalid(message),
    }
}

impl fmt::Debug for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Processor::Any => f.write_str("Any"),
            Processor::String => f.write_str("String"),
            Processor::Number => f.write_str("Number"),
            Processor::Boolean => f.write_str("Boolean"),
            Processor::Object => f.write_str("Object"),
            Processor::Array => f.write_str("Array"),
            Processor::Function => f.write_str("Function"),
            Processor::StringArray => f.write_str("StringArray"),
            Processor::ObjectArray => f.write_str("ObjectArray"),
            Processor::OneOf(values) => f.debug_tuple("OneOf").field(values).finish(),
            Processor::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
