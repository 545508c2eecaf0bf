//! Schema Validator - turns untyped specs into typed details.
//!
//! A [`Schema`] is an ordered list of [`FieldSchema`] rules. Validating a
//! [`Spec`] either yields a [`Detail`] holding exactly the declared fields, or
//! a non-empty [`ValidationErrors`] listing every failure in the spec. The
//! validator never stops at the first error and never returns a partial
//! detail.
//!
//! # Example
//!
//! ```ignore
//! use spark_compose::schema::{FieldSchema, Processor, Schema, Spec};
//!
//! let schema = Schema::new(vec![
//!     FieldSchema::required_string("name"),
//!     FieldSchema::defaulted_of("columns", 2, Processor::Number),
//!     FieldSchema::option("label"),
//! ]);
//!
//! let detail = schema.validate(&Spec::from(json!({ "name": "grid" })))?;
//! assert_eq!(detail.number("columns")?, 2.0);
//! ```

mod detail;
mod field;
mod processor;
mod value;

pub use detail::Detail;
pub use field::{DefaultFn, FieldKind, FieldSchema, Presence};
pub use processor::{Processed, Processor, ProcessorFn};
pub use value::{Object, Opaque, Spec, Value};

use crate::error::{ValidationError, ValidationErrors};

// =============================================================================
// Schema
// =============================================================================

/// Ordered set of field rules.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSchema>,
    strict: bool,
}

impl Schema {
    pub fn new(fields: Vec<FieldSchema>) -> Self {
        let mut schema = Self::default();
        for field in fields {
            schema = schema.field(field);
        }
        schema
    }

    /// Unknown keys become failures instead of being ignored.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Add a rule. A rule with the same name replaces the earlier one in place.
    pub fn field(mut self, field: FieldSchema) -> Self {
        match self.fields.iter().position(|f| f.name() == field.name()) {
            Some(index) => self.fields[index] = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Append every rule of `other`.
    pub fn extend(self, other: &Schema) -> Self {
        other.fields.iter().cloned().fold(self, Schema::field)
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name() == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(FieldSchema::name).collect()
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Validate a spec against this schema.
    pub fn validate(&self, spec: &Spec) -> Result<Detail, ValidationErrors> {
        let mut errors = Vec::new();
        let fields = self.validate_into(spec, &mut errors);
        match ValidationErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(Detail::from_fields(fields)),
        }
    }

    fn validate_into(&self, spec: &Spec, errors: &mut Vec<ValidationError>) -> Object {
        let mut out = Object::new();

        for field in &self.fields {
            let name = field.name();
            let value = match spec.get(name) {
                // an explicit null on an optional field means absent
                Some(raw) if raw.is_null() && matches!(field.presence(), Presence::AsOption) => Some(Value::Null),
                Some(raw) => process(field.kind(), raw, name, errors),
                None => absent(field, spec, name, errors),
            };
            if let Some(value) = value {
                out.insert(name.to_string(), value);
            }
        }

        if self.strict {
            for key in spec.keys() {
                if !self.has_field(key) {
                    errors.push(ValidationError::new(key, "is not a supported field"));
                }
            }
        }

        out
    }
}

fn process(kind: &FieldKind, raw: &Value, name: &str, errors: &mut Vec<ValidationError>) -> Option<Value> {
    match kind {
        FieldKind::Value(processor) => match processor.process(raw) {
            Processed::Valid(value) => Some(value),
            Processed::Invalid(message) => {
                errors.push(ValidationError::new(name, message));
                None
            }
        },
        FieldKind::Object(schema) => match raw.to_spec() {
            Some(nested) => {
                let mut nested_errors = Vec::new();
                let fields = schema.validate_into(&nested, &mut nested_errors);
                let failed = !nested_errors.is_empty();
                errors.extend(nested_errors.into_iter().map(|e| e.prefixed(name)));
                (!failed).then_some(Value::Object(fields))
            }
            None => {
                errors.push(ValidationError::new(name, "Must be an object."));
                None
            }
        },
    }
}

fn absent(field: &FieldSchema, spec: &Spec, name: &str, errors: &mut Vec<ValidationError>) -> Option<Value> {
    match field.presence() {
        Presence::Required => {
            errors.push(ValidationError::new(name, "is required"));
            None
        }
        Presence::Defaulted(default) => match field.kind() {
            FieldKind::Object(_) => process(field.kind(), default, name, errors),
            FieldKind::Value(_) => Some(default.clone()),
        },
        Presence::DefaultedWith(thunk) => Some(thunk(spec)),
        Presence::AsOption => Some(Value::Null),
    }
}
