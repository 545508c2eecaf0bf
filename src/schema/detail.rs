//! Validated details.
//!
//! A [`Detail`] is what comes out of a successful validation: every field the
//! schema declares is present (defaults applied, optional fields recorded as
//! null) and nothing else is. The typed accessors return [`BuildError::Detail`]
//! when a builder asks for a field its schema never declared, or asks for the
//! wrong type. Both are defects in the builder, not bad input.

use super::value::{Object, Spec, Value};
use crate::error::BuildError;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detail {
    fields: Object,
}

impl Detail {
    pub(crate) fn from_fields(fields: Object) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn fields(&self) -> &Object {
        &self.fields
    }

    /// Raw value, including null for absent optional fields.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn value(&self, name: &str) -> Result<&Value, BuildError> {
        self.fields.get(name).ok_or_else(|| mismatch(name, "declared by the schema"))
    }

    /// Optional field: `None` when absent.
    pub fn option(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).filter(|value| !value.is_null())
    }

    pub fn string(&self, name: &str) -> Result<&str, BuildError> {
        self.value(name)?.as_str().ok_or_else(|| mismatch(name, "a string"))
    }

    pub fn option_string(&self, name: &str) -> Result<Option<&str>, BuildError> {
        match self.option(name) {
            None => Ok(None),
            Some(value) => value.as_str().map(Some).ok_or_else(|| mismatch(name, "a string")),
        }
    }

    pub fn number(&self, name: &str) -> Result<f64, BuildError> {
        self.value(name)?.as_f64().ok_or_else(|| mismatch(name, "a number"))
    }

    pub fn bool(&self, name: &str) -> Result<bool, BuildError> {
        self.value(name)?.as_bool().ok_or_else(|| mismatch(name, "a boolean"))
    }

    pub fn array(&self, name: &str) -> Result<&[Value], BuildError> {
        self.value(name)?.as_array().ok_or_else(|| mismatch(name, "an array"))
    }

    pub fn object(&self, name: &str) -> Result<&Object, BuildError> {
        self.value(name)?.as_object().ok_or_else(|| mismatch(name, "an object"))
    }

    pub fn strings(&self, name: &str) -> Result<Vec<String>, BuildError> {
        self.array(name)?
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| mismatch(name, "an array of strings"))
            })
            .collect()
    }

    /// Nested object field as its own detail.
    pub fn nested(&self, name: &str) -> Result<Detail, BuildError> {
        self.object(name).map(|fields| Detail::from_fields(fields.clone()))
    }

    /// Downcast an opaque field (callback, factory).
    pub fn opaque<T: 'static>(&self, name: &str) -> Result<&T, BuildError> {
        self.value(name)?
            .as_opaque::<T>()
            .ok_or_else(|| mismatch(name, "a function of the expected type"))
    }

    pub fn option_opaque<T: 'static>(&self, name: &str) -> Result<Option<&T>, BuildError> {
        match self.option(name) {
            None => Ok(None),
            Some(value) => value
                .as_opaque::<T>()
                .map(Some)
                .ok_or_else(|| mismatch(name, "a function of the expected type")),
        }
    }

    /// Detail fields as a spec, dropping absent optional fields.
    pub fn to_spec(&self) -> Spec {
        Spec::from(
            self.fields
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect::<Object>(),
        )
    }
}

fn mismatch(field: &str, expected: &'static str) -> BuildError {
    BuildError::Detail {
        field: field.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail(json: serde_json::Value) -> Detail {
        match Value::from(json) {
            Value::Object(fields) => Detail::from_fields(fields),
            _ => Detail::default(),
        }
    }

    #[test]
    fn test_typed_accessors() {
        let d = detail(json!({ "name": "x", "columns": 3, "flag": true, "items": ["a"] }));
        assert_eq!(d.string("name").unwrap(), "x");
        assert_eq!(d.number("columns").unwrap(), 3.0);
        assert!(d.bool("flag").unwrap());
        assert_eq!(d.strings("items").unwrap(), vec!["a".to_string()]);
    }

    #[test]
    fn test_wrong_type_is_a_defect() {
        let d = detail(json!({ "name": 1 }));
        assert!(matches!(d.string("name"), Err(BuildError::Detail { .. })));
        assert!(matches!(d.value("missing"), Err(BuildError::Detail { .. })));
    }

    #[test]
    fn test_option_reads_null_as_absent() {
        let d = detail(json!({ "sink": null }));
        assert!(d.option("sink").is_none());
        assert_eq!(d.option_string("sink").unwrap(), None);
        assert!(!d.to_spec().contains("sink"));
    }
}
