//! Spec values.
//!
//! A [`Spec`] is an ordered map of field name to [`Value`]. `Value` mirrors
//! JSON and adds [`Value::Opaque`] for things JSON cannot carry: callbacks,
//! factories and custom behaviours. Specs are usually written with
//! `serde_json::json!` and converted, with callbacks added afterwards.
//!
//! # Example
//!
//! ```ignore
//! use serde_json::json;
//! use spark_compose::schema::{Spec, Value};
//!
//! let spec = Spec::from(json!({
//!     "dom": { "tag": "button", "classes": ["tox-tbtn"] },
//!     "behaviours": { "toggling": { "toggleClass": "active" } }
//! }))
//! .with("action", Value::opaque(my_action));
//! ```

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Ordered object map used by specs, details and nested values.
pub type Object = IndexMap<String, Value>;

// =============================================================================
// Opaque
// =============================================================================

/// Shared, type-erased payload (callbacks, factories, behaviours).
///
/// Equality is identity: two opaques are equal only if they share the same
/// allocation.
#[derive(Clone)]
pub struct Opaque(Rc<dyn Any>);

impl Opaque {
    pub fn new<T: 'static>(value: T) -> Self {
        Self(Rc::new(value))
    }

    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn ptr_eq(&self, other: &Opaque) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Opaque(..)")
    }
}

impl PartialEq for Opaque {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

// =============================================================================
// Value
// =============================================================================

/// A spec value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Object),
    Opaque(Opaque),
}

impl Value {
    /// Wrap a callback or any other non-JSON payload.
    pub fn opaque<T: 'static>(value: T) -> Self {
        Value::Opaque(Opaque::new(value))
    }

    pub fn object() -> Self {
        Value::Object(Object::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_opaque<T: 'static>(&self) -> Option<&T> {
        match self {
            Value::Opaque(opaque) => opaque.downcast::<T>(),
            _ => None,
        }
    }

    /// Read an object value as a spec.
    pub fn to_spec(&self) -> Option<Spec> {
        self.as_object().map(|map| Spec::from(map.clone()))
    }

    /// Look up a key on an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Short name of the variant, used in validation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Opaque(_) => "function",
        }
    }

    /// Deep merge: objects merge key by key, anything else is replaced.
    pub fn deep_merge(&self, other: &Value) -> Value {
        match (self, other) {
            (Value::Object(base), Value::Object(overlay)) => {
                let mut merged = base.clone();
                for (key, value) in overlay {
                    let next = match merged.get(key) {
                        Some(existing) => existing.deep_merge(value),
                        None => value.clone(),
                    };
                    merged.insert(key.clone(), next);
                }
                Value::Object(merged)
            }
            (_, overlay) => overlay.clone(),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Object> for Value {
    fn from(map: Object) -> Self {
        Value::Object(map)
    }
}

impl From<Spec> for Value {
    fn from(spec: Spec) -> Self {
        Value::Object(spec.fields)
    }
}

impl From<Opaque> for Value {
    fn from(opaque: Opaque) -> Self {
        Value::Opaque(opaque)
    }
}

impl From<&crate::types::Uid> for Value {
    fn from(uid: &crate::types::Uid) -> Self {
        Value::String(uid.to_string())
    }
}

// =============================================================================
// Spec
// =============================================================================

/// Author-supplied declarative description of a component.
///
/// Specs are never mutated in place: every builder method returns a new spec.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Spec {
    fields: Object,
}

impl Spec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a copy of this spec with `key` set to `value`.
    pub fn with(&self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut fields = self.fields.clone();
        fields.insert(key.into(), value.into());
        Self { fields }
    }

    /// Present and not null.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|value| !value.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn fields(&self) -> &Object {
        &self.fields
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Deep merge `overlay` on top of this spec.
    pub fn merged(&self, overlay: &Spec) -> Spec {
        match Value::Object(self.fields.clone()).deep_merge(&Value::Object(overlay.fields.clone())) {
            Value::Object(fields) => Spec { fields },
            _ => self.clone(),
        }
    }
}

impl From<Object> for Spec {
    fn from(fields: Object) -> Self {
        Self { fields }
    }
}

impl From<serde_json::Value> for Spec {
    /// Non-object JSON yields an empty spec; the validator reports what is missing.
    fn from(json: serde_json::Value) -> Self {
        match Value::from(json) {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_key_order() {
        let spec = Spec::from(json!({ "zeta": 1, "alpha": 2, "mid": 3 }));
        let keys: Vec<&str> = spec.keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_null_reads_as_absent() {
        let spec = Spec::from(json!({ "sink": null }));
        assert!(!spec.contains("sink"));
    }

    #[test]
    fn test_deep_merge() {
        let base = Spec::from(json!({
            "dom": { "tag": "div", "classes": ["a"] },
            "behaviours": { "toggling": { "toggleClass": "on" } }
        }));
        let overlay = Spec::from(json!({
            "dom": { "classes": ["b"] },
            "behaviours": { "focusing": {} }
        }));
        let merged = Value::from(base.merged(&overlay));
        assert_eq!(merged, Value::from(json!({
            "dom": { "tag": "div", "classes": ["b"] },
            "behaviours": { "toggling": { "toggleClass": "on" }, "focusing": {} }
        })));
    }

    #[test]
    fn test_with_does_not_mutate() {
        let spec = Spec::new();
        let next = spec.with("uid", "x");
        assert!(!spec.contains("uid"));
        assert_eq!(next.get("uid").and_then(Value::as_str), Some("x"));
    }

    #[test]
    fn test_opaque_identity() {
        let a = Opaque::new(5_u32);
        let b = a.clone();
        let c = Opaque::new(5_u32);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.downcast::<u32>(), Some(&5));
        assert_eq!(a.downcast::<i64>(), None);
    }
}
