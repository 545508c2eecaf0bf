//! Container - a `div` that only groups its children.

use serde_json::json;

use crate::composite::{self, component_fields, CompositeDef};
use crate::error::BuildError;
use crate::schema::{FieldSchema, Schema, Spec, Value};
use crate::system::{Component, System};

pub const KIND: &str = "container";

pub fn definition() -> CompositeDef {
    CompositeDef::new(
        KIND,
        Schema::new(vec![FieldSchema::defaulted(
            "dom",
            Value::from(json!({ "tag": "div", "classes": ["alloy-container"] })),
        )]),
        |owner, components| Ok(component_fields(owner, components)),
    )
}

pub fn sketch(system: &System, spec: &Spec) -> Result<Spec, BuildError> {
    composite::sketch(system, &definition(), spec)
}

pub fn build(system: &System, spec: &Spec) -> Result<Component, BuildError> {
    composite::build(system, &definition(), spec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_dom_and_children() {
        let system = System::new();
        let container = build(
            &system,
            &Spec::from(json!({ "components": [{ "dom": { "tag": "p" } }, { "dom": { "tag": "p" } }] })),
        )
        .unwrap();

        assert_eq!(container.dom().tag, "div");
        assert!(container.has_class("alloy-container"));
        assert_eq!(container.children().len(), 2);
        assert!(container.uid().starts_with("container_"));
    }

    #[test]
    fn test_author_dom_wins() {
        let system = System::new();
        let container = build(&system, &Spec::from(json!({ "dom": { "tag": "section" } }))).unwrap();
        assert_eq!(container.dom().tag, "section");
        assert!(!container.has_class("alloy-container"));
    }
}
