//! Part-Type Expander - structural slots of composites.
//!
//! # Example
//!
//! ```ignore
//! use spark_compose::parts::{placeholder, GroupPart};
//!
//! let tabs = GroupPart::new("tabs", "tab", "<alloy.tabs>")
//!     .required()
//!     .item_schema(tab_button::schema())
//!     .overrides(|bar, tab| Spec::new().with("action", select_action(bar.uid())))
//!     .unit(tab_button::sketch);
//!
//! // In the author's spec:
//! // "components": [ placeholder("<alloy.tabs>") ]
//! ```

mod part_type;
mod substitutes;

pub use part_type::{DefaultSpecFn, GroupPart, OverridesFn, PartType, SinglePart, UnitFn};
pub use substitutes::{substitute, Substitution, Substitutions};

use crate::schema::{Object, Spec, Value};

const UI_TYPE: &str = "uiType";
const PLACEHOLDER: &str = "placeholder";

/// A placeholder marking where a part's built specs go.
pub fn placeholder(token: &str) -> Value {
    let mut object = Object::new();
    object.insert(UI_TYPE.to_string(), Value::from(PLACEHOLDER));
    object.insert("name".to_string(), Value::from(token));
    Value::Object(object)
}

/// The token of a placeholder value, if it is one.
pub fn placeholder_token(value: &Value) -> Option<&str> {
    if value.get(UI_TYPE).and_then(Value::as_str) != Some(PLACEHOLDER) {
        return None;
    }
    value.get("name").and_then(Value::as_str)
}

/// The token of a placeholder spec, if it is one.
pub fn placeholder_name(spec: &Spec) -> Option<&str> {
    if spec.get(UI_TYPE).and_then(Value::as_str) != Some(PLACEHOLDER) {
        return None;
    }
    spec.get("name").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_round_trip() {
        let value = placeholder("<alloy.tabs>");
        assert_eq!(placeholder_token(&value), Some("<alloy.tabs>"));
        assert_eq!(placeholder_name(&value.to_spec().unwrap()), Some("<alloy.tabs>"));
        assert_eq!(placeholder_token(&Value::from("x")), None);
    }
}
