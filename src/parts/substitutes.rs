//! Placeholder substitution.
//!
//! The composite's `components` list names where parts go with placeholder
//! objects (`{"uiType": "placeholder", "name": "<alloy.tabs>"}`). One pass
//! over the list replaces each placeholder with its built specs, descending
//! into the `components` of ordinary children. Non-part children keep their
//! relative order.

use indexmap::IndexMap;

use super::placeholder_token;
use crate::error::BuildError;
use crate::schema::{Object, Value};

/// What a placeholder expands to.
#[derive(Debug, Clone, PartialEq)]
pub enum Substitution {
    Single(Value),
    Group(Vec<Value>),
    /// Optional part with nothing to build; the placeholder is removed.
    Absent,
}

/// Placeholder token to built specs.
pub type Substitutions = IndexMap<String, Substitution>;

pub fn substitute(components: &[Value], substitutions: &Substitutions) -> Result<Vec<Value>, BuildError> {
    let mut out = Vec::with_capacity(components.len());

    for component in components {
        if let Some(token) = placeholder_token(component) {
            match substitutions.get(token) {
                Some(Substitution::Single(spec)) => out.push(spec.clone()),
                Some(Substitution::Group(specs)) => out.extend(specs.iter().cloned()),
                Some(Substitution::Absent) => {}
                None => return Err(BuildError::UnknownPlaceholder(token.to_string())),
            }
            continue;
        }

        match component.get("components").and_then(Value::as_array) {
            Some(children) => {
                let mut object: Object = component.as_object().cloned().unwrap_or_default();
                object.insert("components".to_string(), Value::Array(substitute(children, substitutions)?));
                out.push(Value::Object(object));
            }
            None => out.push(component.clone()),
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::placeholder;
    use serde_json::json;

    fn subs() -> Substitutions {
        let mut subs = Substitutions::new();
        subs.insert(
            "<alloy.tabs>".into(),
            Substitution::Group(vec![Value::from("A"), Value::from("B")]),
        );
        subs.insert("<alloy.sink>".into(), Substitution::Absent);
        subs
    }

    #[test]
    fn test_group_splices_in_place() {
        let components = vec![
            Value::from("before"),
            placeholder("<alloy.tabs>"),
            Value::from("after"),
        ];
        let out = substitute(&components, &subs()).unwrap();
        assert_eq!(out, vec![Value::from("before"), Value::from("A"), Value::from("B"), Value::from("after")]);
    }

    #[test]
    fn test_absent_part_is_removed() {
        let out = substitute(&[placeholder("<alloy.sink>")], &subs()).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_nested_placeholders() {
        let wrapper = Value::from(json!({ "dom": { "tag": "div" } }));
        let wrapper = match wrapper {
            Value::Object(mut map) => {
                map.insert("components".into(), Value::Array(vec![placeholder("<alloy.tabs>")]));
                Value::Object(map)
            }
            other => other,
        };
        let out = substitute(&[wrapper], &subs()).unwrap();
        assert_eq!(
            out[0].get("components").and_then(Value::as_array).map(<[Value]>::len),
            Some(2)
        );
    }

    #[test]
    fn test_unknown_placeholder() {
        let err = substitute(&[placeholder("<alloy.menu>")], &subs()).unwrap_err();
        assert!(matches!(err, BuildError::UnknownPlaceholder(token) if token == "<alloy.menu>"));
    }
}
