//! Tab button - one tab of a tab bar.
//!
//! A tab button represents its `value`, carries `role="tab"` and behaves
//! like a [`button`](super::button): executing it runs its action. The tab
//! bar supplies that action through its group overrides.

use serde_json::json;

use super::button::{with_base_handler, ButtonAction};
use crate::behaviour::representing;
use crate::error::BuildError;
use crate::schema::{FieldSchema, Object, Processor, Schema, Spec, Value};
use crate::system::{events, Component};

pub fn schema() -> Schema {
    Schema::new(vec![
        FieldSchema::required_string("value"),
        FieldSchema::option_of("text", Processor::String),
        FieldSchema::defaulted("dom", Value::from(json!({ "tag": "span" }))),
        FieldSchema::option_of("action", Processor::Function),
        FieldSchema::defaulted_of("behaviours", Value::object(), Processor::Object),
        FieldSchema::defaulted("customBehaviours", Value::Array(Vec::new())),
        FieldSchema::option_of("uid", Processor::String),
    ])
}

/// Validate a tab button spec and produce its component spec.
pub fn sketch(spec: &Spec) -> Result<Spec, BuildError> {
    let detail = schema()
        .validate(spec)
        .map_err(|errors| BuildError::validation("tab-button", errors))?;

    let value = detail.string("value")?;
    let text = detail.option_string("text")?.unwrap_or(value);
    let dom = detail.value("dom")?.deep_merge(&Value::from(json!({
        "innerHtml": text,
        "attributes": { "role": "tab" }
    })));

    let defaults = Value::from(json!({
        "representing": { "initialValue": value },
        "focusing": true,
        "keying": { "mode": "execution", "useSpace": true }
    }));
    let behaviours = defaults.deep_merge(detail.value("behaviours")?);

    let mut out = Spec::new()
        .with("dom", dom)
        .with("behaviours", behaviours)
        .with("customBehaviours", detail.value("customBehaviours")?.clone());
    if let Some(uid) = detail.option_string("uid")? {
        out = out.with("uid", uid);
    }
    if let Some(action) = detail.option_opaque::<ButtonAction>("action")?.cloned() {
        out = out.with(
            "events",
            with_base_handler(&Object::new(), events::EXECUTE, move |c, _| action(c)),
        );
    }
    Ok(out)
}

/// The value a tab button represents.
pub fn value(button: &Component) -> Option<String> {
    representing::get_value(button).and_then(|v| v.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::System;

    #[test]
    fn test_sketch_represents_value() {
        let system = System::new();
        let spec = sketch(&Spec::from(json!({ "value": "alpha", "text": "Alpha" }))).unwrap();
        let tab = system.build(&spec).unwrap();

        assert_eq!(value(&tab).as_deref(), Some("alpha"));
        assert_eq!(tab.dom().inner_html.as_deref(), Some("Alpha"));
        assert_eq!(tab.attribute("role").as_deref(), Some("tab"));
        assert_eq!(tab.dom().tag, "span");
    }

    #[test]
    fn test_text_defaults_to_value() {
        let spec = sketch(&Spec::from(json!({ "value": "beta", "uid": "tab-b" }))).unwrap();
        assert_eq!(spec.get("uid").and_then(Value::as_str), Some("tab-b"));
        assert_eq!(
            spec.get("dom").and_then(|d| d.get("innerHtml")).and_then(Value::as_str),
            Some("beta")
        );
    }

    #[test]
    fn test_value_required() {
        let err = sketch(&Spec::from(json!({ "text": "Alpha" }))).unwrap_err();
        assert_eq!(err.validation_errors().unwrap().paths(), vec!["value"]);
    }
}
