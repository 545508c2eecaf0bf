//! Rendered DOM description.
//!
//! A [`DomDefinition`] is the structural description a component renders to:
//! tag, classes, attributes, styles and optional inner html or value. It is
//! built from the spec's `dom` block, then behaviour exhibits are merged on
//! top. After build it lives on the component and behaviours mutate it
//! through the component (a highlighted item gains a class, a toggled button
//! flips its aria attribute).

use std::fmt::Write as _;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{ValidationError, ValidationErrors};
use crate::schema::{FieldSchema, Processed, Processor, Schema, Spec, Value};

/// Ordered string map used for attributes and styles.
pub type StringMap = IndexMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomDefinition {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: StringMap,
    pub styles: StringMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Schema for a `dom` block.
pub fn dom_schema() -> Schema {
    Schema::new(vec![
        FieldSchema::required_string("tag"),
        FieldSchema::defaulted_of("classes", Value::Array(Vec::new()), Processor::StringArray),
        FieldSchema::defaulted_of("attributes", Value::object(), string_map()),
        FieldSchema::defaulted_of("styles", Value::object(), string_map()),
        FieldSchema::option_of("innerHtml", Processor::String),
        FieldSchema::option_of("value", Processor::String),
    ])
}

/// Object whose values are scalars; numbers and booleans are stringified.
fn string_map() -> Processor {
    Processor::custom(|value| {
        let Some(map) = value.as_object() else {
            return Processed::invalid("Must be an object.");
        };
        let mut out = crate::schema::Object::new();
        for (key, item) in map {
            let text = match item {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return Processed::invalid(format!("Value of '{key}' must be a string.")),
            };
            out.insert(key.clone(), Value::String(text));
        }
        Processed::Valid(Value::Object(out))
    })
}

impl DomDefinition {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Read a `dom` block, reporting failures under the `dom` path.
    pub fn from_value(value: &Value) -> Result<Self, ValidationErrors> {
        let Some(spec) = value.to_spec() else {
            return Err(ValidationErrors::single("dom", "Must be an object."));
        };
        Self::from_spec(&spec).map_err(|errors| errors.prefixed("dom"))
    }

    pub fn from_spec(spec: &Spec) -> Result<Self, ValidationErrors> {
        let detail = dom_schema().validate(spec)?;
        let strings = |name: &str| -> StringMap {
            detail
                .object(name)
                .map(|map| {
                    map.iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                        .collect()
                })
                .unwrap_or_default()
        };

        let tag = detail
            .string("tag")
            .map_err(|e| ValidationErrors::from(ValidationError::new("tag", e.to_string())))?;

        Ok(Self {
            tag: tag.to_string(),
            classes: detail.strings("classes").unwrap_or_default(),
            attributes: strings("attributes"),
            styles: strings("styles"),
            inner_html: detail.option_string("innerHtml").ok().flatten().map(str::to_string),
            value: detail.option_string("value").ok().flatten().map(str::to_string),
        })
    }

    // -------------------------------------------------------------------------
    // Builders
    // -------------------------------------------------------------------------

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(&class.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }

    pub fn with_inner_html(mut self, html: impl Into<String>) -> Self {
        self.inner_html = Some(html.into());
        self
    }

    // -------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add a class once. Returns false if it was already present.
    pub fn add_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            return false;
        }
        self.classes.push(class.to_string());
        true
    }

    pub fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        before != self.classes.len()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attribute(&mut self, key: &str, value: impl Into<String>) {
        self.attributes.insert(key.to_string(), value.into());
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<String> {
        self.attributes.shift_remove(key)
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Render to markup with the given children markup inside.
    ///
    /// `inner_html` takes precedence over children, matching how the host
    /// treats an element whose html was set directly.
    pub fn to_html_with(&self, children: &str) -> String {
        let mut out = String::new();
        let _ = write!(out, "<{}", self.tag);
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&self.classes.join(" ")));
        }
        for (key, value) in &self.attributes {
            let _ = write!(out, " {key}=\"{}\"", escape(value));
        }
        if !self.styles.is_empty() {
            let style: String = self.styles.iter().map(|(k, v)| format!("{k}: {v};")).collect::<Vec<_>>().join(" ");
            let _ = write!(out, " style=\"{}\"", escape(&style));
        }
        if let Some(value) = &self.value {
            let _ = write!(out, " value=\"{}\"", escape(value));
        }
        out.push('>');
        match &self.inner_html {
            Some(html) => out.push_str(html),
            None => out.push_str(children),
        }
        let _ = write!(out, "</{}>", self.tag);
        out
    }

    pub fn to_html(&self) -> String {
        self.to_html_with("")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('"', "&quot;").replace('<', "&lt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_applies_defaults() {
        let dom = DomDefinition::from_value(&Value::from(json!({ "tag": "div" }))).unwrap();
        assert_eq!(dom, DomDefinition::new("div"));
    }

    #[test]
    fn test_from_value_stringifies_scalars() {
        let dom = DomDefinition::from_value(&Value::from(json!({
            "tag": "input",
            "attributes": { "tabindex": -1, "disabled": true }
        })))
        .unwrap();
        assert_eq!(dom.attribute("tabindex"), Some("-1"));
        assert_eq!(dom.attribute("disabled"), Some("true"));
    }

    #[test]
    fn test_failures_are_under_dom() {
        let errors = DomDefinition::from_value(&Value::from(json!({ "classes": [1] }))).unwrap_err();
        assert_eq!(errors.paths(), vec!["dom.tag", "dom.classes"]);
    }

    #[test]
    fn test_class_mutation() {
        let mut dom = DomDefinition::new("span").with_class("a");
        assert!(!dom.add_class("a"));
        assert!(dom.add_class("b"));
        assert!(dom.remove_class("a"));
        assert_eq!(dom.classes, vec!["b"]);
    }

    #[test]
    fn test_to_html() {
        let dom = DomDefinition::new("button")
            .with_class("tox-tbtn")
            .with_attribute("aria-pressed", "false")
            .with_style("display", "none");
        assert_eq!(
            dom.to_html_with("<span>x</span>"),
            "<button class=\"tox-tbtn\" aria-pressed=\"false\" style=\"display: none;\"><span>x</span></button>"
        );
    }

    #[test]
    fn test_serializes_camel_case() {
        let dom = DomDefinition::new("div").with_inner_html("hi");
        let json = serde_json::to_value(&dom).unwrap();
        assert_eq!(json["innerHtml"], "hi");
        assert!(json.get("value").is_none());
    }
}
