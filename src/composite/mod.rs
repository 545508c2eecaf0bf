//! Composite Builder - components built from parts.
//!
//! Building a composite is a strict pipeline:
//!
//! 1. validate the spec against the composite schema (component fields, the
//!    composite's own fields, one field per part) into a [`CompositeDetail`];
//! 2. expand every part and group;
//! 3. splice the built children into `components` at their placeholders;
//! 4. hand the detail and children to the composite's factory, which
//!    returns a plain component spec;
//! 5. build that spec in the [`System`] (behaviour composition, then
//!    registration).
//!
//! Steps 1-4 are [`sketch`]; [`build`] adds step 5. Any failure aborts the
//! whole subtree and nothing is registered.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{BuildError, ValidationErrors};
use crate::parts::{substitute, PartType, Substitutions};
use crate::schema::{Detail, Schema, Spec, Value};
use crate::system::{component_schema, Component, System};
use crate::types::Uid;

/// Produces the final component spec from the detail and spliced children.
pub type CompositeFactory = Rc<dyn Fn(&CompositeDetail, Vec<Value>) -> Result<Spec, BuildError>>;

/// A composite kind: one schema, its parts and its factory.
#[derive(Clone)]
pub struct CompositeDef {
    kind: String,
    schema: Schema,
    parts: Vec<PartType>,
    factory: CompositeFactory,
}

impl CompositeDef {
    pub fn new(
        kind: impl Into<String>,
        schema: Schema,
        factory: impl Fn(&CompositeDetail, Vec<Value>) -> Result<Spec, BuildError> + 'static,
    ) -> Self {
        Self {
            kind: kind.into(),
            schema,
            parts: Vec::new(),
            factory: Rc::new(factory),
        }
    }

    pub fn part(mut self, part: impl Into<PartType>) -> Self {
        self.parts.push(part.into());
        self
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn parts(&self) -> &[PartType] {
        &self.parts
    }

    /// Component fields, then the composite's own, then one per part.
    pub fn full_schema(&self) -> Schema {
        self.parts
            .iter()
            .fold(component_schema().extend(&self.schema), |schema, part| {
                schema.field(part.field_schema())
            })
    }
}

impl fmt::Debug for CompositeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDef")
            .field("kind", &self.kind)
            .field("parts", &self.parts)
            .finish()
    }
}

/// Validated composite spec plus the uids assigned to it and its parts.
#[derive(Debug, Clone)]
pub struct CompositeDetail {
    uid: Uid,
    detail: Detail,
    part_uids: IndexMap<String, Uid>,
}

impl CompositeDetail {
    pub fn uid(&self) -> &Uid {
        &self.uid
    }

    pub fn detail(&self) -> &Detail {
        &self.detail
    }

    /// Uid of a named part, for `System::get_by_uid`.
    pub fn part_uid(&self, part: &str) -> Option<&Uid> {
        self.part_uids.get(part)
    }

    pub fn part_uids(&self) -> &IndexMap<String, Uid> {
        &self.part_uids
    }
}

/// Validate, expand and substitute: produce the component spec for `spec`.
pub fn sketch(system: &System, def: &CompositeDef, spec: &Spec) -> Result<Spec, BuildError> {
    let uid = match spec.get("uid").and_then(Value::as_str) {
        Some(uid) => Uid::new(uid),
        None => system.generate_uid(def.kind()),
    };
    let spec = spec.with("uid", &uid);

    let detail = def
        .full_schema()
        .validate(&spec)
        .map_err(|errors| BuildError::validation(def.kind(), errors))?;

    let part_uids = def
        .parts
        .iter()
        .map(|part| (part.name().to_string(), uid.part(part.name())))
        .collect();
    let owner = CompositeDetail {
        uid,
        detail,
        part_uids,
    };

    let mut substitutions = Substitutions::new();
    let mut failures = Vec::new();
    for part in &def.parts {
        match part.expand(&owner) {
            Ok(substitution) => {
                substitutions.insert(part.placeholder().to_string(), substitution);
            }
            Err(BuildError::Validation { errors, .. }) => failures.extend(errors),
            Err(other) => return Err(other),
        }
    }
    if let Some(errors) = ValidationErrors::from_vec(failures) {
        return Err(BuildError::validation(def.kind(), errors));
    }

    let components = substitute(owner.detail().array("components")?, &substitutions)?;
    debug!(kind = def.kind(), uid = %owner.uid(), children = components.len(), "sketched composite");

    (def.factory)(&owner, components)
}

/// Sketch, then build and register in `system`.
pub fn build(system: &System, def: &CompositeDef, spec: &Spec) -> Result<Component, BuildError> {
    let spec = sketch(system, def, spec)?;
    system.build(&spec)
}

/// The component fields of a composite detail, ready to pass through the factory.
pub fn component_fields(owner: &CompositeDetail, components: Vec<Value>) -> Spec {
    let detail = owner.detail();
    let mut spec = Spec::new().with("uid", owner.uid()).with("components", components);
    for field in ["dom", "behaviours", "events", "eventOrder", "customBehaviours"] {
        if let Some(value) = detail.option(field) {
            spec = spec.with(field, value.clone());
        }
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::{placeholder, GroupPart, SinglePart};
    use crate::schema::FieldSchema;
    use serde_json::json;

    fn list_def() -> CompositeDef {
        let items = GroupPart::new("items", "item", "<alloy.items>")
            .item_schema(Schema::new(vec![
                FieldSchema::required_string("text"),
                FieldSchema::required_string("owner"),
            ]))
            .defaults(|_| Spec::from(json!({ "dom": { "tag": "li" } })))
            .overrides(|owner, _| Spec::new().with("owner", owner.uid()));

        let header = SinglePart::new("header", "<alloy.header>")
            .default_spec(|owner| {
                let title = owner.detail().string("title").unwrap_or_default();
                Spec::from(json!({ "dom": { "tag": "h1", "innerHtml": title } }))
            });

        CompositeDef::new(
            "list",
            Schema::new(vec![FieldSchema::defaulted("title", "untitled")]),
            |owner, components| Ok(component_fields(owner, components)),
        )
        .part(items)
        .part(header)
    }

    fn list_spec(items: serde_json::Value) -> Spec {
        Spec::from(json!({ "dom": { "tag": "ul" }, "items": items, "title": "Fruit" })).with(
            "components",
            Value::from(vec![
                placeholder("<alloy.header>"),
                Value::from(json!({ "dom": { "tag": "hr" } })),
                placeholder("<alloy.items>"),
            ]),
        )
    }

    #[test]
    fn test_group_keeps_author_order() {
        let system = System::new();
        let spec = sketch(&system, &list_def(), &list_spec(json!([{ "text": "b" }, { "text": "a" }]))).unwrap();
        let components = spec.get("components").and_then(Value::as_array).unwrap();
        assert_eq!(components.len(), 4);
        assert_eq!(components[2].get("text").and_then(Value::as_str), Some("b"));
        assert_eq!(components[3].get("text").and_then(Value::as_str), Some("a"));
    }

    #[test]
    fn test_empty_group_is_valid() {
        let system = System::new();
        let component = build(&system, &list_def(), &list_spec(json!([]))).unwrap();
        let tags: Vec<String> = component.children().iter().map(|c| c.dom().tag).collect();
        assert_eq!(tags, vec!["h1", "hr"]);
    }

    #[test]
    fn test_group_injects_owner_and_default_single_part() {
        let system = System::new();
        let component = build(
            &system,
            &list_def(),
            &list_spec(json!([{ "text": "a" }])).with("uid", "fruit"),
        )
        .unwrap();

        let spec = sketch(&system, &list_def(), &list_spec(json!([{ "text": "a" }])).with("uid", "veg")).unwrap();
        let items = spec.get("components").and_then(Value::as_array).unwrap();
        assert_eq!(items[2].get("owner").and_then(Value::as_str), Some("veg"));

        let header = system.get_by_uid("fruit-header").unwrap();
        assert_eq!(header.dom().inner_html.as_deref(), Some("Fruit"));
        assert_eq!(header.parent().unwrap(), component);
    }

    #[test]
    fn test_item_failures_aggregate_with_index_paths() {
        let system = System::new();
        let err = sketch(
            &system,
            &list_def(),
            &list_spec(json!([{ "text": "a" }, {}, { "text": 3 }])),
        )
        .unwrap_err();
        assert_eq!(err.validation_errors().unwrap().paths(), vec!["items[1].text", "items[2].text"]);
    }

    #[test]
    fn test_composite_schema_failures_abort_first() {
        let system = System::new();
        let err = build(&system, &list_def(), &Spec::from(json!({ "items": "nope" }))).unwrap_err();
        assert_eq!(err.validation_errors().unwrap().paths(), vec!["dom", "items"]);
        assert_eq!(system.component_count(), 0);
    }
}
