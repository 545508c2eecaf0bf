use serde_json::json;
use spark_compose::composite::{self, component_fields};
use spark_compose::dom::DomModification;
use spark_compose::{
    custom_value, placeholder, BuildError, CompositeDef, CustomBehaviour, FieldSchema, GroupPart, Schema,
    SinglePart, Spec, System, Value,
};

const HEADER: &str = "<panel.header>";
const ROWS: &str = "<panel.rows>";

fn panel() -> CompositeDef {
    let header = SinglePart::new("header", HEADER)
        .default_spec(|owner| Spec::from(json!({ "dom": { "tag": "h2", "innerHtml": owner.uid().as_str() } })));
    let rows = GroupPart::new("rows", "row", ROWS)
        .item_schema(Schema::new(vec![
            FieldSchema::required_string("label"),
            FieldSchema::defaulted("dom", Value::from(json!({ "tag": "li" }))),
        ]))
        .unit(|spec| {
            let label = spec.get("label").and_then(Value::as_str).unwrap_or_default();
            Ok(Spec::new().with("dom", Value::from(json!({ "tag": "li", "innerHtml": label }))))
        });

    CompositeDef::new(
        "panel",
        Schema::new(vec![FieldSchema::defaulted("dom", Value::from(json!({ "tag": "section" })))]),
        |owner, components| Ok(component_fields(owner, components)),
    )
    .part(header)
    .part(rows)
}

fn panel_spec(rows: serde_json::Value) -> Spec {
    Spec::from(json!({ "rows": rows })).with(
        "components",
        Value::from(vec![
            Value::from(json!({ "dom": { "tag": "p", "innerHtml": "before" } })),
            placeholder(HEADER),
            placeholder(ROWS),
            Value::from(json!({ "dom": { "tag": "p", "innerHtml": "after" } })),
        ]),
    )
}

fn inner(component: &spark_compose::Component) -> String {
    component.dom().inner_html.unwrap_or_default()
}

#[test]
fn test_parts_splice_between_plain_children() {
    let system = System::new();
    let panel = composite::build(&system, &panel(), &panel_spec(json!([{ "label": "x" }, { "label": "y" }])))
        .unwrap();

    let tags: Vec<String> = panel.children().iter().map(|c| c.dom().tag).collect();
    assert_eq!(tags, vec!["p", "h2", "li", "li", "p"]);
    let text: Vec<String> = panel.children().iter().map(inner).collect();
    assert_eq!(text[0], "before");
    assert_eq!(text[1], panel.uid().as_str());
    assert_eq!(&text[2..], ["x", "y", "after"]);

    let header = system.get_by_uid(&panel.uid().part("header")).unwrap();
    assert_eq!(header.dom().tag, "h2");
}

#[test]
fn test_failing_row_registers_nothing() {
    let system = System::new();
    let err = composite::build(&system, &panel(), &panel_spec(json!([{ "label": "x" }, {}, { "label": 3 }])))
        .unwrap_err();

    assert_eq!(err.validation_errors().unwrap().paths(), vec!["rows[1].label", "rows[2].label"]);
    assert_eq!(system.component_count(), 0);
}

#[test]
fn test_unknown_placeholder_is_a_build_error() {
    let system = System::new();
    let spec = Spec::from(json!({ "rows": [] })).with("components", Value::from(vec![placeholder("<nope>")]));
    let err = composite::build(&system, &panel(), &spec).unwrap_err();
    assert!(matches!(err, BuildError::UnknownPlaceholder(name) if name == "<nope>"));
    assert_eq!(system.component_count(), 0);
}

#[test]
fn test_conflicting_exhibits_abort_build() {
    let system = System::new();
    let first = CustomBehaviour::new("first").with_exhibit(|_| DomModification::new().attribute("role", "menu"));
    let second = CustomBehaviour::new("second").with_exhibit(|_| DomModification::new().attribute("role", "list"));
    let spec = Spec::from(json!({ "dom": { "tag": "div" } }))
        .with("customBehaviours", vec![custom_value(first), custom_value(second)]);

    let err = system.build(&spec).unwrap_err();
    assert!(matches!(err, BuildError::ExhibitConflict { ref key, .. } if key == "role"));
    assert_eq!(system.component_count(), 0);
}

#[test]
fn test_behaviour_errors() {
    let system = System::new();
    let unknown = Spec::from(json!({ "dom": { "tag": "div" }, "behaviours": { "sparkling": {} } }));
    assert!(matches!(system.build(&unknown), Err(BuildError::UnknownBehaviour(name)) if name == "sparkling"));

    let config = Spec::from(json!({ "dom": { "tag": "div" }, "behaviours": { "toggling": {} } }));
    let err = system.build(&config).unwrap_err();
    assert_eq!(err.validation_errors().unwrap().paths(), vec!["toggling.toggleClass"]);
}

#[test]
fn test_retired_uid_is_never_reused() {
    let system = System::new();
    let spec = Spec::from(json!({ "uid": "only", "dom": { "tag": "div" } }));
    let first = system.build(&spec).unwrap();
    assert!(matches!(system.build(&spec), Err(BuildError::DuplicateUid(_))));

    system.deregister(&first);
    assert!(system.is_retired("only"));
    assert!(matches!(system.build(&spec), Err(BuildError::DuplicateUid(_))));
}
