//! Tab bar - a row of tab buttons with at most one selected.
//!
//! Tabs are a required group part (`tabs`, placeholder `<alloy.tabs>`). Each
//! tab is a [`tab_button`](super::tab_button) whose action is injected by the
//! group overrides:
//!
//! - executing an unselected tab highlights it and fires `alloy.change.tab`
//! - executing the selected tab with `clickToDismiss` dehighlights every tab
//!   and fires `alloy.dismiss.tab`
//! - executing the selected tab otherwise does nothing
//!
//! The tab bar's own handlers for those events call `onChange` and
//! `onDismiss` with the tab bar and the tab button.
//!
//! # Example
//!
//! ```ignore
//! let bar = tabbar::build(&system, &Spec::from(json!({
//!     "tabs": [{ "value": "a" }, { "value": "b" }],
//! }))
//! .with("components", Value::from(vec![placeholder(tabbar::TABS)]))
//! .with("onChange", tabbar::callback(|bar, tab| show_panel(tab))))?;
//! ```

use std::rc::Rc;

use serde_json::json;
use tracing::debug;

use super::{button, tab_button};
use crate::behaviour::{custom_value, highlighting, CustomBehaviour};
use crate::composite::{self, component_fields, CompositeDef, CompositeDetail};
use crate::dom::DomModification;
use crate::error::BuildError;
use crate::parts::GroupPart;
use crate::schema::{FieldSchema, Object, Processor, Schema, Spec, Value};
use crate::system::{events, handler, Component, SimulatedEvent, System};
use crate::types::Uid;

pub const KIND: &str = "tab-bar";

/// Placeholder token for the tabs group.
pub const TABS: &str = "<alloy.tabs>";

/// Called with `(tabbar, tab_button)`.
pub type TabCallback = Rc<dyn Fn(&Component, &Component)>;

pub fn callback(f: impl Fn(&Component, &Component) + 'static) -> Value {
    Value::opaque(Rc::new(f) as TabCallback)
}

fn markers_schema() -> Schema {
    Schema::new(vec![
        FieldSchema::defaulted_of("tabClass", "alloy-tab", Processor::String),
        FieldSchema::defaulted_of("selectedClass", "alloy-selected-tab", Processor::String),
    ])
}

pub fn definition() -> CompositeDef {
    let tabs = GroupPart::new("tabs", "tab", TABS)
        .required()
        .item_schema(tab_button::schema())
        .overrides(tab_overrides)
        .unit(tab_button::sketch);

    CompositeDef::new(
        KIND,
        Schema::new(vec![
            FieldSchema::defaulted("dom", Value::from(json!({ "tag": "div", "attributes": { "role": "tablist" } }))),
            FieldSchema::option_of("onChange", Processor::Function),
            FieldSchema::option_of("onDismiss", Processor::Function),
            FieldSchema::defaulted_of("clickToDismiss", false, Processor::Boolean),
            FieldSchema::defaulted_object("markers", markers_schema()),
        ]),
        factory,
    )
    .part(tabs)
}

fn tab_overrides(bar: &CompositeDetail, raw: &Spec) -> Spec {
    let markers = bar.detail().nested("markers").ok();
    let tab_class = markers
        .as_ref()
        .and_then(|m| m.string("tabClass").ok())
        .unwrap_or("alloy-tab")
        .to_string();
    let click_to_dismiss = bar.detail().bool("clickToDismiss").unwrap_or(false);

    let tab_buttons =
        CustomBehaviour::new("tabbar.tabbuttons").with_exhibit(move |_| DomModification::new().class(tab_class.as_str()));
    let mut custom: Vec<Value> = raw
        .get("customBehaviours")
        .and_then(Value::as_array)
        .map(<[Value]>::to_vec)
        .unwrap_or_default();
    custom.push(custom_value(tab_buttons));

    let bar_uid = bar.uid().clone();
    Spec::new()
        .with("customBehaviours", custom)
        .with(
            "action",
            button::action(move |tab| {
                let Some(bar) = tab.system().and_then(|s| s.get_by_uid(&bar_uid)) else {
                    return;
                };
                activate(&bar, tab, click_to_dismiss);
            }),
        )
}

fn factory(owner: &CompositeDetail, components: Vec<Value>) -> Result<Spec, BuildError> {
    let detail = owner.detail();
    let markers = detail.nested("markers")?;

    let selected_class = markers.string("selectedClass")?;
    let tab_class = markers.string("tabClass")?;
    let highlighting = Value::from(json!({
        "highlighting": { "highlightClass": selected_class, "itemClass": tab_class }
    }));
    let behaviours = detail.value("behaviours")?.deep_merge(&highlighting);

    let mut handlers = detail.object("events")?.clone();
    if let Some(on_change) = detail.option_opaque::<TabCallback>("onChange")?.cloned() {
        handlers.insert(events::CHANGE_TAB.to_string(), tab_handler(on_change));
    }
    if let Some(on_dismiss) = detail.option_opaque::<TabCallback>("onDismiss")?.cloned() {
        handlers.insert(events::DISMISS_TAB.to_string(), tab_handler(on_dismiss));
    }

    Ok(component_fields(owner, components)
        .with("behaviours", behaviours)
        .with("events", handlers))
}

fn tab_handler(callback: TabCallback) -> Value {
    handler(move |bar: &Component, event: &mut SimulatedEvent| {
        let Some(uid) = event.payload().get("button").and_then(Value::as_str) else {
            return;
        };
        if let Some(tab) = bar.system().and_then(|s| s.get_by_uid(uid)) {
            callback(bar, &tab);
        }
    })
}

fn payload(bar: &Component, tab: &Component) -> Value {
    let mut payload = Object::new();
    payload.insert("tabbar".to_string(), Value::from(bar.uid()));
    payload.insert("button".to_string(), Value::from(tab.uid()));
    Value::Object(payload)
}

/// Select or dismiss `tab` the way executing it would.
pub fn activate(bar: &Component, tab: &Component, click_to_dismiss: bool) {
    let Some(system) = bar.system() else {
        return;
    };
    if highlighting::is_highlighted(bar, tab) {
        if click_to_dismiss {
            highlighting::dehighlight_all(bar);
            system.trigger_event(bar, events::DISMISS_TAB, payload(bar, tab));
        } else {
            debug!(tabbar = %bar.uid(), tab = %tab.uid(), "tab already selected");
        }
        return;
    }
    highlighting::highlight(bar, tab);
    system.trigger_event(bar, events::CHANGE_TAB, payload(bar, tab));
}

pub fn tabs(bar: &Component) -> Vec<Component> {
    highlighting::candidates(bar)
}

pub fn selected(bar: &Component) -> Option<Component> {
    highlighting::get_highlighted(bar)
}

/// Execute the tab representing `value`. Returns false when no tab has it.
pub fn select_value(bar: &Component, value: &str) -> bool {
    let Some(tab) = tabs(bar)
        .into_iter()
        .find(|t| tab_button::value(t).as_deref() == Some(value))
    else {
        return false;
    };
    if let Some(system) = bar.system() {
        system.dispatch(&tab, events::EXECUTE, Value::Null);
    }
    true
}

pub fn build(system: &System, spec: &Spec) -> Result<Component, BuildError> {
    composite::build(system, &definition(), spec)
}

/// The uid of the tab bar owning `tab`, if it is one of a tab bar's tabs.
pub fn owner_of(tab: &Component) -> Option<Uid> {
    let mut current = tab.parent();
    while let Some(component) = current {
        if highlighting::candidates(&component).iter().any(|c| c.ptr_eq(tab)) {
            return Some(component.uid().clone());
        }
        current = component.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parts::placeholder;
    use std::cell::RefCell;

    fn bar_spec(tabs: serde_json::Value) -> Spec {
        Spec::from(json!({ "tabs": tabs })).with("components", Value::from(vec![placeholder(TABS)]))
    }

    #[test]
    fn test_tabs_get_marker_class() {
        let system = System::new();
        let bar = build(&system, &bar_spec(json!([{ "value": "a" }, { "value": "b" }]))).unwrap();
        assert_eq!(tabs(&bar).len(), 2);
        assert!(tabs(&bar).iter().all(|t| t.has_class("alloy-tab")));
        assert_eq!(bar.attribute("role").as_deref(), Some("tablist"));
        assert_eq!(owner_of(&tabs(&bar)[0]).as_ref(), Some(bar.uid()));
    }

    #[test]
    fn test_select_value_fires_change() {
        let system = System::new();
        let changes = Rc::new(RefCell::new(Vec::new()));
        let seen = changes.clone();
        let bar = build(
            &system,
            &bar_spec(json!([{ "value": "a" }, { "value": "b" }])).with(
                "onChange",
                callback(move |_, tab| seen.borrow_mut().push(tab_button::value(tab).unwrap_or_default())),
            ),
        )
        .unwrap();

        assert!(select_value(&bar, "b"));
        assert!(!select_value(&bar, "z"));
        assert_eq!(*changes.borrow(), vec!["b"]);
        assert_eq!(tab_button::value(&selected(&bar).unwrap()).as_deref(), Some("b"));
    }

    #[test]
    fn test_tabs_are_required() {
        let system = System::new();
        let err = build(&system, &Spec::from(json!({}))).unwrap_err();
        assert_eq!(err.validation_errors().unwrap().paths(), vec!["tabs"]);
    }

    #[test]
    fn test_custom_markers() {
        let system = System::new();
        let bar = build(
            &system,
            &bar_spec(json!([{ "value": "a" }])).with(
                "markers",
                Value::from(json!({ "tabClass": "t", "selectedClass": "s" })),
            ),
        )
        .unwrap();
        let tab = &tabs(&bar)[0];
        assert!(tab.has_class("t"));
        select_value(&bar, "a");
        assert!(tab.has_class("s"));
    }
}
