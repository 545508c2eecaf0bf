//! Button - runs an action when executed.
//!
//! Clicks arrive as `alloy.execute`; Enter and Space are turned into
//! `alloy.execute` by the `keying` behaviour. The action is the button's
//! base handler, so `eventOrder` can place it among behaviour handlers.
//!
//! # Example
//!
//! ```ignore
//! let save = button::build(&system, &Spec::from(json!({ "text": "Save" }))
//!     .with("action", button::action(|_| save_document())))?;
//! ```

use std::rc::Rc;

use serde_json::json;

use crate::composite::{self, component_fields, CompositeDef, CompositeDetail};
use crate::error::BuildError;
use crate::schema::{FieldSchema, Object, Processor, Schema, Spec, Value};
use crate::system::{events, handler, Component, EventHandler, System};

pub const KIND: &str = "button";

/// Runs with the executed button.
pub type ButtonAction = Rc<dyn Fn(&Component)>;

pub fn action(f: impl Fn(&Component) + 'static) -> Value {
    Value::opaque(Rc::new(f) as ButtonAction)
}

pub fn definition() -> CompositeDef {
    CompositeDef::new(
        KIND,
        Schema::new(vec![
            FieldSchema::defaulted("dom", Value::from(json!({ "tag": "button" }))),
            FieldSchema::option_of("text", Processor::String),
            FieldSchema::option_of("action", Processor::Function),
        ]),
        factory,
    )
}

fn factory(owner: &CompositeDetail, components: Vec<Value>) -> Result<Spec, BuildError> {
    let detail = owner.detail();
    let mut spec = component_fields(owner, components);

    if let Some(text) = detail.option_string("text")? {
        let dom = detail.value("dom")?.deep_merge(&Value::from(json!({ "innerHtml": text })));
        spec = spec.with("dom", dom);
    }

    let defaults = Value::from(json!({
        "focusing": true,
        "keying": { "mode": "execution", "useSpace": true }
    }));
    spec = spec.with("behaviours", defaults.deep_merge(detail.value("behaviours")?));

    if let Some(action) = detail.option_opaque::<ButtonAction>("action")?.cloned() {
        spec = spec.with("events", with_base_handler(detail.object("events")?, events::EXECUTE, move |c, _| action(c)));
    }
    Ok(spec)
}

/// `events` with `f` as the base handler for `event`, unless the author set one.
pub(crate) fn with_base_handler(
    events: &Object,
    event: &str,
    f: impl Fn(&Component, &mut crate::system::SimulatedEvent) + 'static,
) -> Value {
    let mut events = events.clone();
    if !events.contains_key(event) {
        events.insert(event.to_string(), handler(f));
    }
    Value::Object(events)
}

pub fn build(system: &System, spec: &Spec) -> Result<Component, BuildError> {
    composite::build(system, &definition(), spec)
}

/// The button's base handler for `alloy.execute`, if it has one.
pub fn base_action(button: &Component) -> Option<EventHandler> {
    button
        .handlers_for(events::EXECUTE)
        .into_iter()
        .find(|(name, _)| name == events::BASE_HANDLER)
        .map(|(_, h)| h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::keyboard::{self, KeyboardEvent};
    use std::cell::Cell;

    fn counting_button(system: &System, count: &Rc<Cell<u32>>) -> Component {
        let count = count.clone();
        build(
            system,
            &Spec::from(json!({ "text": "Save" })).with("action", action(move |_| count.set(count.get() + 1))),
        )
        .unwrap()
    }

    #[test]
    fn test_execute_runs_action() {
        let system = System::new();
        let count = Rc::new(Cell::new(0));
        let button = counting_button(&system, &count);

        system.dispatch(&button, events::EXECUTE, Value::Null);
        assert_eq!(count.get(), 1);
        assert_eq!(button.dom().inner_html.as_deref(), Some("Save"));
        assert_eq!(button.attribute("tabindex").as_deref(), Some("-1"));
        assert!(base_action(&button).is_some());
    }

    #[test]
    fn test_keys_execute() {
        let system = System::new();
        let count = Rc::new(Cell::new(0));
        let button = counting_button(&system, &count);

        system.dispatch(&button, events::KEY_DOWN, keyboard::payload(KeyboardEvent::new("Enter")));
        system.dispatch(&button, events::KEY_DOWN, keyboard::payload(KeyboardEvent::new(" ")));
        system.dispatch(&button, events::KEY_DOWN, keyboard::payload(KeyboardEvent::new("x")));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_action_must_be_function() {
        let system = System::new();
        let err = build(&system, &Spec::from(json!({ "action": "save" }))).unwrap_err();
        assert_eq!(err.validation_errors().unwrap().paths(), vec!["action"]);
    }
}
