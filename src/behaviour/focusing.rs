//! Focusing - a component that can take focus.
//!
//! Focus itself is tracked by the [`System`](crate::system::System); this
//! behaviour makes a component eligible, exhibits `tabindex="-1"` and runs
//! the optional `onFocus` callback on the focus event.

use std::rc::Rc;

use super::{Behaviour, EventHandlers};
use crate::dom::{DomDefinition, DomModification};
use crate::error::BuildError;
use crate::schema::{Detail, FieldSchema, Processor, Schema, Value};
use crate::system::{events, Component, SimulatedEvent};

pub const NAME: &str = "focusing";

pub type FocusCallback = Rc<dyn Fn(&Component)>;

pub fn callback(f: impl Fn(&Component) + 'static) -> Value {
    Value::opaque(Rc::new(f) as FocusCallback)
}

pub struct Focusing;

#[derive(Clone, Default)]
pub struct FocusConfig {
    pub on_focus: Option<FocusCallback>,
}

impl Behaviour for Focusing {
    type Config = FocusConfig;
    type State = ();

    fn name(&self) -> &str {
        NAME
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![FieldSchema::option_of("onFocus", Processor::Function)])
    }

    fn configure(&self, detail: &Detail) -> Result<FocusConfig, BuildError> {
        Ok(FocusConfig {
            on_focus: detail.option_opaque::<FocusCallback>("onFocus")?.cloned(),
        })
    }

    fn init_state(&self, _config: &FocusConfig) {}

    fn exhibit(&self, _config: &FocusConfig, _base: &DomDefinition) -> DomModification {
        DomModification::new().attribute("tabindex", "-1")
    }

    fn events(&self, config: &Rc<FocusConfig>) -> EventHandlers {
        let mut handlers = EventHandlers::new();
        if let Some(on_focus) = config.on_focus.clone() {
            handlers.insert(
                events::FOCUS.to_string(),
                Rc::new(move |component: &Component, _: &mut SimulatedEvent| on_focus(component)),
            );
        }
        handlers
    }
}

/// Ask the component's system to focus it.
pub fn focus(component: &Component) -> bool {
    if !component.has_behaviour(NAME) {
        return false;
    }
    component.system().is_some_and(|system| system.focus(component))
}

pub fn is_focused(component: &Component) -> bool {
    component.system().is_some_and(|system| system.is_focused(component))
}
