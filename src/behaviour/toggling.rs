//! Toggling - an on/off state mirrored into a class and an aria attribute.
//!
//! # Example
//!
//! ```ignore
//! "behaviours": {
//!     "toggling": { "toggleClass": "open", "aria": "expanded" }
//! }
//!
//! toggling::toggle(&button);
//! assert_eq!(button.attribute("aria-expanded").as_deref(), Some("true"));
//! ```

use std::rc::Rc;

use super::{Behaviour, EventHandlers};
use crate::dom::{DomDefinition, DomModification};
use crate::error::BuildError;
use crate::schema::{Detail, FieldSchema, Processor, Schema};
use crate::system::{events, Component, SimulatedEvent};

pub const NAME: &str = "toggling";

pub struct Toggling;

/// Which aria attribute mirrors the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AriaMode {
    None,
    Pressed,
    Expanded,
    Checked,
    Selected,
}

impl AriaMode {
    fn parse(value: &str) -> Self {
        match value {
            "pressed" => AriaMode::Pressed,
            "expanded" => AriaMode::Expanded,
            "checked" => AriaMode::Checked,
            "selected" => AriaMode::Selected,
            _ => AriaMode::None,
        }
    }

    pub fn attribute(self) -> Option<&'static str> {
        match self {
            AriaMode::None => None,
            AriaMode::Pressed => Some("aria-pressed"),
            AriaMode::Expanded => Some("aria-expanded"),
            AriaMode::Checked => Some("aria-checked"),
            AriaMode::Selected => Some("aria-selected"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToggleConfig {
    pub toggle_class: String,
    pub aria: AriaMode,
    pub toggle_on_execute: bool,
    pub selected: bool,
}

#[derive(Debug, Default)]
pub struct ToggleState {
    pub on: bool,
}

impl Behaviour for Toggling {
    type Config = ToggleConfig;
    type State = ToggleState;

    fn name(&self) -> &str {
        NAME
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            FieldSchema::required_string("toggleClass"),
            FieldSchema::defaulted_of(
                "aria",
                "none",
                Processor::one_of(["none", "pressed", "expanded", "checked", "selected"]),
            ),
            FieldSchema::defaulted_of("toggleOnExecute", true, Processor::Boolean),
            FieldSchema::defaulted_of("selected", false, Processor::Boolean),
        ])
    }

    fn configure(&self, detail: &Detail) -> Result<ToggleConfig, BuildError> {
        Ok(ToggleConfig {
            toggle_class: detail.string("toggleClass")?.to_string(),
            aria: AriaMode::parse(detail.string("aria")?),
            toggle_on_execute: detail.bool("toggleOnExecute")?,
            selected: detail.bool("selected")?,
        })
    }

    fn init_state(&self, config: &ToggleConfig) -> ToggleState {
        ToggleState { on: config.selected }
    }

    fn exhibit(&self, config: &ToggleConfig, _base: &DomDefinition) -> DomModification {
        let mut modification = DomModification::default();
        if config.selected {
            modification = modification.class(&config.toggle_class);
        }
        if let Some(attribute) = config.aria.attribute() {
            modification = modification.attribute(attribute, config.selected.to_string());
        }
        modification
    }

    fn events(&self, config: &Rc<ToggleConfig>) -> EventHandlers {
        let mut handlers = EventHandlers::new();
        if config.toggle_on_execute {
            handlers.insert(
                events::EXECUTE.to_string(),
                Rc::new(|component: &Component, _: &mut SimulatedEvent| {
                    toggle(component);
                }),
            );
        }
        handlers
    }
}

// =============================================================================
// API
// =============================================================================

pub fn is_on(component: &Component) -> bool {
    component
        .with_state(NAME, |state: &mut ToggleState| state.on)
        .unwrap_or(false)
}

pub fn set(component: &Component, on: bool) {
    let Some(config) = component.behaviour_config::<ToggleConfig>(NAME) else {
        return;
    };
    component.with_state(NAME, |state: &mut ToggleState| state.on = on);
    if on {
        component.add_class(&config.toggle_class);
    } else {
        component.remove_class(&config.toggle_class);
    }
    if let Some(attribute) = config.aria.attribute() {
        component.set_attribute(attribute, on.to_string());
    }
}

pub fn on(component: &Component) {
    set(component, true);
}

pub fn off(component: &Component) {
    set(component, false);
}

pub fn toggle(component: &Component) {
    set(component, !is_on(component));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Spec, Value};
    use crate::system::System;
    use serde_json::json;

    fn build(config: serde_json::Value) -> (System, Component) {
        let system = System::new();
        let component = system
            .build(&Spec::from(json!({
                "dom": { "tag": "button" },
                "behaviours": { "toggling": config }
            })))
            .unwrap();
        (system, component)
    }

    #[test]
    fn test_selected_exhibits_class_and_aria() {
        let (_system, button) = build(json!({ "toggleClass": "on", "aria": "pressed", "selected": true }));
        assert!(button.has_class("on"));
        assert_eq!(button.attribute("aria-pressed").as_deref(), Some("true"));
        assert!(is_on(&button));
    }

    #[test]
    fn test_execute_toggles() {
        let (system, button) = build(json!({ "toggleClass": "on", "aria": "expanded" }));
        assert_eq!(button.attribute("aria-expanded").as_deref(), Some("false"));

        system.dispatch(&button, events::EXECUTE, Value::Null);
        assert!(is_on(&button));
        assert!(button.has_class("on"));

        system.dispatch(&button, events::EXECUTE, Value::Null);
        assert!(!is_on(&button));
        assert!(!button.has_class("on"));
        assert_eq!(button.attribute("aria-expanded").as_deref(), Some("false"));
    }

    #[test]
    fn test_execute_can_be_disabled() {
        let (system, button) = build(json!({ "toggleClass": "on", "toggleOnExecute": false }));
        system.dispatch(&button, events::EXECUTE, Value::Null);
        assert!(!is_on(&button));
        on(&button);
        assert!(is_on(&button));
        off(&button);
        assert!(!button.has_class("on"));
    }

    #[test]
    fn test_unknown_aria_mode_rejected() {
        let system = System::new();
        let err = system
            .build(&Spec::from(json!({
                "dom": { "tag": "button" },
                "behaviours": { "toggling": { "toggleClass": "on", "aria": "busy" } }
            })))
            .unwrap_err();
        assert_eq!(err.validation_errors().unwrap().paths(), vec!["toggling.aria"]);
    }
}
