//! Inline one-off behaviours.
//!
//! A [`CustomBehaviour`] is a behaviour built from closures instead of a type:
//! a name, an optional exhibit and a set of handlers. Composites use it for
//! things that only make sense inside them, such as the tab bar marking each
//! tab button with its tab class.
//!
//! # Example
//!
//! ```ignore
//! let tab_marker = CustomBehaviour::new("tabbar.tabbuttons")
//!     .with_exhibit(move |_| DomModification::new().class(&tab_class))
//!     .on(events::FOCUS, |component, _| tracing::debug!(uid = %component.uid(), "tab focused"));
//!
//! let spec = spec.with("customBehaviours", Value::from(vec![custom_value(tab_marker)]));
//! ```

use std::rc::Rc;

use super::{Behaviour, EventHandlers};
use crate::dom::{DomDefinition, DomModification};
use crate::error::BuildError;
use crate::schema::{Detail, Schema};
use crate::system::{Component, SimulatedEvent};

type ExhibitFn = Rc<dyn Fn(&DomDefinition) -> DomModification>;

#[derive(Clone)]
pub struct CustomBehaviour {
    name: String,
    schema: Schema,
    exhibit: Option<ExhibitFn>,
    handlers: EventHandlers,
}

impl CustomBehaviour {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: Schema::default(),
            exhibit: None,
            handlers: EventHandlers::new(),
        }
    }

    /// Schema for the behaviour's configuration block. The validated detail
    /// is the config, reachable through `Component::behaviour_config::<Detail>`.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_exhibit(mut self, f: impl Fn(&DomDefinition) -> DomModification + 'static) -> Self {
        self.exhibit = Some(Rc::new(f));
        self
    }

    pub fn on(mut self, event: &str, f: impl Fn(&Component, &mut SimulatedEvent) + 'static) -> Self {
        self.handlers.insert(event.to_string(), Rc::new(f));
        self
    }
}

impl Behaviour for CustomBehaviour {
    type Config = Detail;
    type State = ();

    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    fn configure(&self, detail: &Detail) -> Result<Detail, BuildError> {
        Ok(detail.clone())
    }

    fn init_state(&self, _config: &Detail) {}

    fn exhibit(&self, _config: &Detail, base: &DomDefinition) -> DomModification {
        self.exhibit.as_ref().map(|f| f(base)).unwrap_or_default()
    }

    fn events(&self, _config: &Rc<Detail>) -> EventHandlers {
        self.handlers.clone()
    }
}
