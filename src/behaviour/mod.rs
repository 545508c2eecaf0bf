//! Behaviours - named capabilities composed onto components.
//!
//! A behaviour bundles a configuration schema, per-instance state, an API
//! (free functions in each behaviour module that take the component), an
//! optional dom exhibit and optional event handlers. Behaviours are composed,
//! never inherited: the builder folds an ordered list of them onto a
//! component.
//!
//! # Composition order
//!
//! Behaviours are composed in the key order of the spec's `behaviours`
//! block, followed by any `customBehaviours` the block does not mention.
//! That order is the default handler order at dispatch time.
//!
//! # Example
//!
//! ```ignore
//! use spark_compose::behaviour::{Behaviour, EventHandlers};
//!
//! struct Counting;
//!
//! impl Behaviour for Counting {
//!     type Config = ();
//!     type State = u32;
//!
//!     fn name(&self) -> &str { "counting" }
//!     fn schema(&self) -> Schema { Schema::default() }
//!     fn configure(&self, _: &Detail) -> Result<(), BuildError> { Ok(()) }
//!     fn init_state(&self, _: &()) -> u32 { 0 }
//! }
//!
//! system.register_behaviour(Counting)?;
//! ```

pub mod coupling;
pub mod custom;
pub mod focusing;
pub mod highlighting;
pub mod keying;
pub mod registry;
pub mod replacing;
pub mod representing;
pub mod tabstopping;
pub mod toggling;

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::dom::{self, DomDefinition, DomModification};
use crate::error::{BuildError, ValidationErrors};
use crate::schema::{Detail, Object, Schema, Spec, Value};
use crate::system::EventHandler;

pub use custom::CustomBehaviour;
pub use registry::BehaviourRegistry;

/// Event handlers keyed by event name.
pub type EventHandlers = IndexMap<String, EventHandler>;

/// Shared, type-erased behaviour.
pub type BehaviourRef = Rc<dyn AnyBehaviour>;

// =============================================================================
// Behaviour trait
// =============================================================================

/// A composable capability.
pub trait Behaviour: 'static {
    /// Validated, immutable configuration.
    type Config: 'static;
    /// Per-component runtime state.
    type State: 'static;

    fn name(&self) -> &str;

    fn schema(&self) -> Schema;

    /// Turn the validated configuration block into the typed config.
    fn configure(&self, detail: &Detail) -> Result<Self::Config, BuildError>;

    fn init_state(&self, config: &Self::Config) -> Self::State;

    fn exhibit(&self, _config: &Self::Config, _base: &DomDefinition) -> DomModification {
        DomModification::default()
    }

    fn events(&self, _config: &Rc<Self::Config>) -> EventHandlers {
        EventHandlers::new()
    }
}

/// Object-safe view of a [`Behaviour`], used by the registry and composer.
pub trait AnyBehaviour {
    fn behaviour_name(&self) -> &str;

    /// Validate `config`, then instantiate state, exhibit and handlers.
    fn compose(&self, config: &Value, base: &DomDefinition) -> Result<ComposedBehaviour, BuildError>;
}

impl<B: Behaviour> AnyBehaviour for B {
    fn behaviour_name(&self) -> &str {
        self.name()
    }

    fn compose(&self, config: &Value, base: &DomDefinition) -> Result<ComposedBehaviour, BuildError> {
        let name = self.name();

        // `"focusing": true` is shorthand for an empty block
        let spec = match config {
            Value::Null | Value::Bool(true) => Spec::new(),
            other => other.to_spec().ok_or_else(|| {
                BuildError::validation("behaviour", ValidationErrors::single(name, "Must be an object."))
            })?,
        };

        let detail = self
            .schema()
            .validate(&spec)
            .map_err(|errors| BuildError::validation("behaviour", errors.prefixed(name)))?;

        let config = Rc::new(self.configure(&detail)?);
        let state = self.init_state(&config);
        let exhibit = self.exhibit(&config, base);
        let handlers = self.events(&config);

        Ok(ComposedBehaviour {
            name: name.to_string(),
            config,
            state: RefCell::new(Box::new(state)),
            exhibit,
            handlers,
        })
    }
}

/// Wrap a behaviour as a value for a spec's `customBehaviours` list.
pub fn custom_value(behaviour: impl AnyBehaviour + 'static) -> Value {
    Value::opaque(Rc::new(behaviour) as BehaviourRef)
}

// =============================================================================
// Composed behaviour
// =============================================================================

/// A behaviour instance living on one component.
pub struct ComposedBehaviour {
    name: String,
    config: Rc<dyn Any>,
    state: RefCell<Box<dyn Any>>,
    exhibit: DomModification,
    handlers: EventHandlers,
}

impl ComposedBehaviour {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exhibit(&self) -> &DomModification {
        &self.exhibit
    }

    pub fn handler(&self, event: &str) -> Option<EventHandler> {
        self.handlers.get(event).cloned()
    }

    pub fn handles(&self, event: &str) -> bool {
        self.handlers.contains_key(event)
    }

    pub fn handled_events(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn config<C: 'static>(&self) -> Option<Rc<C>> {
        self.config.clone().downcast::<C>().ok()
    }

    /// Run `f` on the state. The borrow ends before this returns, so never
    /// call back into the same behaviour from inside `f`.
    pub fn with_state<S: 'static, R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let mut state = self.state.borrow_mut();
        state.downcast_mut::<S>().map(f)
    }
}

impl fmt::Debug for ComposedBehaviour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposedBehaviour")
            .field("name", &self.name)
            .field("exhibit", &self.exhibit)
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// Composer
// =============================================================================

/// Result of composing a component's behaviours.
#[derive(Debug)]
pub struct Composition {
    pub behaviours: Vec<ComposedBehaviour>,
    pub dom: DomDefinition,
}

/// Compose the behaviours named in `block` (plus `custom`) onto `base`.
///
/// Configuration failures aggregate across every behaviour before the
/// build is aborted. Unknown and duplicate names abort immediately.
pub fn compose(
    registry: &BehaviourRegistry,
    block: &Object,
    custom: &[BehaviourRef],
    base: &DomDefinition,
) -> Result<Composition, BuildError> {
    let mut seen = HashSet::new();
    for behaviour in custom {
        let name = behaviour.behaviour_name();
        if !seen.insert(name) || registry.contains(name) {
            return Err(BuildError::DuplicateBehaviour(name.to_string()));
        }
    }

    let mut resolved: Vec<(BehaviourRef, Value)> = Vec::new();
    for (name, config) in block {
        let behaviour = custom
            .iter()
            .find(|b| b.behaviour_name() == name)
            .cloned()
            .or_else(|| registry.get(name))
            .ok_or_else(|| BuildError::UnknownBehaviour(name.clone()))?;
        resolved.push((behaviour, config.clone()));
    }
    for behaviour in custom {
        if !block.contains_key(behaviour.behaviour_name()) {
            resolved.push((behaviour.clone(), Value::Null));
        }
    }

    let mut behaviours = Vec::with_capacity(resolved.len());
    let mut failures = Vec::new();
    for (behaviour, config) in &resolved {
        match behaviour.compose(config, base) {
            Ok(composed) => behaviours.push(composed),
            Err(BuildError::Validation { errors, .. }) => failures.extend(errors),
            Err(other) => return Err(other),
        }
    }
    if let Some(errors) = ValidationErrors::from_vec(failures) {
        return Err(BuildError::validation("behaviour", errors));
    }

    let dom = dom::merge(base, behaviours.iter().map(|b| (b.name(), b.exhibit())))?;
    debug!(
        behaviours = ?behaviours.iter().map(ComposedBehaviour::name).collect::<Vec<_>>(),
        "composed behaviours"
    );

    Ok(Composition { behaviours, dom })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn block(json: serde_json::Value) -> Object {
        match Value::from(json) {
            Value::Object(map) => map,
            _ => Object::new(),
        }
    }

    fn compose_block(json: serde_json::Value) -> Result<Composition, BuildError> {
        compose(
            &BehaviourRegistry::with_builtins(),
            &block(json),
            &[],
            &DomDefinition::new("div"),
        )
    }

    #[test]
    fn test_composition_follows_block_order() {
        let composed = compose_block(json!({
            "toggling": { "toggleClass": "on" },
            "focusing": true,
            "representing": {}
        }))
        .unwrap();
        let names: Vec<&str> = composed.behaviours.iter().map(ComposedBehaviour::name).collect();
        assert_eq!(names, vec!["toggling", "focusing", "representing"]);
    }

    #[test]
    fn test_unknown_behaviour() {
        let err = compose_block(json!({ "sliding": {} })).unwrap_err();
        assert!(matches!(err, BuildError::UnknownBehaviour(name) if name == "sliding"));
    }

    #[test]
    fn test_config_failures_are_qualified_and_aggregated() {
        let err = compose_block(json!({
            "toggling": {},
            "keying": { "mode": "sideways" }
        }))
        .unwrap_err();
        let errors = err.validation_errors().unwrap();
        assert_eq!(errors.paths(), vec!["toggling.toggleClass", "keying.mode"]);
    }

    #[test]
    fn test_duplicate_custom_behaviour() {
        let custom: Vec<BehaviourRef> = vec![
            Rc::new(CustomBehaviour::new("tabbar.tabbuttons")),
            Rc::new(CustomBehaviour::new("tabbar.tabbuttons")),
        ];
        let err = compose(
            &BehaviourRegistry::with_builtins(),
            &Object::new(),
            &custom,
            &DomDefinition::new("div"),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::DuplicateBehaviour(_)));
    }

    #[test]
    fn test_custom_behaviours_append_after_block() {
        let custom: Vec<BehaviourRef> = vec![Rc::new(
            CustomBehaviour::new("tabbar.tabbuttons").with_exhibit(|_| DomModification::new().class("tab")),
        )];
        let composed = compose(
            &BehaviourRegistry::with_builtins(),
            &block(json!({ "representing": { "initialValue": "a" } })),
            &custom,
            &DomDefinition::new("span"),
        )
        .unwrap();
        let names: Vec<&str> = composed.behaviours.iter().map(ComposedBehaviour::name).collect();
        assert_eq!(names, vec!["representing", "tabbar.tabbuttons"]);
        assert!(composed.dom.has_class("tab"));
    }

    #[test]
    fn test_state_and_config_downcast() {
        let composed = compose_block(json!({ "toggling": { "toggleClass": "on", "selected": true } })).unwrap();
        let behaviour = &composed.behaviours[0];
        let config = behaviour.config::<toggling::ToggleConfig>().unwrap();
        assert_eq!(config.toggle_class, "on");
        assert_eq!(behaviour.with_state(|s: &mut toggling::ToggleState| s.on), Some(true));
        assert!(behaviour.config::<String>().is_none());
    }
}
