//! Coupling - lazily built sibling components bound to an owner.
//!
//! Each name in `others` maps to a factory that produces a component spec
//! from the owner. The first [`get_coupled`] for a name builds and caches
//! the component; later calls return the cached one. The coupled component
//! is registered in the owner's system but is not the owner's child, and it
//! is not deregistered with the owner.
//!
//! # Example
//!
//! ```ignore
//! "behaviours": {
//!     "coupling": { "others": { "sandbox": coupling::factory(|owner| sandbox_spec(owner)) } }
//! }
//!
//! let sandbox = coupling::get_coupled(&dropdown, "sandbox")?;
//! ```

use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use super::Behaviour;
use crate::error::{BuildError, CouplingError};
use crate::schema::{Detail, FieldSchema, Processed, Processor, Schema, Spec, Value};
use crate::system::Component;

pub const NAME: &str = "coupling";

/// Builds the spec of a coupled component from its owner.
pub type CouplingFactory = Rc<dyn Fn(&Component) -> Spec>;

pub fn factory(f: impl Fn(&Component) -> Spec + 'static) -> Value {
    Value::opaque(Rc::new(f) as CouplingFactory)
}

pub struct Coupling;

#[derive(Clone, Default)]
pub struct CouplingConfig {
    pub others: IndexMap<String, CouplingFactory>,
}

#[derive(Debug, Default)]
pub struct CouplingState {
    pub cache: IndexMap<String, Component>,
}

fn factories() -> Processor {
    Processor::custom(|value| {
        let Some(object) = value.as_object() else {
            return Processed::invalid("Must be an object.");
        };
        if object.values().all(|f| f.as_opaque::<CouplingFactory>().is_some()) {
            Processed::Valid(value.clone())
        } else {
            Processed::invalid("Every coupling must be a factory function.")
        }
    })
}

impl Behaviour for Coupling {
    type Config = CouplingConfig;
    type State = CouplingState;

    fn name(&self) -> &str {
        NAME
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![FieldSchema::required_of("others", factories())])
    }

    fn configure(&self, detail: &Detail) -> Result<CouplingConfig, BuildError> {
        let others = detail
            .object("others")?
            .iter()
            .filter_map(|(name, f)| f.as_opaque::<CouplingFactory>().map(|f| (name.clone(), f.clone())))
            .collect();
        Ok(CouplingConfig { others })
    }

    fn init_state(&self, _config: &CouplingConfig) -> CouplingState {
        CouplingState::default()
    }
}

/// The coupled component `name`, building it on first use.
///
/// A deregistered owner never calls its factories. A failed build leaves
/// the cache empty so a later call retries.
pub fn get_coupled(owner: &Component, name: &str) -> Result<Component, CouplingError> {
    if !owner.is_live() {
        return Err(CouplingError::Deregistered(owner.uid().clone()));
    }
    let config = owner
        .behaviour_config::<CouplingConfig>(NAME)
        .ok_or_else(|| CouplingError::NotConfigured(owner.uid().clone()))?;

    if let Some(cached) = get_cached(owner, name) {
        return Ok(cached);
    }

    let factory = config.others.get(name).cloned().ok_or_else(|| CouplingError::UnknownName {
        owner: owner.uid().clone(),
        name: name.to_string(),
    })?;
    let system = owner.system().ok_or(BuildError::SystemGone)?;

    let spec = factory(owner);
    let coupled = system.build(&spec)?;
    debug!(owner = %owner.uid(), name, coupled = %coupled.uid(), "built coupled component");

    owner.with_state(NAME, |state: &mut CouplingState| {
        state.cache.insert(name.to_string(), coupled.clone());
    });
    Ok(coupled)
}

/// The cached coupled component, without building. Stale entries are skipped.
pub fn get_cached(owner: &Component, name: &str) -> Option<Component> {
    owner
        .with_state(NAME, |state: &mut CouplingState| state.cache.get(name).cloned())
        .flatten()
        .filter(Component::is_live)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Object;
    use crate::system::System;
    use serde_json::json;
    use std::cell::Cell;

    fn owner_with(system: &System, calls: &Rc<Cell<u32>>, sandbox: serde_json::Value) -> Component {
        let calls = calls.clone();
        let mut others = Object::new();
        others.insert(
            "sandbox".into(),
            factory(move |_| {
                calls.set(calls.get() + 1);
                Spec::from(sandbox.clone())
            }),
        );
        let mut config = Object::new();
        config.insert("others".into(), Value::Object(others));
        let mut behaviours = Object::new();
        behaviours.insert(NAME.into(), Value::Object(config));

        system
            .build(&Spec::from(json!({ "dom": { "tag": "button" } })).with("behaviours", Value::Object(behaviours)))
            .unwrap()
    }

    #[test]
    fn test_built_once_and_cached() {
        let system = System::new();
        let calls = Rc::new(Cell::new(0));
        let owner = owner_with(&system, &calls, json!({ "dom": { "tag": "div" } }));

        assert!(get_cached(&owner, "sandbox").is_none());
        let first = get_coupled(&owner, "sandbox").unwrap();
        let second = get_coupled(&owner, "sandbox").unwrap();
        assert_eq!(first, second);
        assert_eq!(calls.get(), 1);
        assert!(first.parent().is_none());
        assert_eq!(get_cached(&owner, "sandbox").unwrap(), first);
    }

    #[test]
    fn test_deregistered_owner_never_builds() {
        let system = System::new();
        let calls = Rc::new(Cell::new(0));
        let owner = owner_with(&system, &calls, json!({ "dom": { "tag": "div" } }));
        system.deregister(&owner);

        let err = get_coupled(&owner, "sandbox").unwrap_err();
        assert!(matches!(err, CouplingError::Deregistered(_)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_unknown_name_and_missing_behaviour() {
        let system = System::new();
        let calls = Rc::new(Cell::new(0));
        let owner = owner_with(&system, &calls, json!({ "dom": { "tag": "div" } }));
        assert!(matches!(
            get_coupled(&owner, "menu").unwrap_err(),
            CouplingError::UnknownName { name, .. } if name == "menu"
        ));

        let plain = system.build(&Spec::from(json!({ "dom": { "tag": "p" } }))).unwrap();
        assert!(matches!(get_coupled(&plain, "sandbox").unwrap_err(), CouplingError::NotConfigured(_)));
    }

    #[test]
    fn test_failed_build_is_not_cached() {
        let system = System::new();
        let calls = Rc::new(Cell::new(0));
        let owner = owner_with(&system, &calls, json!({ "dom": {} }));

        assert!(matches!(get_coupled(&owner, "sandbox").unwrap_err(), CouplingError::Build(_)));
        assert!(get_cached(&owner, "sandbox").is_none());
        assert!(get_coupled(&owner, "sandbox").is_err());
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_others_must_be_factories() {
        let system = System::new();
        let err = system
            .build(&Spec::from(json!({
                "dom": { "tag": "button" },
                "behaviours": { "coupling": { "others": { "sandbox": "nope" } } }
            })))
            .unwrap_err();
        assert_eq!(err.validation_errors().unwrap().paths(), vec!["coupling.others"]);
    }
}
