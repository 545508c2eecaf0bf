//! Replacing - swap a component's children at runtime.
//!
//! The old children are deregistered (their uids retire) before the new
//! specs are built and attached. A failed build leaves the component empty.

use super::Behaviour;
use crate::error::BuildError;
use crate::schema::{Detail, Schema, Spec};
use crate::system::Component;

pub const NAME: &str = "replacing";

pub struct Replacing;

impl Behaviour for Replacing {
    type Config = ();
    type State = ();

    fn name(&self) -> &str {
        NAME
    }

    fn schema(&self) -> Schema {
        Schema::default()
    }

    fn configure(&self, _detail: &Detail) -> Result<(), BuildError> {
        Ok(())
    }

    fn init_state(&self, _config: &()) {}
}

pub fn contents(component: &Component) -> Vec<Component> {
    component.children()
}

/// Deregister every child.
pub fn clear(component: &Component) {
    let Some(system) = component.system() else {
        return;
    };
    for child in component.children() {
        system.deregister(&child);
    }
}

/// Replace every child with components built from `specs`.
pub fn replace(component: &Component, specs: &[Spec]) -> Result<Vec<Component>, BuildError> {
    let system = component.system().ok_or(BuildError::SystemGone)?;
    clear(component);

    let mut built = Vec::with_capacity(specs.len());
    for spec in specs {
        match system.build(spec) {
            Ok(child) => built.push(child),
            Err(err) => {
                for child in &built {
                    system.deregister(child);
                }
                return Err(err);
            }
        }
    }
    for child in &built {
        system.attach(component, child);
    }
    Ok(built)
}

/// Append a component built from `spec` after the existing children.
pub fn append(component: &Component, spec: &Spec) -> Result<Component, BuildError> {
    let system = component.system().ok_or(BuildError::SystemGone)?;
    let child = system.build(spec)?;
    system.attach(component, &child);
    Ok(child)
}
