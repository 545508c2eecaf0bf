//! Representing - a component that stands for a value.

use super::Behaviour;
use crate::error::BuildError;
use crate::schema::{Detail, FieldSchema, Schema, Value};
use crate::system::Component;

pub const NAME: &str = "representing";

pub struct Representing;

#[derive(Debug, Clone)]
pub struct RepresentConfig {
    pub initial_value: Value,
}

#[derive(Debug)]
pub struct RepresentState {
    pub value: Value,
}

impl Behaviour for Representing {
    type Config = RepresentConfig;
    type State = RepresentState;

    fn name(&self) -> &str {
        NAME
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![FieldSchema::defaulted("initialValue", Value::Null)])
    }

    fn configure(&self, detail: &Detail) -> Result<RepresentConfig, BuildError> {
        Ok(RepresentConfig {
            initial_value: detail.get("initialValue").cloned().unwrap_or(Value::Null),
        })
    }

    fn init_state(&self, config: &RepresentConfig) -> RepresentState {
        RepresentState {
            value: config.initial_value.clone(),
        }
    }
}

/// The current value, or `None` when the component does not represent one.
pub fn get_value(component: &Component) -> Option<Value> {
    component.with_state(NAME, |state: &mut RepresentState| state.value.clone())
}

pub fn set_value(component: &Component, value: impl Into<Value>) {
    let value = value.into();
    component.with_state(NAME, move |state: &mut RepresentState| state.value = value);
}
