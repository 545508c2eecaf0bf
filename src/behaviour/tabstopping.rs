//! Tabstopping - marks a component as a stop for tab navigation.

use super::Behaviour;
use crate::dom::{DomDefinition, DomModification};
use crate::error::BuildError;
use crate::schema::{Detail, Schema};
use crate::system::Component;

pub const NAME: &str = "tabstopping";

pub const ATTRIBUTE: &str = "data-alloy-tabstop";

pub struct Tabstopping;

impl Behaviour for Tabstopping {
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

    fn exhibit(&self, _config: &(), _base: &DomDefinition) -> DomModification {
        DomModification::new().attribute(ATTRIBUTE, "true")
    }
}

/// Tab stops in and below `root`, in tree order.
pub fn tabstops(root: &Component) -> Vec<Component> {
    std::iter::once(root.clone())
        .chain(root.descendants())
        .filter(|c| c.has_behaviour(NAME))
        .collect()
}
