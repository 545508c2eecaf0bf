//! Behaviour registry.
//!
//! Each [`System`](crate::system::System) owns one registry. It starts with
//! the built-in behaviours and accepts more through
//! `System::register_behaviour`, which is how new capabilities are added
//! without touching the builder.

use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{
    coupling::Coupling, focusing::Focusing, highlighting::Highlighting, keying::Keying,
    replacing::Replacing, representing::Representing, tabstopping::Tabstopping,
    toggling::Toggling, AnyBehaviour, BehaviourRef,
};
use crate::error::BuildError;

#[derive(Clone, Default)]
pub struct BehaviourRegistry {
    behaviours: IndexMap<String, BehaviourRef>,
}

impl BehaviourRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in behaviour.
    pub fn with_builtins() -> Self {
        let builtins: [BehaviourRef; 8] = [
            Rc::new(Highlighting),
            Rc::new(Toggling),
            Rc::new(Representing),
            Rc::new(Keying),
            Rc::new(Focusing),
            Rc::new(Tabstopping),
            Rc::new(Replacing),
            Rc::new(Coupling),
        ];
        let behaviours = builtins
            .into_iter()
            .map(|b| (b.behaviour_name().to_string(), b))
            .collect();
        Self { behaviours }
    }

    /// Add a behaviour. Names are unique; re-registering is a defect.
    pub fn register(&mut self, behaviour: impl AnyBehaviour + 'static) -> Result<(), BuildError> {
        self.register_ref(Rc::new(behaviour))
    }

    pub fn register_ref(&mut self, behaviour: BehaviourRef) -> Result<(), BuildError> {
        let name = behaviour.behaviour_name().to_string();
        if self.behaviours.contains_key(&name) {
            return Err(BuildError::DuplicateBehaviour(name));
        }
        self.behaviours.insert(name, behaviour);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<BehaviourRef> {
        self.behaviours.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.behaviours.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.behaviours.keys().map(String::as_str)
    }
}

impl fmt::Debug for BehaviourRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.behaviours.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behaviour::CustomBehaviour;

    #[test]
    fn test_builtins() {
        let registry = BehaviourRegistry::with_builtins();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            vec![
                "highlighting",
                "toggling",
                "representing",
                "keying",
                "focusing",
                "tabstopping",
                "replacing",
                "coupling"
            ]
        );
    }

    #[test]
    fn test_register_twice_fails() {
        let mut registry = BehaviourRegistry::new();
        registry.register(CustomBehaviour::new("docking")).unwrap();
        assert!(matches!(
            registry.register(CustomBehaviour::new("docking")),
            Err(BuildError::DuplicateBehaviour(_))
        ));
    }
}
