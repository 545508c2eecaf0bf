//! Behaviour exhibits and the merge policy.
//!
//! A behaviour contributes a [`DomModification`] to the component it is
//! composed onto. [`merge`] folds the contributions over the base
//! [`DomDefinition`] in composition order:
//!
//! - classes are unioned, base classes first, each class once;
//! - an attribute or style set by a behaviour overrides the base dom;
//! - two behaviours setting the same key to different values is a
//!   [`BuildError::ExhibitConflict`], unless either declares a
//!   [`Combinator`] for that key.

use indexmap::IndexMap;

use super::definition::{DomDefinition, StringMap};
use crate::error::BuildError;

/// How two behaviour values for one key are reconciled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combinator {
    /// Concatenate with a separator, earlier value first (`aria-describedby`).
    Join(String),
    /// The later behaviour wins.
    Override,
}

/// The dom contribution of one behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomModification {
    pub classes: Vec<String>,
    pub attributes: StringMap,
    pub styles: StringMap,
    combinators: IndexMap<String, Combinator>,
}

impl DomModification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn style(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.insert(key.into(), value.into());
        self
    }

    /// Declare how this behaviour's value for `key` combines with another
    /// behaviour's. Applies to attributes and styles alike.
    pub fn combine(mut self, key: impl Into<String>, combinator: Combinator) -> Self {
        self.combinators.insert(key.into(), combinator);
        self
    }

    pub fn combinator(&self, key: &str) -> Option<&Combinator> {
        self.combinators.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.attributes.is_empty() && self.styles.is_empty()
    }
}

// =============================================================================
// Merge
// =============================================================================

/// Value written by a behaviour, with who wrote it.
struct Written<'a> {
    value: String,
    owner: &'a str,
    combinator: Option<&'a Combinator>,
}

/// Fold behaviour exhibits over the base dom.
pub fn merge<'a, I>(base: &DomDefinition, contributions: I) -> Result<DomDefinition, BuildError>
where
    I: IntoIterator<Item = (&'a str, &'a DomModification)>,
{
    let mut classes = Vec::new();
    for class in &base.classes {
        if !classes.contains(class) {
            classes.push(class.clone());
        }
    }

    let mut attributes: IndexMap<String, Written<'a>> = IndexMap::new();
    let mut styles: IndexMap<String, Written<'a>> = IndexMap::new();

    for (owner, modification) in contributions {
        for class in &modification.classes {
            if !classes.contains(class) {
                classes.push(class.clone());
            }
        }
        for (key, value) in &modification.attributes {
            write(&mut attributes, key, value, owner, modification)?;
        }
        for (key, value) in &modification.styles {
            write(&mut styles, key, value, owner, modification)?;
        }
    }

    let overlay = |base: &StringMap, written: IndexMap<String, Written<'a>>| {
        let mut out = base.clone();
        for (key, written) in written {
            out.insert(key, written.value);
        }
        out
    };

    Ok(DomDefinition {
        tag: base.tag.clone(),
        classes,
        attributes: overlay(&base.attributes, attributes),
        styles: overlay(&base.styles, styles),
        inner_html: base.inner_html.clone(),
        value: base.value.clone(),
    })
}

fn write<'a>(
    written: &mut IndexMap<String, Written<'a>>,
    key: &str,
    value: &str,
    owner: &'a str,
    modification: &'a DomModification,
) -> Result<(), BuildError> {
    let combinator = modification.combinator(key);
    let inherited = combinator.or(written.get(key).and_then(|previous| previous.combinator));

    let next = match written.get(key) {
        None => value.to_string(),
        Some(previous) if previous.value == value => value.to_string(),
        Some(previous) => match combinator.or(previous.combinator) {
            Some(Combinator::Join(separator)) => format!("{}{separator}{value}", previous.value),
            Some(Combinator::Override) => value.to_string(),
            None => {
                return Err(BuildError::ExhibitConflict {
                    key: key.to_string(),
                    first: previous.owner.to_string(),
                    second: owner.to_string(),
                });
            }
        },
    };

    written.insert(
        key.to_string(),
        Written {
            value: next,
            owner,
            combinator: inherited,
        },
    );
    Ok(())
}
