//! DOM model - what a component renders to and what behaviours add to it.

mod definition;
mod modification;

pub use definition::{dom_schema, DomDefinition, StringMap};
pub use modification::{merge, Combinator, DomModification};
