//! # spark-compose
//!
//! Declarative component composition for Rust.
//!
//! Components are described by plain data [`Spec`]s. A spec is validated
//! against a [`Schema`], its behaviour blocks are composed into one set of
//! DOM modifications and event handlers, and the result is built into a live
//! [`Component`] registered in a [`System`].
//!
//! ## Architecture
//!
//! ```text
//! Spec → Schema::validate → compose behaviours → Component (in a System)
//!                ↑
//! CompositeDef → parts (placeholder expansion) → Spec
//! ```
//!
//! Events flow through the system: `dispatch` runs one component's handlers,
//! `trigger_event` bubbles to the ancestors until a handler stops it. Async
//! work (dropdown fetches, autocomplete lookups) runs on the system's local
//! executor and is guarded by last-wins tickets.
//!
//! ## Modules
//!
//! - [`types`] - Uids and lifecycle
//! - [`error`] - Validation, build and coupling errors
//! - [`schema`] - Values, specs and the field schema validator
//! - [`dom`] - DOM definitions and modifications
//! - [`behaviour`] - Behaviour trait, registry, composer and built-in behaviours
//! - [`parts`] - Part types and placeholder substitution
//! - [`composite`] - Composite component builder
//! - [`system`] - Component registry, events, focus and deferred work
//! - [`state`] - Host keyboard input
//! - [`ui`] - Widgets (button, container, tab bar, dropdown)
//! - [`editor`] - Editor modes, options and autocomplete

pub mod behaviour;
pub mod composite;
pub mod dom;
pub mod editor;
pub mod error;
pub mod parts;
pub mod schema;
pub mod state;
pub mod system;
pub mod types;
pub mod ui;

// Re-export commonly used items
pub use types::*;

pub use error::{BuildError, CouplingError, ValidationError, ValidationErrors};

pub use schema::{
    Detail, FieldKind, FieldSchema, Object, Presence, Processed, Processor, Schema, Spec, Value,
};

pub use dom::{DomDefinition, DomModification};

pub use behaviour::{
    compose, custom_value, AnyBehaviour, Behaviour, BehaviourRegistry, Composition, CustomBehaviour,
};

pub use parts::{placeholder, GroupPart, PartType, SinglePart};

pub use composite::{CompositeDef, CompositeDetail};

pub use system::{events, handler, Component, LastWins, SimulatedEvent, System, Ticket};

pub use state::keyboard::{KeyState, KeyboardEvent, Modifiers};

pub use editor::{Cleanup, Editor, EditorEvent};
