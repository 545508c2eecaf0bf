//! Component/System runtime.
//!
//! - [`System`] - registry, build entry point, dispatcher, focus and executor
//! - [`Component`] - handle to a built node and its behaviours
//! - [`SimulatedEvent`] - named event with stop/prevent flags
//! - [`events`] - system event names
//! - [`LastWins`] - tickets for last-wins deferred results

mod component;
mod deferred;
mod event;
pub mod events;
#[allow(clippy::module_inception)]
mod system;

pub use component::{component_schema, Component, EventOrder};
pub use deferred::{LastWins, Ticket};
pub use event::{handler, EventFlags, EventHandler, SimulatedEvent};
pub use system::System;
