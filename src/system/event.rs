//! Simulated events.
//!
//! Every event dispatched through the system is a [`SimulatedEvent`]: a name,
//! the uid it targets, a payload and two independent flags. Stopping halts
//! the remaining handlers of the current dispatch (and bubbling); preventing
//! only tells follow-on logic to skip its default.

use std::rc::Rc;

use bitflags::bitflags;

use super::component::Component;
use crate::schema::Value;
use crate::types::Uid;

bitflags! {
    /// Event state flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct EventFlags: u8 {
        const STOPPED = 1 << 0;
        const PREVENTED = 1 << 1;
    }
}

/// Handler for a named event. Call [`SimulatedEvent::stop`] to halt later handlers.
pub type EventHandler = Rc<dyn Fn(&Component, &mut SimulatedEvent)>;

/// Wrap a closure as an event handler value for a spec's `events` block.
pub fn handler(f: impl Fn(&Component, &mut SimulatedEvent) + 'static) -> Value {
    Value::opaque(Rc::new(f) as EventHandler)
}

#[derive(Debug, Clone)]
pub struct SimulatedEvent {
    name: String,
    target: Uid,
    payload: Value,
    flags: EventFlags,
}

impl SimulatedEvent {
    pub fn new(name: impl Into<String>, target: Uid) -> Self {
        Self {
            name: name.into(),
            target,
            payload: Value::Null,
            flags: EventFlags::empty(),
        }
    }

    pub fn with_payload(mut self, payload: impl Into<Value>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The component the event was first dispatched to.
    pub fn target(&self) -> &Uid {
        &self.target
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn flags(&self) -> EventFlags {
        self.flags
    }

    pub fn stop(&mut self) {
        self.flags.insert(EventFlags::STOPPED);
    }

    pub fn prevent_default(&mut self) {
        self.flags.insert(EventFlags::PREVENTED);
    }

    pub fn is_stopped(&self) -> bool {
        self.flags.contains(EventFlags::STOPPED)
    }

    pub fn is_default_prevented(&self) -> bool {
        self.flags.contains(EventFlags::PREVENTED)
    }
}
