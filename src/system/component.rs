//! Built components.
//!
//! A [`Component`] is a cheap, clonable handle to a built node: its uid, its
//! live dom, the behaviours composed onto it (with their state), its base
//! event handlers and its place in the tree. The owning [`System`] is held
//! weakly: a component never keeps its system alive, and once the system is
//! gone [`Component::system`] returns `None`.
//!
//! Behaviour state is only reachable through [`Component::with_state`],
//! which the behaviour modules wrap in their own API functions.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use super::event::EventHandler;
use super::events::BASE_HANDLER;
use super::system::{System, SystemInner};
use crate::behaviour::{BehaviourRef, ComposedBehaviour, EventHandlers};
use crate::dom::DomDefinition;
use crate::schema::{FieldSchema, Processed, Processor, Schema, Value};
use crate::types::{Lifecycle, Uid};

/// Event name to the handler names that run first, in order.
pub type EventOrder = IndexMap<String, Vec<String>>;

// =============================================================================
// Component schema
// =============================================================================

/// Fields every component spec understands.
///
/// Composites add their own fields on top; anything not declared is ignored.
pub fn component_schema() -> Schema {
    Schema::new(vec![
        FieldSchema::option_of("uid", Processor::String),
        FieldSchema::required_of("dom", Processor::Object),
        FieldSchema::defaulted_of("components", Value::Array(Vec::new()), Processor::ObjectArray),
        FieldSchema::defaulted_of("behaviours", Value::object(), Processor::Object),
        FieldSchema::defaulted_of("events", Value::object(), handler_map()),
        FieldSchema::defaulted_of("eventOrder", Value::object(), event_order()),
        FieldSchema::defaulted_of("customBehaviours", Value::Array(Vec::new()), behaviour_list()),
    ])
}

fn handler_map() -> Processor {
    Processor::custom(|value| match value.as_object() {
        Some(map) if map.values().all(|h| h.as_opaque::<EventHandler>().is_some()) => {
            Processed::Valid(value.clone())
        }
        _ => Processed::invalid("Must be an object of event handlers."),
    })
}

fn event_order() -> Processor {
    Processor::custom(|value| match value.as_object() {
        Some(map) if map.values().all(|names| Processor::StringArray.process(names).is_valid()) => {
            Processed::Valid(value.clone())
        }
        _ => Processed::invalid("Must map event names to lists of behaviour names."),
    })
}

fn behaviour_list() -> Processor {
    Processor::custom(|value| match value.as_array() {
        Some(items) if items.iter().all(|b| b.as_opaque::<BehaviourRef>().is_some()) => {
            Processed::Valid(value.clone())
        }
        _ => Processed::invalid("Must be an array of behaviours."),
    })
}

// =============================================================================
// Component
// =============================================================================

pub(crate) struct ComponentInner {
    uid: Uid,
    dom: RefCell<DomDefinition>,
    behaviours: Vec<ComposedBehaviour>,
    base_handlers: EventHandlers,
    event_order: EventOrder,
    children: RefCell<Vec<Component>>,
    parent: RefCell<Weak<ComponentInner>>,
    system: Weak<SystemInner>,
    lifecycle: Cell<Lifecycle>,
}

/// Everything needed to construct a component.
pub(crate) struct ComponentParts {
    pub uid: Uid,
    pub dom: DomDefinition,
    pub behaviours: Vec<ComposedBehaviour>,
    pub base_handlers: EventHandlers,
    pub event_order: EventOrder,
    pub children: Vec<Component>,
    pub system: Weak<SystemInner>,
}

#[derive(Clone)]
pub struct Component(Rc<ComponentInner>);

impl Component {
    pub(crate) fn new(parts: ComponentParts) -> Self {
        let component = Self(Rc::new(ComponentInner {
            uid: parts.uid,
            dom: RefCell::new(parts.dom),
            behaviours: parts.behaviours,
            base_handlers: parts.base_handlers,
            event_order: parts.event_order,
            children: RefCell::new(Vec::new()),
            parent: RefCell::new(Weak::new()),
            system: parts.system,
            lifecycle: Cell::new(Lifecycle::Unbuilt),
        }));
        for child in parts.children {
            component.attach_child(child);
        }
        component
    }

    pub fn uid(&self) -> &Uid {
        &self.0.uid
    }

    pub fn ptr_eq(&self, other: &Component) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    pub fn lifecycle(&self) -> Lifecycle {
        self.0.lifecycle.get()
    }

    pub(crate) fn set_lifecycle(&self, lifecycle: Lifecycle) {
        self.0.lifecycle.set(lifecycle);
    }

    /// Registered or active.
    pub fn is_live(&self) -> bool {
        self.lifecycle().is_live()
    }

    /// The owning system, if it still exists.
    pub fn system(&self) -> Option<System> {
        self.0.system.upgrade().map(System::from_inner)
    }

    // -------------------------------------------------------------------------
    // Dom
    // -------------------------------------------------------------------------

    /// Snapshot of the live dom.
    pub fn dom(&self) -> DomDefinition {
        self.0.dom.borrow().clone()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.dom.borrow().has_class(class)
    }

    pub fn add_class(&self, class: &str) -> bool {
        self.0.dom.borrow_mut().add_class(class)
    }

    pub fn remove_class(&self, class: &str) -> bool {
        self.0.dom.borrow_mut().remove_class(class)
    }

    pub fn attribute(&self, key: &str) -> Option<String> {
        self.0.dom.borrow().attribute(key).map(str::to_string)
    }

    pub fn set_attribute(&self, key: &str, value: impl Into<String>) {
        self.0.dom.borrow_mut().set_attribute(key, value);
    }

    pub fn remove_attribute(&self, key: &str) -> Option<String> {
        self.0.dom.borrow_mut().remove_attribute(key)
    }

    /// Render this component and its children to markup.
    pub fn to_html(&self) -> String {
        let children: String = self.children().iter().map(Component::to_html).collect();
        self.0.dom.borrow().to_html_with(&children)
    }

    // -------------------------------------------------------------------------
    // Tree
    // -------------------------------------------------------------------------

    pub fn children(&self) -> Vec<Component> {
        self.0.children.borrow().clone()
    }

    pub fn parent(&self) -> Option<Component> {
        self.0.parent.borrow().upgrade().map(Component)
    }

    /// Every node below this one, depth first, in child order.
    pub fn descendants(&self) -> Vec<Component> {
        let mut out = Vec::new();
        for child in self.children() {
            out.push(child.clone());
            out.extend(child.descendants());
        }
        out
    }

    /// This node followed by its descendants.
    pub(crate) fn subtree(&self) -> Vec<Component> {
        let mut out = vec![self.clone()];
        out.extend(self.descendants());
        out
    }

    pub(crate) fn attach_child(&self, child: Component) {
        *child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
        self.0.children.borrow_mut().push(child);
    }

    pub(crate) fn detach_child(&self, child: &Component) {
        self.0.children.borrow_mut().retain(|c| !c.ptr_eq(child));
        *child.0.parent.borrow_mut() = Weak::new();
    }

    // -------------------------------------------------------------------------
    // Behaviours
    // -------------------------------------------------------------------------

    pub fn behaviour_names(&self) -> Vec<&str> {
        self.0.behaviours.iter().map(ComposedBehaviour::name).collect()
    }

    pub fn has_behaviour(&self, name: &str) -> bool {
        self.behaviour(name).is_some()
    }

    pub fn behaviour(&self, name: &str) -> Option<&ComposedBehaviour> {
        self.0.behaviours.iter().find(|b| b.name() == name)
    }

    /// Typed configuration of a composed behaviour.
    pub fn behaviour_config<C: 'static>(&self, name: &str) -> Option<Rc<C>> {
        self.behaviour(name).and_then(|b| b.config::<C>())
    }

    /// Run `f` on a behaviour's state. `None` if the behaviour is not
    /// composed or its state is not an `S`.
    pub fn with_state<S: 'static, R>(&self, name: &str, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        self.behaviour(name).and_then(|b| b.with_state(f))
    }

    pub fn event_order(&self) -> &EventOrder {
        &self.0.event_order
    }

    /// Handlers for `event` in dispatch order.
    ///
    /// Handlers named in `eventOrder` run first, in listed order. Then the
    /// remaining behaviours in composition order. The base handler runs last
    /// unless `eventOrder` placed it. A name listed twice runs once.
    pub fn handlers_for(&self, event: &str) -> Vec<(String, EventHandler)> {
        let mut ordered: Vec<(String, EventHandler)> = Vec::new();
        let listed: &[String] = self.0.event_order.get(event).map(Vec::as_slice).unwrap_or(&[]);

        for name in listed {
            if ordered.iter().any(|(pushed, _)| pushed == name) {
                continue;
            }
            let handler = if name == BASE_HANDLER {
                self.0.base_handlers.get(event).cloned()
            } else {
                self.behaviour(name).and_then(|b| b.handler(event))
            };
            if let Some(handler) = handler {
                ordered.push((name.clone(), handler));
            }
        }

        for behaviour in &self.0.behaviours {
            if listed.iter().any(|n| n == behaviour.name()) {
                continue;
            }
            if let Some(handler) = behaviour.handler(event) {
                ordered.push((behaviour.name().to_string(), handler));
            }
        }

        if !listed.iter().any(|n| n == BASE_HANDLER) {
            if let Some(handler) = self.0.base_handlers.get(event) {
                ordered.push((BASE_HANDLER.to_string(), handler.clone()));
            }
        }

        ordered
    }
}

impl PartialEq for Component {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("uid", &self.0.uid)
            .field("lifecycle", &self.lifecycle())
            .field("behaviours", &self.behaviour_names())
            .finish()
    }
}
