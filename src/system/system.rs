//! The System - registry, dispatcher and scheduler for one mounted tree.
//!
//! One `System` exists per mounted editor or dialog. It owns:
//!
//! - the uid registry (`uid -> Component`), mutated only by build and
//!   deregistration, plus the set of retired uids that may never come back;
//! - the behaviour registry used when composing;
//! - focus tracking;
//! - a single-threaded executor for deferred results.
//!
//! Building is transactional: the whole tree is constructed first and only
//! registered once every node has validated and composed. A failed build
//! leaves the registry untouched.
//!
//! # Example
//!
//! ```ignore
//! let system = System::new();
//! let button = system.build(&Spec::from(json!({
//!     "dom": { "tag": "button" },
//!     "behaviours": { "focusing": true }
//! })))?;
//! system.mount(&button);
//!
//! assert!(system.get_by_uid(button.uid()).is_some());
//! system.dispatch(&button, events::EXECUTE, Value::Null);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use tracing::{debug, trace, warn};

use super::component::{component_schema, Component, ComponentParts, EventOrder};
use super::event::{EventHandler, SimulatedEvent};
use super::events;
use crate::behaviour::{self, AnyBehaviour, BehaviourRef, BehaviourRegistry, EventHandlers};
use crate::dom::DomDefinition;
use crate::error::BuildError;
use crate::parts;
use crate::schema::{Spec, Value};
use crate::types::{Lifecycle, Uid};

pub(crate) struct SystemInner {
    registry: RefCell<HashMap<Uid, Component>>,
    retired: RefCell<HashSet<Uid>>,
    next_uid: Cell<usize>,
    behaviours: RefCell<BehaviourRegistry>,
    focused: RefCell<Option<Uid>>,
    roots: RefCell<Vec<Component>>,
    pool: RefCell<LocalPool>,
    spawner: LocalSpawner,
}

#[derive(Clone)]
pub struct System(Rc<SystemInner>);

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl System {
    /// A system with the built-in behaviours registered.
    pub fn new() -> Self {
        Self::with_behaviours(BehaviourRegistry::with_builtins())
    }

    pub fn with_behaviours(behaviours: BehaviourRegistry) -> Self {
        let pool = LocalPool::new();
        let spawner = pool.spawner();
        Self(Rc::new(SystemInner {
            registry: RefCell::new(HashMap::new()),
            retired: RefCell::new(HashSet::new()),
            next_uid: Cell::new(0),
            behaviours: RefCell::new(behaviours),
            focused: RefCell::new(None),
            roots: RefCell::new(Vec::new()),
            pool: RefCell::new(pool),
            spawner,
        }))
    }

    pub(crate) fn from_inner(inner: Rc<SystemInner>) -> Self {
        Self(inner)
    }

    pub(crate) fn downgrade(&self) -> Weak<SystemInner> {
        Rc::downgrade(&self.0)
    }

    pub fn ptr_eq(&self, other: &System) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    // =========================================================================
    // Uids
    // =========================================================================

    /// A uid never used in this system, e.g. `tabbar_4`.
    pub fn generate_uid(&self, prefix: &str) -> Uid {
        self.generate_uid_avoiding(prefix, &HashSet::new())
    }

    /// A fresh uid that is also not in `taken` (uids of a tree still being built).
    fn generate_uid_avoiding(&self, prefix: &str, taken: &HashSet<Uid>) -> Uid {
        loop {
            let n = self.0.next_uid.get();
            self.0.next_uid.set(n + 1);
            let uid = Uid::new(format!("{prefix}_{n}"));
            if !taken.contains(&uid) && !self.is_registered(&uid) && !self.0.retired.borrow().contains(&uid) {
                return uid;
            }
        }
    }

    pub fn is_registered(&self, uid: &str) -> bool {
        self.0.registry.borrow().contains_key(uid)
    }

    pub fn is_retired(&self, uid: &str) -> bool {
        self.0.retired.borrow().contains(uid)
    }

    /// Look up a live component. Absence is a normal result.
    pub fn get_by_uid(&self, uid: &str) -> Option<Component> {
        self.0.registry.borrow().get(uid).cloned()
    }

    pub fn component_count(&self) -> usize {
        self.0.registry.borrow().len()
    }

    pub fn roots(&self) -> Vec<Component> {
        self.0.roots.borrow().clone()
    }

    // =========================================================================
    // Behaviours
    // =========================================================================

    pub fn register_behaviour(&self, behaviour: impl AnyBehaviour + 'static) -> Result<(), BuildError> {
        self.0.behaviours.borrow_mut().register(behaviour)
    }

    pub fn behaviours(&self) -> BehaviourRegistry {
        self.0.behaviours.borrow().clone()
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Build a component tree from a component spec and register it.
    ///
    /// Nothing is registered unless the whole tree builds.
    pub fn build(&self, spec: &Spec) -> Result<Component, BuildError> {
        let mut taken = HashSet::new();
        author_uids(spec, &mut taken);
        let component = self.construct(spec, &mut taken)?;
        self.register_tree(&component)?;
        debug!(uid = %component.uid(), nodes = component.descendants().len() + 1, "built component");
        Ok(component)
    }

    fn construct(&self, spec: &Spec, taken: &mut HashSet<Uid>) -> Result<Component, BuildError> {
        if let Some(name) = parts::placeholder_name(spec) {
            return Err(BuildError::UnknownPlaceholder(name.to_string()));
        }

        let detail = component_schema()
            .validate(spec)
            .map_err(|errors| BuildError::validation("component", errors))?;

        let dom = DomDefinition::from_value(detail.value("dom")?)
            .map_err(|errors| BuildError::validation("component", errors))?;

        let uid = match detail.option_string("uid")? {
            Some(uid) => Uid::new(uid),
            None => {
                let uid = self.generate_uid_avoiding("c", taken);
                taken.insert(uid.clone());
                uid
            }
        };

        let custom: Vec<BehaviourRef> = detail
            .array("customBehaviours")?
            .iter()
            .filter_map(|b| b.as_opaque::<BehaviourRef>().cloned())
            .collect();

        // Composing runs behaviour code; do not hold the registry borrow over it
        let registry = self.behaviours();
        let composition = behaviour::compose(&registry, detail.object("behaviours")?, &custom, &dom)?;

        let base_handlers: EventHandlers = detail
            .object("events")?
            .iter()
            .filter_map(|(event, h)| h.as_opaque::<EventHandler>().map(|h| (event.clone(), h.clone())))
            .collect();

        let event_order: EventOrder = detail
            .object("eventOrder")?
            .iter()
            .map(|(event, names)| {
                let names: Vec<String> = names
                    .as_array()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|n| n.as_str().map(str::to_string))
                    .collect();
                (event.clone(), names)
            })
            .collect();

        for (event, names) in &event_order {
            for name in names {
                let known = name == events::BASE_HANDLER
                    || composition.behaviours.iter().any(|b| b.name() == name);
                if !known {
                    warn!(%uid, event = %event, behaviour = %name, "eventOrder names a behaviour that is not composed");
                }
            }
        }

        let mut children = Vec::new();
        for (index, child) in detail.array("components")?.iter().enumerate() {
            let child_spec = child.to_spec().unwrap_or_default();
            let built = self.construct(&child_spec, taken).map_err(|err| match err {
                BuildError::Validation { kind, errors } => BuildError::Validation {
                    kind,
                    errors: errors.prefixed(&format!("components[{index}]")),
                },
                other => other,
            })?;
            children.push(built);
        }

        Ok(Component::new(ComponentParts {
            uid,
            dom: composition.dom,
            behaviours: composition.behaviours,
            base_handlers,
            event_order,
            children,
            system: self.downgrade(),
        }))
    }

    fn register_tree(&self, component: &Component) -> Result<(), BuildError> {
        let nodes = component.subtree();
        {
            let registry = self.0.registry.borrow();
            let retired = self.0.retired.borrow();
            let mut seen = HashSet::new();
            for node in &nodes {
                let uid = node.uid();
                if registry.contains_key(uid) || retired.contains(uid) || !seen.insert(uid.clone()) {
                    return Err(BuildError::DuplicateUid(uid.clone()));
                }
            }
        }

        let mut registry = self.0.registry.borrow_mut();
        for node in nodes {
            node.set_lifecycle(Lifecycle::Registered);
            registry.insert(node.uid().clone(), node);
        }
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Make a registered tree active and fire `attached` on every node.
    pub fn mount(&self, component: &Component) {
        if component.lifecycle() != Lifecycle::Registered {
            warn!(uid = %component.uid(), lifecycle = ?component.lifecycle(), "cannot mount component");
            return;
        }
        let nodes = component.subtree();
        for node in &nodes {
            node.set_lifecycle(Lifecycle::Active);
        }
        if component.parent().is_none() {
            self.0.roots.borrow_mut().push(component.clone());
        }
        for node in &nodes {
            self.dispatch(node, events::ATTACHED, Value::Null);
        }
    }

    /// Move `child` under `parent`. Mounts it when the parent is active.
    pub fn attach(&self, parent: &Component, child: &Component) {
        if !parent.is_live() || !child.is_live() {
            return;
        }
        if let Some(old) = child.parent() {
            old.detach_child(child);
        }
        self.0.roots.borrow_mut().retain(|r| !r.ptr_eq(child));
        parent.attach_child(child.clone());
        if parent.lifecycle() == Lifecycle::Active && child.lifecycle() == Lifecycle::Registered {
            self.mount(child);
        }
    }

    /// Fire `detached`, then remove the subtree and retire its uids.
    ///
    /// Deregistration is terminal; calling it again is a no-op.
    pub fn deregister(&self, component: &Component) {
        if !component.is_live() {
            return;
        }
        let nodes = component.subtree();
        for node in &nodes {
            self.dispatch(node, events::DETACHED, Value::Null);
        }

        if let Some(parent) = component.parent() {
            parent.detach_child(component);
        }
        self.0.roots.borrow_mut().retain(|r| !r.ptr_eq(component));

        {
            let mut registry = self.0.registry.borrow_mut();
            let mut retired = self.0.retired.borrow_mut();
            for node in &nodes {
                registry.remove(node.uid());
                retired.insert(node.uid().clone());
                node.set_lifecycle(Lifecycle::Deregistered);
            }
        }

        let mut focused = self.0.focused.borrow_mut();
        if focused.as_ref().is_some_and(|uid| nodes.iter().any(|n| n.uid() == uid)) {
            *focused = None;
        }
        debug!(uid = %component.uid(), nodes = nodes.len(), "deregistered component");
    }

    /// Deregister everything. The system stays usable but empty.
    pub fn teardown(&self) {
        for root in self.roots() {
            self.deregister(&root);
        }
        let remaining: Vec<Component> = self
            .0
            .registry
            .borrow()
            .values()
            .filter(|c| c.parent().is_none())
            .cloned()
            .collect();
        for component in remaining {
            self.deregister(&component);
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Dispatch to one component only.
    pub fn dispatch(&self, target: &Component, name: &str, payload: impl Into<Value>) -> SimulatedEvent {
        let mut event = SimulatedEvent::new(name, target.uid().clone()).with_payload(payload);
        self.run_handlers(target, &mut event);
        event
    }

    /// Dispatch to `target`, then bubble up through its ancestors until a
    /// handler stops the event.
    pub fn trigger_event(&self, target: &Component, name: &str, payload: impl Into<Value>) -> SimulatedEvent {
        let mut event = SimulatedEvent::new(name, target.uid().clone()).with_payload(payload);
        let mut current = Some(target.clone());
        while let Some(component) = current {
            if event.is_stopped() {
                break;
            }
            self.run_handlers(&component, &mut event);
            current = component.parent();
        }
        event
    }

    /// Route a host event to the component that owns `uid`.
    pub fn route(&self, uid: &str, name: &str, payload: impl Into<Value>) -> Option<SimulatedEvent> {
        let Some(target) = self.get_by_uid(uid) else {
            debug!(uid, event = name, "no component for routed event");
            return None;
        };
        Some(self.trigger_event(&target, name, payload))
    }

    fn run_handlers(&self, component: &Component, event: &mut SimulatedEvent) {
        for (handler_name, handler) in component.handlers_for(event.name()) {
            if event.is_stopped() || !component.is_live() {
                break;
            }
            trace!(uid = %component.uid(), event = event.name(), handler = %handler_name, "dispatch");
            handler(component, event);
        }
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focused(&self) -> Option<Component> {
        let uid = self.0.focused.borrow().clone()?;
        self.get_by_uid(&uid)
    }

    pub fn is_focused(&self, component: &Component) -> bool {
        self.0.focused.borrow().as_ref() == Some(component.uid())
    }

    /// Move focus to `component`, firing `blur` on the old and `focus` on the new.
    pub fn focus(&self, component: &Component) -> bool {
        if !component.is_live() {
            return false;
        }
        if self.is_focused(component) {
            return true;
        }
        self.blur();
        *self.0.focused.borrow_mut() = Some(component.uid().clone());
        self.dispatch(component, events::FOCUS, Value::Null);
        true
    }

    pub fn blur(&self) {
        let previous = self.0.focused.borrow_mut().take();
        if let Some(component) = previous.and_then(|uid| self.get_by_uid(&uid)) {
            self.dispatch(&component, events::BLUR, Value::Null);
        }
    }

    /// Mounted components composing `focusing`, in tree order.
    pub fn focusables(&self) -> Vec<Component> {
        self.roots()
            .iter()
            .flat_map(Component::subtree)
            .filter(|c| c.lifecycle() == Lifecycle::Active && c.has_behaviour("focusing"))
            .collect()
    }

    pub fn focus_next(&self) -> bool {
        self.focus_step(1)
    }

    pub fn focus_previous(&self) -> bool {
        self.focus_step(-1)
    }

    fn focus_step(&self, direction: isize) -> bool {
        let focusables = self.focusables();
        if focusables.is_empty() {
            return false;
        }
        let len = focusables.len() as isize;
        let next = match self.focused().and_then(|f| focusables.iter().position(|c| c.ptr_eq(&f))) {
            None if direction > 0 => 0,
            None => len - 1,
            Some(pos) => ((pos as isize + direction) % len + len) % len,
        };
        self.focus(&focusables[next as usize])
    }

    // =========================================================================
    // Deferred results
    // =========================================================================

    pub fn spawn(&self, future: impl Future<Output = ()> + 'static) {
        if let Err(err) = self.0.spawner.spawn_local(future) {
            warn!(%err, "failed to spawn task");
        }
    }

    /// Run `future`, then `apply` its result to `owner` if `owner` is still
    /// registered. A result for a deregistered owner is dropped.
    pub fn spawn_for<T: 'static>(
        &self,
        owner: &Component,
        future: impl Future<Output = T> + 'static,
        apply: impl FnOnce(&Component, T) + 'static,
    ) {
        let system = self.downgrade();
        let uid = owner.uid().clone();
        self.spawn(async move {
            let value = future.await;
            let owner = system.upgrade().map(System).and_then(|s| s.get_by_uid(&uid));
            match owner {
                Some(owner) => apply(&owner, value),
                None => debug!(%uid, "discarding result for deregistered component"),
            }
        });
    }

    /// Drive spawned tasks until none can make progress.
    pub fn run_until_stalled(&self) {
        match self.0.pool.try_borrow_mut() {
            Ok(mut pool) => pool.run_until_stalled(),
            Err(_) => warn!("run_until_stalled called from inside a running task"),
        }
    }
}

/// Every uid an author wrote anywhere in `spec`'s tree.
fn author_uids(spec: &Spec, taken: &mut HashSet<Uid>) {
    if let Some(uid) = spec.get("uid").and_then(Value::as_str) {
        taken.insert(Uid::new(uid));
    }
    let children = spec.get("components").and_then(Value::as_array).unwrap_or_default();
    for child in children.iter().filter_map(Value::to_spec) {
        author_uids(&child, taken);
    }
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("components", &self.component_count())
            .field("retired", &self.0.retired.borrow().len())
            .field("behaviours", &*self.0.behaviours.borrow())
            .finish()
    }
}
