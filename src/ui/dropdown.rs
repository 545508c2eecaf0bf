//! Dropdown - a button that opens a lazily built popup.
//!
//! The popup ("sandbox") is a coupled component: the first open builds it
//! through `coupling`, later opens reuse it. It is attached to the
//! dropdown's `sink` part. Its contents come from the async `fetch`; only
//! the newest fetch is applied, and only while the dropdown is open and
//! still registered.
//!
//! Executing the dropdown toggles it: `toggling` flips its state first, then
//! the base handler opens or closes to match (`eventOrder`).
//!
//! # Example
//!
//! ```ignore
//! let dropdown = dropdown::build(&system, &Spec::from(json!({ "text": "Styles" }))
//!     .with("fetch", dropdown::fetch(|_| async { style_items() }.boxed_local()))
//!     .with("components", Value::from(vec![placeholder(dropdown::SINK)])))?;
//!
//! system.dispatch(&dropdown, events::EXECUTE, Value::Null);
//! system.run_until_stalled();
//! ```

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use serde_json::json;
use tracing::{debug, warn};

use crate::behaviour::{coupling, custom_value, replacing, toggling, Behaviour, EventHandlers};
use crate::composite::{self, component_fields, CompositeDef, CompositeDetail};
use crate::error::{BuildError, CouplingError};
use crate::parts::SinglePart;
use crate::schema::{Detail, FieldSchema, Processor, Schema, Spec, Value};
use crate::system::{events, handler, Component, LastWins, SimulatedEvent, System};
use crate::types::Uid;

pub const KIND: &str = "dropdown";

/// Behaviour name of the dropdown's own behaviour.
pub const NAME: &str = "dropdown";

/// Placeholder token for the sink part.
pub const SINK: &str = "<alloy.sink>";

/// Coupling name of the popup.
pub const SANDBOX: &str = "sandbox";

/// Produces the popup's item specs.
pub type FetchFn = Rc<dyn Fn(&Component) -> LocalBoxFuture<'static, Vec<Spec>>>;

/// Called with `(dropdown, sandbox)` once fetched items are in place.
pub type OpenCallback = Rc<dyn Fn(&Component, &Component)>;

pub fn fetch(f: impl Fn(&Component) -> LocalBoxFuture<'static, Vec<Spec>> + 'static) -> Value {
    Value::opaque(Rc::new(f) as FetchFn)
}

pub fn on_open(f: impl Fn(&Component, &Component) + 'static) -> Value {
    Value::opaque(Rc::new(f) as OpenCallback)
}

pub fn definition() -> CompositeDef {
    let sink = SinglePart::new("sink", SINK)
        .default_spec(|_| Spec::from(json!({ "dom": { "tag": "div", "classes": ["alloy-dropdown-sink"] } })));

    CompositeDef::new(
        KIND,
        Schema::new(vec![
            FieldSchema::defaulted("dom", Value::from(json!({ "tag": "button" }))),
            FieldSchema::option_of("text", Processor::String),
            FieldSchema::required_function("fetch"),
            FieldSchema::defaulted_of("toggleClass", "alloy-selected-button", Processor::String),
            FieldSchema::option_of("onOpen", Processor::Function),
            FieldSchema::option_of("sandbox", Processor::Function),
        ]),
        factory,
    )
    .part(sink)
}

/// The popup built when a spec leaves `sandbox` out.
fn default_sandbox(owner: &Component) -> Spec {
    Spec::from(json!({
        "uid": owner.uid().part(SANDBOX).as_str(),
        "dom": { "tag": "div", "classes": ["alloy-dropdown-menu"], "attributes": { "role": "menu" } },
        "behaviours": {
            "replacing": {},
            "toggling": { "toggleClass": "alloy-menu-open", "toggleOnExecute": false }
        }
    }))
}

fn factory(owner: &CompositeDetail, components: Vec<Value>) -> Result<Spec, BuildError> {
    let detail = owner.detail();

    let sandbox = match detail.option("sandbox") {
        Some(factory) => factory.clone(),
        None => coupling::factory(default_sandbox),
    };
    let toggle_class = detail.string("toggleClass")?;
    let defaults = Value::from(json!({
        "toggling": { "toggleClass": toggle_class, "aria": "expanded" },
        "keying": { "mode": "execution", "useSpace": true },
        "focusing": true
    }));
    let mut behaviours = defaults.deep_merge(detail.value("behaviours")?);
    if let Value::Object(map) = &mut behaviours {
        let mut others = crate::schema::Object::new();
        others.insert(SANDBOX.to_string(), sandbox);
        let mut config = crate::schema::Object::new();
        config.insert("others".to_string(), Value::Object(others));
        map.insert(coupling::NAME.to_string(), Value::Object(config));
    }

    let dom = match detail.option_string("text")? {
        Some(text) => detail.value("dom")?.deep_merge(&Value::from(json!({ "innerHtml": text }))),
        None => detail.value("dom")?.clone(),
    };

    let config = DropdownConfig {
        fetch: detail.opaque::<FetchFn>("fetch")?.clone(),
        on_open: detail.option_opaque::<OpenCallback>("onOpen")?.cloned(),
        sink: owner.part_uid("sink").cloned().unwrap_or_else(|| owner.uid().part("sink")),
    };
    let mut custom = detail.array("customBehaviours")?.to_vec();
    custom.push(custom_value(Dropdown { config }));

    let mut handlers = detail.object("events")?.clone();
    handlers.insert(
        events::EXECUTE.to_string(),
        handler(|dropdown: &Component, _: &mut SimulatedEvent| {
            if toggling::is_on(dropdown) {
                if let Err(err) = open(dropdown) {
                    // toggling already flipped the dropdown on
                    toggling::off(dropdown);
                    warn!(uid = %dropdown.uid(), %err, "failed to open dropdown");
                }
            } else {
                close(dropdown);
            }
        }),
    );

    let mut order = detail.object("eventOrder")?.clone();
    order
        .entry(events::EXECUTE.to_string())
        .or_insert_with(|| Value::from(json!([toggling::NAME, events::BASE_HANDLER])));

    Ok(component_fields(owner, components)
        .with("dom", dom)
        .with("behaviours", behaviours)
        .with("customBehaviours", custom)
        .with("events", handlers)
        .with("eventOrder", order))
}

// =============================================================================
// Behaviour
// =============================================================================

#[derive(Clone)]
pub struct DropdownConfig {
    pub fetch: FetchFn,
    pub on_open: Option<OpenCallback>,
    pub sink: Uid,
}

/// Carries the fetch configuration and the last-wins state of one dropdown.
struct Dropdown {
    config: DropdownConfig,
}

impl Behaviour for Dropdown {
    type Config = DropdownConfig;
    type State = LastWins;

    fn name(&self) -> &str {
        NAME
    }

    fn schema(&self) -> Schema {
        Schema::default()
    }

    fn configure(&self, _detail: &Detail) -> Result<DropdownConfig, BuildError> {
        Ok(self.config.clone())
    }

    fn init_state(&self, _config: &DropdownConfig) -> LastWins {
        LastWins::new()
    }

    fn events(&self, _config: &Rc<DropdownConfig>) -> EventHandlers {
        let mut handlers = EventHandlers::new();
        handlers.insert(
            events::SANDBOX_CLOSE.to_string(),
            Rc::new(|dropdown: &Component, event: &mut SimulatedEvent| {
                close(dropdown);
                event.stop();
            }),
        );
        handlers
    }
}

// =============================================================================
// API
// =============================================================================

pub fn is_open(dropdown: &Component) -> bool {
    toggling::is_on(dropdown)
}

/// Open the popup, building it on first use, and start a fetch.
pub fn open(dropdown: &Component) -> Result<Component, CouplingError> {
    let config = dropdown
        .behaviour_config::<DropdownConfig>(NAME)
        .ok_or_else(|| CouplingError::NotConfigured(dropdown.uid().clone()))?;
    let sandbox = coupling::get_coupled(dropdown, SANDBOX)?;
    let system = dropdown.system().ok_or(BuildError::SystemGone)?;

    toggling::on(dropdown);
    if sandbox.parent().is_none() {
        match system.get_by_uid(&config.sink) {
            Some(sink) => system.attach(&sink, &sandbox),
            None => debug!(uid = %dropdown.uid(), "dropdown has no sink; sandbox left detached"),
        }
    }
    toggling::on(&sandbox);

    let Some(ticket) = dropdown.with_state(NAME, |requests: &mut LastWins| requests.issue()) else {
        return Ok(sandbox);
    };
    let on_open = config.on_open.clone();
    system.spawn_for(dropdown, (config.fetch)(dropdown), move |dropdown, items| {
        if !ticket.is_current() || !is_open(dropdown) {
            debug!(uid = %dropdown.uid(), "discarding stale dropdown items");
            return;
        }
        let Some(sandbox) = coupling::get_cached(dropdown, SANDBOX) else {
            return;
        };
        match replacing::replace(&sandbox, &items) {
            Ok(_) => {
                if let Some(on_open) = &on_open {
                    on_open(dropdown, &sandbox);
                }
            }
            Err(err) => warn!(uid = %dropdown.uid(), %err, "failed to build dropdown items"),
        }
    });
    Ok(sandbox)
}

/// Close the popup. The sandbox is kept for the next open.
pub fn close(dropdown: &Component) {
    toggling::off(dropdown);
    if let Some(sandbox) = coupling::get_cached(dropdown, SANDBOX) {
        toggling::off(&sandbox);
    }
    dropdown.with_state(NAME, |requests: &mut LastWins| requests.cancel());
}

pub fn toggle_popup(dropdown: &Component) -> Result<(), CouplingError> {
    if is_open(dropdown) {
        close(dropdown);
        Ok(())
    } else {
        open(dropdown).map(|_| ())
    }
}

/// The popup, if it has been built.
pub fn sandbox(dropdown: &Component) -> Option<Component> {
    coupling::get_cached(dropdown, SANDBOX)
}

pub fn build(system: &System, spec: &Spec) -> Result<Component, BuildError> {
    composite::build(system, &definition(), spec)
}
