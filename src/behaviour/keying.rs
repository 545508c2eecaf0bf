//! Keying - keyboard handling for a component.
//!
//! Reads the [`KeyboardEvent`] carried by `alloy.keydown`:
//!
//! - `execution` - Enter (and Space when `useSpace`) dispatch `alloy.execute`
//! - `menu` - Up/Down move the highlight, Enter executes the highlighted item
//! - `flow` - Left/Right move the highlight, Enter executes the highlighted item
//!
//! A handled key stops the event.

use std::rc::Rc;

use super::{highlighting, Behaviour, EventHandlers};
use crate::error::BuildError;
use crate::schema::{Detail, FieldSchema, Processor, Schema, Value};
use crate::state::keyboard::KeyboardEvent;
use crate::system::{events, Component, SimulatedEvent};

pub const NAME: &str = "keying";

pub struct Keying;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    Execution,
    Menu,
    Flow,
}

#[derive(Debug, Clone)]
pub struct KeyingConfig {
    pub mode: KeyMode,
    pub use_space: bool,
    pub use_enter: bool,
}

impl Behaviour for Keying {
    type Config = KeyingConfig;
    type State = ();

    fn name(&self) -> &str {
        NAME
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            FieldSchema::defaulted_of("mode", "execution", Processor::one_of(["execution", "menu", "flow"])),
            FieldSchema::defaulted_of("useSpace", false, Processor::Boolean),
            FieldSchema::defaulted_of("useEnter", true, Processor::Boolean),
        ])
    }

    fn configure(&self, detail: &Detail) -> Result<KeyingConfig, BuildError> {
        let mode = match detail.string("mode")? {
            "menu" => KeyMode::Menu,
            "flow" => KeyMode::Flow,
            _ => KeyMode::Execution,
        };
        Ok(KeyingConfig {
            mode,
            use_space: detail.bool("useSpace")?,
            use_enter: detail.bool("useEnter")?,
        })
    }

    fn init_state(&self, _config: &KeyingConfig) {}

    fn events(&self, config: &Rc<KeyingConfig>) -> EventHandlers {
        let config = config.clone();
        let mut handlers = EventHandlers::new();
        handlers.insert(
            events::KEY_DOWN.to_string(),
            Rc::new(move |component: &Component, event: &mut SimulatedEvent| {
                let Some(key) = KeyboardEvent::from_payload(event.payload()).cloned() else {
                    return;
                };
                if !key.is_press() {
                    return;
                }
                if handle_key(&config, component, &key) {
                    event.stop();
                }
            }),
        );
        handlers
    }
}

fn is_execute_key(config: &KeyingConfig, key: &KeyboardEvent) -> bool {
    (config.use_enter && key.key == "Enter") || (config.use_space && key.key == " ")
}

fn handle_key(config: &KeyingConfig, component: &Component, key: &KeyboardEvent) -> bool {
    let Some(system) = component.system() else {
        return false;
    };

    let (previous, next) = match config.mode {
        KeyMode::Execution => {
            if is_execute_key(config, key) {
                system.dispatch(component, events::EXECUTE, Value::Null);
                return true;
            }
            return false;
        }
        KeyMode::Menu => ("ArrowUp", "ArrowDown"),
        KeyMode::Flow => ("ArrowLeft", "ArrowRight"),
    };

    if key.key == next {
        return highlighting::highlight_next(component).is_some();
    }
    if key.key == previous {
        return highlighting::highlight_previous(component).is_some();
    }
    if is_execute_key(config, key) {
        if let Some(item) = highlighting::get_highlighted(component) {
            system.dispatch(&item, events::EXECUTE, Value::Null);
            return true;
        }
    }
    false
}
