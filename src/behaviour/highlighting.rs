//! Highlighting - one highlighted item among a component's descendants.
//!
//! Candidates are the descendants carrying `itemClass`; the highlighted one
//! also carries `highlightClass`. Highlighting an item first dehighlights
//! every other candidate, so callbacks always arrive as
//! `onDehighlight(old)` then `onHighlight(new)`.
//!
//! # Example
//!
//! ```ignore
//! "behaviours": {
//!     "highlighting": { "highlightClass": "selected", "itemClass": "tab" }
//! }
//!
//! highlighting::highlight(&tabbar, &tab_b);
//! assert!(highlighting::is_highlighted(&tabbar, &tab_b));
//! ```

use std::rc::Rc;

use super::Behaviour;
use crate::error::BuildError;
use crate::schema::{Detail, FieldSchema, Processor, Schema, Value};
use crate::system::Component;
use crate::types::Uid;

pub const NAME: &str = "highlighting";

/// Called with `(owner, item)`.
pub type HighlightCallback = Rc<dyn Fn(&Component, &Component)>;

pub fn callback(f: impl Fn(&Component, &Component) + 'static) -> Value {
    Value::opaque(Rc::new(f) as HighlightCallback)
}

pub struct Highlighting;

#[derive(Clone)]
pub struct HighlightConfig {
    pub highlight_class: String,
    pub item_class: String,
    pub on_highlight: Option<HighlightCallback>,
    pub on_dehighlight: Option<HighlightCallback>,
}

#[derive(Debug, Default)]
pub struct HighlightState {
    pub highlighted: Option<Uid>,
}

impl Behaviour for Highlighting {
    type Config = HighlightConfig;
    type State = HighlightState;

    fn name(&self) -> &str {
        NAME
    }

    fn schema(&self) -> Schema {
        Schema::new(vec![
            FieldSchema::required_string("highlightClass"),
            FieldSchema::required_string("itemClass"),
            FieldSchema::option_of("onHighlight", Processor::Function),
            FieldSchema::option_of("onDehighlight", Processor::Function),
        ])
    }

    fn configure(&self, detail: &Detail) -> Result<HighlightConfig, BuildError> {
        Ok(HighlightConfig {
            highlight_class: detail.string("highlightClass")?.to_string(),
            item_class: detail.string("itemClass")?.to_string(),
            on_highlight: detail.option_opaque::<HighlightCallback>("onHighlight")?.cloned(),
            on_dehighlight: detail.option_opaque::<HighlightCallback>("onDehighlight")?.cloned(),
        })
    }

    fn init_state(&self, _config: &HighlightConfig) -> HighlightState {
        HighlightState::default()
    }
}

// =============================================================================
// API
// =============================================================================

fn config(component: &Component) -> Option<Rc<HighlightConfig>> {
    component.behaviour_config::<HighlightConfig>(NAME)
}

fn set_highlighted(component: &Component, uid: Option<Uid>) {
    component.with_state(NAME, |state: &mut HighlightState| state.highlighted = uid);
}

/// Descendants carrying the item class, in tree order.
pub fn candidates(component: &Component) -> Vec<Component> {
    let Some(config) = config(component) else {
        return Vec::new();
    };
    component
        .descendants()
        .into_iter()
        .filter(|c| c.has_class(&config.item_class))
        .collect()
}

pub fn is_highlighted(component: &Component, item: &Component) -> bool {
    component
        .with_state(NAME, |state: &mut HighlightState| state.highlighted.as_ref() == Some(item.uid()))
        .unwrap_or(false)
}

pub fn get_highlighted(component: &Component) -> Option<Component> {
    let uid = component.with_state(NAME, |state: &mut HighlightState| state.highlighted.clone())??;
    candidates(component).into_iter().find(|c| c.uid() == &uid)
}

/// Highlight `item`, dehighlighting every other candidate first.
pub fn highlight(component: &Component, item: &Component) {
    let Some(config) = config(component) else {
        return;
    };
    for other in candidates(component) {
        if !other.ptr_eq(item) {
            dehighlight(component, &other);
        }
    }
    if is_highlighted(component, item) && item.has_class(&config.highlight_class) {
        return;
    }

    item.add_class(&config.highlight_class);
    set_highlighted(component, Some(item.uid().clone()));
    if let Some(on_highlight) = &config.on_highlight {
        on_highlight(component, item);
    }
}

pub fn dehighlight(component: &Component, item: &Component) {
    let Some(config) = config(component) else {
        return;
    };
    let was_current = is_highlighted(component, item);
    let had_class = item.remove_class(&config.highlight_class);
    if was_current {
        set_highlighted(component, None);
    }
    if had_class || was_current {
        if let Some(on_dehighlight) = &config.on_dehighlight {
            on_dehighlight(component, item);
        }
    }
}

pub fn dehighlight_all(component: &Component) {
    for item in candidates(component) {
        dehighlight(component, &item);
    }
}

pub fn highlight_first(component: &Component) -> Option<Component> {
    let first = candidates(component).into_iter().next()?;
    highlight(component, &first);
    Some(first)
}

pub fn highlight_last(component: &Component) -> Option<Component> {
    let last = candidates(component).into_iter().last()?;
    highlight(component, &last);
    Some(last)
}

/// Move the highlight one candidate forward, wrapping at the end.
pub fn highlight_next(component: &Component) -> Option<Component> {
    step(component, 1)
}

pub fn highlight_previous(component: &Component) -> Option<Component> {
    step(component, -1)
}

fn step(component: &Component, direction: isize) -> Option<Component> {
    let items = candidates(component);
    if items.is_empty() {
        return None;
    }
    let len = items.len() as isize;
    let current = get_highlighted(component).and_then(|h| items.iter().position(|c| c.ptr_eq(&h)));
    let next = match current {
        None if direction > 0 => 0,
        None => len - 1,
        Some(pos) => ((pos as isize + direction) % len + len) % len,
    };
    let target = items[next as usize].clone();
    highlight(component, &target);
    Some(target)
}
