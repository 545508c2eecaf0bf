use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;
use spark_compose::behaviour::highlighting;
use spark_compose::ui::{tab_button, tabbar};
use spark_compose::{events, placeholder, Component, Object, Spec, System, Value};

type Log = Rc<RefCell<Vec<String>>>;

fn value_of(tab: &Component) -> String {
    tab_button::value(tab).unwrap_or_default()
}

fn abc_bar(system: &System, log: &Log, click_to_dismiss: bool) -> Component {
    let mut callbacks = Object::new();
    let seen = log.clone();
    callbacks.insert(
        "onHighlight".into(),
        highlighting::callback(move |_, tab| seen.borrow_mut().push(format!("highlight:{}", value_of(tab)))),
    );
    let seen = log.clone();
    callbacks.insert(
        "onDehighlight".into(),
        highlighting::callback(move |_, tab| seen.borrow_mut().push(format!("dehighlight:{}", value_of(tab)))),
    );
    let mut behaviours = Object::new();
    behaviours.insert("highlighting".into(), Value::from(callbacks));

    let on_change = log.clone();
    let on_dismiss = log.clone();
    let spec = Spec::from(json!({
        "tabs": [{ "value": "A" }, { "value": "B" }, { "value": "C" }],
        "clickToDismiss": click_to_dismiss,
    }))
    .with("components", Value::from(vec![placeholder(tabbar::TABS)]))
    .with("behaviours", behaviours)
    .with(
        "onChange",
        tabbar::callback(move |_, tab| on_change.borrow_mut().push(format!("change:{}", value_of(tab)))),
    )
    .with(
        "onDismiss",
        tabbar::callback(move |_, tab| on_dismiss.borrow_mut().push(format!("dismiss:{}", value_of(tab)))),
    );

    tabbar::build(system, &spec).unwrap()
}

fn execute(system: &System, bar: &Component, value: &str) {
    let tab = tabbar::tabs(bar)
        .into_iter()
        .find(|t| value_of(t) == value)
        .unwrap();
    system.dispatch(&tab, events::EXECUTE, Value::Null);
}

#[test]
fn test_change_fires_once_per_new_selection() {
    let system = System::new();
    let log: Log = Rc::default();
    let bar = abc_bar(&system, &log, false);

    execute(&system, &bar, "B");
    execute(&system, &bar, "B");
    execute(&system, &bar, "C");

    assert_eq!(
        *log.borrow(),
        vec!["highlight:B", "change:B", "dehighlight:B", "highlight:C", "change:C"]
    );
    assert_eq!(value_of(&tabbar::selected(&bar).unwrap()), "C");

    let selected: Vec<String> = tabbar::tabs(&bar)
        .iter()
        .filter(|t| t.has_class("alloy-selected-tab"))
        .map(value_of)
        .collect();
    assert_eq!(selected, vec!["C"]);
}

#[test]
fn test_click_to_dismiss() {
    let system = System::new();
    let log: Log = Rc::default();
    let bar = abc_bar(&system, &log, true);

    execute(&system, &bar, "A");
    execute(&system, &bar, "A");

    assert_eq!(*log.borrow(), vec!["highlight:A", "change:A", "dehighlight:A", "dismiss:A"]);
    assert!(tabbar::selected(&bar).is_none());
}

#[test]
fn test_empty_tab_list_builds() {
    let system = System::new();
    let spec = Spec::from(json!({ "tabs": [] })).with("components", Value::from(vec![placeholder(tabbar::TABS)]));
    let bar = tabbar::build(&system, &spec).unwrap();
    assert!(tabbar::tabs(&bar).is_empty());
    assert!(bar.children().is_empty());
}

#[test]
fn test_tab_buttons_are_built_in_author_order() {
    let system = System::new();
    let log: Log = Rc::default();
    let bar = abc_bar(&system, &log, false);
    let values: Vec<String> = bar.children().iter().map(value_of).collect();
    assert_eq!(values, vec!["A", "B", "C"]);
}
