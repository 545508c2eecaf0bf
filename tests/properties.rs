use std::cell::RefCell;
use std::rc::Rc;

use proptest::prelude::*;
use serde_json::json;
use spark_compose::ui::{button, tab_button, tabbar};
use spark_compose::{
    custom_value, placeholder, CustomBehaviour, FieldSchema, Processor, Schema, Spec, System, Value,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Rule {
    Required,
    Defaulted,
    Optional,
}

fn rule() -> impl Strategy<Value = Rule> {
    prop_oneof![Just(Rule::Required), Just(Rule::Defaulted), Just(Rule::Optional)]
}

/// (rule, supplied, supplied value is valid)
fn fields() -> impl Strategy<Value = Vec<(Rule, bool, bool)>> {
    prop::collection::vec((rule(), any::<bool>(), any::<bool>()), 0..8)
}

proptest! {
    #[test]
    fn validation_yields_full_detail_or_every_failure(fields in fields()) {
        let names: Vec<String> = (0..fields.len()).map(|i| format!("f{i}")).collect();
        let schema = Schema::new(
            fields
                .iter()
                .zip(&names)
                .map(|((rule, _, _), name)| match rule {
                    Rule::Required => FieldSchema::required_string(name.as_str()),
                    Rule::Defaulted => FieldSchema::defaulted_of(name.as_str(), "default", Processor::String),
                    Rule::Optional => FieldSchema::option_of(name.as_str(), Processor::String),
                })
                .collect(),
        );

        let mut spec = Spec::new().with("undeclared", true);
        let mut expected = Vec::new();
        for ((rule, supplied, valid), name) in fields.iter().zip(&names) {
            if *supplied {
                spec = if *valid { spec.with(name.as_str(), "text") } else { spec.with(name.as_str(), 42) };
                if !*valid {
                    expected.push(name.clone());
                }
            } else if *rule == Rule::Required {
                expected.push(name.clone());
            }
        }

        match schema.validate(&spec) {
            Ok(detail) => {
                prop_assert!(expected.is_empty());
                prop_assert_eq!(detail.field_names().collect::<Vec<_>>(), names.iter().map(String::as_str).collect::<Vec<_>>());
                prop_assert!(detail.get("undeclared").is_none());
            }
            Err(errors) => {
                prop_assert!(!errors.is_empty());
                prop_assert_eq!(errors.paths(), expected.iter().map(String::as_str).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn group_entries_keep_author_order(count in 0usize..12) {
        let system = System::new();
        let tabs: Vec<serde_json::Value> = (0..count).map(|i| json!({ "value": format!("t{i}") })).collect();
        let spec = Spec::from(json!({ "tabs": tabs }))
            .with("components", Value::from(vec![placeholder(tabbar::TABS)]));
        let bar = tabbar::build(&system, &spec).unwrap();

        let values: Vec<String> = bar.children().iter().filter_map(tab_button::value).collect();
        let expected: Vec<String> = (0..count).map(|i| format!("t{i}")).collect();
        prop_assert_eq!(values, expected);
    }

    #[test]
    fn dispatch_follows_composition_order(count in 1usize..6) {
        let (log, spec) = probe_spec(count);
        let system = System::new();
        let component = system.build(&spec).unwrap();
        system.dispatch(&component, "probe", Value::Null);
        prop_assert_eq!(log.borrow().clone(), (0..count).collect::<Vec<_>>());
    }

    #[test]
    fn event_order_overrides_composition_order(order in Just((0usize..5).collect::<Vec<_>>()).prop_shuffle()) {
        let (log, spec) = probe_spec(order.len());
        let names: Vec<String> = order.iter().map(|i| format!("probe{i}")).collect();
        let spec = spec.with("eventOrder", Value::from(json!({ "probe": names })));
        let system = System::new();
        let component = system.build(&spec).unwrap();
        system.dispatch(&component, "probe", Value::Null);
        prop_assert_eq!(log.borrow().clone(), order);
    }

    #[test]
    fn building_twice_gives_distinct_but_equal_components(text in "[a-zA-Z ]{0,12}", toggles in any::<bool>()) {
        let system = System::new();
        let mut spec = Spec::from(json!({ "text": text }));
        if toggles {
            spec = spec.with("behaviours", Value::from(json!({ "toggling": { "toggleClass": "on" } })));
        }

        let first = button::build(&system, &spec).unwrap();
        let second = button::build(&system, &spec).unwrap();

        prop_assert_ne!(first.uid(), second.uid());
        prop_assert_eq!(first.behaviour_names(), second.behaviour_names());
        prop_assert_eq!(first.dom(), second.dom());
        prop_assert_eq!(first.has_behaviour("toggling"), toggles);
    }
}

/// A plain component with `count` custom behaviours that log on `probe`.
fn probe_spec(count: usize) -> (Rc<RefCell<Vec<usize>>>, Spec) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let behaviours: Vec<Value> = (0..count)
        .map(|i| {
            let seen = log.clone();
            custom_value(CustomBehaviour::new(format!("probe{i}")).on("probe", move |_, _| seen.borrow_mut().push(i)))
        })
        .collect();
    let spec = Spec::from(json!({ "dom": { "tag": "div" } })).with("customBehaviours", behaviours);
    (log, spec)
}
