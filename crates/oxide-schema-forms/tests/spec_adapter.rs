//! Tests for building forms from spec trees.

mod common;
use common::*;

use oxide_schema_forms::widgets::HtmlMount;
use oxide_schema_forms::{
    AdapterDefaults, AdapterOptions, Form, FormError, SpecAdapter, Value,
};
use serde_json::json;

fn search_spec() -> serde_json::Value {
    json!([{ "category": {
        "name": "Search",
        "description": "Narrow the results",
        "content": [
            { "fields": [
                { "name": "query", "datatype": "text", "label": "Query", "current_value": "rust" },
                { "name": "size", "datatype": "range", "label": "Size", "current_value": [1, 10] },
                { "name": "advanced", "datatype": "boolean", "label": "Advanced",
                  "dependent_fields": { "field": [
                      { "name": "since", "datatype": "date", "label": "Since" }
                  ]}}
            ]},
            { "category": { "name": "Filters", "content": [{ "fields": [
                { "name": "lang", "datatype": "multi_select", "label": "Language",
                  "options": { "option": [
                      { "option_value": "en", "option_label": "English" },
                      { "option_value": "fr", "option_label": "French" }
                  ]},
                  "current_value": ["fr"] }
            ]}]}}
        ]
    }}])
}

#[test]
fn range_splits_into_ordered_min_max_fields() {
    let adapted = SpecAdapter::new(AdapterOptions::new()).adapt(&search_spec()).unwrap();
    let keys: Vec<&str> = adapted.schema.keys().collect();
    assert_eq!(keys, vec!["query", "size_min", "size_max", "advanced", "since", "lang"]);

    let form = Form::from_spec(adapted).unwrap();
    assert_eq!(form.field_value("size_min"), Some(Value::from("1")));
    assert_eq!(form.field_value("size_max"), Some(Value::from("10")));
    assert_eq!(form.field("size_min").unwrap().title(), "Size Min");
}

#[test]
fn spec_form_renders_layout_and_enhances_chosen() {
    let adapted = SpecAdapter::default().adapt(&search_spec()).unwrap();
    let mut form = Form::from_spec(adapted).unwrap();

    let mut mount = HtmlMount::new();
    form.render_to(&mut mount);

    assert!(mount.html.contains("<legend>Search</legend>"));
    assert!(mount.html.contains("Narrow the results"));
    assert!(mount.html.contains("<legend>Filters</legend>"));
    assert!(mount.html.contains(r#"<fieldset class="dependency" hidden>"#));
    assert_eq!(mount.enhanced.len(), 1);
    assert!(mount.enhanced[0].0.ends_with("_lang"));

    assert_eq!(
        form.field_value("lang"),
        Some(Value::List(vec![Value::from("fr")]))
    );
}

#[test]
fn dependent_fieldset_follows_the_boolean() {
    let mut form = Form::from_spec(SpecAdapter::default().adapt(&search_spec()).unwrap()).unwrap();
    let since_active = |form: &Form| form.field("advanced").unwrap().dependants()[0].is_active();

    assert!(!since_active(&form));
    form.editor_mut("advanced").unwrap().input(Value::from(true));
    let events = form.tick();
    assert!(names(&events).contains(&"advanced:change"));
    assert!(since_active(&form));
}

#[test]
fn without_chosen_selects_fall_back() {
    let defaults = AdapterDefaults::from_json(r#"{"use_chosen": false}"#).unwrap();
    let adapted = SpecAdapter::new(AdapterOptions::new().defaults(defaults))
        .adapt(&search_spec())
        .unwrap();
    assert_eq!(adapted.schema.get("lang").unwrap().type_name, "Checkboxes");

    let adapted = SpecAdapter::new(AdapterOptions::new().use_chosen(false).add_empty_select_option(true))
        .adapt(&json!({ "name": "C", "fields": [
            { "name": "pick", "datatype": "single_select", "options": [{ "val": 1, "label": "One" }] }
        ]}))
        .unwrap();
    let pick = adapted.schema.get("pick").unwrap();
    assert_eq!(pick.type_name, "Select");
    assert_eq!(pick.options.as_ref().unwrap().resolve().len(), 2);
}

#[test]
fn unknown_datatype_is_a_construction_error() {
    let err = SpecAdapter::default()
        .adapt_str(r#"{ "name": "C", "fields": [{ "name": "x", "datatype": "color" }] }"#)
        .unwrap_err();
    assert!(matches!(err, FormError::UnknownDatatype(t) if t == "color"));
}
