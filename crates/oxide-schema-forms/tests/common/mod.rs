#![allow(dead_code)]

use std::sync::Arc;

use oxide_schema_forms::{Form, FormEvent, FormOptions, Registry, Schema, Value, ValueMap};

pub fn registry() -> Arc<Registry> {
    Arc::new(Registry::with_builtins())
}

pub fn form(schema: Schema) -> Form {
    Form::new(FormOptions::new().schema(schema).registry(registry()))
        .unwrap_or_else(|e| panic!("Failed to build form: {e}"))
}

pub fn names(events: &[FormEvent]) -> Vec<&str> {
    events.iter().map(|e| e.name.as_str()).collect()
}

pub fn map(pairs: &[(&str, Value)]) -> ValueMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}
