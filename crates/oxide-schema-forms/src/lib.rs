//! # oxide-schema-forms
//!
//! Schema-driven forms: a schema of typed fields becomes a form of
//! fieldsets, fields and editors, with two-way binding to a data source,
//! event bubbling and validation.
//!
//! This crate provides:
//! - Editors for text, numbers, checkboxes, selects, dates, ranges and
//!   nested objects
//! - Fields with titles, help and error display, and dependent fieldsets
//! - Forms with aggregate values, focus tracking, validation and commit
//! - An adapter from category/field spec trees to forms
//!
//! ## Quick Start
//!
//! ```rust
//! use oxide_schema_forms::{
//!     FieldSchema, Form, FormOptions, Model, Schema, SetOptions, Value,
//! };
//! use oxide_schema_forms::model::DataSource;
//!
//! let schema = Schema::new()
//!     .field("title", FieldSchema::new("Text").validator("required"))
//!     .field("body", "TextArea")
//!     .field("published", "Checkbox");
//!
//! let model = Model::new().into_shared();
//! let mut form = Form::new(
//!     FormOptions::new().schema(schema).model(model.clone()),
//! ).unwrap();
//!
//! // Nothing typed yet: `title` is required.
//! assert!(form.commit(SetOptions::new()).is_err());
//!
//! form.set_value("title", Value::from("Hello"));
//! form.commit(SetOptions::new()).unwrap();
//! assert_eq!(model.borrow().get("title"), Some(Value::from("Hello")));
//!
//! let html = form.render();
//! assert!(html.contains("field-title"));
//! ```
//!
//! ## Events
//!
//! Editors queue events on their form. `tick()` delivers them, together with
//! the form's own `change`, `focus` and `blur`:
//!
//! ```rust
//! use oxide_schema_forms::{Editor, Form, FormOptions, Schema, Value};
//!
//! let schema = Schema::new().field("a", "Text").field("b", "Text");
//! let mut form = Form::new(FormOptions::new().schema(schema)).unwrap();
//!
//! form.editor_mut("a").unwrap().focus();
//! form.editor_mut("a").unwrap().input(Value::from("x"));
//!
//! let names: Vec<String> = form.tick().into_iter().map(|e| e.name).collect();
//! assert_eq!(names, ["a:focus", "focus", "a:change", "change"]);
//! ```
//!
//! ## Validators
//!
//! Built-in validators are `required`, `regexp`, `email`, `url` and `match`.
//! Others can be registered:
//!
//! ```rust
//! use std::sync::Arc;
//! use oxide_schema_forms::{FieldSchema, Form, FormOptions, Registry, Schema, Value};
//! use oxide_schema_forms::validation::{FnValidator, Validator};
//!
//! let mut registry = Registry::with_builtins();
//! registry.register_validator("even", |_config| {
//!     let validator = FnValidator::new("even", |value, _form| {
//!         match value.as_str().and_then(|s| s.parse::<i64>().ok()) {
//!             Some(n) if n % 2 == 0 => None,
//!             _ => Some("Must be even".to_string()),
//!         }
//!     });
//!     Ok(Arc::new(validator) as Arc<dyn Validator>)
//! });
//!
//! let schema = Schema::new().field("n", FieldSchema::new("Text").validator("even"));
//! let mut form = Form::new(
//!     FormOptions::new().schema(schema).registry(Arc::new(registry)),
//! ).unwrap();
//!
//! form.set_value("n", Value::from("3"));
//! assert_eq!(form.validate().unwrap_err().get("n").unwrap().message(), "Must be even");
//! ```
//!
//! ## Editors
//!
//! Built-in editor types:
//! - `Text`, `TextArea`, `Password`, `Number`, `Hidden`
//! - `Checkbox`, `Select`, `Chosen`, `Radio`, `Checkboxes`
//! - `Date`, `DateTime`, `Range`
//! - `Object`, `NestedModel` - nested forms

pub mod adapter;
pub mod config;
pub mod editors;
mod error;
pub mod events;
pub mod field;
pub mod fieldset;
mod form;
pub mod model;
pub mod registry;
pub mod schema;
pub mod validation;
mod value;
pub mod widgets;

pub use adapter::{AdaptedSpec, AdapterOptions, SpecAdapter};
pub use config::{AdapterDefaults, DateDisplay};
pub use editors::{Editor, EditorOptions};
pub use error::{
    CommitError, FieldError, FormError, FormErrors, ModelError, OtherError, Result, ValidationError,
};
pub use events::{EventKind, FormEvent};
pub use field::Field;
pub use fieldset::Fieldset;
pub use form::{Form, FormDefinition, FormOptions, IdPrefix};
pub use model::{DataSource, Model, ModelValidation, SetOptions, SharedModel};
pub use registry::Registry;
pub use schema::{FieldSchema, FieldsetSchema, Schema, SelectOption};
pub use value::{Value, ValueMap};
