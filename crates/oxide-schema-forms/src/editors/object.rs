//! Editors wrapping a nested form: Object and NestedModel.

use tracing::warn;

use super::{missing, store_in_model, Editor, EditorCore, EditorOptions};
use crate::error::{CommitError, FieldError, Result};
use crate::events::EventKind;
use crate::form::{Form, FormOptions, IdPrefix};
use crate::model::SetOptions;
use crate::schema::{ModelFactory, Schema};
use crate::value::{Value, ValueMap};
use crate::widgets::{html_escape, MountPoint};

/// Editor whose value is the aggregate value of a nested form.
///
/// The nested form is built from the schema's `sub_schema`; nested-model
/// editors additionally bind it to a data source made by the schema's model
/// factory. Events of the nested form are re-raised by this editor.
pub struct ObjectEditor {
    core: EditorCore,
    sub_schema: Schema,
    factory: Option<ModelFactory>,
    form: Form,
}

impl std::fmt::Debug for ObjectEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectEditor")
            .field("core", &self.core)
            .field("form", &self.form)
            .finish_non_exhaustive()
    }
}

impl ObjectEditor {
    fn build(options: EditorOptions, nested_model: bool) -> Result<Box<dyn Editor>> {
        let type_name = if nested_model { "NestedModel" } else { "Object" };
        let sub_schema = options
            .schema
            .sub_schema
            .clone()
            .ok_or_else(|| missing("schema.sub_schema", type_name))?;
        let factory = if nested_model {
            Some(
                options
                    .schema
                    .model
                    .clone()
                    .ok_or_else(|| missing("schema.model", type_name))?,
            )
        } else {
            None
        };

        let (core, initial) = EditorCore::new(options)?;
        let data = match initial {
            Some(Value::Map(map)) => map,
            _ => ValueMap::new(),
        };
        let form = Self::nested_form_for(&core, &sub_schema, factory.as_ref(), data)?;

        let mut editor = Self {
            core,
            sub_schema,
            factory,
            form,
        };
        let value = editor.value();
        editor.core.last_observed = value;
        Ok(Box::new(editor))
    }

    fn nested_form_for(
        core: &EditorCore,
        sub_schema: &Schema,
        factory: Option<&ModelFactory>,
        data: ValueMap,
    ) -> Result<Form> {
        let options = FormOptions::new()
            .schema(sub_schema.clone())
            .id_prefix(IdPrefix::Prefix(format!("{}_", core.id)))
            .registry(std::sync::Arc::clone(&core.registry))
            .nested_field(&core.key);
        let options = match factory {
            Some(factory) => options.model(factory(data)),
            None => options.data(data),
        };
        Form::new(options)
    }
}

/// Creates an `Object` editor.
pub fn object(options: EditorOptions) -> Result<Box<dyn Editor>> {
    ObjectEditor::build(options, false)
}

/// Creates a `NestedModel` editor.
pub fn nested_model(options: EditorOptions) -> Result<Box<dyn Editor>> {
    ObjectEditor::build(options, true)
}

impl Editor for ObjectEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        if self.factory.is_some() {
            "NestedModel"
        } else {
            "Object"
        }
    }

    fn value(&self) -> Value {
        Value::Map(self.form.value())
    }

    /// Rebuilds the nested form around the new value.
    fn write(&mut self, value: Value) {
        let data = match value {
            Value::Map(map) => map,
            _ => ValueMap::new(),
        };
        match Self::nested_form_for(&self.core, &self.sub_schema, self.factory.as_ref(), data) {
            Ok(form) => {
                self.form.dispose();
                self.form = form;
            }
            Err(err) => warn!(key = %self.core.key, error = %err, "failed to rebuild nested form"),
        }
    }

    fn render(&mut self) -> String {
        format!(
            r#"<div id="{}" class="object">{}</div>"#,
            html_escape(&self.core.id),
            self.form.render()
        )
    }

    fn has_focus(&self) -> bool {
        self.form.has_focus()
    }

    fn focus(&mut self) {
        self.form.focus();
    }

    fn blur(&mut self) {
        self.form.blur();
    }

    fn validate(&mut self, _form_values: &ValueMap) -> std::result::Result<(), FieldError> {
        self.form
            .validate()
            .map_err(|errors| FieldError::Nested(Box::new(errors)))
    }

    /// Nested-model editors commit the nested form first.
    fn commit(&mut self, form_values: &ValueMap, options: SetOptions) -> std::result::Result<(), CommitError> {
        if self.factory.is_some() {
            self.form.commit(options).map_err(|err| match err {
                CommitError::Form(errors) => CommitError::Field(FieldError::Nested(Box::new(errors))),
                other => other,
            })?;
        }
        self.validate(form_values).map_err(CommitError::Field)?;
        store_in_model(&self.core, self.value(), options)
    }

    fn has_nested_form(&self) -> bool {
        true
    }

    fn nested_form(&self) -> Option<&Form> {
        Some(&self.form)
    }

    fn nested_form_mut(&mut self) -> Option<&mut Form> {
        Some(&mut self.form)
    }

    fn pump(&mut self) -> bool {
        let events = self.form.tick();
        for event in &events {
            self.core.emitter.emit(EventKind::from_name(&event.name));
        }
        if !events.is_empty() {
            let value = self.value();
            self.core.last_observed = value;
        }
        !events.is_empty()
    }

    fn init_display(&mut self, mount: &mut dyn MountPoint) {
        self.form.init_enhanced(mount);
    }

    fn dispose(&mut self) {
        self.form.dispose();
        self.core.has_focus = false;
        self.core.alive().set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editors::test_support::{build, options};
    use crate::error::FormError;
    use crate::model::{DataSource, Model};
    use crate::schema::FieldSchema;

    fn address() -> Schema {
        Schema::new()
            .field("street", FieldSchema::new("Text").validator("required"))
            .field("city", "Text")
    }

    fn map(pairs: &[(&str, &str)]) -> ValueMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_object_requires_sub_schema() {
        let err = object(options("address", FieldSchema::new("Object"))).err().unwrap();
        assert!(matches!(
            err,
            FormError::MissingOption { option, .. } if option == "schema.sub_schema"
        ));
    }

    #[test]
    fn test_nested_model_requires_factory() {
        let schema = FieldSchema::new("NestedModel").sub_schema(address());
        let err = nested_model(options("address", schema)).err().unwrap();
        assert!(matches!(
            err,
            FormError::MissingOption { option, .. } if option == "schema.model"
        ));
    }

    #[test]
    fn test_object_value_round_trip() {
        let mut editor = build("address", FieldSchema::new("Object").sub_schema(address()));
        assert!(editor.has_nested_form());
        assert_eq!(editor.value(), Value::Map(map(&[("street", ""), ("city", "")])));

        editor.set_value(Value::Map(map(&[("street", "Main St"), ("city", "Ghent")])));
        assert_eq!(
            editor.value(),
            Value::Map(map(&[("street", "Main St"), ("city", "Ghent")]))
        );
        assert!(editor.render().contains(r#"id="address_street""#));
    }

    #[test]
    fn test_object_validation_is_nested() {
        let mut editor = build("address", FieldSchema::new("Object").sub_schema(address()));
        match editor.validate(&ValueMap::new()) {
            Err(FieldError::Nested(errors)) => assert!(errors.contains("street")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_object_relays_nested_events() {
        let mut editor = build("address", FieldSchema::new("Object").sub_schema(address()));
        editor
            .nested_form_mut()
            .unwrap()
            .editor_mut("city")
            .unwrap()
            .focus();

        assert!(editor.pump());
        assert!(editor.has_focus());
        assert!(!editor.pump());
    }

    #[test]
    fn test_nested_model_commits_nested_form_first() {
        let schema = FieldSchema::new("NestedModel")
            .sub_schema(address())
            .model(|values| Model::with_attributes(values).into_shared());
        let mut editor = build("address", schema);
        editor.set_value(Value::Map(map(&[("street", "Main St"), ("city", "Ghent")])));

        let err = editor.commit(&ValueMap::new(), SetOptions::new()).unwrap_err();
        assert!(matches!(err, CommitError::Unbound(key) if key == "address"));

        let nested_model = editor.nested_form().unwrap().model().unwrap();
        assert_eq!(nested_model.borrow().get("street"), Some(Value::from("Main St")));
    }

    #[test]
    fn test_nested_model_surfaces_nested_errors() {
        let schema = FieldSchema::new("NestedModel")
            .sub_schema(address())
            .model(|values| Model::with_attributes(values).into_shared());
        let mut editor = build("address", schema);

        let err = editor.commit(&ValueMap::new(), SetOptions::new()).unwrap_err();
        assert!(matches!(err, CommitError::Field(FieldError::Nested(_))));
    }
}
