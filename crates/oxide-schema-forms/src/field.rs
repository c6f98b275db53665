//! A labelled form row owning one editor.

use std::rc::Rc;

use ironhtml::html;
use ironhtml_elements::Div;
use tracing::trace;

use crate::editors::{Editor, EditorOptions};
use crate::error::{CommitError, FieldError, Result};
use crate::fieldset::Fieldset;
use crate::model::SetOptions;
use crate::schema::{create_title, FieldSchema};
use crate::value::{Value, ValueMap};

/// Callback notified with a field key when its error is shown or hidden.
pub type ErrorHook = Rc<dyn Fn(&str)>;

/// Hooks the embedding application can supply to display errors itself.
#[derive(Clone, Default)]
pub struct ErrorHooks {
    /// Called after an error was set.
    pub show: Option<ErrorHook>,
    /// Called after an error was cleared.
    pub hide: Option<ErrorHook>,
}

impl std::fmt::Debug for ErrorHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorHooks")
            .field("show", &self.show.is_some())
            .field("hide", &self.hide.is_some())
            .finish()
    }
}

/// A form row: label, editor, help text, error display and dependent
/// fieldsets.
pub struct Field {
    key: String,
    schema: FieldSchema,
    editor: Box<dyn Editor>,
    dependants: Vec<Fieldset>,
    error: Option<String>,
    error_class: String,
    hooks: ErrorHooks,
    html: String,
}

impl std::fmt::Debug for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("key", &self.key)
            .field("editor", &self.editor)
            .field("dependants", &self.dependants)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl Field {
    /// Creates the field and its editor.
    ///
    /// The title defaults to one derived from the key.
    pub fn new(mut options: EditorOptions, hooks: ErrorHooks) -> Result<Self> {
        if options.schema.title.is_none() {
            options.schema.title = Some(create_title(&options.key));
        }
        let key = options.key.clone();
        let schema = options.schema.clone();
        let editor = options
            .registry
            .clone()
            .create_editor(&schema.type_name, options)?;
        trace!(key = %key, editor = editor.type_name(), "field created");

        Ok(Self {
            key,
            schema,
            editor,
            dependants: Vec::new(),
            error: None,
            error_class: "error".to_string(),
            hooks,
            html: String::new(),
        })
    }

    /// Field key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Displayed title.
    pub fn title(&self) -> &str {
        self.schema.title.as_deref().unwrap_or(&self.key)
    }

    /// Field schema, with the title filled in.
    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// The editor.
    pub fn editor(&self) -> &dyn Editor {
        self.editor.as_ref()
    }

    /// The editor, mutably.
    pub fn editor_mut(&mut self) -> &mut dyn Editor {
        self.editor.as_mut()
    }

    /// Fieldsets shown only while this field's value is truthy.
    pub fn dependants(&self) -> &[Fieldset] {
        &self.dependants
    }

    pub(crate) fn add_dependant(&mut self, fieldset: Fieldset) {
        self.dependants.push(fieldset);
    }

    /// Activates dependants iff the current value is truthy.
    pub fn sync_dependants(&mut self) {
        let active = self.editor.value().is_truthy();
        for dependant in &mut self.dependants {
            dependant.set_active(active);
        }
    }

    /// Current value.
    pub fn value(&self) -> Value {
        self.editor.value()
    }

    /// Sets the value and updates dependants.
    pub fn set_value(&mut self, value: Value) {
        self.editor.set_value(value);
        self.sync_dependants();
    }

    /// Validates the editor and shows or clears the error.
    ///
    /// Editors wrapping a nested form leave error display to the nested
    /// fields.
    pub fn validate(&mut self, form_values: &ValueMap) -> std::result::Result<(), FieldError> {
        let result = self.editor.validate(form_values);
        if !self.editor.has_nested_form() {
            match &result {
                Err(err) => self.set_error(&err.message()),
                Ok(()) => self.clear_error(),
            }
        }
        result
    }

    /// Commits the editor's value to its data source.
    pub fn commit(&mut self, form_values: &ValueMap, options: SetOptions) -> std::result::Result<(), CommitError> {
        let result = self.editor.commit(form_values, options);
        if let Err(CommitError::Field(err)) = &result {
            if !self.editor.has_nested_form() {
                self.set_error(&err.message());
            }
        }
        result
    }

    /// Shows an error.
    pub fn set_error(&mut self, message: &str) {
        if self.editor.has_nested_form() {
            return;
        }
        self.error = Some(message.to_string());
        if let Some(show) = &self.hooks.show {
            show(&self.key);
        }
    }

    /// Clears the error.
    pub fn clear_error(&mut self) {
        self.error = None;
        if let Some(hide) = &self.hooks.hide {
            hide(&self.key);
        }
    }

    /// Current error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sets a schema attribute and re-renders this field only.
    ///
    /// `Null` removes the attribute.
    pub fn set_schema_attr(&mut self, attr: &str, value: Value) {
        for attrs in [&mut self.schema.schema_attrs, &mut self.editor.core_mut().schema.schema_attrs] {
            if value.is_null() {
                attrs.shift_remove(attr);
            } else {
                attrs.insert(attr.to_string(), value.clone());
            }
        }
        self.render();
    }

    /// Gives the editor focus.
    pub fn focus(&mut self) {
        self.editor.focus();
    }

    /// Removes focus from the editor.
    pub fn blur(&mut self) {
        self.editor.blur();
    }

    /// Renders the field row and caches it.
    pub fn render(&mut self) -> &str {
        let editor_html = self.editor.render();
        let id = self.editor.id().to_string();
        let title = self.title().to_string();

        let mut class = format!("mb-3 field-{}", self.key);
        if let Some(extra) = &self.schema.field_class {
            class = format!("{class} {extra}");
        }
        if self.error.is_some() {
            class = format!("{class} {}", self.error_class);
        }

        let error = self.error.clone();
        let errortext = self.schema.schema_attr_str("errortext").map(str::to_string);
        let help = self.schema.help.clone();

        let label_el = html! {
            label.for_(#id).class("form-label") { #title }
        };

        self.html = html! { div.class(#class) }
            .raw(label_el.render())
            .raw(&editor_html)
            .when(error.is_some(), |d| {
                d.child::<Div, _>(|e| {
                    e.class("invalid-feedback d-block")
                        .text(error.as_deref().unwrap_or(""))
                })
            })
            .when(errortext.is_some(), |d| {
                d.child::<Div, _>(|e| {
                    e.class("invalid-feedback d-block errortext")
                        .raw(errortext.as_deref().unwrap_or(""))
                })
            })
            .when(help.is_some(), |d| {
                d.child::<Div, _>(|h| h.class("form-text").text(help.as_deref().unwrap_or("")))
            })
            .render();
        &self.html
    }

    /// Last rendered markup.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Releases the editor and the dependants.
    pub fn dispose(&mut self) {
        self.editor.dispose();
        for dependant in &mut self.dependants {
            dependant.set_active(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use std::cell::RefCell;
    use std::sync::Arc;

    fn field(key: &str, schema: FieldSchema) -> Field {
        let options = EditorOptions::new(key, schema, Arc::new(Registry::with_builtins()));
        Field::new(options, ErrorHooks::default()).unwrap()
    }

    #[test]
    fn test_title_from_key() {
        let f = field("firstName", FieldSchema::new("Text"));
        assert_eq!(f.title(), "First Name");

        let f = field("x", FieldSchema::new("Text").title("Custom"));
        assert_eq!(f.title(), "Custom");
    }

    #[test]
    fn test_unknown_editor_type() {
        let options = EditorOptions::new("x", FieldSchema::new("Nope"), Arc::new(Registry::with_builtins()));
        assert!(Field::new(options, ErrorHooks::default()).is_err());
    }

    #[test]
    fn test_validate_sets_and_clears_error() {
        let shown = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&shown);
        let hooks = ErrorHooks {
            show: Some(Rc::new(move |key: &str| seen.borrow_mut().push(key.to_string()))),
            hide: None,
        };
        let options = EditorOptions::new(
            "title",
            FieldSchema::new("Text").validator("required"),
            Arc::new(Registry::with_builtins()),
        );
        let mut f = Field::new(options, hooks).unwrap();

        assert!(f.validate(&ValueMap::new()).is_err());
        assert_eq!(f.error(), Some("Required"));
        assert!(f.render().contains("Required"));
        assert!(f.html().contains("mb-3 field-title error"));
        assert_eq!(shown.borrow().as_slice(), ["title".to_string()]);

        f.set_value(Value::from("ok"));
        assert!(f.validate(&ValueMap::new()).is_ok());
        assert_eq!(f.error(), None);
    }

    #[test]
    fn test_render_label_and_help() {
        let mut f = field("email", FieldSchema::new("Text").help("We never share it"));
        let html = f.render().to_string();
        assert!(html.contains(r#"for="email""#));
        assert!(html.contains("form-label"));
        assert!(html.contains("Email"));
        assert!(html.contains("We never share it"));
    }

    #[test]
    fn test_set_schema_attr_rerenders() {
        let mut f = field("title", FieldSchema::new("Text"));
        f.render();
        assert!(!f.html().contains("errortext"));

        f.set_schema_attr("errortext", Value::from("Taken<br/>Too short"));
        assert!(f.html().contains("Taken<br/>Too short"));

        f.set_schema_attr("errortext", Value::Null);
        assert!(!f.html().contains("Taken"));
    }
}
