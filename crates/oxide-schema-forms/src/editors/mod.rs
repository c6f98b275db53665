//! Editors: the widgets that hold and edit one field's value.

pub mod checkbox;
pub mod date;
pub mod object;
pub mod range;
pub mod select;
pub mod text;

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use tracing::trace;

use crate::error::{CommitError, FieldError, Result};
use crate::events::{Emitter, EventKind};
use crate::form::Form;
use crate::model::{SetOptions, SharedModel};
use crate::registry::Registry;
use crate::schema::{FieldSchema, ValidatorSpec};
use crate::validation::{run_validators, Validator};
use crate::value::{Value, ValueMap};
use crate::widgets::{MountPoint, WidgetAttrs};

/// Everything an editor factory needs.
#[derive(Clone)]
pub struct EditorOptions {
    /// Field key, also the data source key.
    pub key: String,
    /// Element id.
    pub id: String,
    /// Field schema.
    pub schema: FieldSchema,
    /// Bound data source.
    pub model: Option<SharedModel>,
    /// Initial value used when no data source is bound.
    pub value: Value,
    /// Registry used to resolve validators and nested editors.
    pub registry: Arc<Registry>,
    /// Event handle on the owning form's bus.
    pub emitter: Emitter,
    /// Validators overriding those of the schema.
    pub validators: Option<Vec<ValidatorSpec>>,
}

impl std::fmt::Debug for EditorOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorOptions")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("schema", &self.schema)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

impl EditorOptions {
    /// Creates options for a standalone editor.
    pub fn new(key: impl Into<String>, schema: FieldSchema, registry: Arc<Registry>) -> Self {
        let key = key.into();
        Self {
            id: key.replace('.', "_"),
            emitter: Emitter::detached(&key),
            key,
            schema,
            model: None,
            value: Value::Null,
            registry,
            validators: None,
        }
    }

    /// Sets the element id.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Binds a data source.
    #[must_use]
    pub fn model(mut self, model: SharedModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets the initial value.
    #[must_use]
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Attaches the editor to a form's bus.
    #[must_use]
    pub fn emitter(mut self, emitter: Emitter) -> Self {
        self.emitter = emitter;
        self
    }

    /// Overrides the schema's validators.
    #[must_use]
    pub fn validators(mut self, validators: Vec<ValidatorSpec>) -> Self {
        self.validators = Some(validators);
        self
    }
}

/// State shared by every editor.
pub struct EditorCore {
    /// Element id.
    pub id: String,
    /// Field key.
    pub key: String,
    /// Field schema.
    pub schema: FieldSchema,
    /// Bound data source.
    pub model: Option<SharedModel>,
    /// Registry the editor was built from.
    pub registry: Arc<Registry>,
    /// Resolved validator chain.
    pub validators: Vec<Arc<dyn Validator>>,
    /// Whether the editor holds focus.
    pub has_focus: bool,
    /// Value last reported through `change`.
    pub last_observed: Value,
    /// Event handle.
    pub emitter: Emitter,
    alive: Rc<Cell<bool>>,
}

impl std::fmt::Debug for EditorCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorCore")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("has_focus", &self.has_focus)
            .field("last_observed", &self.last_observed)
            .finish_non_exhaustive()
    }
}

impl EditorCore {
    /// Builds the core and returns it with the initial value, if any.
    ///
    /// The initial value comes from the bound data source, else from the
    /// options. `None` means the editor should use its default.
    pub fn new(options: EditorOptions) -> Result<(Self, Option<Value>)> {
        let EditorOptions {
            key,
            id,
            schema,
            model,
            value,
            registry,
            emitter,
            validators,
        } = options;

        let alive = emitter.alive();
        let specs = validators.unwrap_or_else(|| schema.validators.clone());
        let validators = registry.validators().build_all(&specs)?;

        let initial = match &model {
            Some(model) => model.borrow().get(&key),
            None => (!value.is_null()).then_some(value),
        };

        Ok((
            Self {
                id,
                key,
                schema,
                model,
                registry,
                validators,
                has_focus: false,
                last_observed: Value::Null,
                emitter,
                alive,
            },
            initial,
        ))
    }

    /// Returns the liveness flag.
    pub fn alive(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.alive)
    }

    /// Returns whether the editor was disposed.
    pub fn is_disposed(&self) -> bool {
        !self.alive.get()
    }

    /// Element attributes: the schema's editor attrs plus `editor_class`.
    pub fn attrs(&self) -> WidgetAttrs {
        let mut attrs = self.schema.editor_attrs.clone();
        if let Some(class) = &self.schema.editor_class {
            let joined = match attrs.get("class") {
                Some(existing) => format!("{existing} {class}"),
                None => class.clone(),
            };
            attrs.set("class", joined);
        }
        attrs
    }

    fn set_focus(&mut self, focus: bool) {
        if self.has_focus == focus {
            return;
        }
        self.has_focus = focus;
        self.emitter
            .emit(if focus { EventKind::Focus } else { EventKind::Blur });
    }
}

/// An editor for one field.
///
/// Implementors provide storage (`write`), retrieval (`value`) and
/// rendering; focus tracking, change detection, validation and commit are
/// shared.
pub trait Editor {
    /// Shared state.
    fn core(&self) -> &EditorCore;

    /// Shared state, mutably.
    fn core_mut(&mut self) -> &mut EditorCore;

    /// Registered type name.
    fn type_name(&self) -> &'static str;

    /// Returns the current value.
    fn value(&self) -> Value;

    /// Stores a value, coercing it to the editor's type.
    fn write(&mut self, value: Value);

    /// Renders the editor element.
    fn render(&mut self) -> String;

    /// Element id.
    fn id(&self) -> &str {
        &self.core().id
    }

    /// Field key.
    fn key(&self) -> &str {
        &self.core().key
    }

    /// Sets the value programmatically. No `change` is raised.
    fn set_value(&mut self, value: Value) {
        self.write(value);
        let current = self.value();
        self.core_mut().last_observed = current;
    }

    /// Applies user input and raises `change` if the value moved.
    fn input(&mut self, value: Value) {
        self.write(value);
        self.determine_change();
    }

    /// Raises `change` if the value differs from the last observed one.
    fn determine_change(&mut self) {
        let current = self.value();
        let core = self.core_mut();
        if current != core.last_observed {
            trace!(key = %core.key, "editor change");
            core.last_observed = current;
            core.emitter.emit(EventKind::Change);
        }
    }

    /// Whether the editor holds focus.
    fn has_focus(&self) -> bool {
        self.core().has_focus
    }

    /// Gives the editor focus.
    fn focus(&mut self) {
        self.core_mut().set_focus(true);
    }

    /// Removes focus from the editor.
    fn blur(&mut self) {
        self.core_mut().set_focus(false);
    }

    /// Runs the validator chain and returns the first failure.
    fn validate(&mut self, form_values: &ValueMap) -> std::result::Result<(), FieldError> {
        run_validators(&self.core().validators, &self.value(), form_values).map_err(FieldError::from)
    }

    /// Validates, then writes the value into the bound data source.
    fn commit(&mut self, form_values: &ValueMap, options: SetOptions) -> std::result::Result<(), CommitError> {
        self.validate(form_values).map_err(CommitError::Field)?;
        store_in_model(self.core(), self.value(), options)
    }

    /// Whether the editor wraps a form of its own.
    fn has_nested_form(&self) -> bool {
        false
    }

    /// The wrapped form.
    fn nested_form(&self) -> Option<&Form> {
        None
    }

    /// The wrapped form, mutably.
    fn nested_form_mut(&mut self) -> Option<&mut Form> {
        None
    }

    /// Relays events of a wrapped form. Returns whether any were relayed.
    fn pump(&mut self) -> bool {
        false
    }

    /// Options for the post-mount enhancement, for editors that need one.
    fn enhancement(&self) -> Option<Value> {
        None
    }

    /// Runs the post-mount enhancement.
    fn init_display(&mut self, mount: &mut dyn MountPoint) {
        if let Some(options) = self.enhancement() {
            mount.enhance(self.id(), &options);
        }
    }

    /// Releases the editor. Pending deferred work is dropped.
    fn dispose(&mut self) {
        let core = self.core_mut();
        core.has_focus = false;
        core.alive.set(false);
    }
}

impl std::fmt::Debug for dyn Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("type", &self.type_name())
            .field("key", &self.key())
            .field("value", &self.value())
            .finish()
    }
}

/// Writes one editor value into the editor's bound data source.
pub(crate) fn store_in_model(
    core: &EditorCore,
    value: Value,
    options: SetOptions,
) -> std::result::Result<(), CommitError> {
    let model = core
        .model
        .as_ref()
        .ok_or_else(|| CommitError::Unbound(core.key.clone()))?;
    let mut values = ValueMap::new();
    values.insert(core.key.clone(), value);
    model.borrow_mut().set(values, options)?;
    Ok(())
}

/// Error for a schema option an editor cannot work without.
pub(crate) fn missing(option: &str, type_name: &str) -> crate::error::FormError {
    crate::error::FormError::MissingOption {
        option: option.to_string(),
        context: format!("{type_name} editor"),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn options(key: &str, schema: FieldSchema) -> EditorOptions {
        EditorOptions::new(key, schema, Arc::new(Registry::with_builtins()))
    }

    pub fn build(key: &str, schema: FieldSchema) -> Box<dyn Editor> {
        let registry = Arc::new(Registry::with_builtins());
        let type_name = schema.type_name.clone();
        registry
            .create_editor(&type_name, EditorOptions::new(key, schema, Arc::clone(&registry)))
            .unwrap()
    }
}
