//! The form: fields built from a schema, grouped into fieldsets, with
//! aggregate value, validation, commit and focus handling.

use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::adapter::AdaptedSpec;
use crate::editors::{Editor, EditorOptions};
use crate::error::{CommitError, FieldError, FormError, FormErrors, OtherError, Result};
use crate::events::{EditorEvent, EventBus, EventKind, FormEvent, Task};
use crate::field::{ErrorHook, ErrorHooks, Field};
use crate::fieldset::Fieldset;
use crate::model::{Model, ModelValidation, SetOptions, SharedModel};
use crate::registry::Registry;
use crate::schema::{FieldsetSchema, Schema};
use crate::value::{Value, ValueMap};
use crate::widgets::{html_escape, MountPoint};

/// How editor ids are prefixed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IdPrefix {
    /// `"{model id}_"` when a data source is bound, nothing otherwise.
    #[default]
    Auto,
    /// No prefix.
    None,
    /// A fixed prefix.
    Prefix(String),
}

/// A form type with a schema of its own.
///
/// # Example
///
/// ```
/// use oxide_schema_forms::{Form, FormDefinition, FormOptions, Schema};
///
/// struct Signup;
///
/// impl FormDefinition for Signup {
///     fn schema() -> Schema {
///         Schema::new().field("email", "Text").field("name", "Text")
///     }
/// }
///
/// let form = Form::from_definition::<Signup>(FormOptions::new()).unwrap();
/// assert_eq!(form.keys().collect::<Vec<_>>(), vec!["email", "name"]);
/// ```
pub trait FormDefinition {
    /// Schema used when neither the options nor the data source give one.
    fn schema() -> Schema;

    /// Fieldset layout used when the options give none.
    fn fieldsets() -> Vec<FieldsetSchema> {
        Vec::new()
    }
}

/// Options for building a [`Form`].
#[derive(Clone, Default)]
pub struct FormOptions {
    schema: Option<Schema>,
    default_schema: Option<Schema>,
    model: Option<SharedModel>,
    data: ValueMap,
    fields: Option<Vec<String>>,
    fieldsets: Vec<FieldsetSchema>,
    id_prefix: IdPrefix,
    registry: Option<Arc<Registry>>,
    dependency_class: Option<String>,
    nested_field: Option<String>,
    hooks: ErrorHooks,
}

impl std::fmt::Debug for FormOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormOptions")
            .field("schema", &self.schema)
            .field("data", &self.data)
            .field("fields", &self.fields)
            .field("fieldsets", &self.fieldsets)
            .field("id_prefix", &self.id_prefix)
            .finish_non_exhaustive()
    }
}

impl FormOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the schema, overriding the data source's.
    #[must_use]
    pub fn schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Sets the schema used when no other is found.
    #[must_use]
    pub fn default_schema(mut self, schema: Schema) -> Self {
        self.default_schema = Some(schema);
        self
    }

    /// Binds a data source.
    #[must_use]
    pub fn model(mut self, model: SharedModel) -> Self {
        self.model = Some(model);
        self
    }

    /// Sets initial values, used when no data source is bound.
    #[must_use]
    pub fn data(mut self, data: ValueMap) -> Self {
        self.data = data;
        self
    }

    /// Restricts the form to these schema keys.
    #[must_use]
    pub fn fields<S: AsRef<str>>(mut self, keys: &[S]) -> Self {
        self.fields = Some(keys.iter().map(|k| k.as_ref().to_string()).collect());
        self
    }

    /// Sets the fieldset layout.
    #[must_use]
    pub fn fieldsets(mut self, fieldsets: Vec<FieldsetSchema>) -> Self {
        self.fieldsets = fieldsets;
        self
    }

    /// Sets how editor ids are prefixed.
    #[must_use]
    pub fn id_prefix(mut self, prefix: IdPrefix) -> Self {
        self.id_prefix = prefix;
        self
    }

    /// Uses this registry instead of the global one.
    #[must_use]
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Class of dependant fieldsets. Defaults to `dependency`.
    #[must_use]
    pub fn dependency_class(mut self, class: impl Into<String>) -> Self {
        self.dependency_class = Some(class.into());
        self
    }

    /// Marks the form as the nested form of an object field.
    #[must_use]
    pub fn nested_field(mut self, key: &str) -> Self {
        self.nested_field = Some(key.to_string());
        self
    }

    /// Called with a field key whenever its error is shown.
    #[must_use]
    pub fn show_error(mut self, hook: impl Fn(&str) + 'static) -> Self {
        self.hooks.show = Some(Rc::new(hook) as ErrorHook);
        self
    }

    /// Called with a field key whenever its error is cleared.
    #[must_use]
    pub fn hide_error(mut self, hook: impl Fn(&str) + 'static) -> Self {
        self.hooks.hide = Some(Rc::new(hook) as ErrorHook);
        self
    }
}

type Listener = Box<dyn FnMut(&FormEvent)>;
type SubmitHandler = Box<dyn FnMut(&ValueMap) -> bool>;

/// A form built from a schema.
///
/// # Example
///
/// ```
/// use oxide_schema_forms::{FieldSchema, Form, FormOptions, Schema, Value};
///
/// let schema = Schema::new()
///     .field("title", FieldSchema::new("Text").validator("required"))
///     .field("agree", "Checkbox");
/// let mut form = Form::new(FormOptions::new().schema(schema)).unwrap();
///
/// let errors = form.validate().unwrap_err();
/// assert_eq!(errors.get("title").unwrap().message(), "Required");
///
/// form.set_value("title", Value::from("Hello"));
/// assert!(form.validate().is_ok());
/// assert_eq!(form.field_value("agree"), Some(Value::from(false)));
/// ```
pub struct Form {
    schema: Schema,
    model: Option<SharedModel>,
    fields: IndexMap<String, Field>,
    fieldsets: Vec<Fieldset>,
    nested_field: Option<String>,
    bus: EventBus,
    alive: Rc<Cell<bool>>,
    has_focus: bool,
    listeners: Vec<Listener>,
    submit_handler: Option<SubmitHandler>,
    outbox: Vec<FormEvent>,
    error_keys: HashSet<String>,
    html: String,
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.fields)
            .field("fieldsets", &self.fieldsets)
            .field("has_focus", &self.has_focus)
            .finish_non_exhaustive()
    }
}

impl Form {
    /// Builds a form.
    ///
    /// The schema is, in order of precedence, the one in `options`, the data
    /// source's, the default schema, or empty.
    pub fn new(options: FormOptions) -> Result<Self> {
        let FormOptions {
            schema,
            default_schema,
            model,
            data,
            fields: selected,
            fieldsets,
            id_prefix,
            registry,
            dependency_class,
            nested_field,
            hooks,
        } = options;

        let registry = registry.unwrap_or_else(Registry::global);
        let schema = schema
            .or_else(|| model.as_ref().and_then(|m| m.borrow().schema()))
            .or(default_schema)
            .unwrap_or_default();
        let selected: Vec<String> =
            selected.unwrap_or_else(|| schema.keys().map(str::to_string).collect());

        let prefix = match id_prefix {
            IdPrefix::Auto => model
                .as_ref()
                .map(|m| format!("{}_", m.borrow().id()))
                .unwrap_or_default(),
            IdPrefix::None => String::new(),
            IdPrefix::Prefix(prefix) => prefix,
        };

        let bus = EventBus::new();
        let mut fields = IndexMap::new();
        for key in &selected {
            let field_schema = schema
                .get(key)
                .cloned()
                .ok_or_else(|| FormError::UnknownField(key.clone()))?;
            let mut editor_options = EditorOptions::new(key.as_str(), field_schema, Arc::clone(&registry))
                .id(format!("{prefix}{key}").replace('.', "_"))
                .value(data.get(key).cloned().unwrap_or_default())
                .emitter(bus.emitter(key, Rc::new(Cell::new(true))));
            if let Some(model) = &model {
                editor_options = editor_options.model(Rc::clone(model));
            }
            fields.insert(key.clone(), Field::new(editor_options, hooks.clone())?);
        }

        let layouts = if fieldsets.is_empty() {
            vec![FieldsetSchema::new(&selected)]
        } else {
            fieldsets
        };
        let dependency_class = dependency_class.unwrap_or_else(|| "dependency".to_string());
        let fieldsets = layouts
            .iter()
            .map(|layout| Fieldset::new(layout, &mut fields, &dependency_class))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            fields = fields.len(),
            fieldsets = fieldsets.len(),
            nested = nested_field.as_deref().unwrap_or(""),
            "form built"
        );

        Ok(Self {
            schema,
            model,
            fields,
            fieldsets,
            nested_field,
            bus,
            alive: Rc::new(Cell::new(true)),
            has_focus: false,
            listeners: Vec::new(),
            submit_handler: None,
            outbox: Vec::new(),
            error_keys: HashSet::new(),
            html: String::new(),
        })
    }

    /// Builds a form whose default schema and layout come from `D`.
    pub fn from_definition<D: FormDefinition>(options: FormOptions) -> Result<Self> {
        let mut options = options.default_schema(D::schema());
        if options.fieldsets.is_empty() {
            options.fieldsets = D::fieldsets();
        }
        Self::new(options)
    }

    /// Builds a form from adapted spec output, bound to a fresh model
    /// holding the spec's values.
    pub fn from_spec(spec: AdaptedSpec) -> Result<Self> {
        let model = Model::with_attributes(spec.values).into_shared();
        Self::new(
            FormOptions::new()
                .schema(spec.schema)
                .model(model)
                .fieldsets(spec.fieldsets),
        )
    }

    /// The resolved schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Field keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The bound data source.
    pub fn model(&self) -> Option<SharedModel> {
        self.model.clone()
    }

    /// Top-level fieldsets.
    pub fn fieldsets(&self) -> &[Fieldset] {
        &self.fieldsets
    }

    /// A field by key.
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.get(key)
    }

    /// A field by key, mutably.
    pub fn field_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.fields.get_mut(key)
    }

    /// The editor of a field.
    pub fn editor(&self, key: &str) -> Result<&dyn Editor> {
        self.fields
            .get(key)
            .map(Field::editor)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }

    /// The editor of a field, mutably.
    pub fn editor_mut(&mut self, key: &str) -> Result<&mut dyn Editor> {
        match self.fields.get_mut(key) {
            Some(field) => Ok(field.editor_mut()),
            None => Err(FormError::UnknownField(key.to_string())),
        }
    }

    /// Registers an event listener.
    pub fn on(&mut self, listener: impl FnMut(&FormEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Registers the submit handler. It returns whether default submission
    /// proceeds.
    pub fn on_submit(&mut self, handler: impl FnMut(&ValueMap) -> bool + 'static) {
        self.submit_handler = Some(Box::new(handler));
    }

    /// Raises `submit` and runs the submit handler.
    pub fn submit(&mut self) -> bool {
        let values = self.value();
        let mut out = Vec::new();
        self.emit(FormEvent::form("submit"), &mut out);
        self.outbox.extend(out);
        match &mut self.submit_handler {
            Some(handler) => handler(&values),
            None => true,
        }
    }

    /// Whether the form last raised `focus` and not `blur`.
    pub fn has_focus(&self) -> bool {
        self.has_focus
    }

    /// Handles every queued editor event and returns the form events raised,
    /// including any raised by `focus()`, `blur()` or `submit()` since the
    /// last call. Deferred tasks are left queued.
    pub fn dispatch(&mut self) -> Vec<FormEvent> {
        let mut out = std::mem::take(&mut self.outbox);
        out.extend(self.process_events());
        out
    }

    /// Runs the form until nothing is queued: relays nested forms,
    /// dispatches events and runs deferred tasks.
    pub fn tick(&mut self) -> Vec<FormEvent> {
        let mut out = self.dispatch();
        loop {
            let mut progressed = false;
            for field in self.fields.values_mut() {
                progressed |= field.editor_mut().pump();
            }

            let events = self.process_events();
            progressed |= !events.is_empty();
            out.extend(events);

            let tasks = self.bus.take_deferred();
            progressed |= !tasks.is_empty();
            for task in tasks {
                self.run_task(task, &mut out);
            }

            if !progressed {
                break;
            }
        }
        out
    }

    fn process_events(&mut self) -> Vec<FormEvent> {
        let mut out = Vec::new();
        while let Some(event) = self.bus.pop_event() {
            self.handle_event(event, &mut out);
        }
        out
    }

    fn handle_event(&mut self, event: EditorEvent, out: &mut Vec<FormEvent>) {
        trace!(key = %event.key, event = event.kind.name(), "editor event");
        if event.kind == EventKind::Change {
            if let Some(field) = self.fields.get_mut(&event.key) {
                field.sync_dependants();
            }
        }
        self.emit(FormEvent::editor(&event.key, &event.kind), out);

        match event.kind {
            EventKind::Change => self.emit(FormEvent::form("change"), out),
            EventKind::Focus => {
                if !self.has_focus {
                    self.has_focus = true;
                    self.emit(FormEvent::form("focus"), out);
                }
            }
            EventKind::Blur => self.bus.defer(Task::BlurConsensus, Rc::clone(&self.alive)),
            EventKind::Select | EventKind::Other(_) => {}
        }
    }

    fn run_task(&mut self, task: Task, out: &mut Vec<FormEvent>) {
        match task {
            Task::DetermineChange { key } => {
                if let Some(field) = self.fields.get_mut(&key) {
                    field.editor_mut().determine_change();
                }
            }
            Task::BlurConsensus => {
                let focused = self.fields.values().any(|f| f.editor().has_focus());
                if self.has_focus && !focused {
                    self.has_focus = false;
                    self.emit(FormEvent::form("blur"), out);
                }
            }
        }
    }

    fn emit(&mut self, event: FormEvent, out: &mut Vec<FormEvent>) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        out.push(event);
    }

    /// Focuses the first field of the first fieldset.
    pub fn focus(&mut self) {
        if self.has_focus {
            return;
        }
        let first = self
            .fieldsets
            .first()
            .and_then(|fieldset| fieldset.get_field_at(0))
            .map(str::to_string);
        if let Some(field) = first.and_then(|key| self.fields.get_mut(&key)) {
            field.focus();
        }
        let events = self.process_events();
        self.outbox.extend(events);
    }

    /// Blurs the focused field. The form raises `blur` on the next `tick()`.
    pub fn blur(&mut self) {
        if !self.has_focus {
            return;
        }
        for field in self.fields.values_mut() {
            if field.editor().has_focus() {
                field.blur();
            }
        }
        let events = self.process_events();
        self.outbox.extend(events);
    }

    /// Aggregate value in field order.
    pub fn value(&self) -> ValueMap {
        self.fields
            .iter()
            .map(|(key, field)| (key.clone(), field.value()))
            .collect()
    }

    /// Value of one field.
    pub fn field_value(&self, key: &str) -> Option<Value> {
        self.fields.get(key).map(Field::value)
    }

    /// Sets one field's value. Keys outside the form are ignored.
    pub fn set_value(&mut self, key: &str, value: Value) {
        match self.fields.get_mut(key) {
            Some(field) => field.set_value(value),
            None => warn!(key, "ignoring value for unknown field"),
        }
    }

    /// Sets several values. Keys outside the form are ignored.
    pub fn set_values(&mut self, values: &ValueMap) {
        for (key, value) in values {
            self.set_value(key, value.clone());
        }
    }

    /// Validates every field and the data source's own rules.
    ///
    /// Data source messages for unknown fields, or for fields already in
    /// error, go to `others`.
    pub fn validate(&mut self) -> std::result::Result<(), FormErrors> {
        let values = self.value();
        let mut errors = FormErrors::new();
        for (key, field) in &mut self.fields {
            if let Err(err) = field.validate(&values) {
                errors.insert(key.clone(), err);
            }
        }

        let model_result = self.model.as_ref().and_then(|m| m.borrow().validate(&values));
        match model_result {
            Some(ModelValidation::Message(message)) => errors.push_other(OtherError::Message(message)),
            Some(ModelValidation::Fields(messages)) => {
                for (key, message) in messages {
                    match self.fields.get_mut(&key) {
                        Some(field) if !errors.contains(&key) => {
                            field.set_error(&message);
                            errors.insert(key, FieldError::Model(message));
                        }
                        _ => errors.push_other(OtherError::Field { key, message }),
                    }
                }
            }
            None => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(errors = errors.len(), "form invalid");
            Err(errors)
        }
    }

    /// Validates, then writes the whole value to the data source in one
    /// batched `set`.
    pub fn commit(&mut self, options: SetOptions) -> std::result::Result<(), CommitError> {
        self.validate().map_err(CommitError::Form)?;
        let model = self
            .model
            .clone()
            .ok_or_else(|| CommitError::Unbound(self.nested_field.clone().unwrap_or_default()))?;
        let values = self.value();
        let result = model.borrow_mut().set(values, options);
        match &result {
            Ok(()) => debug!("form committed"),
            Err(err) => warn!(error = %err, "data source rejected commit"),
        }
        result.map_err(CommitError::from)
    }

    /// Renders every field and composes the form.
    pub fn render(&mut self) -> String {
        for field in self.fields.values_mut() {
            field.render();
        }
        self.html = self.compose();
        self.html.clone()
    }

    /// Last composed markup.
    pub fn html(&self) -> &str {
        &self.html
    }

    fn compose(&self) -> String {
        let body: String = self
            .fieldsets
            .iter()
            .map(|fieldset| fieldset.compose(&self.fields))
            .collect();
        match &self.nested_field {
            Some(key) => format!(r#"<div class="nested-form" data-field="{}">{body}</div>"#, html_escape(key)),
            None => format!(r#"<form class="oxide-form">{body}</form>"#),
        }
    }

    /// Renders, attaches the markup and runs post-mount enhancements.
    pub fn render_to(&mut self, mount: &mut dyn MountPoint) {
        let html = self.render();
        mount.attach(&html);
        self.init_enhanced(mount);
    }

    /// Runs the post-mount enhancement of every editor that has one.
    pub fn init_enhanced(&mut self, mount: &mut dyn MountPoint) {
        for field in self.fields.values_mut() {
            field.editor_mut().init_display(mount);
        }
    }

    /// Sets a schema attribute of one field and re-renders that field.
    pub fn set_schema_attr(&mut self, key: &str, attr: &str, value: Value) -> Result<()> {
        let field = self
            .fields
            .get_mut(key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))?;
        field.set_schema_attr(attr, value);
        self.html = self.compose();
        Ok(())
    }

    /// Shows server-side errors as each field's `errortext`.
    ///
    /// Lists are joined with `<br/>`. Fields that had error text from the
    /// previous call and are absent now are cleared.
    pub fn set_errors(&mut self, errors: &ValueMap) -> Result<()> {
        if let Some(unknown) = errors.keys().find(|key| !self.fields.contains_key(*key)) {
            return Err(FormError::UnknownField(unknown.clone()));
        }

        let stale: Vec<String> = self
            .error_keys
            .iter()
            .filter(|key| !errors.contains_key(*key))
            .cloned()
            .collect();
        for key in stale {
            if let Some(field) = self.fields.get_mut(&key) {
                field.set_schema_attr("errortext", Value::Null);
            }
        }

        for (key, value) in errors {
            let text = match value {
                Value::List(items) => items
                    .iter()
                    .map(Value::to_form_string)
                    .collect::<Vec<_>>()
                    .join("<br/>"),
                other => other.to_form_string(),
            };
            if let Some(field) = self.fields.get_mut(key) {
                field.set_schema_attr("errortext", Value::Text(text));
            }
        }

        self.error_keys = errors.keys().cloned().collect();
        self.html = self.compose();
        Ok(())
    }

    /// Releases every field. Queued events and deferred tasks are dropped.
    pub fn dispose(&mut self) {
        self.alive.set(false);
        for field in self.fields.values_mut() {
            field.dispose();
        }
        self.bus.clear();
        self.outbox.clear();
        self.has_focus = false;
        self.listeners.clear();
        trace!("form disposed");
    }
}
