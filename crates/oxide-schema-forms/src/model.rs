//! Data sources forms read from and commit to.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;
use tracing::trace;

use crate::error::ModelError;
use crate::schema::Schema;
use crate::value::{Value, ValueMap};

/// Result of a data source's own cross-field validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidation {
    /// A single message not tied to any field.
    Message(String),
    /// Messages keyed by field.
    Fields(IndexMap<String, String>),
}

impl std::fmt::Display for ModelValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Message(message) => write!(f, "{message}"),
            Self::Fields(fields) => {
                let parts: Vec<String> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{}", parts.join("; "))
            }
        }
    }
}

/// Options for a batched write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetOptions {
    /// Suppress the change notification.
    pub silent: bool,
    /// Run the data source's validation before writing.
    pub validate: bool,
}

impl SetOptions {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppresses change notifications.
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.silent = true;
        self
    }

    /// Validates before writing.
    #[must_use]
    pub fn validate(mut self) -> Self {
        self.validate = true;
        self
    }
}

/// An observable key-value store bound to a form.
pub trait DataSource {
    /// Identifier used to build unique editor ids.
    fn id(&self) -> &str;

    /// Returns the current value for a key.
    fn get(&self, key: &str) -> Option<Value>;

    /// Writes several values at once.
    ///
    /// Implementations emit at most one change notification per call and
    /// report failures through the returned error.
    fn set(&mut self, values: ValueMap, options: SetOptions) -> Result<(), ModelError>;

    /// Validates a candidate set of values.
    fn validate(&self, _candidate: &ValueMap) -> Option<ModelValidation> {
        None
    }

    /// Schema declared by the data source itself.
    fn schema(&self) -> Option<Schema> {
        None
    }
}

/// A data source shared between a form and its editors.
pub type SharedModel = Rc<RefCell<dyn DataSource>>;

type ChangeListener = Box<dyn FnMut(&ValueMap)>;
type ModelValidator = Box<dyn Fn(&ValueMap) -> Option<ModelValidation>>;

static NEXT_MODEL_ID: AtomicUsize = AtomicUsize::new(1);

/// In-memory data source.
pub struct Model {
    id: String,
    attributes: ValueMap,
    schema: Option<Schema>,
    validator: Option<ModelValidator>,
    listeners: Vec<ChangeListener>,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("id", &self.id)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Creates an empty model with a fresh id (`c1`, `c2`, ...).
    pub fn new() -> Self {
        let n = NEXT_MODEL_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id: format!("c{n}"),
            attributes: ValueMap::new(),
            schema: None,
            validator: None,
            listeners: Vec::new(),
        }
    }

    /// Creates a model holding the given attributes.
    pub fn with_attributes(attributes: ValueMap) -> Self {
        Self {
            attributes,
            ..Self::new()
        }
    }

    /// Declares the schema forms should use for this model.
    #[must_use]
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Installs cross-field validation.
    #[must_use]
    pub fn validator(
        mut self,
        validator: impl Fn(&ValueMap) -> Option<ModelValidation> + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Registers a change listener, called with the changed attributes.
    pub fn on_change(&mut self, listener: impl FnMut(&ValueMap) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Returns all attributes.
    pub fn attributes(&self) -> &ValueMap {
        &self.attributes
    }

    /// Wraps the model for sharing with a form.
    pub fn into_shared(self) -> SharedModel {
        Rc::new(RefCell::new(self))
    }
}

impl DataSource for Model {
    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.attributes.get(key).cloned()
    }

    fn set(&mut self, values: ValueMap, options: SetOptions) -> Result<(), ModelError> {
        if options.validate {
            let mut candidate = self.attributes.clone();
            candidate.extend(values.clone());
            if let Some(error) = self.validate(&candidate) {
                return Err(ModelError::Invalid(error));
            }
        }

        let mut changed = ValueMap::new();
        for (key, value) in values {
            if self.attributes.get(&key) != Some(&value) {
                changed.insert(key.clone(), value.clone());
                self.attributes.insert(key, value);
            }
        }

        if !changed.is_empty() && !options.silent {
            trace!(model = %self.id, changed = changed.len(), "model change");
            for listener in &mut self.listeners {
                listener(&changed);
            }
        }

        Ok(())
    }

    fn validate(&self, candidate: &ValueMap) -> Option<ModelValidation> {
        self.validator.as_ref().and_then(|validator| validator(candidate))
    }

    fn schema(&self) -> Option<Schema> {
        self.schema.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn values(pairs: &[(&str, &str)]) -> ValueMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_batched_set_notifies_once() {
        let count = Rc::new(Cell::new(0));
        let mut model = Model::new();
        let seen = Rc::clone(&count);
        model.on_change(move |_| seen.set(seen.get() + 1));

        model
            .set(values(&[("title", "A"), ("author", "B")]), SetOptions::new())
            .unwrap();

        assert_eq!(count.get(), 1);
        assert_eq!(model.get("title"), Some(Value::from("A")));
    }

    #[test]
    fn test_silent_and_unchanged_set() {
        let count = Rc::new(Cell::new(0));
        let mut model = Model::with_attributes(values(&[("title", "A")]));
        let seen = Rc::clone(&count);
        model.on_change(move |_| seen.set(seen.get() + 1));

        model.set(values(&[("title", "A")]), SetOptions::new()).unwrap();
        model
            .set(values(&[("title", "B")]), SetOptions::new().silent())
            .unwrap();

        assert_eq!(count.get(), 0);
        assert_eq!(model.get("title"), Some(Value::from("B")));
    }

    #[test]
    fn test_validated_set_rejects() {
        let mut model = Model::new().validator(|attrs| {
            (attrs.get("age") == Some(&Value::from("-1")))
                .then(|| ModelValidation::Message("bad age".to_string()))
        });

        let err = model
            .set(values(&[("age", "-1")]), SetOptions::new().validate())
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::Invalid(ModelValidation::Message("bad age".to_string()))
        );
        assert_eq!(model.get("age"), None);
    }

    #[test]
    fn test_model_ids_are_unique() {
        let a = Model::new();
        let b = Model::new();
        assert_ne!(a.id(), b.id());
        assert!(a.id().starts_with('c'));
    }
}
