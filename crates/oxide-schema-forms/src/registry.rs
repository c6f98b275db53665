//! Editor type and validator registries.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use crate::editors::{self, Editor, EditorOptions};
use crate::error::{FormError, Result};
use crate::schema::ValidatorConfig;
use crate::validation::{Validator, ValidatorRegistry};

/// Builds an editor from its options.
pub type EditorFactory = fn(EditorOptions) -> Result<Box<dyn Editor>>;

/// Maps editor type names and validator names to factories.
#[derive(Clone, Default)]
pub struct Registry {
    editors: HashMap<String, EditorFactory>,
    validators: ValidatorRegistry,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.editors.keys().collect();
        names.sort();
        f.debug_struct("Registry")
            .field("editors", &names)
            .field("validators", &self.validators)
            .finish()
    }
}

static GLOBAL: OnceLock<RwLock<Arc<Registry>>> = OnceLock::new();

fn global_slot() -> &'static RwLock<Arc<Registry>> {
    GLOBAL.get_or_init(|| RwLock::new(Arc::new(Registry::with_builtins())))
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in editor and validator.
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            editors: HashMap::new(),
            validators: ValidatorRegistry::with_builtins(),
        };
        registry.register_editor("Text", editors::text::text);
        registry.register_editor("TextArea", editors::text::text_area);
        registry.register_editor("Password", editors::text::password);
        registry.register_editor("Number", editors::text::number);
        registry.register_editor("Hidden", editors::text::hidden);
        registry.register_editor("Checkbox", editors::checkbox::checkbox);
        registry.register_editor("Select", editors::select::select);
        registry.register_editor("Chosen", editors::select::chosen);
        registry.register_editor("Radio", editors::select::radio);
        registry.register_editor("Checkboxes", editors::select::checkboxes);
        registry.register_editor("Date", editors::date::date);
        registry.register_editor("DateTime", editors::date::date_time);
        registry.register_editor("Range", editors::range::range);
        registry.register_editor("Object", editors::object::object);
        registry.register_editor("NestedModel", editors::object::nested_model);
        registry
    }

    /// Returns the process-wide registry, created with the built-ins on first use.
    pub fn global() -> Arc<Registry> {
        match global_slot().read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Replaces the process-wide registry.
    pub fn install_global(registry: Registry) {
        let mut slot = match global_slot().write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        debug!(editors = registry.editors.len(), "installing global registry");
        *slot = Arc::new(registry);
    }

    /// Registers an editor type, replacing any previous one of that name.
    pub fn register_editor(&mut self, name: impl Into<String>, factory: EditorFactory) {
        self.editors.insert(name.into(), factory);
    }

    /// Registers a validator, replacing any previous one of that name.
    pub fn register_validator(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(&ValidatorConfig) -> Result<Arc<dyn Validator>> + Send + Sync + 'static,
    ) {
        self.validators.register(name, factory);
    }

    /// Returns whether an editor type is registered.
    pub fn has_editor(&self, name: &str) -> bool {
        self.editors.contains_key(name)
    }

    /// Returns the validator registry.
    pub fn validators(&self) -> &ValidatorRegistry {
        &self.validators
    }

    /// Creates an editor of the given type.
    pub fn create_editor(&self, type_name: &str, options: EditorOptions) -> Result<Box<dyn Editor>> {
        let factory = self
            .editors
            .get(type_name)
            .ok_or_else(|| FormError::UnknownEditorType(type_name.to_string()))?;
        factory(options)
    }
}
