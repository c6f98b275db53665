//! Form, field and fieldset schemas.

use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::DateDisplay;
use crate::model::SharedModel;
use crate::validation::Validator;
use crate::value::{Value, ValueMap};
use crate::widgets::WidgetAttrs;

/// One choice of a select, radio or checkbox group.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    /// Submitted value.
    pub val: Value,
    /// Displayed label.
    pub label: String,
}

impl SelectOption {
    /// Creates a new option.
    pub fn new(val: impl Into<Value>, label: impl Into<String>) -> Self {
        Self {
            val: val.into(),
            label: label.into(),
        }
    }

    /// Creates an option whose value is its label.
    pub fn plain(label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            val: Value::Text(label.clone()),
            label,
        }
    }

    /// The empty `{val: null, label: ''}` option.
    pub fn empty() -> Self {
        Self {
            val: Value::Null,
            label: String::new(),
        }
    }
}

/// Supplier of options resolved when the editor renders.
pub type OptionsSupplier = Rc<dyn Fn() -> Vec<SelectOption>>;

/// Where a select-like editor gets its choices from.
#[derive(Clone)]
pub enum OptionsSource {
    /// A literal list.
    Static(Vec<SelectOption>),
    /// A supplier called at render time.
    Deferred(OptionsSupplier),
}

impl OptionsSource {
    /// Returns the current list of options.
    pub fn resolve(&self) -> Vec<SelectOption> {
        match self {
            Self::Static(options) => options.clone(),
            Self::Deferred(supplier) => supplier(),
        }
    }
}

impl std::fmt::Debug for OptionsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(options) => f.debug_tuple("Static").field(options).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Configuration for a built-in validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Registered validator name.
    pub kind: String,
    /// Message override.
    pub message: Option<String>,
    /// Pattern for `regexp`-style validators.
    pub regexp: Option<String>,
    /// Other field for `match`.
    pub field: Option<String>,
}

impl ValidatorConfig {
    /// Creates a config for the named validator.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Overrides the error message.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets the pattern.
    #[must_use]
    pub fn regexp(mut self, pattern: impl Into<String>) -> Self {
        self.regexp = Some(pattern.into());
        self
    }

    /// Sets the field to compare against.
    #[must_use]
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// A validator declared on a field schema.
#[derive(Clone)]
pub enum ValidatorSpec {
    /// A registered validator with default settings, e.g. `"required"`.
    Named(String),
    /// A registered validator with custom settings.
    Config(ValidatorConfig),
    /// A ready-made validator.
    Custom(Arc<dyn Validator>),
}

impl std::fmt::Debug for ValidatorSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Config(config) => f.debug_tuple("Config").field(config).finish(),
            Self::Custom(validator) => f.debug_tuple("Custom").field(&validator.kind()).finish(),
        }
    }
}

impl From<&str> for ValidatorSpec {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<ValidatorConfig> for ValidatorSpec {
    fn from(config: ValidatorConfig) -> Self {
        Self::Config(config)
    }
}

/// Builds the data source behind a nested-model editor from its value.
pub type ModelFactory = Rc<dyn Fn(ValueMap) -> SharedModel>;

/// Definition of a single field.
#[derive(Clone)]
pub struct FieldSchema {
    /// Editor type name, resolved through the registry.
    pub type_name: String,
    /// Label; derived from the key when absent.
    pub title: Option<String>,
    /// Help text.
    pub help: Option<String>,
    /// Ordered validator chain.
    pub validators: Vec<ValidatorSpec>,
    /// Schema of the nested form for object editors.
    pub sub_schema: Option<Schema>,
    /// Choices for select-like editors.
    pub options: Option<OptionsSource>,
    /// Free-form attributes, e.g. server-side error text.
    pub schema_attrs: ValueMap,
    /// Extra attributes for the editor element.
    pub editor_attrs: WidgetAttrs,
    /// Extra CSS class for the field wrapper.
    pub field_class: Option<String>,
    /// Extra CSS class for the editor element.
    pub editor_class: Option<String>,
    /// Input placeholder.
    pub placeholder: Option<String>,
    /// Options passed to the searchable dropdown enhancement.
    pub chosen_options: Option<Value>,
    /// First year offered by date editors.
    pub year_start: Option<i32>,
    /// Last year offered by date editors.
    pub year_end: Option<i32>,
    /// Minute step of date-time editors.
    pub mins_interval: Option<u32>,
    /// Month naming of date editors.
    pub date_display: DateDisplay,
    /// Model factory for nested-model editors.
    pub model: Option<ModelFactory>,
}

impl std::fmt::Debug for FieldSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSchema")
            .field("type_name", &self.type_name)
            .field("title", &self.title)
            .field("help", &self.help)
            .field("validators", &self.validators)
            .field("sub_schema", &self.sub_schema)
            .field("options", &self.options)
            .field("schema_attrs", &self.schema_attrs)
            .finish_non_exhaustive()
    }
}

impl Default for FieldSchema {
    fn default() -> Self {
        Self::new("Text")
    }
}

impl FieldSchema {
    /// Creates a field schema for the given editor type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            title: None,
            help: None,
            validators: Vec::new(),
            sub_schema: None,
            options: None,
            schema_attrs: ValueMap::new(),
            editor_attrs: WidgetAttrs::new(),
            field_class: None,
            editor_class: None,
            placeholder: None,
            chosen_options: None,
            year_start: None,
            year_end: None,
            mins_interval: None,
            date_display: DateDisplay::default(),
            model: None,
        }
    }

    /// Sets the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets help text.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Appends a validator.
    #[must_use]
    pub fn validator(mut self, validator: impl Into<ValidatorSpec>) -> Self {
        self.validators.push(validator.into());
        self
    }

    /// Appends a ready-made validator.
    #[must_use]
    pub fn custom_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(ValidatorSpec::Custom(Arc::new(validator)));
        self
    }

    /// Sets the nested schema.
    #[must_use]
    pub fn sub_schema(mut self, schema: Schema) -> Self {
        self.sub_schema = Some(schema);
        self
    }

    /// Sets a literal list of options.
    #[must_use]
    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = Some(OptionsSource::Static(options));
        self
    }

    /// Sets options from plain labels.
    #[must_use]
    pub fn plain_options(self, labels: &[&str]) -> Self {
        self.options(labels.iter().map(|l| SelectOption::plain(*l)).collect())
    }

    /// Sets an option supplier resolved at render time.
    #[must_use]
    pub fn deferred_options(mut self, supplier: impl Fn() -> Vec<SelectOption> + 'static) -> Self {
        self.options = Some(OptionsSource::Deferred(Rc::new(supplier)));
        self
    }

    /// Sets a free-form schema attribute.
    #[must_use]
    pub fn schema_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.schema_attrs.insert(key.into(), value.into());
        self
    }

    /// Sets an editor attribute.
    #[must_use]
    pub fn editor_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.editor_attrs.set(key, value);
        self
    }

    /// Sets the field wrapper class.
    #[must_use]
    pub fn field_class(mut self, class: impl Into<String>) -> Self {
        self.field_class = Some(class.into());
        self
    }

    /// Sets the editor class.
    #[must_use]
    pub fn editor_class(mut self, class: impl Into<String>) -> Self {
        self.editor_class = Some(class.into());
        self
    }

    /// Sets the placeholder.
    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the dropdown enhancement options.
    #[must_use]
    pub fn chosen_options(mut self, options: Value) -> Self {
        self.chosen_options = Some(options);
        self
    }

    /// Sets the year range of date editors.
    #[must_use]
    pub fn year_range(mut self, start: i32, end: i32) -> Self {
        self.year_start = Some(start);
        self.year_end = Some(end);
        self
    }

    /// Sets the minute step of date-time editors.
    #[must_use]
    pub fn mins_interval(mut self, interval: u32) -> Self {
        self.mins_interval = Some(interval);
        self
    }

    /// Sets month naming of date editors.
    #[must_use]
    pub fn date_display(mut self, display: DateDisplay) -> Self {
        self.date_display = display;
        self
    }

    /// Sets the model factory of nested-model editors.
    #[must_use]
    pub fn model(mut self, factory: impl Fn(ValueMap) -> SharedModel + 'static) -> Self {
        self.model = Some(Rc::new(factory));
        self
    }

    /// Returns a string schema attribute.
    pub fn schema_attr_str(&self, key: &str) -> Option<&str> {
        self.schema_attrs.get(key).and_then(Value::as_str)
    }
}

impl From<&str> for FieldSchema {
    fn from(type_name: &str) -> Self {
        Self::new(type_name)
    }
}

/// Ordered mapping of field key to field schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: IndexMap<String, FieldSchema>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, schema: impl Into<FieldSchema>) -> Self {
        self.fields.insert(key.into(), schema.into());
        self
    }

    /// Inserts or replaces a field.
    pub fn insert(&mut self, key: impl Into<String>, schema: impl Into<FieldSchema>) {
        self.fields.insert(key.into(), schema.into());
    }

    /// Returns the schema of a field.
    pub fn get(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.get(key)
    }

    /// Returns whether a key is declared.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Returns the declared keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates over fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns whether the schema is empty.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// An entry in a run of fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEntry {
    /// A field key.
    Key(String),
    /// Fieldsets shown only while the preceding field has a truthy value.
    Dependants(Vec<FieldsetSchema>),
}

impl From<&str> for FieldEntry {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

/// A block of fieldset content.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// A run of plain fields.
    Fields(Vec<FieldEntry>),
    /// A nested fieldset.
    Fieldset(FieldsetSchema),
}

/// Layout of one fieldset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldsetSchema {
    /// Heading; `None` renders no legend.
    pub legend: Option<String>,
    /// Help text under the heading.
    pub help: Option<String>,
    /// Flat list of field keys.
    pub fields: Vec<String>,
    /// Ordered content blocks.
    pub content: Vec<ContentBlock>,
}

impl FieldsetSchema {
    /// Creates an anonymous fieldset with the given keys.
    pub fn new<S: AsRef<str>>(fields: &[S]) -> Self {
        Self {
            fields: fields.iter().map(|k| k.as_ref().to_string()).collect(),
            ..Self::default()
        }
    }

    /// Creates an empty fieldset with a legend.
    pub fn with_legend(legend: impl Into<String>) -> Self {
        Self {
            legend: Some(legend.into()),
            ..Self::default()
        }
    }

    /// Sets the legend.
    #[must_use]
    pub fn legend(mut self, legend: impl Into<String>) -> Self {
        self.legend = Some(legend.into());
        self
    }

    /// Sets the help text.
    #[must_use]
    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Appends a run of fields to the content.
    #[must_use]
    pub fn fields_block(mut self, entries: Vec<FieldEntry>) -> Self {
        self.content.push(ContentBlock::Fields(entries));
        self
    }

    /// Appends a nested fieldset to the content.
    #[must_use]
    pub fn fieldset_block(mut self, fieldset: FieldsetSchema) -> Self {
        self.content.push(ContentBlock::Fieldset(fieldset));
        self
    }
}

impl From<Vec<&str>> for FieldsetSchema {
    fn from(fields: Vec<&str>) -> Self {
        Self::new(&fields)
    }
}

impl From<Vec<String>> for FieldsetSchema {
    fn from(fields: Vec<String>) -> Self {
        Self::new(&fields)
    }
}

/// Creates the default field title from its key.
///
/// `camelCase` becomes `Camel Case`.
pub fn create_title(key: &str) -> String {
    let mut title = String::with_capacity(key.len() + 4);
    for (i, c) in key.chars().enumerate() {
        if i == 0 {
            title.extend(c.to_uppercase());
        } else {
            if c.is_uppercase() {
                title.push(' ');
            }
            title.push(c);
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_title() {
        assert_eq!(create_title("camelCase"), "Camel Case");
        assert_eq!(create_title("title"), "Title");
        assert_eq!(create_title("firstNameAndAge"), "First Name And Age");
        assert_eq!(create_title(""), "");
    }

    #[test]
    fn test_schema_preserves_order() {
        let schema = Schema::new()
            .field("zeta", "Text")
            .field("alpha", FieldSchema::new("Number"))
            .field("mid", "Checkbox");

        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(schema.get("alpha").unwrap().type_name, "Number");
        assert_eq!(schema.len(), 3);
    }

    #[test]
    fn test_field_schema_builder() {
        let field = FieldSchema::new("Select")
            .title("Status")
            .validator("required")
            .validator(ValidatorConfig::new("regexp").regexp("^a"))
            .plain_options(&["a", "b"])
            .schema_attr("errortext", "boom");

        assert_eq!(field.title.as_deref(), Some("Status"));
        assert_eq!(field.validators.len(), 2);
        assert_eq!(field.schema_attr_str("errortext"), Some("boom"));
        let options = field.options.unwrap().resolve();
        assert_eq!(options[1], SelectOption::new("b", "b"));
    }

    #[test]
    fn test_deferred_options() {
        let field = FieldSchema::new("Select")
            .deferred_options(|| vec![SelectOption::new(1, "One")]);
        let options = field.options.unwrap().resolve();
        assert_eq!(options, vec![SelectOption::new(1, "One")]);
    }

    #[test]
    fn test_fieldset_schema_from_list() {
        let fieldset: FieldsetSchema = vec!["title", "author"].into();
        assert_eq!(fieldset.fields, vec!["title", "author"]);
        assert_eq!(fieldset.legend, None);
        assert!(fieldset.content.is_empty());
    }
}
