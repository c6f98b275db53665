//! Translates an external category/field spec tree into a schema, initial
//! values and a fieldset layout.
//!
//! The tree is JSON that often came from XML, so single children and lists
//! of children are both accepted wherever a list is expected, and children
//! may be wrapped as `{"field": ...}`, `{"category": ...}` or
//! `{"option": ...}`.

use serde::Deserialize;
use serde_json::Value as Json;
use tracing::debug;

use crate::config::AdapterDefaults;
use crate::error::{FormError, Result};
use crate::schema::{create_title, ContentBlock, FieldEntry, FieldSchema, FieldsetSchema, Schema, SelectOption};
use crate::value::{Value, ValueMap};

/// Output of the adapter.
#[derive(Debug, Clone, Default)]
pub struct AdaptedSpec {
    /// Field schemas in spec order.
    pub schema: Schema,
    /// Initial values by field key.
    pub values: ValueMap,
    /// One fieldset per top-level category.
    pub fieldsets: Vec<FieldsetSchema>,
}

/// Per-call adapter options. Unset options fall back to the defaults.
#[derive(Debug, Clone, Default)]
pub struct AdapterOptions {
    add_empty_select_option: Option<bool>,
    use_chosen: Option<bool>,
    chosen_options: Option<Json>,
    defaults: AdapterDefaults,
}

impl AdapterOptions {
    /// Creates options using the built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends a blank choice to select options.
    #[must_use]
    pub fn add_empty_select_option(mut self, add: bool) -> Self {
        self.add_empty_select_option = Some(add);
        self
    }

    /// Renders selects as searchable dropdowns.
    #[must_use]
    pub fn use_chosen(mut self, use_chosen: bool) -> Self {
        self.use_chosen = Some(use_chosen);
        self
    }

    /// Options for the searchable dropdown enhancement.
    #[must_use]
    pub fn chosen_options(mut self, options: Json) -> Self {
        self.chosen_options = Some(options);
        self
    }

    /// Replaces the adapter-wide defaults.
    #[must_use]
    pub fn defaults(mut self, defaults: AdapterDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}

#[derive(Debug, Deserialize)]
struct SpecCategory {
    name: Option<String>,
    description: Option<String>,
    fields: Option<Json>,
    categories: Option<Json>,
    content: Option<Vec<Json>>,
}

#[derive(Debug, Deserialize)]
struct SpecField {
    name: String,
    datatype: String,
    label: Option<String>,
    options: Option<Json>,
    current_value: Option<Json>,
    dependent_elements: Option<Json>,
    dependent_fields: Option<Json>,
    #[serde(alias = "addEmptySelectOption")]
    add_empty_select_option: Option<bool>,
    #[serde(alias = "useChosen")]
    use_chosen: Option<bool>,
    #[serde(alias = "chosenOptions")]
    chosen_options: Option<Json>,
}

/// Settings after resolving field override, call option and default.
struct Resolved {
    add_empty_select_option: bool,
    use_chosen: bool,
    chosen_options: Json,
}

/// Converts spec trees into form input.
///
/// # Example
///
/// ```
/// use oxide_schema_forms::{AdapterOptions, Form, SpecAdapter};
///
/// let spec = serde_json::json!([{ "category": {
///     "name": "Search",
///     "content": [{ "fields": [
///         { "name": "query", "datatype": "text", "label": "Query" },
///         { "name": "size", "datatype": "range", "label": "Size", "current_value": [1, 10] }
///     ]}]
/// }}]);
///
/// let adapted = SpecAdapter::new(AdapterOptions::new()).adapt(&spec).unwrap();
/// assert_eq!(
///     adapted.schema.keys().collect::<Vec<_>>(),
///     vec!["query", "size_min", "size_max"]
/// );
///
/// let form = Form::from_spec(adapted).unwrap();
/// assert_eq!(form.field_value("size_max").unwrap().to_form_string(), "10");
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpecAdapter {
    options: AdapterOptions,
}

impl SpecAdapter {
    /// Creates an adapter.
    pub fn new(options: AdapterOptions) -> Self {
        Self { options }
    }

    /// Parses a spec from JSON text and adapts it.
    pub fn adapt_str(&self, json: &str) -> Result<AdaptedSpec> {
        let spec: Json = serde_json::from_str(json)?;
        self.adapt(&spec)
    }

    /// Adapts a spec tree.
    ///
    /// The root may be a category, a list of categories, `{"category": ...}`
    /// nests, or `{"categories": {"category": ...}}`.
    pub fn adapt(&self, spec: &Json) -> Result<AdaptedSpec> {
        let root = spec
            .get("categories")
            .and_then(|categories| categories.get("category"))
            .unwrap_or(spec);

        let mut out = AdaptedSpec::default();
        for node in nest(root, "category") {
            let fieldset = self.parse_category(node, &mut out)?;
            out.fieldsets.push(fieldset);
        }

        debug!(
            fields = out.schema.len(),
            fieldsets = out.fieldsets.len(),
            "spec adapted"
        );
        Ok(out)
    }

    fn parse_category(&self, node: &Json, out: &mut AdaptedSpec) -> Result<FieldsetSchema> {
        let category: SpecCategory = serde_json::from_value(node.clone())?;
        let mut fieldset = FieldsetSchema {
            legend: category.name,
            help: category.description,
            ..FieldsetSchema::default()
        };

        if let Some(fields) = &category.fields {
            let entries = self.parse_fields(fields, out)?;
            fieldset.content.push(ContentBlock::Fields(entries));
        }

        for block in category.content.iter().flatten() {
            if let Some(fields) = block.get("fields") {
                let entries = self.parse_fields(fields, out)?;
                fieldset.content.push(ContentBlock::Fields(entries));
            } else if let Some(categories) = block.get("category") {
                for nested in nest(categories, "category") {
                    let nested = self.parse_category(nested, out)?;
                    fieldset.content.push(ContentBlock::Fieldset(nested));
                }
            }
        }

        if let Some(categories) = &category.categories {
            for nested in nest(categories, "category") {
                let nested = self.parse_category(nested, out)?;
                fieldset.content.push(ContentBlock::Fieldset(nested));
            }
        }

        Ok(fieldset)
    }

    fn parse_fields(&self, fields: &Json, out: &mut AdaptedSpec) -> Result<Vec<FieldEntry>> {
        let mut entries = Vec::new();
        for node in nest(fields, "field") {
            self.parse_field(node, out, &mut entries)?;
        }
        Ok(entries)
    }

    fn parse_field(&self, node: &Json, out: &mut AdaptedSpec, entries: &mut Vec<FieldEntry>) -> Result<()> {
        let field: SpecField = serde_json::from_value(node.clone())?;
        let resolved = self.resolve(&field);
        let attrs = match Value::from_json(node) {
            Value::Map(map) => map,
            _ => ValueMap::new(),
        };

        if field.datatype == "range" {
            let label = field
                .label
                .clone()
                .unwrap_or_else(|| create_title(&field.name));
            for (suffix, title, index) in [("_min", " Min", 0), ("_max", " Max", 1)] {
                let key = format!("{}{suffix}", field.name);
                let mut schema = FieldSchema::new("Text").title(format!("{label}{title}"));
                schema.schema_attrs = attrs.clone();
                let value = field
                    .current_value
                    .as_ref()
                    .and_then(|current| current.get(index))
                    .map_or(Value::Null, Value::from_json);
                out.schema.insert(key.clone(), schema);
                out.values.insert(key.clone(), value);
                entries.push(FieldEntry::Key(key));
            }
        } else {
            let mut schema = field_schema_for(&field.datatype, &resolved)?;
            schema.title = field.label.clone();
            schema.schema_attrs = attrs;
            if let Some(options) = &field.options {
                let mut parsed = parse_options(options);
                if resolved.add_empty_select_option {
                    parsed.insert(0, SelectOption::empty());
                }
                schema = schema.options(parsed);
            }

            let value = match &field.current_value {
                Some(Json::Array(items)) if items.is_empty() => Value::Null,
                Some(current) => Value::from_json(current),
                None => Value::Null,
            };
            out.schema.insert(field.name.clone(), schema);
            out.values.insert(field.name.clone(), value);
            entries.push(FieldEntry::Key(field.name.clone()));
        }

        let dependants = field.dependent_elements.as_ref().or(field.dependent_fields.as_ref());
        if let Some(dependants) = dependants {
            let mut dependant_entries = Vec::new();
            for child in nest(dependants, "field") {
                self.parse_field(child, out, &mut dependant_entries)?;
            }
            let dependant = FieldsetSchema::default().fields_block(dependant_entries);
            entries.push(FieldEntry::Dependants(vec![dependant]));
        }
        Ok(())
    }

    fn resolve(&self, field: &SpecField) -> Resolved {
        let options = &self.options;
        Resolved {
            add_empty_select_option: field
                .add_empty_select_option
                .or(options.add_empty_select_option)
                .unwrap_or(options.defaults.add_empty_select_option),
            use_chosen: field
                .use_chosen
                .or(options.use_chosen)
                .unwrap_or(options.defaults.use_chosen),
            chosen_options: field
                .chosen_options
                .clone()
                .or_else(|| options.chosen_options.clone())
                .unwrap_or_else(|| options.defaults.chosen_options.clone()),
        }
    }
}

fn field_schema_for(datatype: &str, resolved: &Resolved) -> Result<FieldSchema> {
    let select = |fallback: &str| {
        let type_name = if resolved.use_chosen { "Chosen" } else { fallback };
        FieldSchema::new(type_name).chosen_options(Value::from_json(&resolved.chosen_options))
    };
    Ok(match datatype {
        "boolean" => FieldSchema::new("Checkbox"),
        "date" => FieldSchema::new("Date"),
        "int" | "uint" | "text" | "time" => FieldSchema::new("Text"),
        "textarea" => FieldSchema::new("TextArea"),
        "single_select" => select("Select"),
        "multi_select" => select("Checkboxes"),
        other => return Err(FormError::UnknownDatatype(other.to_string())),
    })
}

/// Options are either `{val, label}` items or an `{"option": ...}` nest of
/// `{option_value, option_label}` items.
fn parse_options(options: &Json) -> Vec<SelectOption> {
    let wrapped = match options {
        Json::Array(items) => items.iter().any(|item| item.get("option").is_some()),
        other => other.get("option").is_some(),
    };
    nest(options, "option")
        .into_iter()
        .map(|item| {
            let (val, label) = if wrapped {
                (item.get("option_value"), item.get("option_label"))
            } else {
                (item.get("val"), item.get("label"))
            };
            match (val, label) {
                (None, None) => SelectOption::plain(Value::from_json(item).to_form_string()),
                (val, label) => SelectOption::new(
                    val.map_or(Value::Null, Value::from_json),
                    label.map(|l| Value::from_json(l).to_form_string()).unwrap_or_default(),
                ),
            }
        })
        .collect()
}

/// Flattens a node that may be a single child, a list of children, or
/// children wrapped under `key`.
fn nest<'a>(node: &'a Json, key: &str) -> Vec<&'a Json> {
    let items: Vec<&Json> = match node {
        Json::Null => Vec::new(),
        Json::Array(items) => items.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .flat_map(|item| match item.get(key) {
            Some(Json::Array(inner)) => inner.iter().collect::<Vec<_>>(),
            Some(inner) => vec![inner],
            None => vec![item],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn adapt(spec: Json) -> AdaptedSpec {
        SpecAdapter::new(AdapterOptions::new()).adapt(&spec).unwrap()
    }

    fn keys(adapted: &AdaptedSpec) -> Vec<&str> {
        adapted.schema.keys().collect()
    }

    #[test]
    fn test_datatype_mapping() {
        let spec = json!({ "name": "All", "fields": [
            { "name": "a", "datatype": "boolean" },
            { "name": "b", "datatype": "date" },
            { "name": "c", "datatype": "int" },
            { "name": "d", "datatype": "uint" },
            { "name": "e", "datatype": "text" },
            { "name": "f", "datatype": "textarea" },
            { "name": "g", "datatype": "time" },
            { "name": "h", "datatype": "single_select", "options": [] },
            { "name": "i", "datatype": "multi_select", "options": [] },
            { "name": "j", "datatype": "single_select", "options": [], "useChosen": false },
            { "name": "k", "datatype": "multi_select", "options": [], "use_chosen": false }
        ]});
        let adapted = adapt(spec);
        let types: Vec<&str> = adapted
            .schema
            .iter()
            .map(|(_, schema)| schema.type_name.as_str())
            .collect();
        assert_eq!(
            types,
            vec![
                "Checkbox", "Date", "Text", "Text", "Text", "TextArea", "Text", "Chosen", "Chosen",
                "Select", "Checkboxes"
            ]
        );
        assert_eq!(adapted.schema.get("i").unwrap().schema_attr_str("datatype"), Some("multi_select"));
    }

    #[test]
    fn test_unknown_datatype() {
        let err = SpecAdapter::default()
            .adapt(&json!({ "fields": [{ "name": "x", "datatype": "blob" }] }))
            .unwrap_err();
        assert!(matches!(err, FormError::UnknownDatatype(t) if t == "blob"));
    }

    #[test]
    fn test_range_split() {
        let adapted = adapt(json!([{ "category": { "name": "C", "content": [{ "fields": [
            { "name": "size", "datatype": "range", "label": "Size", "current_value": [1, 10] }
        ]}]}}]));
        assert_eq!(keys(&adapted), vec!["size_min", "size_max"]);
        assert_eq!(adapted.values["size_min"], Value::from(1));
        assert_eq!(adapted.values["size_max"], Value::from(10));
        assert_eq!(adapted.schema.get("size_min").unwrap().title.as_deref(), Some("Size Min"));
        assert_eq!(adapted.schema.get("size_max").unwrap().title.as_deref(), Some("Size Max"));
    }

    #[test]
    fn test_empty_select_option_precedence() {
        let spec = json!([{ "category": { "name": "C", "content": [{ "fields": [
            { "name": "a", "datatype": "single_select", "options": [] },
            { "name": "b", "datatype": "multi_select", "options": [] },
            { "name": "c", "datatype": "single_select", "options": [], "addEmptySelectOption": false }
        ]}]}}]);
        let adapted = SpecAdapter::new(AdapterOptions::new().add_empty_select_option(true))
            .adapt(&spec)
            .unwrap();

        let options = |key: &str| {
            adapted
                .schema
                .get(key)
                .and_then(|s| s.options.as_ref())
                .map(|o| o.resolve())
                .unwrap()
        };
        assert_eq!(options("a"), vec![SelectOption::empty()]);
        assert_eq!(options("b"), vec![SelectOption::empty()]);
        assert!(options("c").is_empty());
    }

    #[test]
    fn test_option_nests_are_remapped() {
        let adapted = adapt(json!({ "fields": { "field": {
            "name": "colour",
            "datatype": "single_select",
            "options": { "option": [
                { "option_value": "r", "option_label": "Red" },
                { "option_value": "g", "option_label": "Green" }
            ]}
        }}}));
        let options = adapted.schema.get("colour").unwrap().options.as_ref().unwrap().resolve();
        assert_eq!(
            options,
            vec![SelectOption::new("r", "Red"), SelectOption::new("g", "Green")]
        );
    }

    #[test]
    fn test_dependants_and_nested_categories() {
        let adapted = adapt(json!([{ "category": {
            "name": "Set1",
            "content": [
                { "fields": [
                    { "name": "name", "datatype": "text", "dependent_elements": { "field": [
                        { "name": "first", "datatype": "text" },
                        { "name": "age", "datatype": "int" }
                    ]}}
                ]},
                { "category": { "name": "Set2", "content": [{ "fields": [
                    { "name": "hi", "datatype": "boolean" }
                ]}]}}
            ]
        }}]));

        assert_eq!(keys(&adapted), vec!["name", "first", "age", "hi"]);
        assert_eq!(adapted.fieldsets.len(), 1);
        let content = &adapted.fieldsets[0].content;
        match &content[0] {
            ContentBlock::Fields(entries) => {
                assert_eq!(entries[0], FieldEntry::Key("name".to_string()));
                assert!(matches!(&entries[1], FieldEntry::Dependants(d) if d.len() == 1));
            }
            other => panic!("unexpected block {other:?}"),
        }
        assert!(matches!(&content[1], ContentBlock::Fieldset(f) if f.legend.as_deref() == Some("Set2")));
    }

    #[test]
    fn test_categories_wrapper_and_empty_current_value() {
        let adapted = adapt(json!({ "categories": { "category": [
            { "name": "One", "fields": [{ "name": "tags", "datatype": "text", "current_value": [] }] },
            { "name": "Two", "description": "More", "fields": [{ "name": "x", "datatype": "text", "current_value": "v" }] }
        ]}}));
        assert_eq!(adapted.fieldsets.len(), 2);
        assert_eq!(adapted.fieldsets[1].help.as_deref(), Some("More"));
        assert_eq!(adapted.values["tags"], Value::Null);
        assert_eq!(adapted.values["x"], Value::from("v"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SpecAdapter::default().adapt_str("[{"),
            Err(FormError::ParseError(_))
        ));
    }
}
