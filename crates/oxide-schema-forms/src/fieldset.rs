//! Groups of fields, optionally nested.

use indexmap::IndexMap;
use ironhtml::html;
use ironhtml::typed::Element;
use ironhtml_elements::{Li, Ol};

use crate::error::{FormError, Result};
use crate::field::Field;
use crate::schema::{ContentBlock, FieldEntry, FieldsetSchema};
use crate::widgets::html_escape;

/// One entry of a fieldset's content.
#[derive(Debug)]
pub enum FieldsetItem {
    /// Key of a field owned by the form.
    Field(String),
    /// A nested fieldset.
    Fieldset(Fieldset),
}

/// A named or anonymous group of fields.
///
/// Fields are referenced by key; the form owns them. Nested fieldsets are
/// owned here, dependant fieldsets by the field they depend on.
#[derive(Debug)]
pub struct Fieldset {
    legend: Option<String>,
    help: Option<String>,
    items: Vec<FieldsetItem>,
    active: bool,
    class: Option<String>,
}

impl Fieldset {
    /// Builds a fieldset, attaching dependant fieldsets to their fields.
    ///
    /// Fails if a key is not in `fields`, or if dependants do not follow a
    /// field.
    pub fn new(
        schema: &FieldsetSchema,
        fields: &mut IndexMap<String, Field>,
        dependency_class: &str,
    ) -> Result<Self> {
        let mut items = Vec::new();
        for key in &schema.fields {
            items.push(FieldsetItem::Field(known(key, fields)?));
        }

        for block in &schema.content {
            match block {
                ContentBlock::Fields(entries) => {
                    let mut previous: Option<String> = None;
                    for entry in entries {
                        match entry {
                            FieldEntry::Key(key) => {
                                let key = known(key, fields)?;
                                previous = Some(key.clone());
                                items.push(FieldsetItem::Field(key));
                            }
                            FieldEntry::Dependants(dependants) => {
                                let parent = previous.clone().ok_or(FormError::OrphanDependants)?;
                                for dependant in dependants {
                                    let mut fieldset = Fieldset::new(dependant, fields, dependency_class)?;
                                    fieldset.class = Some(dependency_class.to_string());
                                    if let Some(field) = fields.get_mut(&parent) {
                                        fieldset.active = field.value().is_truthy();
                                        field.add_dependant(fieldset);
                                    }
                                }
                            }
                        }
                    }
                }
                ContentBlock::Fieldset(nested) => {
                    items.push(FieldsetItem::Fieldset(Fieldset::new(nested, fields, dependency_class)?));
                }
            }
        }

        Ok(Self {
            legend: schema.legend.clone(),
            help: schema.help.clone(),
            items,
            active: true,
            class: None,
        })
    }

    /// Heading.
    pub fn legend(&self) -> Option<&str> {
        self.legend.as_deref()
    }

    /// Content entries in declared order.
    pub fn items(&self) -> &[FieldsetItem] {
        &self.items
    }

    /// Key of the field at `index` among this fieldset's direct fields.
    pub fn get_field_at(&self, index: usize) -> Option<&str> {
        self.field_keys().nth(index)
    }

    /// Keys of the direct fields, in order.
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| match item {
            FieldsetItem::Field(key) => Some(key.as_str()),
            FieldsetItem::Fieldset(_) => None,
        })
    }

    /// Shows or hides the fieldset.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Whether the fieldset is shown.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Composes the fieldset from the fields' last rendered markup.
    ///
    /// Consecutive fields share one list; a nested fieldset closes the
    /// current list and later fields start a new one.
    pub fn compose(&self, fields: &IndexMap<String, Field>) -> String {
        let mut out = String::from("<fieldset");
        if let Some(class) = &self.class {
            out.push_str(&format!(r#" class="{}""#, html_escape(class)));
        }
        if !self.active {
            out.push_str(" hidden");
        }
        out.push('>');
        if let Some(legend) = &self.legend {
            out.push_str(&format!("<legend>{}</legend>", html_escape(legend)));
        }
        if let Some(help) = &self.help {
            out.push_str(&format!(r#"<div class="form-text">{}</div>"#, html_escape(help)));
        }

        let mut run: Vec<String> = Vec::new();
        for item in &self.items {
            match item {
                FieldsetItem::Field(key) => {
                    if let Some(field) = fields.get(key) {
                        let mut row = field.html().to_string();
                        for dependant in field.dependants() {
                            row.push_str(&dependant.compose(fields));
                        }
                        run.push(row);
                    }
                }
                FieldsetItem::Fieldset(nested) => {
                    out.push_str(&list(&run));
                    run.clear();
                    out.push_str(&nested.compose(fields));
                }
            }
        }
        out.push_str(&list(&run));
        out.push_str("</fieldset>");
        out
    }
}

fn known(key: &str, fields: &IndexMap<String, Field>) -> Result<String> {
    if fields.contains_key(key) {
        Ok(key.to_string())
    } else {
        Err(FormError::UnknownField(key.to_string()))
    }
}

fn list(rows: &[String]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    html! { div.class("fields") }
        .child::<Ol, _>(|ol| {
            ol.class("list-unstyled")
                .children(rows, |row, li: Element<Li>| li.raw(row))
        })
        .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editors::EditorOptions;
    use crate::field::ErrorHooks;
    use crate::registry::Registry;
    use crate::schema::FieldSchema;
    use crate::value::Value;
    use std::sync::Arc;

    fn fields(keys: &[(&str, &str)]) -> IndexMap<String, Field> {
        let registry = Arc::new(Registry::with_builtins());
        keys.iter()
            .map(|(key, type_name)| {
                let options = EditorOptions::new(*key, FieldSchema::new(*type_name), Arc::clone(&registry));
                let mut field = Field::new(options, ErrorHooks::default()).unwrap();
                field.render();
                ((*key).to_string(), field)
            })
            .collect()
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut map = fields(&[("a", "Text")]);
        let err = Fieldset::new(&FieldsetSchema::new(&["a", "zzz"]), &mut map, "dependency").unwrap_err();
        assert!(matches!(err, FormError::UnknownField(key) if key == "zzz"));
    }

    #[test]
    fn test_get_field_at_spans_fields_and_content() {
        let mut map = fields(&[("a", "Text"), ("b", "Text"), ("c", "Text")]);
        let schema = FieldsetSchema::new(&["a"])
            .fieldset_block(FieldsetSchema::new(&["b"]))
            .fields_block(vec!["c".into()]);
        let fieldset = Fieldset::new(&schema, &mut map, "dependency").unwrap();

        assert_eq!(fieldset.get_field_at(0), Some("a"));
        assert_eq!(fieldset.get_field_at(1), Some("c"));
        assert_eq!(fieldset.get_field_at(2), None);
    }

    #[test]
    fn test_nested_fieldset_breaks_the_run() {
        let mut map = fields(&[("a", "Text"), ("b", "Text"), ("c", "Text")]);
        let schema = FieldsetSchema::with_legend("Outer")
            .fields_block(vec!["a".into()])
            .fieldset_block(FieldsetSchema::new(&["b"]).legend("Inner"))
            .fields_block(vec!["c".into()]);
        let fieldset = Fieldset::new(&schema, &mut map, "dependency").unwrap();
        let html = fieldset.compose(&map);

        assert!(html.starts_with(r#"<fieldset><legend>Outer</legend><div class="fields"><ol"#));
        let a = html.find("field-a").unwrap();
        let inner = html.find("Inner").unwrap();
        let c = html.find("field-c").unwrap();
        assert!(a < inner && inner < c);
        assert_eq!(html.matches("<ol").count(), 3);
    }

    #[test]
    fn test_dependants_follow_parent_value() {
        let mut map = fields(&[("agree", "Checkbox"), ("details", "Text")]);
        let schema = FieldsetSchema::default().fields_block(vec![
            "agree".into(),
            FieldEntry::Dependants(vec![FieldsetSchema::new(&["details"])]),
        ]);
        let fieldset = Fieldset::new(&schema, &mut map, "dependency").unwrap();
        assert_eq!(fieldset.get_field_at(0), Some("agree"));

        let agree = map.get_mut("agree").unwrap();
        assert!(!agree.dependants()[0].is_active());
        agree.set_value(Value::from(true));
        assert!(agree.dependants()[0].is_active());

        let html = fieldset.compose(&map);
        assert!(html.contains(r#"<fieldset class="dependency">"#));
    }

    #[test]
    fn test_orphan_dependants() {
        let mut map = fields(&[("details", "Text")]);
        let schema = FieldsetSchema::default()
            .fields_block(vec![FieldEntry::Dependants(vec![FieldsetSchema::new(&["details"])])]);
        assert!(matches!(
            Fieldset::new(&schema, &mut map, "dependency"),
            Err(FormError::OrphanDependants)
        ));
    }
}
