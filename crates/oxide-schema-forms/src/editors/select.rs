//! Option-based editors: Select, Chosen, Radio and Checkboxes.

use super::{missing, Editor, EditorCore, EditorOptions};
use crate::error::Result;
use crate::schema::{OptionsSource, SelectOption};
use crate::value::{Value, ValueMap};
use crate::widgets::{BootstrapCheckboxes, BootstrapRadioSelect, BootstrapSelect, Widget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectKind {
    Select,
    Chosen,
    Radio,
    Checkboxes,
}

impl SelectKind {
    fn name(self) -> &'static str {
        match self {
            Self::Select => "Select",
            Self::Chosen => "Chosen",
            Self::Radio => "Radio",
            Self::Checkboxes => "Checkboxes",
        }
    }
}

/// Editor choosing among the schema's options.
///
/// Single-valued kinds hold one option value or `Null`; multi-valued kinds
/// hold the list of selected option values in option order.
#[derive(Debug)]
pub struct SelectEditor {
    core: EditorCore,
    kind: SelectKind,
    multiple: bool,
    source: OptionsSource,
    resolved: Option<Vec<SelectOption>>,
    selected: Value,
}

impl SelectEditor {
    fn build(options: EditorOptions, kind: SelectKind) -> Result<Box<dyn Editor>> {
        let source = options
            .schema
            .options
            .clone()
            .ok_or_else(|| missing("schema.options", kind.name()))?;
        let multiple = match kind {
            SelectKind::Checkboxes => true,
            SelectKind::Chosen => options.schema.schema_attr_str("datatype") == Some("multi_select"),
            SelectKind::Select | SelectKind::Radio => false,
        };
        let (core, initial) = EditorCore::new(options)?;
        let resolved = match &source {
            OptionsSource::Static(list) => Some(list.clone()),
            OptionsSource::Deferred(_) => None,
        };

        let mut editor = Self {
            core,
            kind,
            multiple,
            source,
            resolved,
            selected: Value::Null,
        };
        editor.set_value(initial.unwrap_or_default());
        Ok(Box::new(editor))
    }

    /// Returns the current options, resolving a deferred supplier if it
    /// has not been rendered yet.
    pub fn options(&self) -> Vec<SelectOption> {
        match &self.resolved {
            Some(list) => list.clone(),
            None => self.source.resolve(),
        }
    }

    /// Returns whether several options can be selected.
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }
}

/// Creates a `Select` editor.
pub fn select(options: EditorOptions) -> Result<Box<dyn Editor>> {
    SelectEditor::build(options, SelectKind::Select)
}

/// Creates a `Chosen` editor: a select enhanced into a searchable dropdown
/// once mounted.
pub fn chosen(options: EditorOptions) -> Result<Box<dyn Editor>> {
    SelectEditor::build(options, SelectKind::Chosen)
}

/// Creates a `Radio` editor.
pub fn radio(options: EditorOptions) -> Result<Box<dyn Editor>> {
    SelectEditor::build(options, SelectKind::Radio)
}

/// Creates a `Checkboxes` editor.
pub fn checkboxes(options: EditorOptions) -> Result<Box<dyn Editor>> {
    SelectEditor::build(options, SelectKind::Checkboxes)
}

impl Editor for SelectEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        self.kind.name()
    }

    fn value(&self) -> Value {
        let options = self.options();
        if self.multiple {
            let picked = match &self.selected {
                Value::List(items) => items.as_slice(),
                _ => &[],
            };
            Value::List(
                options
                    .into_iter()
                    .filter(|option| picked.iter().any(|item| option.val.same_form_value(item)))
                    .map(|option| option.val)
                    .collect(),
            )
        } else {
            options
                .into_iter()
                .find(|option| option.val.same_form_value(&self.selected))
                .map_or(Value::Null, |option| option.val)
        }
    }

    fn write(&mut self, value: Value) {
        self.selected = if self.multiple {
            match value {
                Value::List(items) => Value::List(items),
                Value::Null => Value::List(Vec::new()),
                scalar => Value::List(vec![scalar]),
            }
        } else {
            value
        };
    }

    fn render(&mut self) -> String {
        let options = self.source.resolve();
        self.resolved = Some(options.clone());

        let value = self.value();
        let attrs = self.core.attrs();
        let (id, name) = (&self.core.id, &self.core.key);
        match self.kind {
            SelectKind::Select | SelectKind::Chosen => BootstrapSelect::new(options)
                .multiple(self.multiple)
                .render(id, name, &value, &attrs),
            SelectKind::Radio => BootstrapRadioSelect::new(options).render(id, name, &value, &attrs),
            SelectKind::Checkboxes => BootstrapCheckboxes::new(options).render(id, name, &value, &attrs),
        }
    }

    fn enhancement(&self) -> Option<Value> {
        (self.kind == SelectKind::Chosen).then(|| {
            self.core
                .schema
                .chosen_options
                .clone()
                .unwrap_or_else(|| Value::Map(ValueMap::new()))
        })
    }
}
