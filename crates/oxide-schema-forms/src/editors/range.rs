//! Two-input range editor.

use super::{Editor, EditorCore, EditorOptions};
use crate::error::Result;
use crate::value::Value;
use crate::widgets::{html_escape, BootstrapTextInput, Widget};

/// Editor holding a `[from, to]` pair of strings.
#[derive(Debug)]
pub struct RangeEditor {
    core: EditorCore,
    bounds: [String; 2],
}

/// Creates a `Range` editor.
pub fn range(options: EditorOptions) -> Result<Box<dyn Editor>> {
    let (core, initial) = EditorCore::new(options)?;
    let mut editor = RangeEditor {
        core,
        bounds: [String::new(), String::new()],
    };
    editor.set_value(initial.unwrap_or_default());
    Ok(Box::new(editor))
}

impl Editor for RangeEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "Range"
    }

    fn value(&self) -> Value {
        Value::List(self.bounds.iter().map(|b| Value::Text(b.clone())).collect())
    }

    /// Falsy values leave the inputs untouched.
    fn write(&mut self, value: Value) {
        if !value.is_truthy() {
            return;
        }
        let items = match value {
            Value::List(items) => items,
            scalar => vec![scalar],
        };
        for (slot, item) in self.bounds.iter_mut().zip(items.iter()) {
            *slot = item.to_form_string();
        }
    }

    fn render(&mut self) -> String {
        let attrs = self.core.attrs();
        let id = &self.core.id;
        let [from, to] = &self.bounds;
        format!(
            r#"<div id="{}" class="range">{}<span> to </span>{}</div>"#,
            html_escape(id),
            BootstrapTextInput::new().render(&format!("{id}_from"), &self.core.key, &Value::Text(from.clone()), &attrs),
            BootstrapTextInput::new().render(&format!("{id}_to"), &self.core.key, &Value::Text(to.clone()), &attrs),
        )
    }
}
