//! Single checkbox editor.

use super::{Editor, EditorCore, EditorOptions};
use crate::error::Result;
use crate::value::Value;
use crate::widgets::{BootstrapCheckbox, Widget};

/// Boolean editor; the value is the truthiness of whatever was set.
#[derive(Debug)]
pub struct CheckboxEditor {
    core: EditorCore,
    checked: bool,
}

/// Creates a `Checkbox` editor.
pub fn checkbox(options: EditorOptions) -> Result<Box<dyn Editor>> {
    let (core, initial) = EditorCore::new(options)?;
    let mut editor = CheckboxEditor {
        core,
        checked: false,
    };
    editor.set_value(initial.unwrap_or(Value::Bool(false)));
    Ok(Box::new(editor))
}

impl CheckboxEditor {
    /// Toggles the box, as a click would.
    pub fn click(&mut self) {
        let toggled = Value::Bool(!self.checked);
        self.input(toggled);
    }
}

impl Editor for CheckboxEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "Checkbox"
    }

    fn value(&self) -> Value {
        Value::Bool(self.checked)
    }

    fn write(&mut self, value: Value) {
        self.checked = value.is_truthy();
    }

    fn render(&mut self) -> String {
        BootstrapCheckbox.render(
            &self.core.id,
            &self.core.key,
            &self.value(),
            &self.core.attrs(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editors::test_support::options;
    use crate::schema::FieldSchema;

    #[test]
    fn test_checkbox_truthiness() {
        let mut editor = checkbox(options("agree", FieldSchema::new("Checkbox"))).unwrap();
        assert_eq!(editor.value(), Value::Bool(false));

        editor.set_value(Value::from("yes"));
        assert_eq!(editor.value(), Value::Bool(true));
        assert!(editor.render().contains("checked"));

        editor.set_value(Value::from(0));
        assert_eq!(editor.value(), Value::Bool(false));
        assert!(!editor.render().contains("checked"));
    }

    #[test]
    fn test_click_toggles() {
        let (core, _) = EditorCore::new(options("agree", FieldSchema::new("Checkbox"))).unwrap();
        let mut editor = CheckboxEditor {
            core,
            checked: false,
        };
        editor.click();
        assert_eq!(editor.value(), Value::Bool(true));
        editor.click();
        assert_eq!(editor.value(), Value::Bool(false));
    }
}
