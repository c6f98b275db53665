//! Text-like editors: Text, TextArea, Password, Number and Hidden.

use super::{Editor, EditorCore, EditorOptions};
use crate::error::Result;
use crate::events::Task;
use crate::value::Value;
use crate::widgets::{BootstrapTextInput, BootstrapTextarea, HiddenInput, Widget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextKind {
    Text,
    TextArea,
    Password,
}

/// Single- or multi-line text editor.
#[derive(Debug)]
pub struct TextEditor {
    core: EditorCore,
    kind: TextKind,
    value: String,
}

impl TextEditor {
    fn build(options: EditorOptions, kind: TextKind) -> Result<Box<dyn Editor>> {
        let (core, initial) = EditorCore::new(options)?;
        let mut editor = Self {
            core,
            kind,
            value: String::new(),
        };
        editor.set_value(initial.unwrap_or_default());
        Ok(Box::new(editor))
    }
}

/// Creates a `Text` editor.
pub fn text(options: EditorOptions) -> Result<Box<dyn Editor>> {
    TextEditor::build(options, TextKind::Text)
}

/// Creates a `TextArea` editor.
pub fn text_area(options: EditorOptions) -> Result<Box<dyn Editor>> {
    TextEditor::build(options, TextKind::TextArea)
}

/// Creates a `Password` editor.
pub fn password(options: EditorOptions) -> Result<Box<dyn Editor>> {
    TextEditor::build(options, TextKind::Password)
}

impl Editor for TextEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        match self.kind {
            TextKind::Text => "Text",
            TextKind::TextArea => "TextArea",
            TextKind::Password => "Password",
        }
    }

    fn value(&self) -> Value {
        Value::Text(self.value.clone())
    }

    fn write(&mut self, value: Value) {
        self.value = value.to_form_string();
    }

    /// Keystrokes are compared one deferred turn later.
    fn input(&mut self, value: Value) {
        self.write(value);
        self.core.emitter.defer(Task::DetermineChange {
            key: self.core.key.clone(),
        });
    }

    fn render(&mut self) -> String {
        let attrs = self.core.attrs();
        let value = self.value();
        let placeholder = self.core.schema.placeholder.as_deref();
        match self.kind {
            TextKind::Text => BootstrapTextInput::new().placeholder(placeholder).render(
                &self.core.id,
                &self.core.key,
                &value,
                &attrs,
            ),
            TextKind::Password => BootstrapTextInput::of_type("password")
                .placeholder(placeholder)
                .render(&self.core.id, &self.core.key, &value, &attrs),
            TextKind::TextArea => BootstrapTextarea {
                placeholder: placeholder.map(str::to_string),
                ..BootstrapTextarea::default()
            }
            .render(&self.core.id, &self.core.key, &value, &attrs),
        }
    }
}

/// Parses the leading number of a string, ignoring trailing garbage.
fn parse_leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let candidate: String = text
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        .collect();
    (1..=candidate.len())
        .rev()
        .find_map(|end| candidate[..end].parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Whether typed text can still become a number: digits and at most one
/// decimal point.
fn is_numeric_input(text: &str) -> bool {
    let mut seen_point = false;
    text.chars().all(|c| match c {
        '0'..='9' => true,
        '.' if !seen_point => {
            seen_point = true;
            true
        }
        _ => false,
    })
}

/// Numeric editor; empty or non-numeric input is `Null`.
#[derive(Debug)]
pub struct NumberEditor {
    core: EditorCore,
    value: Option<f64>,
}

/// Creates a `Number` editor.
pub fn number(options: EditorOptions) -> Result<Box<dyn Editor>> {
    let (core, initial) = EditorCore::new(options)?;
    let mut editor = NumberEditor { core, value: None };
    editor.set_value(initial.unwrap_or(Value::Number(0.0)));
    Ok(Box::new(editor))
}

impl Editor for NumberEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "Number"
    }

    fn value(&self) -> Value {
        self.value.map_or(Value::Null, Value::Number)
    }

    fn write(&mut self, value: Value) {
        self.value = match value {
            Value::Number(n) if !n.is_nan() => Some(n),
            Value::Text(s) if !s.is_empty() => parse_leading_float(&s),
            _ => None,
        };
    }

    /// Typed text that cannot form a number is rejected.
    fn input(&mut self, value: Value) {
        if let Value::Text(typed) = &value {
            if !is_numeric_input(typed) {
                return;
            }
        }
        self.write(value);
        self.core.emitter.defer(Task::DetermineChange {
            key: self.core.key.clone(),
        });
    }

    fn render(&mut self) -> String {
        let attrs = self.core.attrs().with("step", "any");
        BootstrapTextInput::of_type("number")
            .placeholder(self.core.schema.placeholder.as_deref())
            .render(&self.core.id, &self.core.key, &self.value(), &attrs)
    }
}

/// Plain value holder rendered as a hidden input.
#[derive(Debug)]
pub struct HiddenEditor {
    core: EditorCore,
    value: Value,
}

/// Creates a `Hidden` editor.
pub fn hidden(options: EditorOptions) -> Result<Box<dyn Editor>> {
    let (core, initial) = EditorCore::new(options)?;
    let mut editor = HiddenEditor {
        core,
        value: Value::Null,
    };
    editor.set_value(initial.unwrap_or_default());
    Ok(Box::new(editor))
}

impl Editor for HiddenEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "Hidden"
    }

    fn value(&self) -> Value {
        self.value.clone()
    }

    fn write(&mut self, value: Value) {
        self.value = if value.is_null() {
            Value::Text(String::new())
        } else {
            value
        };
    }

    fn focus(&mut self) {}

    fn blur(&mut self) {}

    fn render(&mut self) -> String {
        HiddenInput.render(&self.core.id, &self.core.key, &self.value, &self.core.attrs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editors::test_support::build;
    use crate::schema::FieldSchema;

    #[test]
    fn test_text_defaults_and_null() {
        let mut editor = build("title", FieldSchema::new("Text"));
        assert_eq!(editor.value(), Value::from(""));
        editor.set_value(Value::from("Hello"));
        assert_eq!(editor.value(), Value::from("Hello"));
        editor.set_value(Value::Null);
        assert_eq!(editor.value(), Value::from(""));
    }

    #[test]
    fn test_textarea_render_keeps_value() {
        let mut editor = build("content", FieldSchema::new("TextArea"));
        editor.set_value(Value::from("Lana"));
        let first = editor.render();
        let second = editor.render();
        assert!(first.contains(">Lana</textarea>"));
        assert_eq!(first, second);

        editor.set_value(Value::from("Pam"));
        assert!(editor.render().contains(">Pam</textarea>"));
        assert_eq!(editor.value(), Value::from("Pam"));
    }

    #[test]
    fn test_password_renders_password_input() {
        let mut editor = build("secret", FieldSchema::new("Password").placeholder("Secret"));
        let html = editor.render();
        assert!(html.contains(r#"type="password""#));
        assert!(html.contains(r#"placeholder="Secret""#));
    }

    #[test]
    fn test_number_coercion() {
        let mut editor = build("age", FieldSchema::new("Number"));
        assert_eq!(editor.value(), Value::Number(0.0));

        editor.set_value(Value::from("12.5"));
        assert_eq!(editor.value(), Value::Number(12.5));
        editor.set_value(Value::from(""));
        assert_eq!(editor.value(), Value::Null);
        editor.set_value(Value::from("abc"));
        assert_eq!(editor.value(), Value::Null);
        editor.set_value(Value::from("42px"));
        assert_eq!(editor.value(), Value::Number(42.0));
        editor.set_value(Value::from(7));
        assert_eq!(editor.value(), Value::Number(7.0));
    }

    #[test]
    fn test_number_input_rejects_non_numeric() {
        let mut editor = build("age", FieldSchema::new("Number"));
        editor.input(Value::from("1.5"));
        assert_eq!(editor.value(), Value::Number(1.5));
        editor.input(Value::from("1.5.2"));
        assert_eq!(editor.value(), Value::Number(1.5));
        editor.input(Value::from("1a"));
        assert_eq!(editor.value(), Value::Number(1.5));
        assert!(editor.render().contains(r#"step="any""#));
    }

    #[test]
    fn test_hidden_editor() {
        let mut editor = build("token", FieldSchema::new("Hidden"));
        assert_eq!(editor.value(), Value::from(""));
        editor.set_value(Value::from(5));
        assert_eq!(editor.value(), Value::from(5));

        editor.focus();
        assert!(!editor.has_focus());
        assert!(editor.render().contains(r#"type="hidden""#));
    }

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("  3.25abc"), Some(3.25));
        assert_eq!(parse_leading_float("-2"), Some(-2.0));
        assert_eq!(parse_leading_float("1e3"), Some(1000.0));
        assert_eq!(parse_leading_float("e"), None);
        assert_eq!(parse_leading_float("NaN"), None);
    }
}
