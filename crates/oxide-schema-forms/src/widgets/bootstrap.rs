//! Bootstrap 5 editor widgets.

use super::{html_escape, Widget, WidgetAttrs};
use crate::schema::SelectOption;
use crate::value::Value;

/// Bootstrap 5 text input widget.
#[derive(Debug, Clone)]
pub struct BootstrapTextInput {
    /// The HTML input type (text, password, number, ...).
    pub input_type: String,
    /// Placeholder text.
    pub placeholder: Option<String>,
}

impl Default for BootstrapTextInput {
    fn default() -> Self {
        Self {
            input_type: "text".to_string(),
            placeholder: None,
        }
    }
}

impl BootstrapTextInput {
    /// Creates a new text input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an input of another type.
    pub fn of_type(input_type: impl Into<String>) -> Self {
        Self {
            input_type: input_type.into(),
            ..Default::default()
        }
    }

    /// Sets the placeholder text.
    #[must_use]
    pub fn placeholder(mut self, text: Option<&str>) -> Self {
        self.placeholder = text.map(str::to_string);
        self
    }
}

impl Widget for BootstrapTextInput {
    fn render(&self, id: &str, name: &str, value: &Value, attrs: &WidgetAttrs) -> String {
        let placeholder_attr = self
            .placeholder
            .as_ref()
            .map(|p| format!(r#" placeholder="{}""#, html_escape(p)))
            .unwrap_or_default();

        format!(
            r#"<input type="{}" class="{}" id="{}" name="{}" value="{}"{placeholder_attr}{}>"#,
            self.input_type,
            attrs.class_with("form-control"),
            html_escape(id),
            html_escape(name),
            html_escape(&value.to_form_string()),
            attrs.extra_html()
        )
    }

    fn input_type(&self) -> &str {
        &self.input_type
    }
}

/// Bootstrap 5 textarea widget.
#[derive(Debug, Clone)]
pub struct BootstrapTextarea {
    /// Number of rows.
    pub rows: usize,
    /// Placeholder text.
    pub placeholder: Option<String>,
}

impl Default for BootstrapTextarea {
    fn default() -> Self {
        Self {
            rows: 4,
            placeholder: None,
        }
    }
}

impl Widget for BootstrapTextarea {
    fn render(&self, id: &str, name: &str, value: &Value, attrs: &WidgetAttrs) -> String {
        let placeholder_attr = self
            .placeholder
            .as_ref()
            .map(|p| format!(r#" placeholder="{}""#, html_escape(p)))
            .unwrap_or_default();

        format!(
            r#"<textarea class="{}" id="{}" name="{}" rows="{}"{placeholder_attr}{}>{}</textarea>"#,
            attrs.class_with("form-control"),
            html_escape(id),
            html_escape(name),
            self.rows,
            attrs.extra_html(),
            html_escape(&value.to_form_string())
        )
    }

    fn input_type(&self) -> &str {
        "textarea"
    }
}

fn is_selected(option: &SelectOption, value: &Value) -> bool {
    match value {
        Value::List(items) => items.iter().any(|item| option.val.same_form_value(item)),
        other => option.val.same_form_value(other),
    }
}

/// Bootstrap 5 select widget.
#[derive(Debug, Clone, Default)]
pub struct BootstrapSelect {
    /// Available choices.
    pub choices: Vec<SelectOption>,
    /// Whether several choices can be selected.
    pub multiple: bool,
}

impl BootstrapSelect {
    /// Creates a new select with the given choices.
    pub fn new(choices: Vec<SelectOption>) -> Self {
        Self {
            choices,
            multiple: false,
        }
    }

    /// Allows multiple selection.
    #[must_use]
    pub fn multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }
}

impl Widget for BootstrapSelect {
    fn render(&self, id: &str, name: &str, value: &Value, attrs: &WidgetAttrs) -> String {
        let options: String = self
            .choices
            .iter()
            .map(|option| {
                let selected_attr = if is_selected(option, value) { " selected" } else { "" };
                format!(
                    r#"<option value="{}"{selected_attr}>{}</option>"#,
                    html_escape(&option.val.to_form_string()),
                    html_escape(&option.label)
                )
            })
            .collect();

        let multiple_attr = if self.multiple { " multiple" } else { "" };

        format!(
            r#"<select class="{}" id="{}" name="{}"{multiple_attr}{}>{}</select>"#,
            attrs.class_with("form-select"),
            html_escape(id),
            html_escape(name),
            attrs.extra_html(),
            options
        )
    }

    fn input_type(&self) -> &str {
        "select"
    }
}

/// Bootstrap 5 checkbox widget.
#[derive(Debug, Clone, Default)]
pub struct BootstrapCheckbox;

impl Widget for BootstrapCheckbox {
    fn render(&self, id: &str, name: &str, value: &Value, attrs: &WidgetAttrs) -> String {
        let checked_attr = if value.is_truthy() { " checked" } else { "" };
        format!(
            r#"<input class="{}" type="checkbox" id="{}" name="{}" value="true"{checked_attr}{}>"#,
            attrs.class_with("form-check-input"),
            html_escape(id),
            html_escape(name),
            attrs.extra_html()
        )
    }

    fn input_type(&self) -> &str {
        "checkbox"
    }
}

fn render_choices(
    input_type: &str,
    choices: &[SelectOption],
    id: &str,
    name: &str,
    value: &Value,
) -> String {
    let items: String = choices
        .iter()
        .enumerate()
        .map(|(i, option)| {
            let item_id = format!("{id}-{i}");
            let checked_attr = if is_selected(option, value) { " checked" } else { "" };
            format!(
                r#"<li class="form-check"><input class="form-check-input" type="{input_type}" id="{}" name="{}" value="{}"{checked_attr}><label class="form-check-label" for="{}">{}</label></li>"#,
                html_escape(&item_id),
                html_escape(name),
                html_escape(&option.val.to_form_string()),
                html_escape(&item_id),
                html_escape(&option.label)
            )
        })
        .collect();
    format!(r#"<ul id="{}" class="list-unstyled">{items}</ul>"#, html_escape(id))
}

/// Bootstrap 5 radio select widget.
#[derive(Debug, Clone, Default)]
pub struct BootstrapRadioSelect {
    /// Available choices.
    pub choices: Vec<SelectOption>,
}

impl BootstrapRadioSelect {
    /// Creates a new radio select with the given choices.
    pub fn new(choices: Vec<SelectOption>) -> Self {
        Self { choices }
    }
}

impl Widget for BootstrapRadioSelect {
    fn render(&self, id: &str, name: &str, value: &Value, _attrs: &WidgetAttrs) -> String {
        render_choices("radio", &self.choices, id, name, value)
    }

    fn input_type(&self) -> &str {
        "radio"
    }
}

/// Bootstrap 5 checkbox group widget.
#[derive(Debug, Clone, Default)]
pub struct BootstrapCheckboxes {
    /// Available choices.
    pub choices: Vec<SelectOption>,
}

impl BootstrapCheckboxes {
    /// Creates a new checkbox group with the given choices.
    pub fn new(choices: Vec<SelectOption>) -> Self {
        Self { choices }
    }
}

impl Widget for BootstrapCheckboxes {
    fn render(&self, id: &str, name: &str, value: &Value, _attrs: &WidgetAttrs) -> String {
        render_choices("checkbox", &self.choices, id, name, value)
    }

    fn input_type(&self) -> &str {
        "checkbox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choices() -> Vec<SelectOption> {
        vec![SelectOption::new("1", "Option 1"), SelectOption::new("2", "Option 2")]
    }

    #[test]
    fn test_bootstrap_text_input() {
        let widget = BootstrapTextInput::new().placeholder(Some("Enter name"));
        let html = widget.render("username", "username", &Value::from("<b>"), &WidgetAttrs::new());
        assert!(html.contains(r#"class="form-control""#));
        assert!(html.contains(r#"name="username""#));
        assert!(html.contains(r#"placeholder="Enter name""#));
        assert!(html.contains(r#"value="&lt;b&gt;""#));
    }

    #[test]
    fn test_bootstrap_password() {
        let widget = BootstrapTextInput::of_type("password");
        let html = widget.render("pw", "password", &Value::Null, &WidgetAttrs::new());
        assert!(html.contains(r#"type="password""#));
    }

    #[test]
    fn test_bootstrap_textarea() {
        let widget = BootstrapTextarea::default();
        let html = widget.render("content", "content", &Value::from("Hello"), &WidgetAttrs::new());
        assert!(html.contains(r#"rows="4""#));
        assert!(html.ends_with(">Hello</textarea>"));
    }

    #[test]
    fn test_bootstrap_select() {
        let widget = BootstrapSelect::new(choices());
        let html = widget.render("choice", "choice", &Value::from(2), &WidgetAttrs::new());
        assert!(html.contains(r#"class="form-select""#));
        assert!(html.contains(r#"value="2" selected"#));
        assert!(!html.contains("multiple"));
    }

    #[test]
    fn test_bootstrap_multi_select() {
        let widget = BootstrapSelect::new(choices()).multiple(true);
        let value = Value::List(vec![Value::from("1"), Value::from("2")]);
        let html = widget.render("tags", "tags", &value, &WidgetAttrs::new());
        assert!(html.contains(" multiple"));
        assert_eq!(html.matches(" selected").count(), 2);
    }

    #[test]
    fn test_bootstrap_checkbox() {
        let html = BootstrapCheckbox.render("agree", "agree", &Value::from(true), &WidgetAttrs::new());
        assert!(html.contains("form-check-input"));
        assert!(html.contains("checked"));
    }

    #[test]
    fn test_bootstrap_radio_select() {
        let widget = BootstrapRadioSelect::new(choices());
        let html = widget.render("choice", "choice", &Value::from("2"), &WidgetAttrs::new());
        assert!(html.contains(r#"id="choice-1""#));
        assert!(html.contains(r#"value="2" checked"#));
    }

    #[test]
    fn test_bootstrap_checkboxes() {
        let widget = BootstrapCheckboxes::new(choices());
        let value = Value::List(vec![Value::from("1")]);
        let html = widget.render("opts", "opts", &value, &WidgetAttrs::new());
        assert!(html.contains(r#"type="checkbox""#));
        assert_eq!(html.matches(" checked").count(), 1);
    }
}
