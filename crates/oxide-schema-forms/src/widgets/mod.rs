//! HTML widgets used by editors, and the mount point rendered forms attach to.

mod bootstrap;

pub use bootstrap::{
    BootstrapCheckbox, BootstrapCheckboxes, BootstrapRadioSelect, BootstrapSelect,
    BootstrapTextInput, BootstrapTextarea,
};

use indexmap::IndexMap;

use crate::value::Value;

/// Attributes that can be applied to a widget.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetAttrs {
    /// HTML attributes, rendered in insertion order.
    pub attrs: IndexMap<String, String>,
}

impl WidgetAttrs {
    /// Creates new empty widget attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attribute.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(key.into(), value.into());
    }

    /// Gets an attribute.
    pub fn get(&self, key: &str) -> Option<&String> {
        self.attrs.get(key)
    }

    /// Returns whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Renders attributes as an HTML attribute string.
    pub fn to_html(&self) -> String {
        self.attrs
            .iter()
            .map(|(k, v)| format!(r#"{k}="{}""#, html_escape(v)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Renders the attributes except `id` and `class`, each with a leading space.
    pub fn extra_html(&self) -> String {
        self.attrs
            .iter()
            .filter(|(k, _)| k.as_str() != "class" && k.as_str() != "id")
            .map(|(k, v)| format!(r#" {k}="{}""#, html_escape(v)))
            .collect()
    }

    /// Joins a base class with the `class` attribute, if any.
    pub fn class_with(&self, base: &str) -> String {
        match self.get("class") {
            Some(extra) if !extra.is_empty() => format!("{base} {extra}"),
            _ => base.to_string(),
        }
    }

    /// Builder method to set an attribute.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }
}

/// Trait for widgets that render an editor's HTML input.
pub trait Widget {
    /// Renders the widget as HTML.
    ///
    /// # Arguments
    /// * `id` - The element id
    /// * `name` - The field name (used for the name attribute)
    /// * `value` - The current value
    /// * `attrs` - Additional HTML attributes
    fn render(&self, id: &str, name: &str, value: &Value, attrs: &WidgetAttrs) -> String;

    /// Returns the HTML input type.
    fn input_type(&self) -> &str {
        "text"
    }
}

/// A hidden input widget.
#[derive(Debug, Clone, Default)]
pub struct HiddenInput;

impl Widget for HiddenInput {
    fn render(&self, id: &str, name: &str, value: &Value, attrs: &WidgetAttrs) -> String {
        format!(
            r#"<input type="hidden" id="{}" name="{}" value="{}"{}>"#,
            html_escape(id),
            html_escape(name),
            html_escape(&value.to_form_string()),
            attrs.extra_html()
        )
    }

    fn input_type(&self) -> &str {
        "hidden"
    }
}

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// A place in a host document that rendered forms attach to.
pub trait MountPoint {
    /// Inserts rendered markup.
    fn attach(&mut self, html: &str);

    /// Runs the post-mount enhancement of an editor (searchable dropdowns).
    fn enhance(&mut self, editor_id: &str, options: &Value);
}

/// Mount point that collects markup into a string.
#[derive(Debug, Clone, Default)]
pub struct HtmlMount {
    /// Attached markup, in attach order.
    pub html: String,
    /// Enhanced editor ids with their options.
    pub enhanced: Vec<(String, Value)>,
}

impl HtmlMount {
    /// Creates an empty mount point.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MountPoint for HtmlMount {
    fn attach(&mut self, html: &str) {
        self.html.push_str(html);
    }

    fn enhance(&mut self, editor_id: &str, options: &Value) {
        self.enhanced.push((editor_id.to_string(), options.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_input() {
        let widget = HiddenInput;
        let html = widget.render("token", "csrf_token", &Value::from("abc123"), &WidgetAttrs::new());
        assert!(html.contains(r#"type="hidden""#));
        assert!(html.contains(r#"name="csrf_token""#));
        assert!(html.contains(r#"value="abc123""#));
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("\"test\""), "&quot;test&quot;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }

    #[test]
    fn test_widget_attrs() {
        let attrs = WidgetAttrs::new()
            .with("class", "wide")
            .with("id", "my-input")
            .with("data-x", "\"q\"");
        assert_eq!(
            attrs.to_html(),
            r#"class="wide" id="my-input" data-x="&quot;q&quot;""#
        );
        assert_eq!(attrs.extra_html(), r#" data-x="&quot;q&quot;""#);
        assert_eq!(attrs.class_with("form-control"), "form-control wide");
    }

    #[test]
    fn test_html_mount() {
        let mut mount = HtmlMount::new();
        mount.attach("<form></form>");
        mount.enhance("c1_tags", &Value::Null);
        assert_eq!(mount.html, "<form></form>");
        assert_eq!(mount.enhanced.len(), 1);
    }
}
