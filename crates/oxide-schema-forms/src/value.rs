//! Dynamic values held by editors and exchanged with data sources.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

/// Ordered mapping of field key to value.
///
/// Insertion order is preserved so that aggregate form values follow the
/// declaration order of the schema.
pub type ValueMap = IndexMap<String, Value>;

/// A value held by an editor.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Boolean value (checkboxes).
    Bool(bool),
    /// Floating point number.
    Number(f64),
    /// Text value.
    Text(String),
    /// Calendar date.
    Date(NaiveDate),
    /// Calendar date with a time of day.
    DateTime(NaiveDateTime),
    /// Ordered list of values (multi-selects, ranges).
    List(Vec<Value>),
    /// Nested values (object editors).
    Map(ValueMap),
}

impl Value {
    /// Returns whether this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Boolean interpretation used to toggle dependent fieldsets.
    ///
    /// `Null`, `false`, zero, NaN, the empty string and the empty list are
    /// falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::Text(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Date(_) | Self::DateTime(_) | Self::Map(_) => true,
        }
    }

    /// Returns whether the value counts as "not filled in".
    ///
    /// Validators other than `required` skip these values.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Returns the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number, if this is a numeric value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the nested map, if this is a map value.
    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the form-encoded representation of this value.
    ///
    /// This is what an HTML input would carry: numbers without a trailing
    /// `.0`, dates in ISO-8601, `Null` as the empty string.
    pub fn to_form_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
            Self::Date(d) => d.format("%Y-%m-%d").to_string(),
            Self::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            Self::List(items) => items
                .iter()
                .map(Self::to_form_string)
                .collect::<Vec<_>>()
                .join(","),
            Self::Map(_) => String::new(),
        }
    }

    /// Returns the ISO-8601 timestamp used by hidden date mirrors.
    ///
    /// Naive dates are treated as UTC midnight.
    pub fn to_iso_string(&self) -> Option<String> {
        match self {
            Self::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
            Self::DateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()),
            _ => None,
        }
    }

    /// Converts a JSON value into a `Value`.
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::Text(s.clone()),
            serde_json::Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            serde_json::Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts this value into JSON. Dates become ISO-8601 strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Date(_) | Self::DateTime(_) => serde_json::Value::String(self.to_form_string()),
            Self::List(items) => serde_json::Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Returns whether two values carry the same form-encoded content.
    ///
    /// Option values coming from the browser are strings, so `3` and `"3"`
    /// select the same option.
    pub fn same_form_value(&self, other: &Self) -> bool {
        self == other || (!self.is_null() && self.to_form_string() == other.to_form_string())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Self::Map(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::from(false).is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::from("x").is_truthy());
        assert!(Value::from(2.5).is_truthy());
        assert!(Value::List(vec![Value::from("a")]).is_truthy());
    }

    #[test]
    fn test_form_string() {
        assert_eq!(Value::from(3.5).to_form_string(), "3.5");
        assert_eq!(Value::from(10).to_form_string(), "10");
        assert_eq!(Value::Null.to_form_string(), "");
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(Value::from(date).to_form_string(), "2024-01-15");
        assert_eq!(
            Value::from(date).to_iso_string().as_deref(),
            Some("2024-01-15T00:00:00.000Z")
        );
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"a": 1, "b": ["x", null], "c": true});
        let value = Value::from_json(&json);
        let map = value.as_map().unwrap();
        assert_eq!(map.get("a"), Some(&Value::Number(1.0)));
        assert_eq!(
            map.get("b"),
            Some(&Value::List(vec![Value::from("x"), Value::Null]))
        );
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_same_form_value() {
        assert!(Value::from(3).same_form_value(&Value::from("3")));
        assert!(!Value::Null.same_form_value(&Value::from("")));
        assert!(Value::Null.same_form_value(&Value::Null));
    }
}
