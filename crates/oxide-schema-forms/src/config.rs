//! Adapter-wide defaults and date display settings.

use serde::Deserialize;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Defaults applied by the spec adapter when neither the field nor the call
/// overrides them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdapterDefaults {
    /// Prepend a blank choice to single selects.
    pub add_empty_select_option: bool,
    /// Render selects as searchable dropdowns.
    pub use_chosen: bool,
    /// Options passed to the searchable dropdown enhancement.
    pub chosen_options: serde_json::Value,
}

impl Default for AdapterDefaults {
    fn default() -> Self {
        Self {
            add_empty_select_option: false,
            use_chosen: true,
            chosen_options: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

impl AdapterDefaults {
    /// Parses defaults from JSON; missing keys keep their default.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// How date editors label their month selector.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DateDisplay {
    /// Show month names instead of numbers.
    pub show_month_names: bool,
    /// Month names, January first.
    pub month_names: Vec<String>,
}

impl Default for DateDisplay {
    fn default() -> Self {
        Self {
            show_month_names: true,
            month_names: MONTH_NAMES.iter().map(|m| (*m).to_string()).collect(),
        }
    }
}

impl DateDisplay {
    /// Returns the label for a zero-based month.
    pub fn month_label(&self, month0: u32) -> String {
        if self.show_month_names {
            if let Some(name) = self.month_names.get(month0 as usize) {
                return name.clone();
            }
        }
        (month0 + 1).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_defaults() {
        let defaults = AdapterDefaults::default();
        assert!(!defaults.add_empty_select_option);
        assert!(defaults.use_chosen);
        assert_eq!(defaults.chosen_options, serde_json::json!({}));
    }

    #[test]
    fn test_adapter_defaults_from_json() {
        let defaults = AdapterDefaults::from_json(r#"{"use_chosen": false}"#).unwrap();
        assert!(!defaults.use_chosen);
        assert!(!defaults.add_empty_select_option);
        assert!(AdapterDefaults::from_json("{").is_err());
    }

    #[test]
    fn test_month_label() {
        let display = DateDisplay::default();
        assert_eq!(display.month_label(0), "January");
        assert_eq!(display.month_label(11), "December");

        let numeric = DateDisplay {
            show_month_names: false,
            ..DateDisplay::default()
        };
        assert_eq!(numeric.month_label(2), "3");
    }
}
