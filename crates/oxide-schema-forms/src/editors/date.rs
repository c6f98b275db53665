//! Date and date-time editors built from day, month, year, hour and minute
//! selectors.

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, Timelike};

use super::{Editor, EditorCore, EditorOptions};
use crate::config::DateDisplay;
use crate::error::Result;
use crate::value::{Value, ValueMap};
use crate::widgets::{html_escape, HiddenInput, Widget};

fn part(map: &ValueMap, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => Some(*n),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn render_selector(id: &str, name: &str, choices: &[(String, String)], selected: Option<String>) -> String {
    let options: String = choices
        .iter()
        .map(|(value, label)| {
            let selected_attr = if selected.as_deref() == Some(value.as_str()) {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{}"{selected_attr}>{}</option>"#,
                html_escape(value),
                html_escape(label)
            )
        })
        .collect();
    format!(
        r#"<select class="form-select" id="{}" data-type="{}">{options}</select>"#,
        html_escape(id),
        html_escape(name)
    )
}

/// Day, zero-based month and year, each possibly unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DateParts {
    day: Option<u32>,
    month: Option<u32>,
    year: Option<i32>,
}

impl DateParts {
    fn from_date(date: NaiveDate) -> Self {
        Self {
            day: Some(date.day()),
            month: Some(date.month0()),
            year: Some(date.year()),
        }
    }

    fn from_map(map: &ValueMap) -> Self {
        Self {
            day: part(map, "day").filter(|d| *d >= 1.0).map(|d| d as u32),
            month: part(map, "month").filter(|m| *m >= 0.0).map(|m| m as u32),
            year: part(map, "year").map(|y| y as i32),
        }
    }

    /// The date, with day overflow rolling into the following month.
    fn date(&self) -> Option<NaiveDate> {
        let (day, month, year) = (self.day?, self.month?, self.year?);
        let first = NaiveDate::from_ymd_opt(year, month + 1, 1)?;
        first.checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
    }

    fn render(&self, id: &str, year_start: i32, year_end: i32, display: &DateDisplay) -> String {
        let days: Vec<(String, String)> = (1..=31).map(|d| (d.to_string(), d.to_string())).collect();
        let months: Vec<(String, String)> = (0..12)
            .map(|m| (m.to_string(), display.month_label(m)))
            .collect();
        let years: Vec<(String, String)> = if year_start <= year_end {
            (year_start..=year_end).map(|y| (y.to_string(), y.to_string())).collect()
        } else {
            (year_end..=year_start).rev().map(|y| (y.to_string(), y.to_string())).collect()
        };

        format!(
            "{}{}{}",
            render_selector(&format!("{id}_day"), "date", &days, self.day.map(|d| d.to_string())),
            render_selector(&format!("{id}_month"), "month", &months, self.month.map(|m| m.to_string())),
            render_selector(&format!("{id}_year"), "year", &years, self.year.map(|y| y.to_string())),
        )
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_date_time(text).map(|dt| dt.date()))
}

fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim_end_matches('Z');
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn year_range(core: &EditorCore) -> (i32, i32) {
    let this_year = Local::now().year();
    (
        core.schema.year_start.unwrap_or(this_year - 100),
        core.schema.year_end.unwrap_or(this_year),
    )
}

/// Calendar date editor.
///
/// Renders day, month and year selectors plus a hidden input mirroring the
/// value as an ISO-8601 string for plain form submission.
#[derive(Debug)]
pub struct DateEditor {
    core: EditorCore,
    parts: DateParts,
}

/// Creates a `Date` editor. The default value is today.
pub fn date(options: EditorOptions) -> Result<Box<dyn Editor>> {
    let (core, initial) = EditorCore::new(options)?;
    let mut editor = DateEditor {
        core,
        parts: DateParts::default(),
    };
    editor.set_value(initial.unwrap_or_else(|| Value::Date(Local::now().date_naive())));
    Ok(Box::new(editor))
}

impl Editor for DateEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "Date"
    }

    fn value(&self) -> Value {
        self.parts.date().map_or(Value::Null, Value::Date)
    }

    /// Accepts a date, a date-time, an ISO string or a map of `day`,
    /// `month` (zero-based) and `year`.
    fn write(&mut self, value: Value) {
        self.parts = match value {
            Value::Date(d) => DateParts::from_date(d),
            Value::DateTime(dt) => DateParts::from_date(dt.date()),
            Value::Text(s) => parse_date(&s).map(DateParts::from_date).unwrap_or_default(),
            Value::Map(map) => DateParts::from_map(&map),
            _ => DateParts::default(),
        };
    }

    fn render(&mut self) -> String {
        let (start, end) = year_range(&self.core);
        let mirror = self.value().to_iso_string().map_or(Value::Null, Value::Text);
        format!(
            r#"<div id="{}" class="date">{}{}</div>"#,
            html_escape(&self.core.id),
            self.parts.render(&self.core.id, start, end, &self.core.schema.date_display),
            HiddenInput.render(
                &format!("{}_hidden", self.core.id),
                &self.core.key,
                &mirror,
                &Default::default()
            )
        )
    }
}

/// Date and time-of-day editor.
#[derive(Debug)]
pub struct DateTimeEditor {
    core: EditorCore,
    date: DateParts,
    hour: Option<u32>,
    minute: Option<u32>,
}

/// Creates a `DateTime` editor. The default value is now.
pub fn date_time(options: EditorOptions) -> Result<Box<dyn Editor>> {
    let (core, initial) = EditorCore::new(options)?;
    let mut editor = DateTimeEditor {
        core,
        date: DateParts::default(),
        hour: None,
        minute: None,
    };
    editor.set_value(initial.unwrap_or_else(|| Value::DateTime(Local::now().naive_local())));
    Ok(Box::new(editor))
}

impl DateTimeEditor {
    fn set_date_time(&mut self, dt: NaiveDateTime) {
        self.date = DateParts::from_date(dt.date());
        self.hour = Some(dt.hour());
        self.minute = Some(dt.minute());
    }

    fn mins_interval(&self) -> u32 {
        self.core.schema.mins_interval.filter(|m| *m > 0).unwrap_or(15)
    }
}

impl Editor for DateTimeEditor {
    fn core(&self) -> &EditorCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "DateTime"
    }

    fn value(&self) -> Value {
        let (Some(date), Some(hour), Some(minute)) = (self.date.date(), self.hour, self.minute) else {
            return Value::Null;
        };
        date.and_hms_opt(hour, minute, 0)
            .map_or(Value::Null, Value::DateTime)
    }

    /// Accepts a date-time, a date (midnight), an ISO string or a map of
    /// `day`, `month`, `year`, `hour` and `min`.
    fn write(&mut self, value: Value) {
        match value {
            Value::DateTime(dt) => self.set_date_time(dt),
            Value::Date(d) => match d.and_hms_opt(0, 0, 0) {
                Some(dt) => self.set_date_time(dt),
                None => self.write(Value::Null),
            },
            Value::Text(s) => match parse_date_time(&s).or_else(|| parse_date(&s)?.and_hms_opt(0, 0, 0)) {
                Some(dt) => self.set_date_time(dt),
                None => self.write(Value::Null),
            },
            Value::Map(map) => {
                self.date = DateParts::from_map(&map);
                self.hour = part(&map, "hour").filter(|h| (0.0..24.0).contains(h)).map(|h| h as u32);
                self.minute = part(&map, "min").filter(|m| (0.0..60.0).contains(m)).map(|m| m as u32);
            }
            _ => {
                self.date = DateParts::default();
                self.hour = None;
                self.minute = None;
            }
        }
    }

    fn render(&mut self) -> String {
        let (start, end) = year_range(&self.core);
        let hours: Vec<(String, String)> = (0..24).map(|h| (h.to_string(), format!("{h:02}"))).collect();
        let minutes: Vec<(String, String)> = (0..60)
            .step_by(self.mins_interval() as usize)
            .map(|m| (m.to_string(), format!("{m:02}")))
            .collect();
        let id = &self.core.id;
        let mirror = self.value().to_iso_string().map_or(Value::Null, Value::Text);

        format!(
            r#"<div id="{}" class="datetime">{}{}:{}{}</div>"#,
            html_escape(id),
            self.date.render(&format!("{id}_date"), start, end, &self.core.schema.date_display),
            render_selector(&format!("{id}_hour"), "hour", &hours, self.hour.map(|h| h.to_string())),
            render_selector(&format!("{id}_min"), "min", &minutes, self.minute.map(|m| m.to_string())),
            HiddenInput.render(&format!("{id}_hidden"), &self.core.key, &mirror, &Default::default())
        )
    }
}
