//! Date/time editing with field-type dependent storage formats
//!
//! Formats in the config use the `yyyy-MM-dd HH:mm:ss` token style of stored
//! projects; they are translated to chrono format strings for parsing and
//! formatting.

use attrform_core::config_widget::value_types;
use attrform_core::{
    classes, AttributeEditorContext, BoxedEditorWrapper, ConfigOption, ConfigSchema, ControlRef,
    EditorWidgetFactory, EditorWidgetWrapper, WrapperCore,
};
use attrform_types::{FieldType, VectorLayer, WidgetConfig};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{json, Value};
use std::collections::HashMap;

pub const WIDGET_TYPE: &str = "DateTime";

pub const DEFAULT_DATE_FORMAT: &str = "yyyy-MM-dd";
pub const DEFAULT_TIME_FORMAT: &str = "HH:mm:ss";
pub const DEFAULT_DATETIME_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Longest tokens first so `yyyy` is not read as two `yy`
const FORMAT_TOKENS: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("MM", "%m"),
    ("dd", "%d"),
    ("HH", "%H"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("zzz", "%3f"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Temporal {
    Date,
    Time,
    DateTime,
}

impl Temporal {
    fn of(field_type: Option<FieldType>) -> Self {
        match field_type {
            Some(FieldType::Date) => Temporal::Date,
            Some(FieldType::Time) => Temporal::Time,
            _ => Temporal::DateTime,
        }
    }

    fn default_format(self) -> &'static str {
        match self {
            Temporal::Date => DEFAULT_DATE_FORMAT,
            Temporal::Time => DEFAULT_TIME_FORMAT,
            Temporal::DateTime => DEFAULT_DATETIME_FORMAT,
        }
    }
}

/// Storage format used for a column when the config names none
pub fn default_field_format(field_type: FieldType) -> &'static str {
    Temporal::of(Some(field_type)).default_format()
}

/// Translate a `yyyy-MM-dd` style format into a chrono format string
pub fn to_chrono_format(format: &str) -> String {
    let mut out = String::with_capacity(format.len() + 8);
    let mut rest = format;
    'scan: while !rest.is_empty() {
        for (token, replacement) in FORMAT_TOKENS {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = tail;
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            if c == '%' {
                out.push_str("%%");
            } else {
                out.push(c);
            }
        }
        rest = chars.as_str();
    }
    out
}

/// Parse `text` as the given kind, trying `format` first and ISO forms after
fn normalize(kind: Temporal, text: &str, format: &str) -> Option<String> {
    let text = text.trim();
    let chrono_format = to_chrono_format(format);
    match kind {
        Temporal::Date => {
            let date = NaiveDate::parse_from_str(text, &chrono_format)
                .ok()
                .or_else(|| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
                .or_else(|| parse_iso_datetime(text).map(|datetime| datetime.date()))?;
            Some(date.format(&chrono_format).to_string())
        }
        Temporal::Time => {
            let time = NaiveTime::parse_from_str(text, &chrono_format)
                .ok()
                .or_else(|| NaiveTime::parse_from_str(text, "%H:%M:%S%.f").ok())
                .or_else(|| NaiveTime::parse_from_str(text, "%H:%M").ok())?;
            Some(time.format(&chrono_format).to_string())
        }
        Temporal::DateTime => {
            let datetime = NaiveDateTime::parse_from_str(text, &chrono_format)
                .ok()
                .or_else(|| parse_iso_datetime(text))
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })?;
            Some(datetime.format(&chrono_format).to_string())
        }
    }
}

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

pub struct DateTimeFactory;

impl EditorWidgetFactory for DateTimeFactory {
    fn name(&self) -> &str {
        "Date/Time"
    }

    fn create(
        &self,
        layer: &VectorLayer,
        field_idx: usize,
        editor: Option<ControlRef>,
        _parent: Option<&ControlRef>,
    ) -> Option<BoxedEditorWrapper> {
        let field_type = layer.fields().get(field_idx).map(|field| field.field_type);
        let kind = Temporal::of(field_type);
        let default_class = match kind {
            Temporal::Date => classes::DATE_EDIT,
            Temporal::Time => classes::TIME_EDIT,
            Temporal::DateTime => classes::DATE_TIME_EDIT,
        };
        Some(Box::new(DateTimeWrapper {
            core: WrapperCore::new(WIDGET_TYPE, field_idx, editor, default_class),
            kind,
        }))
    }

    fn config_schema(&self) -> ConfigSchema {
        ConfigSchema::new(vec![
            ConfigOption::new("field_format", "Field format", value_types::STRING, Value::Null)
                .describe("Storage format; defaults by column type"),
            ConfigOption::new("display_format", "Display format", value_types::STRING, Value::Null),
            ConfigOption::new("calendar_popup", "Calendar popup", value_types::BOOLEAN, json!(true)),
            ConfigOption::new("allow_null", "Allow NULL", value_types::BOOLEAN, json!(true)),
        ])
    }

    fn supported_widget_types(&self) -> HashMap<String, i32> {
        HashMap::from([
            (classes::DATE_TIME_EDIT.to_string(), 10),
            (classes::DATE_EDIT.to_string(), 10),
            (classes::TIME_EDIT.to_string(), 10),
        ])
    }
}

pub struct DateTimeWrapper {
    core: WrapperCore,
    kind: Temporal,
}

impl DateTimeWrapper {
    fn field_format(&self) -> String {
        self.core
            .config_value("field_format")
            .as_str()
            .filter(|format| !format.is_empty())
            .unwrap_or(self.kind.default_format())
            .to_string()
    }
}

impl EditorWidgetWrapper for DateTimeWrapper {
    fn widget_type(&self) -> &str {
        self.core.widget_type()
    }

    fn field_index(&self) -> usize {
        self.core.field_index()
    }

    fn config(&self) -> &WidgetConfig {
        self.core.config()
    }

    fn set_config(&mut self, config: WidgetConfig) {
        self.core.set_config(config);
    }

    fn context(&self) -> &AttributeEditorContext {
        self.core.context()
    }

    fn set_context(&mut self, context: AttributeEditorContext) {
        self.core.set_context(context);
    }

    fn widget(&mut self) -> ControlRef {
        self.core.widget()
    }

    fn valid(&self) -> bool {
        self.core.accepts(&[classes::DATE_TIME_EDIT, classes::LINE_EDIT])
    }

    fn value(&self) -> Value {
        self.core.raw_value()
    }

    fn set_value(&mut self, value: &Value) {
        let normalized = match value {
            Value::String(text) if !text.trim().is_empty() => {
                match normalize(self.kind, text, &self.field_format()) {
                    Some(normalized) => Value::String(normalized),
                    None => {
                        log::debug!("Could not read '{}' as a {:?} value", text, self.kind);
                        Value::Null
                    }
                }
            }
            _ => Value::Null,
        };
        self.core.set_raw_value(normalized);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrform_types::{Field, Fields};

    fn layer() -> VectorLayer {
        let fields: Fields = vec![
            Field::new("built", FieldType::Date),
            Field::new("opens", FieldType::Time),
            Field::new("surveyed", FieldType::DateTime),
        ]
        .into_iter()
        .collect();
        VectorLayer::new("sites", "Sites", fields)
    }

    #[test]
    fn test_format_translation() {
        assert_eq!(to_chrono_format("yyyy-MM-dd HH:mm:ss"), "%Y-%m-%d %H:%M:%S");
        assert_eq!(to_chrono_format("dd.MM.yy"), "%d.%m.%y");
        assert_eq!(to_chrono_format("100%"), "100%%");
    }

    #[test]
    fn test_values_are_normalized_per_column_type() {
        let layer = layer();

        let mut date = DateTimeFactory.create(&layer, 0, None, None).unwrap();
        date.set_value(&json!("2024-03-05T10:00:00"));
        assert_eq!(date.value(), json!("2024-03-05"));
        assert_eq!(date.widget().borrow().class_name(), classes::DATE_EDIT);

        let mut time = DateTimeFactory.create(&layer, 1, None, None).unwrap();
        time.set_value(&json!("08:30"));
        assert_eq!(time.value(), json!("08:30:00"));

        let mut datetime = DateTimeFactory.create(&layer, 2, None, None).unwrap();
        datetime.set_value(&json!("2024-03-05"));
        assert_eq!(datetime.value(), json!("2024-03-05 00:00:00"));
    }

    #[test]
    fn test_custom_field_format_and_invalid_input() {
        let mut wrapper = DateTimeFactory.create(&layer(), 0, None, None).unwrap();
        wrapper.set_config(WidgetConfig::from([("field_format".to_string(), json!("dd.MM.yyyy"))]));
        wrapper.set_value(&json!("2024-12-31"));
        assert_eq!(wrapper.value(), json!("31.12.2024"));

        wrapper.set_value(&json!("not a date"));
        assert_eq!(wrapper.value(), Value::Null);
    }

    #[test]
    fn test_default_formats() {
        assert_eq!(default_field_format(FieldType::Date), "yyyy-MM-dd");
        assert_eq!(default_field_format(FieldType::String), "yyyy-MM-dd HH:mm:ss");
    }
}
