//! Editor widget factory trait and config (de)serialisation helpers

use crate::config_widget::{value_types, BoxedConfigWidget, ConfigSchema, SchemaConfigWidget};
use crate::control::ControlRef;
use crate::search::{BoxedSearchWrapper, DefaultSearchWrapper};
use crate::wrapper::BoxedEditorWrapper;
use attrform_types::{Element, VectorLayer, WidgetConfig};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Attributes of a `widgetv2config` element managed by the registry itself
pub const REGISTRY_ATTRIBUTES: &[&str] = &[
    "fieldEditable",
    "labelOnTop",
    "notNull",
    "constraint",
    "constraintDescription",
];

/// Trait for all editor widget factories
///
/// A factory builds the edit, search and configuration controls for one
/// widget type and reads/writes that widget type's configuration.
pub trait EditorWidgetFactory {
    /// Human-readable name
    fn name(&self) -> &str;

    /// Create a wrapper around `editor`, or around a new control when `None`
    fn create(
        &self,
        layer: &VectorLayer,
        field_idx: usize,
        editor: Option<ControlRef>,
        parent: Option<&ControlRef>,
    ) -> Option<BoxedEditorWrapper>;

    /// Create a search wrapper for the column
    fn create_search_widget(
        &self,
        layer: &VectorLayer,
        field_idx: usize,
        _parent: Option<&ControlRef>,
    ) -> Option<BoxedSearchWrapper> {
        Some(Box::new(DefaultSearchWrapper::new(layer, field_idx)))
    }

    /// Options this widget type understands
    fn config_schema(&self) -> ConfigSchema {
        ConfigSchema::default()
    }

    /// Create a control for editing this widget type's configuration
    fn config_widget(
        &self,
        _layer: &VectorLayer,
        field_idx: usize,
        _parent: Option<&ControlRef>,
    ) -> Option<BoxedConfigWidget> {
        Some(Box::new(SchemaConfigWidget::new(self.config_schema(), field_idx)))
    }

    /// Read the configuration stored in a `widgetv2config` element
    fn read_editor_config(
        &self,
        element: &Element,
        _layer: &VectorLayer,
        _field_idx: usize,
    ) -> WidgetConfig {
        read_config_attributes(element, &self.config_schema())
    }

    /// Write the configuration into a `widgetv2config` element
    fn write_config(
        &self,
        config: &WidgetConfig,
        element: &mut Element,
        _layer: &VectorLayer,
        _field_idx: usize,
    ) {
        write_config_attributes(config, element);
    }

    /// Control classes this factory can drive, with the priority it claims them at
    fn supported_widget_types(&self) -> HashMap<String, i32> {
        HashMap::new()
    }
}

/// Type-erased factory for dynamic dispatch
pub type BoxedEditorWidgetFactory = Box<dyn EditorWidgetFactory>;

/// Child element recording the value type of a non-string config attribute
pub const VALUE_TYPE_ELEMENT: &str = "configtype";

/// Read every non-registry attribute of `element` into a config.
///
/// Attributes described by `schema` are converted to the option's value
/// type, others to the type recorded in a `configtype` child. Attributes
/// with neither are kept as strings.
pub fn read_config_attributes(element: &Element, schema: &ConfigSchema) -> WidgetConfig {
    let recorded: HashMap<&str, &str> = element
        .children_named(VALUE_TYPE_ELEMENT)
        .filter_map(|child| Some((child.attribute("key")?, child.attribute("type")?)))
        .collect();

    element
        .attributes()
        .filter(|(key, _)| !REGISTRY_ATTRIBUTES.contains(key))
        .map(|(key, raw)| {
            let value = match schema.option(key) {
                Some(option) => parse_typed(&option.value_type, raw),
                None => match recorded.get(key) {
                    Some(value_type) => parse_typed(value_type, raw),
                    None => Value::String(raw.to_string()),
                },
            };
            (key.to_string(), value)
        })
        .collect()
}

/// Write scalar config entries as attributes, compound ones as JSON text.
///
/// Keys are written in sorted order; null entries and keys reserved by the
/// registry are skipped. Every non-string entry gets a `configtype` child
/// so it reads back with its type.
pub fn write_config_attributes(config: &WidgetConfig, element: &mut Element) {
    let mut keys: Vec<&String> = config.keys().collect();
    keys.sort();

    for key in keys {
        if REGISTRY_ATTRIBUTES.contains(&key.as_str()) {
            log::debug!("Not writing reserved config key '{}'", key);
            continue;
        }
        let value = &config[key];
        let Some(text) = attribute_text(value) else {
            continue;
        };
        element.set_attribute(key.as_str(), text);
        if let Some(value_type) = value_type_of(value) {
            let child = element.append_child(Element::new(VALUE_TYPE_ELEMENT));
            child.set_attribute("key", key.as_str());
            child.set_attribute("type", value_type);
        }
    }
}

/// Schema value type a non-string value is read back with, `None` for strings and null
pub fn value_type_of(value: &Value) -> Option<&'static str> {
    match value {
        Value::Null | Value::String(_) => None,
        Value::Bool(_) => Some(value_types::BOOLEAN),
        Value::Number(number) if number.is_f64() => Some(value_types::NUMBER),
        Value::Number(_) => Some(value_types::INTEGER),
        Value::Array(_) | Value::Object(_) => Some(value_types::JSON),
    }
}

/// Textual attribute form of a config value, `None` for null
pub fn attribute_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(if *flag { "1" } else { "0" }.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        compound => Some(compound.to_string()),
    }
}

/// Convert an attribute string to a value of the given schema type.
///
/// Values that do not parse are kept as strings rather than dropped.
pub fn parse_typed(value_type: &str, raw: &str) -> Value {
    match value_type {
        value_types::INTEGER => raw
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| parse_typed(value_types::NUMBER, raw)),
        value_types::NUMBER => {
            let trimmed = raw.trim();
            if let Ok(integer) = trimmed.parse::<i64>() {
                return Value::from(integer);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(raw.to_string()))
        }
        value_types::BOOLEAN => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" => Value::Bool(true),
            "0" | "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        value_types::JSON => {
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
        }
        _ => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_widget::ConfigOption;
    use serde_json::json;

    fn schema() -> ConfigSchema {
        ConfigSchema::new(vec![
            ConfigOption::new("Min", "Minimum", value_types::NUMBER, json!(0)),
            ConfigOption::new("Step", "Step", value_types::INTEGER, json!(1)),
            ConfigOption::new("AllowNull", "Allow null", value_types::BOOLEAN, json!(true)),
            ConfigOption::new("Map", "Map", value_types::JSON, Value::Null),
        ])
    }

    #[test]
    fn test_read_converts_schema_types_and_skips_registry_attributes() {
        let mut element = Element::new("widgetv2config");
        element.set_attribute("fieldEditable", "1");
        element.set_attribute("notNull", "1");
        element.set_attribute("Min", "-2.5");
        element.set_attribute("Step", "5");
        element.set_attribute("AllowNull", "0");
        element.set_attribute("Map", r#"{"a":1}"#);
        element.set_attribute("Suffix", "km");

        let config = read_config_attributes(&element, &schema());
        assert_eq!(config.len(), 5);
        assert_eq!(config["Min"], json!(-2.5));
        assert_eq!(config["Step"], json!(5));
        assert_eq!(config["AllowNull"], json!(false));
        assert_eq!(config["Map"], json!({"a": 1}));
        assert_eq!(config["Suffix"], json!("km"));
    }

    #[test]
    fn test_write_skips_null_and_reserved_keys() {
        let config = WidgetConfig::from([
            ("Max".to_string(), json!(100)),
            ("labelOnTop".to_string(), json!(true)),
            ("Suffix".to_string(), Value::Null),
            ("Values".to_string(), json!(["a", "b"])),
        ]);
        let mut element = Element::new("widgetv2config");
        write_config_attributes(&config, &mut element);

        let written: Vec<(&str, &str)> = element.attributes().collect();
        assert_eq!(written, vec![("Max", "100"), ("Values", r#"["a","b"]"#)]);
    }

    #[test]
    fn test_unknown_keys_read_back_with_their_type() {
        let config = WidgetConfig::from([
            ("min".to_string(), json!(0)),
            ("ratio".to_string(), json!(0.5)),
            ("wrap".to_string(), json!(true)),
            ("tags".to_string(), json!(["a", "b"])),
            ("label".to_string(), json!("100")),
        ]);
        let mut element = Element::new("widgetv2config");
        write_config_attributes(&config, &mut element);
        assert_eq!(element.children_named(VALUE_TYPE_ELEMENT).count(), 4);

        let read = read_config_attributes(&element, &ConfigSchema::default());
        assert_eq!(read, config);
    }

    #[test]
    fn test_schema_type_wins_over_recorded_type() {
        let mut element = Element::new("widgetv2config");
        element.set_attribute("Step", "5");
        let recorded = element.append_child(Element::new(VALUE_TYPE_ELEMENT));
        recorded.set_attribute("key", "Step");
        recorded.set_attribute("type", value_types::STRING);

        let config = read_config_attributes(&element, &schema());
        assert_eq!(config["Step"], json!(5));
    }

    #[test]
    fn test_unparseable_values_are_kept_as_strings() {
        assert_eq!(parse_typed(value_types::NUMBER, "abc"), json!("abc"));
        assert_eq!(parse_typed(value_types::INTEGER, "1.5"), json!(1.5));
        assert_eq!(parse_typed(value_types::BOOLEAN, "yes"), json!("yes"));
    }
}
