//! Configuration controls and the option schema they present

use crate::control::{classes, Control, ControlRef};
use attrform_types::WidgetConfig;
use serde_json::Value;

/// Value types understood by schema-driven configuration
pub mod value_types {
    pub const STRING: &str = "string";
    pub const INTEGER: &str = "integer";
    pub const NUMBER: &str = "number";
    pub const BOOLEAN: &str = "boolean";
    /// Arbitrary JSON, stored as JSON text
    pub const JSON: &str = "json";
}

/// Configuration schema for a widget option
#[derive(Debug, Clone)]
pub struct ConfigOption {
    /// Option key
    pub key: String,
    /// Human-readable name
    pub name: String,
    /// Description
    pub description: String,
    /// Value type, one of [`value_types`]
    pub value_type: String,
    /// Default value
    pub default: Value,
}

impl ConfigOption {
    pub fn new(key: &str, name: &str, value_type: &str, default: Value) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            description: String::new(),
            value_type: value_type.to_string(),
            default,
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// Configuration schema for a widget type
#[derive(Debug, Clone, Default)]
pub struct ConfigSchema {
    /// Available configuration options
    pub options: Vec<ConfigOption>,
}

impl ConfigSchema {
    pub fn new(options: Vec<ConfigOption>) -> Self {
        Self { options }
    }

    pub fn option(&self, key: &str) -> Option<&ConfigOption> {
        self.options.iter().find(|option| option.key == key)
    }

    /// Config holding every option at its default value
    pub fn defaults(&self) -> WidgetConfig {
        self.options
            .iter()
            .filter(|option| !option.default.is_null())
            .map(|option| (option.key.clone(), option.default.clone()))
            .collect()
    }
}

/// Control used to edit a widget configuration
pub trait ConfigWidget {
    /// Current configuration as edited
    fn config(&self) -> WidgetConfig;

    fn set_config(&mut self, config: &WidgetConfig);

    /// Column index the configuration belongs to
    fn field_index(&self) -> usize;

    /// The container control, created on first access
    fn widget(&mut self) -> ControlRef;
}

/// Type-erased configuration control
pub type BoxedConfigWidget = Box<dyn ConfigWidget>;

/// Configuration control generated from a [`ConfigSchema`]
#[derive(Debug)]
pub struct SchemaConfigWidget {
    schema: ConfigSchema,
    values: WidgetConfig,
    field_idx: usize,
    container: Option<ControlRef>,
}

impl SchemaConfigWidget {
    pub fn new(schema: ConfigSchema, field_idx: usize) -> Self {
        Self {
            schema,
            values: WidgetConfig::new(),
            field_idx,
            container: None,
        }
    }

    pub fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    /// Edit one option; keys unknown to the schema are ignored
    pub fn set_option(&mut self, key: &str, value: Value) -> bool {
        if self.schema.option(key).is_none() {
            log::debug!("Ignoring unknown config option '{}'", key);
            return false;
        }
        self.values.insert(key.to_string(), value);
        true
    }
}

impl ConfigWidget for SchemaConfigWidget {
    fn config(&self) -> WidgetConfig {
        let mut config = self.schema.defaults();
        config.extend(self.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        config
    }

    fn set_config(&mut self, config: &WidgetConfig) {
        self.values = config.clone();
    }

    fn field_index(&self) -> usize {
        self.field_idx
    }

    fn widget(&mut self) -> ControlRef {
        let options = &self.schema.options;
        self.container
            .get_or_insert_with(|| {
                let mut container = Control::of_class(classes::FRAME);
                container.set_items(
                    options
                        .iter()
                        .map(|option| (option.name.clone(), Value::String(option.key.clone())))
                        .collect(),
                );
                container.into_ref()
            })
            .clone()
    }
}
