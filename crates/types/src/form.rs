//! Per-column editor widget configuration of a layer's attribute form

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Key/value configuration of an editor widget
pub type WidgetConfig = HashMap<String, Value>;

/// A widget type together with its configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorWidgetSetup {
    widget_type: String,
    #[serde(default)]
    config: WidgetConfig,
}

impl EditorWidgetSetup {
    pub fn new(widget_type: impl Into<String>, config: WidgetConfig) -> Self {
        Self {
            widget_type: widget_type.into(),
            config,
        }
    }

    /// Setup that names no widget type
    pub fn null() -> Self {
        Self::default()
    }

    pub fn widget_type(&self) -> &str {
        &self.widget_type
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn into_parts(self) -> (String, WidgetConfig) {
        (self.widget_type, self.config)
    }

    pub fn is_null(&self) -> bool {
        self.widget_type.is_empty()
    }
}

/// Form settings for one column
#[derive(Debug, Clone, Default, PartialEq)]
struct ColumnFormSettings {
    widget_type: Option<String>,
    widget_config: WidgetConfig,
    read_only: bool,
    label_on_top: bool,
}

/// Attribute form configuration of a vector layer
///
/// This is a value type: layers hand out copies and take back a complete
/// replacement, so a batch of changes is committed in one step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditFormConfig {
    columns: HashMap<String, ColumnFormSettings>,
}

impl EditFormConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicitly configured widget type, `None` when never set
    pub fn widget_type(&self, column: &str) -> Option<&str> {
        self.columns
            .get(column)
            .and_then(|settings| settings.widget_type.as_deref())
    }

    pub fn set_widget_type(&mut self, column: &str, widget_type: impl Into<String>) {
        self.column_mut(column).widget_type = Some(widget_type.into());
    }

    /// Widget configuration, empty when none was stored
    pub fn widget_config(&self, column: &str) -> WidgetConfig {
        self.columns
            .get(column)
            .map(|settings| settings.widget_config.clone())
            .unwrap_or_default()
    }

    pub fn set_widget_config(&mut self, column: &str, config: WidgetConfig) {
        self.column_mut(column).widget_config = config;
    }

    /// Set widget type and configuration in one call
    pub fn set_widget_setup(&mut self, column: &str, setup: EditorWidgetSetup) {
        let (widget_type, config) = setup.into_parts();
        let settings = self.column_mut(column);
        settings.widget_type = Some(widget_type);
        settings.widget_config = config;
    }

    /// Forget the explicit widget setup so that auto-detection applies again
    pub fn remove_widget_setup(&mut self, column: &str) {
        if let Some(settings) = self.columns.get_mut(column) {
            settings.widget_type = None;
            settings.widget_config.clear();
        }
    }

    pub fn read_only(&self, column: &str) -> bool {
        self.columns
            .get(column)
            .map(|settings| settings.read_only)
            .unwrap_or(false)
    }

    pub fn set_read_only(&mut self, column: &str, read_only: bool) {
        self.column_mut(column).read_only = read_only;
    }

    pub fn label_on_top(&self, column: &str) -> bool {
        self.columns
            .get(column)
            .map(|settings| settings.label_on_top)
            .unwrap_or(false)
    }

    pub fn set_label_on_top(&mut self, column: &str, label_on_top: bool) {
        self.column_mut(column).label_on_top = label_on_top;
    }

    /// Columns with an explicit widget type, in no particular order
    pub fn configured_columns(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .filter(|(_, settings)| settings.widget_type.is_some())
            .map(|(name, _)| name.as_str())
    }

    fn column_mut(&mut self, column: &str) -> &mut ColumnFormSettings {
        self.columns.entry(column.to_string()).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_widget_type_absent_until_set() {
        let mut config = EditFormConfig::new();
        config.set_widget_config("pop", WidgetConfig::from([("Min".to_string(), json!(0))]));
        assert_eq!(config.widget_type("pop"), None);

        config.set_widget_type("pop", "Range");
        assert_eq!(config.widget_type("pop"), Some("Range"));
        assert_eq!(config.widget_config("pop").get("Min"), Some(&json!(0)));
    }

    #[test]
    fn test_remove_widget_setup_keeps_form_flags() {
        let mut config = EditFormConfig::new();
        config.set_widget_setup("name", EditorWidgetSetup::new("TextEdit", WidgetConfig::new()));
        config.set_read_only("name", true);

        config.remove_widget_setup("name");
        assert_eq!(config.widget_type("name"), None);
        assert!(config.read_only("name"));
        assert_eq!(config.configured_columns().count(), 0);
    }

    #[test]
    fn test_null_setup() {
        assert!(EditorWidgetSetup::null().is_null());
        assert!(!EditorWidgetSetup::new("Hidden", WidgetConfig::new()).is_null());
    }
}
