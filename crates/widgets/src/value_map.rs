//! Value map: a combo box over a fixed label -> code table
//!
//! The table lives under the `map` config key as an ordered list of
//! single-entry `{label: code}` objects. In documents it is stored as
//! `<value key="label" value="code"/>` children of the config element.

use attrform_core::factory::{
    attribute_text, parse_typed, read_config_attributes, value_type_of, write_config_attributes,
};
use attrform_core::{
    classes, AttributeEditorContext, BoxedEditorWrapper, BoxedSearchWrapper, ConfigSchema,
    ControlRef, DefaultSearchWrapper, EditorWidgetFactory, EditorWidgetWrapper, WrapperCore,
};
use attrform_types::{Element, VectorLayer, WidgetConfig};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub const WIDGET_TYPE: &str = "ValueMap";

/// `(label, code)` pairs of a value map config, in order
pub fn entries(config: &WidgetConfig) -> Vec<(String, Value)> {
    let Some(Value::Array(map)) = config.get("map") else {
        return Vec::new();
    };
    map.iter()
        .filter_map(Value::as_object)
        .flat_map(|entry| entry.iter().map(|(label, code)| (label.clone(), code.clone())))
        .collect()
}

pub struct ValueMapFactory;

impl EditorWidgetFactory for ValueMapFactory {
    fn name(&self) -> &str {
        "Value Map"
    }

    fn create(
        &self,
        _layer: &VectorLayer,
        field_idx: usize,
        editor: Option<ControlRef>,
        _parent: Option<&ControlRef>,
    ) -> Option<BoxedEditorWrapper> {
        Some(Box::new(ValueMapWrapper {
            core: WrapperCore::new(WIDGET_TYPE, field_idx, editor, classes::COMBO_BOX),
        }))
    }

    fn create_search_widget(
        &self,
        layer: &VectorLayer,
        field_idx: usize,
        _parent: Option<&ControlRef>,
    ) -> Option<BoxedSearchWrapper> {
        Some(Box::new(DefaultSearchWrapper::with_control_class(
            layer,
            field_idx,
            classes::COMBO_BOX,
        )))
    }

    fn read_editor_config(&self, element: &Element, _layer: &VectorLayer, _field_idx: usize) -> WidgetConfig {
        let mut config = read_config_attributes(element, &ConfigSchema::default());
        let map: Vec<Value> = element
            .children_named("value")
            .map(|value| {
                let raw = value.attribute_or("value", "");
                let code = match value.attribute("type") {
                    Some(value_type) => parse_typed(value_type, raw),
                    None => Value::String(raw.to_string()),
                };
                let mut entry = Map::new();
                entry.insert(value.attribute_or("key", "").to_string(), code);
                Value::Object(entry)
            })
            .collect();
        if !map.is_empty() {
            config.insert("map".to_string(), Value::Array(map));
        }
        config
    }

    fn write_config(&self, config: &WidgetConfig, element: &mut Element, _layer: &VectorLayer, _field_idx: usize) {
        let mut scalars = config.clone();
        scalars.remove("map");
        write_config_attributes(&scalars, element);

        for (label, code) in entries(config) {
            let value = element.append_child(Element::new("value"));
            value.set_attribute("key", label);
            value.set_attribute("value", attribute_text(&code).unwrap_or_default());
            if let Some(value_type) = value_type_of(&code) {
                value.set_attribute("type", value_type);
            }
        }
    }

    fn supported_widget_types(&self) -> HashMap<String, i32> {
        HashMap::from([(classes::COMBO_BOX.to_string(), 20)])
    }
}

pub struct ValueMapWrapper {
    core: WrapperCore,
}

impl EditorWidgetWrapper for ValueMapWrapper {
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
        let items = entries(&config);
        self.core.set_config(config);
        self.core.widget().borrow_mut().set_items(items);
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
        self.core.accepts(&[classes::COMBO_BOX])
    }

    fn value(&self) -> Value {
        self.core.raw_value()
    }

    fn set_value(&mut self, value: &Value) {
        let widget = self.core.widget();
        let mut control = widget.borrow_mut();
        let known = value.is_null() || control.items().iter().any(|(_, code)| code == value);
        if !known {
            // keep values missing from the table visible
            let mut items = control.items().to_vec();
            let label = match value {
                Value::String(text) => format!("({})", text),
                other => format!("({})", other),
            };
            items.push((label, value.clone()));
            control.set_items(items);
        }
        control.set_value(value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrform_types::{Field, FieldType, Fields};
    use serde_json::json;

    fn layer() -> VectorLayer {
        let fields: Fields = vec![Field::new("kind", FieldType::String)].into_iter().collect();
        VectorLayer::new("parcels", "Parcels", fields)
    }

    fn config() -> WidgetConfig {
        WidgetConfig::from([("map".to_string(), json!([{ "Urban": "U" }, { "Rural": "R" }]))])
    }

    #[test]
    fn test_write_then_read_keeps_order() {
        let layer = layer();
        let mut element = Element::new("widgetv2config");
        element.set_attribute("fieldEditable", "1");
        ValueMapFactory.write_config(&config(), &mut element, &layer, 0);

        let keys: Vec<&str> = element
            .children_named("value")
            .filter_map(|value| value.attribute("key"))
            .collect();
        assert_eq!(keys, vec!["Urban", "Rural"]);

        let read = ValueMapFactory.read_editor_config(&element, &layer, 0);
        assert_eq!(read, config());
    }

    #[test]
    fn test_numeric_codes_keep_their_type() {
        let layer = layer();
        let config = WidgetConfig::from([("map".to_string(), json!([{ "One": 1 }, { "Half": 0.5 }, { "Two": "2" }]))]);
        let mut element = Element::new("widgetv2config");
        ValueMapFactory.write_config(&config, &mut element, &layer, 0);

        let read = ValueMapFactory.read_editor_config(&element, &layer, 0);
        assert_eq!(read, config);
    }

    #[test]
    fn test_empty_config_reads_back_empty() {
        let layer = layer();
        let mut element = Element::new("widgetv2config");
        ValueMapFactory.write_config(&WidgetConfig::new(), &mut element, &layer, 0);

        assert!(ValueMapFactory.read_editor_config(&element, &layer, 0).is_empty());
    }

    #[test]
    fn test_wrapper_lists_entries_and_keeps_unknown_values() {
        let mut wrapper = ValueMapFactory.create(&layer(), 0, None, None).unwrap();
        wrapper.set_config(config());
        assert_eq!(wrapper.widget().borrow().items().len(), 2);

        wrapper.set_value(&json!("R"));
        assert_eq!(wrapper.value(), json!("R"));

        wrapper.set_value(&json!("X"));
        assert_eq!(wrapper.value(), json!("X"));
        assert_eq!(
            wrapper.widget().borrow().items().last(),
            Some(&("(X)".to_string(), json!("X")))
        );
    }
}
