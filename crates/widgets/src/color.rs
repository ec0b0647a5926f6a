//! Color picker bound to a text column holding hex colors

use attrform_core::{
    classes, AttributeEditorContext, BoxedEditorWrapper, ControlRef, EditorWidgetFactory,
    EditorWidgetWrapper, WrapperCore,
};
use attrform_types::{Color, VectorLayer, WidgetConfig};
use serde_json::Value;
use std::collections::HashMap;

pub const WIDGET_TYPE: &str = "Color";

pub struct ColorFactory;

impl EditorWidgetFactory for ColorFactory {
    fn name(&self) -> &str {
        "Color"
    }

    fn create(
        &self,
        _layer: &VectorLayer,
        field_idx: usize,
        editor: Option<ControlRef>,
        _parent: Option<&ControlRef>,
    ) -> Option<BoxedEditorWrapper> {
        Some(Box::new(ColorWrapper {
            core: WrapperCore::new(WIDGET_TYPE, field_idx, editor, classes::COLOR_BUTTON),
        }))
    }

    fn supported_widget_types(&self) -> HashMap<String, i32> {
        HashMap::from([(classes::COLOR_BUTTON.to_string(), 20)])
    }
}

pub struct ColorWrapper {
    core: WrapperCore,
}

impl EditorWidgetWrapper for ColorWrapper {
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
        self.core.accepts(&[classes::COLOR_BUTTON])
    }

    fn value(&self) -> Value {
        self.core.raw_value()
    }

    fn set_value(&mut self, value: &Value) {
        let color = value.as_str().and_then(Color::from_hex);
        if color.is_none() && !value.is_null() {
            log::debug!("Ignoring invalid color value {}", value);
        }
        self.core
            .set_raw_value(color.map_or(Value::Null, |color| Value::String(color.to_hex())));
    }
}
