//! UUID generator: read-only control that fills empty values with a new UUID

use attrform_core::{
    classes, AttributeEditorContext, BoxedEditorWrapper, ControlRef, EditorWidgetFactory,
    EditorWidgetWrapper, WrapperCore,
};
use attrform_types::{VectorLayer, WidgetConfig};
use serde_json::Value;
use uuid::Uuid;

pub const WIDGET_TYPE: &str = "UuidGenerator";

/// New UUID in braced form, e.g. `{0b5c...}`
pub fn generate() -> String {
    format!("{{{}}}", Uuid::new_v4())
}

pub struct UuidGeneratorFactory;

impl EditorWidgetFactory for UuidGeneratorFactory {
    fn name(&self) -> &str {
        "Uuid Generator"
    }

    fn create(
        &self,
        _layer: &VectorLayer,
        field_idx: usize,
        editor: Option<ControlRef>,
        _parent: Option<&ControlRef>,
    ) -> Option<BoxedEditorWrapper> {
        Some(Box::new(UuidGeneratorWrapper {
            core: WrapperCore::new(WIDGET_TYPE, field_idx, editor, classes::LINE_EDIT),
        }))
    }
}

pub struct UuidGeneratorWrapper {
    core: WrapperCore,
}

impl EditorWidgetWrapper for UuidGeneratorWrapper {
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
        let widget = self.core.widget();
        widget.borrow_mut().set_enabled(false);
        widget
    }

    fn valid(&self) -> bool {
        self.core.accepts(&[classes::LINE_EDIT, classes::LABEL])
    }

    fn value(&self) -> Value {
        self.core.raw_value()
    }

    fn set_value(&mut self, value: &Value) {
        let value = match value {
            Value::Null => Value::String(generate()),
            Value::String(text) if text.is_empty() => Value::String(generate()),
            other => other.clone(),
        };
        self.core.set_raw_value(value);
    }

    /// The value is generated, never typed
    fn set_enabled(&mut self, _enabled: bool) {
        self.widget().borrow_mut().set_enabled(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrform_types::Fields;
    use serde_json::json;

    #[test]
    fn test_empty_values_get_a_new_uuid() {
        let layer = VectorLayer::new("l", "l", Fields::new());
        let mut wrapper = UuidGeneratorFactory.create(&layer, 0, None, None).unwrap();

        wrapper.set_value(&Value::Null);
        let generated = wrapper.value();
        let text = generated.as_str().unwrap();
        assert!(text.starts_with('{') && text.ends_with('}'));
        assert!(Uuid::parse_str(&text[1..text.len() - 1]).is_ok());

        wrapper.set_value(&json!("{kept}"));
        assert_eq!(wrapper.value(), json!("{kept}"));

        wrapper.set_enabled(true);
        assert!(!wrapper.widget().borrow().is_enabled());
    }
}
