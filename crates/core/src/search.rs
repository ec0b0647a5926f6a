//! Search/filter wrappers

use crate::context::AttributeEditorContext;
use crate::control::{classes, ControlRef};
use crate::wrapper::WrapperCore;
use attrform_types::{FieldType, VectorLayer, WidgetConfig};
use serde_json::Value;

/// Binds a control to a column for building filter expressions
pub trait SearchWidgetWrapper {
    fn field_index(&self) -> usize;

    fn set_config(&mut self, config: WidgetConfig);

    fn set_context(&mut self, context: AttributeEditorContext);

    /// The wrapped control, created on first access
    fn widget(&mut self) -> ControlRef;

    /// Reset the control to its empty state
    fn clear_widget(&mut self);

    /// Filter expression for the current value, `None` when nothing is entered
    fn expression(&self) -> Option<String>;
}

/// Type-erased search wrapper for dynamic dispatch
pub type BoxedSearchWrapper = Box<dyn SearchWidgetWrapper>;

/// Quote a column name for use in an expression
pub fn quoted_column(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a value for use in an expression
pub fn quoted_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(number) => number.to_string(),
        Value::String(text) => format!("'{}'", text.replace('\'', "''")),
        other => format!("'{}'", other.to_string().replace('\'', "''")),
    }
}

/// Search wrapper used by factories without a dedicated one
///
/// Text columns match case-insensitively on a substring, every other
/// column type matches on equality.
#[derive(Debug)]
pub struct DefaultSearchWrapper {
    core: WrapperCore,
    column: String,
    text_search: bool,
}

impl DefaultSearchWrapper {
    pub fn new(layer: &VectorLayer, field_idx: usize) -> Self {
        Self::with_control_class(layer, field_idx, classes::LINE_EDIT)
    }

    pub fn with_control_class(layer: &VectorLayer, field_idx: usize, class: &str) -> Self {
        let field = layer.fields().get(field_idx);
        Self {
            core: WrapperCore::new("", field_idx, None, class),
            column: field.map(|field| field.name.clone()).unwrap_or_default(),
            text_search: field.is_some_and(|field| field.field_type == FieldType::String),
        }
    }
}

impl SearchWidgetWrapper for DefaultSearchWrapper {
    fn field_index(&self) -> usize {
        self.core.field_index()
    }

    fn set_config(&mut self, config: WidgetConfig) {
        self.core.set_config(config);
    }

    fn set_context(&mut self, context: AttributeEditorContext) {
        self.core.set_context(context);
    }

    fn widget(&mut self) -> ControlRef {
        self.core.widget()
    }

    fn clear_widget(&mut self) {
        self.core.widget().borrow_mut().clear();
    }

    fn expression(&self) -> Option<String> {
        let value = self.core.raw_value();
        let column = quoted_column(&self.column);
        match &value {
            Value::Null => None,
            Value::String(text) if text.is_empty() => None,
            Value::String(text) if self.text_search => {
                let pattern = format!("%{}%", text.replace('%', "\\%").replace('_', "\\_"));
                Some(format!("{} ILIKE {}", column, quoted_value(&Value::String(pattern))))
            }
            _ => Some(format!("{} = {}", column, quoted_value(&value))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrform_types::{Field, Fields};
    use serde_json::json;

    fn layer() -> VectorLayer {
        let fields: Fields = vec![
            Field::new("name", FieldType::String),
            Field::new("pop\"2020", FieldType::Integer),
        ]
        .into_iter()
        .collect();
        VectorLayer::new("cities", "cities", fields)
    }

    #[test]
    fn test_quoting() {
        assert_eq!(quoted_column("a\"b"), "\"a\"\"b\"");
        assert_eq!(quoted_value(&json!("O'Brien")), "'O''Brien'");
        assert_eq!(quoted_value(&json!(3.5)), "3.5");
        assert_eq!(quoted_value(&json!(null)), "NULL");
    }

    #[test]
    fn test_text_column_uses_ilike() {
        let layer = layer();
        let mut wrapper = DefaultSearchWrapper::new(&layer, 0);
        assert_eq!(wrapper.expression(), None);

        wrapper.widget().borrow_mut().set_value(json!("ber"));
        assert_eq!(wrapper.expression().as_deref(), Some("\"name\" ILIKE '%ber%'"));
    }

    #[test]
    fn test_numeric_column_uses_equality_and_clears() {
        let layer = layer();
        let mut wrapper = DefaultSearchWrapper::new(&layer, 1);
        wrapper.widget().borrow_mut().set_value(json!(5000));
        assert_eq!(wrapper.expression().as_deref(), Some("\"pop\"\"2020\" = 5000"));

        wrapper.clear_widget();
        assert_eq!(wrapper.expression(), None);
    }
}
