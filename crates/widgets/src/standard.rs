//! Descriptor-driven factory shared by the simple widget types
//!
//! Most widget types differ only in which controls they can drive, which
//! control they create, how the control value maps to an attribute value and
//! which options they understand. Those are described once per widget type in
//! a [`WidgetDescriptor`].

use attrform_core::{
    AttributeEditorContext, BoxedEditorWrapper, BoxedSearchWrapper, ConfigSchema, ControlRef,
    DefaultSearchWrapper, EditorWidgetFactory, EditorWidgetWrapper, WrapperCore,
};
use attrform_types::{FieldDomain, VectorLayer, WidgetConfig};
use serde_json::Value;
use std::collections::HashMap;

/// How the control value maps onto the attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Text; an empty string is null
    Text,
    /// Numbers; text that does not parse is null
    Number,
    /// Checked state, optionally mapped to `CheckedState`/`UncheckedState`
    Boolean,
    /// Values are stored as they are
    Passthrough,
}

/// Where a list control gets its choices from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSource {
    None,
    /// Distinct values already present in the column
    UniqueValues,
    /// The provider's coded domain of the column
    Domain,
}

/// Everything a [`StandardWidgetFactory`] needs to know about a widget type
#[derive(Debug, Clone)]
pub struct WidgetDescriptor {
    pub widget_type: &'static str,
    pub name: &'static str,
    /// Control classes the wrapper can drive
    pub accepted: &'static [&'static str],
    /// Class of the control created when none is bound
    pub default_class: &'static str,
    /// Control classes this widget type claims, with priorities
    pub priorities: &'static [(&'static str, i32)],
    pub value_kind: ValueKind,
    pub items: ItemSource,
    pub schema: ConfigSchema,
}

/// Factory backed by a static [`WidgetDescriptor`]
pub struct StandardWidgetFactory {
    descriptor: &'static WidgetDescriptor,
}

impl StandardWidgetFactory {
    pub fn new(descriptor: &'static WidgetDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &'static WidgetDescriptor {
        self.descriptor
    }
}

impl EditorWidgetFactory for StandardWidgetFactory {
    fn name(&self) -> &str {
        self.descriptor.name
    }

    fn create(
        &self,
        layer: &VectorLayer,
        field_idx: usize,
        editor: Option<ControlRef>,
        _parent: Option<&ControlRef>,
    ) -> Option<BoxedEditorWrapper> {
        let mut core = WrapperCore::new(
            self.descriptor.widget_type,
            field_idx,
            editor,
            self.descriptor.default_class,
        );

        let items = collect_items(self.descriptor.items, layer, field_idx);
        if !items.is_empty() {
            core.widget().borrow_mut().set_items(items);
        }

        Some(Box::new(StandardWrapper {
            core,
            descriptor: self.descriptor,
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
            self.descriptor.default_class,
        )))
    }

    fn config_schema(&self) -> ConfigSchema {
        self.descriptor.schema.clone()
    }

    fn supported_widget_types(&self) -> HashMap<String, i32> {
        self.descriptor
            .priorities
            .iter()
            .map(|(class, priority)| (class.to_string(), *priority))
            .collect()
    }
}

/// Wrapper produced by [`StandardWidgetFactory`]
pub struct StandardWrapper {
    core: WrapperCore,
    descriptor: &'static WidgetDescriptor,
}

impl EditorWidgetWrapper for StandardWrapper {
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
        self.core.accepts(self.descriptor.accepted)
    }

    fn value(&self) -> Value {
        let raw = self.core.raw_value();
        match self.descriptor.value_kind {
            ValueKind::Text => match raw {
                Value::String(text) if text.is_empty() => Value::Null,
                Value::Number(number) => Value::String(number.to_string()),
                other => other,
            },
            ValueKind::Number => to_number(&raw),
            ValueKind::Boolean => {
                let checked = raw.as_bool().unwrap_or(false);
                let state_key = if checked { "CheckedState" } else { "UncheckedState" };
                match self.core.config_value(state_key).as_str() {
                    Some(state) if !state.is_empty() => Value::String(state.to_string()),
                    _ if raw.is_null() => Value::Null,
                    _ => Value::Bool(checked),
                }
            }
            ValueKind::Passthrough => raw,
        }
    }

    fn set_value(&mut self, value: &Value) {
        let control_value = match self.descriptor.value_kind {
            ValueKind::Text => match value {
                Value::Null => Value::String(String::new()),
                Value::String(_) => value.clone(),
                other => Value::String(other.to_string()),
            },
            ValueKind::Number => to_number(value),
            ValueKind::Boolean => {
                let checked_state = self.core.config_value("CheckedState").as_str();
                match value {
                    Value::Bool(flag) => Value::Bool(*flag),
                    Value::String(text) if checked_state.is_some() => {
                        Value::Bool(checked_state == Some(text.as_str()))
                    }
                    Value::String(text) => Value::Bool(matches!(
                        text.to_ascii_lowercase().as_str(),
                        "1" | "t" | "true"
                    )),
                    Value::Number(number) => Value::Bool(number.as_f64() != Some(0.0)),
                    _ => Value::Null,
                }
            }
            ValueKind::Passthrough => value.clone(),
        };
        self.core.set_raw_value(control_value);
    }
}

fn to_number(value: &Value) -> Value {
    match value {
        Value::Number(_) => value.clone(),
        Value::String(text) => {
            let trimmed = text.trim();
            if let Ok(integer) = trimmed.parse::<i64>() {
                return Value::from(integer);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

fn collect_items(source: ItemSource, layer: &VectorLayer, field_idx: usize) -> Vec<(String, Value)> {
    match source {
        ItemSource::None => Vec::new(),
        ItemSource::UniqueValues => layer
            .unique_values(field_idx, None)
            .into_iter()
            .map(|value| {
                let label = match &value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                (label, value)
            })
            .collect(),
        ItemSource::Domain => match layer.fields().get(field_idx).and_then(|field| field.domain.as_ref()) {
            Some(FieldDomain::Coded(values)) => values
                .iter()
                .map(|(code, label)| (label.clone(), Value::String(code.clone())))
                .collect(),
            _ => Vec::new(),
        },
    }
}
