//! Editor wrapper trait and shared wrapper state

use crate::context::AttributeEditorContext;
use crate::control::{Control, ControlRef};
use attrform_types::WidgetConfig;
use serde_json::Value;

/// Binds a native control to a column and gets/sets its value
pub trait EditorWidgetWrapper {
    /// Widget type id of the factory that built this wrapper
    fn widget_type(&self) -> &str;

    /// Column index the wrapper edits
    fn field_index(&self) -> usize;

    fn config(&self) -> &WidgetConfig;

    fn set_config(&mut self, config: WidgetConfig);

    fn context(&self) -> &AttributeEditorContext;

    fn set_context(&mut self, context: AttributeEditorContext);

    /// The wrapped control, created on first access
    fn widget(&mut self) -> ControlRef;

    /// Whether this wrapper can drive the control it was given
    fn valid(&self) -> bool;

    fn value(&self) -> Value;

    fn set_value(&mut self, value: &Value);

    fn set_enabled(&mut self, enabled: bool) {
        self.widget().borrow_mut().set_enabled(enabled);
    }
}

/// Type-erased wrapper for dynamic dispatch
pub type BoxedEditorWrapper = Box<dyn EditorWidgetWrapper>;

/// State every wrapper carries: identity, bound control, config and context
#[derive(Debug)]
pub struct WrapperCore {
    widget_type: String,
    field_idx: usize,
    editor: Option<ControlRef>,
    default_class: String,
    config: WidgetConfig,
    context: AttributeEditorContext,
}

impl WrapperCore {
    /// `default_class` is the control class created when no editor was bound
    pub fn new(
        widget_type: impl Into<String>,
        field_idx: usize,
        editor: Option<ControlRef>,
        default_class: impl Into<String>,
    ) -> Self {
        Self {
            widget_type: widget_type.into(),
            field_idx,
            editor,
            default_class: default_class.into(),
            config: WidgetConfig::new(),
            context: AttributeEditorContext::default(),
        }
    }

    pub fn widget_type(&self) -> &str {
        &self.widget_type
    }

    pub fn field_index(&self) -> usize {
        self.field_idx
    }

    /// Bound control, if one exists yet
    pub fn editor(&self) -> Option<&ControlRef> {
        self.editor.as_ref()
    }

    /// Bound control, creating one of the default class when missing
    pub fn widget(&mut self) -> ControlRef {
        let default_class = &self.default_class;
        self.editor
            .get_or_insert_with(|| Control::of_class(default_class).into_ref())
            .clone()
    }

    /// A wrapper that creates its own control is always valid; a bound
    /// control must inherit one of the accepted classes
    pub fn accepts(&self, accepted: &[&str]) -> bool {
        match &self.editor {
            Some(editor) => editor.borrow().inherits_any(accepted),
            None => true,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: WidgetConfig) {
        self.config = config;
    }

    /// Config entry, `Null` when absent
    pub fn config_value(&self, key: &str) -> &Value {
        self.config.get(key).unwrap_or(&Value::Null)
    }

    pub fn context(&self) -> &AttributeEditorContext {
        &self.context
    }

    pub fn set_context(&mut self, context: AttributeEditorContext) {
        self.context = context;
    }

    /// Current control value, `Null` when no control exists
    pub fn raw_value(&self) -> Value {
        self.editor
            .as_ref()
            .map(|editor| editor.borrow().value().clone())
            .unwrap_or(Value::Null)
    }

    pub fn set_raw_value(&mut self, value: Value) {
        self.widget().borrow_mut().set_value(value);
    }
}
