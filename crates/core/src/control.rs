//! Headless editor controls
//!
//! A control carries its runtime class name and the class tags it derives
//! from, so wrappers and the registry can match controls against the classes
//! a factory declares without any runtime type introspection.

use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a control; wrappers and forms both hold one
pub type ControlRef = Rc<RefCell<Control>>;

/// Class names of the built-in controls
pub mod classes {
    pub const WIDGET: &str = "Widget";
    pub const FRAME: &str = "Frame";
    pub const SCROLL_AREA: &str = "ScrollArea";
    pub const ABSTRACT_BUTTON: &str = "AbstractButton";
    pub const ABSTRACT_SPIN_BOX: &str = "AbstractSpinBox";
    pub const ABSTRACT_SLIDER: &str = "AbstractSlider";

    pub const LABEL: &str = "Label";
    pub const LINE_EDIT: &str = "LineEdit";
    pub const TEXT_EDIT: &str = "TextEdit";
    pub const PLAIN_TEXT_EDIT: &str = "PlainTextEdit";
    pub const CHECK_BOX: &str = "CheckBox";
    pub const GROUP_BOX: &str = "GroupBox";
    pub const COMBO_BOX: &str = "ComboBox";
    pub const SPIN_BOX: &str = "SpinBox";
    pub const DOUBLE_SPIN_BOX: &str = "DoubleSpinBox";
    pub const SLIDER: &str = "Slider";
    pub const DIAL: &str = "Dial";
    pub const DATE_TIME_EDIT: &str = "DateTimeEdit";
    pub const DATE_EDIT: &str = "DateEdit";
    pub const TIME_EDIT: &str = "TimeEdit";
    pub const TOOL_BUTTON: &str = "ToolButton";
    pub const COLOR_BUTTON: &str = "ColorButton";
    pub const LIST_WIDGET: &str = "ListWidget";
    pub const TABLE_WIDGET: &str = "TableWidget";
    pub const FILE_PICKER: &str = "FilePicker";
    pub const IMAGE_VIEW: &str = "ImageView";
    pub const WEB_VIEW: &str = "WebView";

    /// Ancestor tags of a built-in class, nearest first
    pub fn ancestors_of(class: &str) -> &'static [&'static str] {
        match class {
            WIDGET => &[],
            FRAME | LINE_EDIT | COMBO_BOX | GROUP_BOX | ABSTRACT_BUTTON | ABSTRACT_SPIN_BOX
            | ABSTRACT_SLIDER | WEB_VIEW | FILE_PICKER => &[WIDGET],
            LABEL | SCROLL_AREA => &[FRAME, WIDGET],
            TEXT_EDIT | PLAIN_TEXT_EDIT | LIST_WIDGET | TABLE_WIDGET | IMAGE_VIEW => {
                &[SCROLL_AREA, FRAME, WIDGET]
            }
            CHECK_BOX | TOOL_BUTTON => &[ABSTRACT_BUTTON, WIDGET],
            COLOR_BUTTON => &[TOOL_BUTTON, ABSTRACT_BUTTON, WIDGET],
            SPIN_BOX | DOUBLE_SPIN_BOX | DATE_TIME_EDIT => &[ABSTRACT_SPIN_BOX, WIDGET],
            DATE_EDIT | TIME_EDIT => &[DATE_TIME_EDIT, ABSTRACT_SPIN_BOX, WIDGET],
            SLIDER | DIAL => &[ABSTRACT_SLIDER, WIDGET],
            _ => &[WIDGET],
        }
    }
}

/// A native editor control
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    class_name: String,
    ancestors: Vec<String>,
    value: Value,
    enabled: bool,
    items: Vec<(String, Value)>,
}

impl Control {
    /// Create a control of a built-in class, ancestors taken from the catalogue
    pub fn of_class(class_name: &str) -> Self {
        let ancestors = classes::ancestors_of(class_name)
            .iter()
            .map(|tag| tag.to_string())
            .collect();
        Self::with_ancestors(class_name, ancestors)
    }

    /// Create a control with an explicit ancestor chain (nearest first)
    pub fn with_ancestors(class_name: impl Into<String>, ancestors: Vec<String>) -> Self {
        Self {
            class_name: class_name.into(),
            ancestors,
            value: Value::Null,
            enabled: true,
            items: Vec::new(),
        }
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> ControlRef {
        Rc::new(RefCell::new(self))
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn ancestors(&self) -> &[String] {
        &self.ancestors
    }

    /// True for the control's own class and every ancestor tag
    pub fn inherits(&self, class: &str) -> bool {
        self.class_name == class || self.ancestors.iter().any(|tag| tag == class)
    }

    /// True when the control inherits any of the given classes
    pub fn inherits_any(&self, classes: &[&str]) -> bool {
        classes.iter().any(|class| self.inherits(class))
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    /// Reset the value to empty
    pub fn clear(&mut self) {
        self.value = Value::Null;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Choice items `(label, value)` of list-like controls
    pub fn items(&self) -> &[(String, Value)] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<(String, Value)>) {
        self.items = items;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalogue_ancestors() {
        let date = Control::of_class(classes::DATE_EDIT);
        assert!(date.inherits(classes::DATE_EDIT));
        assert!(date.inherits(classes::DATE_TIME_EDIT));
        assert!(date.inherits(classes::WIDGET));
        assert!(!date.inherits(classes::LINE_EDIT));
    }

    #[test]
    fn test_custom_hierarchy() {
        let control = Control::with_ancestors("PostcodeEdit", vec![classes::LINE_EDIT.into()]);
        assert!(control.inherits_any(&[classes::TEXT_EDIT, classes::LINE_EDIT]));
        assert_eq!(control.class_name(), "PostcodeEdit");
    }

    #[test]
    fn test_value_roundtrip_and_clear() {
        let handle = Control::of_class(classes::LINE_EDIT).into_ref();
        handle.borrow_mut().set_value(json!("abc"));
        assert_eq!(handle.borrow().value(), &json!("abc"));
        handle.borrow_mut().clear();
        assert!(handle.borrow().value().is_null());
    }
}
