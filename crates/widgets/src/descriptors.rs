//! Descriptors of the widget types built on [`StandardWidgetFactory`]
//!
//! [`StandardWidgetFactory`]: crate::StandardWidgetFactory

use crate::standard::{ItemSource, ValueKind, WidgetDescriptor};
use attrform_core::config_widget::value_types;
use attrform_core::{classes, ConfigOption, ConfigSchema};
use once_cell::sync::Lazy;
use serde_json::{json, Value};

pub static TEXT_EDIT: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "TextEdit",
    name: "Text Edit",
    accepted: &[classes::LINE_EDIT, classes::TEXT_EDIT, classes::PLAIN_TEXT_EDIT],
    default_class: classes::LINE_EDIT,
    priorities: &[
        (classes::LINE_EDIT, 10),
        (classes::TEXT_EDIT, 10),
        (classes::PLAIN_TEXT_EDIT, 10),
    ],
    value_kind: ValueKind::Text,
    items: ItemSource::None,
    schema: ConfigSchema::new(vec![
        ConfigOption::new("IsMultiline", "Multiline", value_types::BOOLEAN, json!(false)),
        ConfigOption::new("UseHtml", "HTML", value_types::BOOLEAN, json!(false))
            .describe("Render the value as HTML; only used with multiline"),
    ]),
});

pub static CLASSIFICATION: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "Classification",
    name: "Classification",
    accepted: &[classes::COMBO_BOX],
    default_class: classes::COMBO_BOX,
    priorities: &[],
    value_kind: ValueKind::Passthrough,
    items: ItemSource::UniqueValues,
    schema: ConfigSchema::default(),
});

pub static RANGE: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "Range",
    name: "Range",
    accepted: &[classes::SPIN_BOX, classes::DOUBLE_SPIN_BOX, classes::SLIDER, classes::DIAL],
    default_class: classes::DOUBLE_SPIN_BOX,
    priorities: &[
        (classes::SPIN_BOX, 20),
        (classes::DOUBLE_SPIN_BOX, 20),
        (classes::SLIDER, 20),
        (classes::DIAL, 20),
    ],
    value_kind: ValueKind::Number,
    items: ItemSource::None,
    schema: ConfigSchema::new(vec![
        ConfigOption::new("Min", "Minimum", value_types::NUMBER, Value::Null),
        ConfigOption::new("Max", "Maximum", value_types::NUMBER, Value::Null),
        ConfigOption::new("Step", "Step", value_types::NUMBER, json!(1)),
        ConfigOption::new("Precision", "Precision", value_types::INTEGER, Value::Null),
        ConfigOption::new("AllowNull", "Allow NULL", value_types::BOOLEAN, json!(true)),
        ConfigOption::new("Suffix", "Suffix", value_types::STRING, Value::Null),
        ConfigOption::new("Style", "Style", value_types::STRING, json!("SpinBox"))
            .describe("SpinBox, Slider or Dial"),
    ]),
});

pub static UNIQUE_VALUES: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "UniqueValues",
    name: "Unique Values",
    accepted: &[classes::COMBO_BOX, classes::LINE_EDIT],
    default_class: classes::COMBO_BOX,
    priorities: &[],
    value_kind: ValueKind::Text,
    items: ItemSource::UniqueValues,
    schema: ConfigSchema::new(vec![ConfigOption::new(
        "Editable",
        "Editable",
        value_types::BOOLEAN,
        json!(false),
    )
    .describe("Allow values not yet present in the column")]),
});

pub static FILE_NAME: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "FileName",
    name: "File Name",
    accepted: &[classes::FILE_PICKER, classes::LINE_EDIT],
    default_class: classes::FILE_PICKER,
    priorities: &[],
    value_kind: ValueKind::Text,
    items: ItemSource::None,
    schema: file_options(),
});

pub static ENUMERATION: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "Enumeration",
    name: "Enumeration",
    accepted: &[classes::COMBO_BOX],
    default_class: classes::COMBO_BOX,
    priorities: &[],
    value_kind: ValueKind::Text,
    items: ItemSource::Domain,
    schema: ConfigSchema::default(),
});

pub static HIDDEN: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "Hidden",
    name: "Hidden",
    accepted: &[classes::WIDGET],
    default_class: classes::WIDGET,
    priorities: &[],
    value_kind: ValueKind::Passthrough,
    items: ItemSource::None,
    schema: ConfigSchema::default(),
});

pub static CHECK_BOX: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "CheckBox",
    name: "Checkbox",
    accepted: &[classes::CHECK_BOX, classes::GROUP_BOX],
    default_class: classes::CHECK_BOX,
    priorities: &[(classes::CHECK_BOX, 20), (classes::GROUP_BOX, 10)],
    value_kind: ValueKind::Boolean,
    items: ItemSource::None,
    schema: ConfigSchema::new(vec![
        ConfigOption::new("CheckedState", "Checked state", value_types::STRING, Value::Null),
        ConfigOption::new("UncheckedState", "Unchecked state", value_types::STRING, Value::Null),
    ]),
});

pub static VALUE_RELATION: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "ValueRelation",
    name: "Value Relation",
    accepted: &[classes::COMBO_BOX, classes::LIST_WIDGET],
    default_class: classes::COMBO_BOX,
    priorities: &[],
    value_kind: ValueKind::Passthrough,
    items: ItemSource::None,
    schema: ConfigSchema::new(vec![
        ConfigOption::new("Layer", "Layer", value_types::STRING, Value::Null),
        ConfigOption::new("Key", "Key column", value_types::STRING, Value::Null),
        ConfigOption::new("Value", "Value column", value_types::STRING, Value::Null),
        ConfigOption::new("AllowMulti", "Allow multiple", value_types::BOOLEAN, json!(false)),
        ConfigOption::new("AllowNull", "Allow NULL", value_types::BOOLEAN, json!(false)),
        ConfigOption::new("OrderByValue", "Order by value", value_types::BOOLEAN, json!(false)),
        ConfigOption::new("FilterExpression", "Filter expression", value_types::STRING, Value::Null),
    ]),
});

pub static PHOTO: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "Photo",
    name: "Photo",
    accepted: &[classes::IMAGE_VIEW, classes::LINE_EDIT],
    default_class: classes::IMAGE_VIEW,
    priorities: &[(classes::IMAGE_VIEW, 10)],
    value_kind: ValueKind::Text,
    items: ItemSource::None,
    schema: size_options(),
});

#[cfg(feature = "webview")]
pub static WEB_VIEW: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "WebView",
    name: "Web View",
    accepted: &[classes::WEB_VIEW, classes::LINE_EDIT],
    default_class: classes::WEB_VIEW,
    priorities: &[(classes::WEB_VIEW, 10)],
    value_kind: ValueKind::Text,
    items: ItemSource::None,
    schema: size_options(),
});

pub static EXTERNAL_RESOURCE: Lazy<WidgetDescriptor> = Lazy::new(|| {
    let mut schema = file_options();
    schema.options.extend([
        ConfigOption::new("FileWidget", "Show file picker", value_types::BOOLEAN, json!(true)),
        ConfigOption::new("UseLink", "Show as link", value_types::BOOLEAN, json!(false)),
        ConfigOption::new("FullUrl", "Full URL", value_types::BOOLEAN, json!(false)),
        ConfigOption::new("DocumentViewer", "Document viewer", value_types::INTEGER, json!(0))
            .describe("0: none, 1: image, 2: web"),
    ]);
    WidgetDescriptor {
        widget_type: "ExternalResource",
        name: "Attachment",
        accepted: &[classes::FILE_PICKER, classes::LINE_EDIT],
        default_class: classes::FILE_PICKER,
        priorities: &[(classes::FILE_PICKER, 10)],
        value_kind: ValueKind::Text,
        items: ItemSource::None,
        schema,
    }
});

pub static KEY_VALUE: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "KeyValue",
    name: "Key/Value",
    accepted: &[classes::TABLE_WIDGET],
    default_class: classes::TABLE_WIDGET,
    priorities: &[(classes::TABLE_WIDGET, 10)],
    value_kind: ValueKind::Passthrough,
    items: ItemSource::None,
    schema: ConfigSchema::default(),
});

pub static LIST: Lazy<WidgetDescriptor> = Lazy::new(|| WidgetDescriptor {
    widget_type: "List",
    name: "List",
    accepted: &[classes::LIST_WIDGET],
    default_class: classes::LIST_WIDGET,
    priorities: &[(classes::LIST_WIDGET, 10)],
    value_kind: ValueKind::Passthrough,
    items: ItemSource::None,
    schema: ConfigSchema::default(),
});

fn file_options() -> ConfigSchema {
    ConfigSchema::new(vec![
        ConfigOption::new("DefaultRoot", "Default path", value_types::STRING, Value::Null),
        ConfigOption::new("StorageMode", "Storage mode", value_types::STRING, json!("Files"))
            .describe("Files or Directory"),
        ConfigOption::new("RelativeStorage", "Relative paths", value_types::INTEGER, json!(0))
            .describe("0: absolute, 1: relative to project, 2: relative to default path"),
    ])
}

fn size_options() -> ConfigSchema {
    ConfigSchema::new(vec![
        ConfigOption::new("Width", "Width", value_types::INTEGER, json!(0)),
        ConfigOption::new("Height", "Height", value_types::INTEGER, json!(0)),
    ])
}
