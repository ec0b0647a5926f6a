//! Mock factories and fixtures shared by the crate's tests

use crate::autoconf::{DefaultAutoConf, EditorWidgetAutoConf};
use crate::config_widget::{value_types, ConfigOption, ConfigSchema};
use crate::context::AttributeEditorContext;
use crate::control::{classes, ControlRef};
use crate::factory::EditorWidgetFactory;
use crate::registry::EditorWidgetRegistry;
use crate::wrapper::{BoxedEditorWrapper, EditorWidgetWrapper, WrapperCore};
use attrform_types::{EditorWidgetSetup, Field, FieldType, Fields, VectorLayer, WidgetConfig};
use serde_json::{json, Value};
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

pub struct MockFactory {
    name: String,
    widget_type: String,
    accepted: Vec<&'static str>,
    default_class: &'static str,
    supported: Vec<(&'static str, i32)>,
    schema: ConfigSchema,
    drops: Option<Rc<Cell<usize>>>,
}

impl MockFactory {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            widget_type: name.to_string(),
            accepted: vec![classes::WIDGET],
            default_class: classes::LINE_EDIT,
            supported: Vec::new(),
            schema: ConfigSchema::default(),
            drops: None,
        }
    }

    pub fn widget_type(mut self, widget_type: &str) -> Self {
        self.widget_type = widget_type.to_string();
        self
    }

    pub fn supports(mut self, class: &'static str, priority: i32) -> Self {
        self.supported.push((class, priority));
        self
    }

    pub fn accepts(mut self, accepted: Vec<&'static str>, default_class: &'static str) -> Self {
        self.accepted = accepted;
        self.default_class = default_class;
        self
    }

    pub fn schema(mut self, schema: ConfigSchema) -> Self {
        self.schema = schema;
        self
    }

    pub fn count_drops(mut self, drops: &Rc<Cell<usize>>) -> Self {
        self.drops = Some(Rc::clone(drops));
        self
    }
}

impl Drop for MockFactory {
    fn drop(&mut self) {
        if let Some(drops) = &self.drops {
            drops.set(drops.get() + 1);
        }
    }
}

impl EditorWidgetFactory for MockFactory {
    fn name(&self) -> &str {
        &self.name
    }

    fn create(
        &self,
        _layer: &VectorLayer,
        field_idx: usize,
        editor: Option<ControlRef>,
        _parent: Option<&ControlRef>,
    ) -> Option<BoxedEditorWrapper> {
        Some(Box::new(MockWrapper {
            core: WrapperCore::new(self.widget_type.as_str(), field_idx, editor, self.default_class),
            accepted: self.accepted.clone(),
        }))
    }

    fn config_schema(&self) -> ConfigSchema {
        self.schema.clone()
    }

    fn supported_widget_types(&self) -> HashMap<String, i32> {
        self.supported
            .iter()
            .map(|(class, priority)| (class.to_string(), *priority))
            .collect()
    }
}

pub struct MockWrapper {
    core: WrapperCore,
    accepted: Vec<&'static str>,
}

impl EditorWidgetWrapper for MockWrapper {
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
        self.core.accepts(&self.accepted)
    }

    fn value(&self) -> Value {
        self.core.raw_value()
    }

    fn set_value(&mut self, value: &Value) {
        self.core.set_raw_value(value.clone());
    }
}

/// Always suggests the same widget type for existing columns
pub struct FixedAutoConf(pub &'static str);

impl EditorWidgetAutoConf for FixedAutoConf {
    fn editor_widget_setup(&self, layer: &VectorLayer, field_name: &str) -> EditorWidgetSetup {
        match layer.fields().lookup_field(field_name) {
            Some(_) => EditorWidgetSetup::new(self.0, WidgetConfig::new()),
            None => EditorWidgetSetup::null(),
        }
    }
}

/// Register TextEdit, Range, CheckBox and Hidden mocks
pub fn register_mocks(registry: &EditorWidgetRegistry) {
    let text = MockFactory::new("Text Edit")
        .widget_type("TextEdit")
        .accepts(
            vec![classes::LINE_EDIT, classes::TEXT_EDIT, classes::PLAIN_TEXT_EDIT],
            classes::LINE_EDIT,
        )
        .supports(classes::LINE_EDIT, 10)
        .supports(classes::TEXT_EDIT, 10)
        .supports(classes::PLAIN_TEXT_EDIT, 10);

    let range = MockFactory::new("Range")
        .accepts(
            vec![classes::ABSTRACT_SPIN_BOX, classes::ABSTRACT_SLIDER],
            classes::SPIN_BOX,
        )
        .supports(classes::SPIN_BOX, 10)
        .supports(classes::DOUBLE_SPIN_BOX, 10)
        .supports(classes::SLIDER, 10)
        .schema(ConfigSchema::new(vec![
            ConfigOption::new("Min", "Minimum", value_types::NUMBER, json!(0)),
            ConfigOption::new("Max", "Maximum", value_types::NUMBER, json!(100)),
        ]));

    let check = MockFactory::new("Checkbox")
        .widget_type("CheckBox")
        .accepts(vec![classes::CHECK_BOX], classes::CHECK_BOX)
        .supports(classes::CHECK_BOX, 10);

    let hidden = MockFactory::new("Hidden").accepts(vec![classes::WIDGET], classes::WIDGET);

    for (id, factory) in [("TextEdit", text), ("Range", range), ("CheckBox", check), ("Hidden", hidden)] {
        if let Err(error) = registry.register_widget(id, Box::new(factory)) {
            panic!("mock registration failed: {error}");
        }
    }
}

pub fn registry() -> Rc<EditorWidgetRegistry> {
    let registry = EditorWidgetRegistry::new(Box::new(DefaultAutoConf::new()));
    register_mocks(&registry);
    registry
}

/// `cities` layer: name (string), population (integer), visited (boolean)
pub fn layer() -> VectorLayer {
    let fields: Fields = vec![
        Field::new("name", FieldType::String),
        Field::new("population", FieldType::Integer),
        Field::new("visited", FieldType::Boolean),
    ]
    .into_iter()
    .collect();
    VectorLayer::new("cities", "Cities", fields)
}
