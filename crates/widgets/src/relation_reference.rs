//! Relation reference: picks the referenced feature of a relation
//!
//! The factory keeps the map canvas and message bar it was registered with.
//! Wrappers use the collaborators of their form context and fall back to
//! those when the context has none.

use attrform_core::config_widget::value_types;
use attrform_core::{
    classes, AttributeEditorContext, BoxedEditorWrapper, ConfigOption, ConfigSchema, ControlRef,
    EditorWidgetFactory, EditorWidgetWrapper, MapCanvas, MessageBar, MessageLevel, WrapperCore,
};
use attrform_types::{VectorLayer, WidgetConfig};
use serde_json::{json, Value};
use std::rc::Rc;

pub const WIDGET_TYPE: &str = "RelationReference";

pub struct RelationReferenceFactory {
    map_canvas: Option<Rc<dyn MapCanvas>>,
    message_bar: Option<Rc<dyn MessageBar>>,
}

impl RelationReferenceFactory {
    pub fn new(map_canvas: Option<Rc<dyn MapCanvas>>, message_bar: Option<Rc<dyn MessageBar>>) -> Self {
        Self {
            map_canvas,
            message_bar,
        }
    }
}

impl EditorWidgetFactory for RelationReferenceFactory {
    fn name(&self) -> &str {
        "Relation Reference"
    }

    fn create(
        &self,
        layer: &VectorLayer,
        field_idx: usize,
        editor: Option<ControlRef>,
        _parent: Option<&ControlRef>,
    ) -> Option<BoxedEditorWrapper> {
        let referenced_layer = layer
            .fields()
            .field_name(field_idx)
            .and_then(|column| layer.referencing_relations(column).next())
            .map(|relation| relation.referenced_layer_id.clone());

        Some(Box::new(RelationReferenceWrapper {
            core: WrapperCore::new(WIDGET_TYPE, field_idx, editor, classes::COMBO_BOX),
            referenced_layer,
            map_canvas: self.map_canvas.clone(),
            message_bar: self.message_bar.clone(),
        }))
    }

    fn config_schema(&self) -> ConfigSchema {
        ConfigSchema::new(vec![
            ConfigOption::new("Relation", "Relation", value_types::STRING, Value::Null),
            ConfigOption::new("AllowNULL", "Allow NULL", value_types::BOOLEAN, json!(false)),
            ConfigOption::new("ShowForm", "Show embedded form", value_types::BOOLEAN, json!(false)),
            ConfigOption::new("MapIdentification", "On map identification", value_types::BOOLEAN, json!(false)),
            ConfigOption::new("ReadOnly", "Read only", value_types::BOOLEAN, json!(false)),
        ])
    }
}

pub struct RelationReferenceWrapper {
    core: WrapperCore,
    referenced_layer: Option<String>,
    map_canvas: Option<Rc<dyn MapCanvas>>,
    message_bar: Option<Rc<dyn MessageBar>>,
}

impl RelationReferenceWrapper {
    /// Canvas of the form context, else the one given at registration
    pub fn map_canvas(&self) -> Option<Rc<dyn MapCanvas>> {
        self.core
            .context()
            .map_canvas()
            .cloned()
            .or_else(|| self.map_canvas.clone())
    }

    /// Message bar of the form context, else the one given at registration
    pub fn message_bar(&self) -> Option<Rc<dyn MessageBar>> {
        self.core
            .context()
            .message_bar()
            .cloned()
            .or_else(|| self.message_bar.clone())
    }

    /// Zoom the canvas to the currently referenced feature.
    ///
    /// Returns false when there is nothing to zoom to.
    pub fn zoom_to_referenced(&self) -> bool {
        let Some(layer_id) = &self.referenced_layer else {
            return false;
        };
        let Some(feature_id) = self.core.raw_value().as_i64() else {
            return false;
        };
        match self.map_canvas() {
            Some(canvas) => {
                canvas.zoom_to_feature(layer_id, feature_id);
                true
            }
            None => {
                if let Some(bar) = self.message_bar() {
                    bar.push_message("Relation reference", "No map canvas available", MessageLevel::Warning);
                }
                false
            }
        }
    }

    fn allow_null(&self) -> bool {
        self.core.config_value("AllowNULL").as_bool().unwrap_or(false)
    }
}

impl EditorWidgetWrapper for RelationReferenceWrapper {
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
        self.core.accepts(&[classes::COMBO_BOX])
    }

    fn value(&self) -> Value {
        self.core.raw_value()
    }

    fn set_value(&mut self, value: &Value) {
        if value.is_null() && !self.allow_null() {
            log::debug!("NULL not allowed for relation reference of field {}", self.core.field_index());
        }
        self.core.set_raw_value(value.clone());
    }
}
