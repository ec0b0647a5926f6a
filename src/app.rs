//! Wiring of the registry, the built-in widgets and a project

use crate::config::Settings;
use attrform_core::{DefaultAutoConf, EditorWidgetRegistry, MapCanvas, MessageBar, MessageLevel, Project};
use attrform_types::WidgetConfig;
use std::rc::Rc;

/// Message bar that forwards messages to the log
#[derive(Debug, Default)]
pub struct LogMessageBar;

impl MessageBar for LogMessageBar {
    fn push_message(&self, title: &str, text: &str, level: MessageLevel) {
        match level {
            MessageLevel::Critical => log::error!("{}: {}", title, text),
            MessageLevel::Warning => log::warn!("{}: {}", title, text),
            MessageLevel::Info | MessageLevel::Success => log::info!("{}: {}", title, text),
        }
    }
}

/// Create the registry for `project` and register the built-in widgets
pub fn build_registry(
    project: &mut Project,
    settings: &Settings,
    map_canvas: Option<Rc<dyn MapCanvas>>,
    message_bar: Option<Rc<dyn MessageBar>>,
) -> Rc<EditorWidgetRegistry> {
    let registry = EditorWidgetRegistry::with_project(project, Box::new(DefaultAutoConf::new()));
    registry.set_fallback_widget(settings.fallback_widget.as_str());
    attrform_widgets::register_all(
        &registry,
        map_canvas,
        message_bar,
        &settings.registration_options(),
    );
    registry
}

/// A registered widget type and the control classes it claims
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetInfo {
    pub id: String,
    pub name: String,
    /// `(control class, priority)`, sorted by class
    pub classes: Vec<(String, i32)>,
}

pub fn widget_catalog(registry: &EditorWidgetRegistry) -> Vec<WidgetInfo> {
    registry
        .factories()
        .iter()
        .map(|(id, factory)| {
            let mut classes: Vec<(String, i32)> = factory.supported_widget_types().into_iter().collect();
            classes.sort();
            WidgetInfo {
                id: id.clone(),
                name: factory.name().to_string(),
                classes,
            }
        })
        .collect()
}

/// Effective widget setup of one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReport {
    pub layer_id: String,
    pub column: String,
    pub widget_type: String,
    /// Set in the form configuration rather than auto-detected
    pub explicit: bool,
    pub config: WidgetConfig,
}

/// Resolve the widget setup of every column of every vector layer
pub fn describe_project(project: &Project, registry: &EditorWidgetRegistry) -> Vec<ColumnReport> {
    let mut reports = Vec::new();
    for handle in project.layers() {
        let layer = handle.borrow();
        let Some(vector) = layer.as_vector() else {
            continue;
        };
        let form_config = vector.edit_form_config();
        for field in vector.fields().iter() {
            let (widget_type, config) = registry.find_best(vector, &field.name).into_parts();
            reports.push(ColumnReport {
                layer_id: vector.id().to_string(),
                column: field.name.clone(),
                widget_type,
                explicit: form_config.widget_type(&field.name).is_some(),
                config,
            });
        }
    }
    reports
}
