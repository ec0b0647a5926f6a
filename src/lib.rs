//! attrform: editor widget registry for attribute forms of map layers
//!
//! This library ties together:
//! - The document, field and layer model (`attrform-types`)
//! - The editor widget registry and its traits (`attrform-core`)
//! - The built-in widget factories (`attrform-widgets`)
//! - Settings and application wiring

pub mod app;
pub mod config;

// Re-export commonly used types
pub use app::{build_registry, describe_project, widget_catalog, ColumnReport, LogMessageBar, WidgetInfo};
pub use attrform_core::{EditorWidgetRegistry, Project};
pub use attrform_types::{
    EditFormConfig, EditorWidgetSetup, Element, Field, FieldType, Fields, LayerHandle, MapLayer, VectorLayer,
    WidgetConfig,
};
pub use config::Settings;
