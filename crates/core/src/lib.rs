//! attrform-core: Editor widget registry and the traits around it.
//!
//! This crate contains the factory, wrapper and auto-configuration traits,
//! the headless control model, the project lifecycle and the
//! [`EditorWidgetRegistry`] that ties them together.

pub mod autoconf;
pub mod config_widget;
pub mod context;
pub mod control;
pub mod factory;
pub mod project;
mod registry;
pub mod search;
pub mod wrapper;

#[cfg(test)]
mod test_support;

pub use autoconf::{AutoConfPlugin, DefaultAutoConf, EditorWidgetAutoConf, DEFAULT_WIDGET_TYPE};
pub use config_widget::{BoxedConfigWidget, ConfigOption, ConfigSchema, ConfigWidget, SchemaConfigWidget};
pub use context::{AttributeEditorContext, FormMode, MapCanvas, MessageBar, MessageLevel};
pub use control::{classes, Control, ControlRef};
pub use factory::{BoxedEditorWidgetFactory, EditorWidgetFactory};
pub use project::{Project, ProjectError, ProjectListener, SubscriptionId};
pub use registry::{EditorWidgetRegistry, RegistryError};
pub use search::{BoxedSearchWrapper, DefaultSearchWrapper, SearchWidgetWrapper};
pub use wrapper::{BoxedEditorWrapper, EditorWidgetWrapper, WrapperCore};

// Re-export types used in trait signatures for convenience
pub use attrform_types::{EditorWidgetSetup, Element, MapLayer, VectorLayer, WidgetConfig};
