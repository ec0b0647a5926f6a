//! attrform-widgets: Built-in editor widget factories.

pub mod color;
pub mod datetime;
pub mod descriptors;
pub mod relation_reference;
mod standard;
pub mod uuid_generator;
pub mod value_map;

pub use color::ColorFactory;
pub use datetime::DateTimeFactory;
pub use relation_reference::RelationReferenceFactory;
pub use standard::{ItemSource, StandardWidgetFactory, StandardWrapper, ValueKind, WidgetDescriptor};
pub use uuid_generator::UuidGeneratorFactory;
pub use value_map::ValueMapFactory;

use attrform_core::{BoxedEditorWidgetFactory, EditorWidgetRegistry, MapCanvas, MessageBar};
use std::rc::Rc;

/// Switches that control which built-in factories get registered
#[derive(Debug, Clone, Default)]
pub struct RegistrationOptions {
    /// Register the web view widget (needs the `webview` feature)
    pub webview_enabled: bool,
    /// Widget type ids that are not registered at all
    pub disabled_widgets: Vec<String>,
}

/// Register all built-in factories with the registry
///
/// # Arguments
/// * `map_canvas` - Map view handed to widgets that interact with the map
/// * `message_bar` - Message sink handed to widgets that report to the user
/// * `options` - Disabled widget types and the web view switch
pub fn register_all(
    registry: &EditorWidgetRegistry,
    map_canvas: Option<Rc<dyn MapCanvas>>,
    message_bar: Option<Rc<dyn MessageBar>>,
    options: &RegistrationOptions,
) {
    let mut factories: Vec<(&'static str, BoxedEditorWidgetFactory)> = vec![
        standard(&descriptors::TEXT_EDIT),
        standard(&descriptors::CLASSIFICATION),
        standard(&descriptors::RANGE),
        standard(&descriptors::UNIQUE_VALUES),
        standard(&descriptors::FILE_NAME),
        (value_map::WIDGET_TYPE, Box::new(ValueMapFactory) as BoxedEditorWidgetFactory),
        standard(&descriptors::ENUMERATION),
        standard(&descriptors::HIDDEN),
        standard(&descriptors::CHECK_BOX),
        standard(&descriptors::VALUE_RELATION),
        (uuid_generator::WIDGET_TYPE, Box::new(UuidGeneratorFactory) as BoxedEditorWidgetFactory),
        standard(&descriptors::PHOTO),
    ];

    #[cfg(feature = "webview")]
    if options.webview_enabled {
        factories.push(standard(&descriptors::WEB_VIEW));
        log::info!("Web view widget enabled");
    }
    #[cfg(not(feature = "webview"))]
    if options.webview_enabled {
        log::warn!("Web view widget requested but built without the webview feature");
    }

    factories.extend([
        (color::WIDGET_TYPE, Box::new(ColorFactory) as BoxedEditorWidgetFactory),
        (
            relation_reference::WIDGET_TYPE,
            Box::new(RelationReferenceFactory::new(map_canvas, message_bar)) as BoxedEditorWidgetFactory,
        ),
        (datetime::WIDGET_TYPE, Box::new(DateTimeFactory) as BoxedEditorWidgetFactory),
        standard(&descriptors::EXTERNAL_RESOURCE),
        standard(&descriptors::KEY_VALUE),
        standard(&descriptors::LIST),
    ]);

    let mut registered = 0;
    for (widget_id, factory) in factories {
        if options.disabled_widgets.iter().any(|disabled| disabled == widget_id) {
            log::debug!("Editor widget '{}' disabled in settings", widget_id);
            continue;
        }
        if registry.register_widget(widget_id, factory).is_ok() {
            registered += 1;
        }
    }
    log::info!("Registered {} editor widget factories", registered);
}

fn standard(descriptor: &'static WidgetDescriptor) -> (&'static str, BoxedEditorWidgetFactory) {
    (descriptor.widget_type, Box::new(StandardWidgetFactory::new(descriptor)))
}
