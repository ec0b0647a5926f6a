//! Registry for editor widget factories
//!
//! Maps widget type ids to factories, picks a factory for a bound control by
//! the control classes factories declare, resolves the effective widget setup
//! of a column and persists per-column setups in layer documents.

use crate::autoconf::{EditorWidgetAutoConf, DEFAULT_WIDGET_TYPE};
use crate::config_widget::BoxedConfigWidget;
use crate::context::AttributeEditorContext;
use crate::control::{Control, ControlRef};
use crate::factory::{BoxedEditorWidgetFactory, EditorWidgetFactory};
use crate::project::{Project, ProjectListener, SubscriptionId};
use crate::search::BoxedSearchWrapper;
use crate::wrapper::BoxedEditorWrapper;
use attrform_types::{
    Constraint, CustomSymbologyHandler, EditorWidgetSetup, Element, HandlerId, MapLayer,
    VectorLayer, WidgetConfig,
};
use std::cell::{Ref, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Import-only attributes that are never written back
const LEGACY_UPGRADE_ATTRIBUTES: &[&str] = &["notNull", "constraint", "constraintDescription"];

/// Reasons a factory registration is refused
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("factory not valid: empty widget type id")]
    EmptyWidgetId,

    #[error("factory with id {0} already registered")]
    AlreadyRegistered(String),
}

/// Registry for editor widget factories
///
/// Created once by the application root and shared as `Rc`. Registration
/// happens at startup; every other operation is a read.
pub struct EditorWidgetRegistry {
    factories: RefCell<BTreeMap<String, BoxedEditorWidgetFactory>>,
    /// control class -> (priority, widget type)
    factories_by_type: RefCell<HashMap<String, (i32, String)>>,
    auto_conf: RefCell<Box<dyn EditorWidgetAutoConf>>,
    fallback_widget: RefCell<String>,
    handler_id: HandlerId,
    self_ref: Weak<EditorWidgetRegistry>,
}

impl EditorWidgetRegistry {
    /// Create an empty registry
    pub fn new(auto_conf: Box<dyn EditorWidgetAutoConf>) -> Rc<Self> {
        Rc::new_cyclic(|self_ref| Self {
            factories: RefCell::new(BTreeMap::new()),
            factories_by_type: RefCell::new(HashMap::new()),
            auto_conf: RefCell::new(auto_conf),
            fallback_widget: RefCell::new(DEFAULT_WIDGET_TYPE.to_string()),
            handler_id: HandlerId::next(),
            self_ref: self_ref.clone(),
        })
    }

    /// Create a registry wired to the lifecycle of `project`
    pub fn with_project(project: &mut Project, auto_conf: Box<dyn EditorWidgetAutoConf>) -> Rc<Self> {
        let registry = Self::new(auto_conf);
        registry.attach_to_project(project);
        registry
    }

    /// Subscribe to the project's layer notifications.
    ///
    /// Vector layers already in the project get their style hooks attached
    /// right away.
    pub fn attach_to_project(self: &Rc<Self>, project: &mut Project) -> SubscriptionId {
        for layer in project.layers() {
            self.map_layer_added(&mut layer.borrow_mut());
        }
        let listener: Weak<dyn ProjectListener> = Rc::downgrade(self) as Weak<dyn ProjectListener>;
        project.subscribe(listener)
    }

    /// Replace the auto-configuration helper
    pub fn set_auto_conf(&self, auto_conf: Box<dyn EditorWidgetAutoConf>) {
        *self.auto_conf.borrow_mut() = auto_conf;
    }

    /// Widget type used when a wrapper rejects its bound control
    pub fn fallback_widget(&self) -> String {
        self.fallback_widget.borrow().clone()
    }

    pub fn set_fallback_widget(&self, widget_id: impl Into<String>) {
        *self.fallback_widget.borrow_mut() = widget_id.into();
    }

    /// Effective widget setup of a column: the explicit one if any, otherwise
    /// the auto-configured one
    pub fn find_best(&self, layer: &VectorLayer, field_name: &str) -> EditorWidgetSetup {
        let form_config = layer.edit_form_config();
        if let Some(widget_type) = form_config.widget_type(field_name) {
            return EditorWidgetSetup::new(widget_type, form_config.widget_config(field_name));
        }
        self.auto_conf
            .borrow()
            .editor_widget_setup(layer, field_name)
    }

    /// Create an editor wrapper for a column using its effective setup
    pub fn create(
        &self,
        layer: &VectorLayer,
        field_idx: usize,
        editor: Option<ControlRef>,
        parent: Option<&ControlRef>,
        context: &AttributeEditorContext,
    ) -> Option<BoxedEditorWrapper> {
        let Some(field_name) = layer.fields().field_name(field_idx) else {
            log::debug!("No field {} on layer '{}'", field_idx, layer.id());
            return None;
        };
        let setup = self.find_best(layer, field_name);
        self.create_with_type(
            setup.widget_type(),
            layer,
            field_idx,
            setup.config(),
            editor,
            parent,
            context,
        )
    }

    /// Create an editor wrapper of an explicit widget type.
    ///
    /// When the wrapper cannot drive the control it was given, it is replaced
    /// by the wrapper best matching that control, or the fallback widget type.
    #[allow(clippy::too_many_arguments)]
    pub fn create_with_type(
        &self,
        widget_id: &str,
        layer: &VectorLayer,
        field_idx: usize,
        config: &WidgetConfig,
        editor: Option<ControlRef>,
        parent: Option<&ControlRef>,
        context: &AttributeEditorContext,
    ) -> Option<BoxedEditorWrapper> {
        let factories = self.factories.borrow();
        let factory = factories.get(widget_id)?;

        let mut wrapper = factory.create(layer, field_idx, editor.clone(), parent)?;
        wrapper.set_config(config.clone());
        wrapper.set_context(context.clone());
        // Make sure a control exists so value access is always safe
        wrapper.widget();

        if wrapper.valid() {
            return Some(wrapper);
        }
        drop(wrapper);

        let fallback_id = {
            let bound = editor.as_ref().map(|control| control.borrow());
            self.find_suitable_wrapper(bound.as_deref(), &self.fallback_widget())
        };
        log::debug!(
            "Widget '{}' cannot drive the control of field {}, falling back to '{}'",
            widget_id,
            field_idx,
            fallback_id
        );

        let Some(fallback) = factories.get(&fallback_id) else {
            log::warn!("Fallback editor widget '{}' is not registered", fallback_id);
            return None;
        };
        let mut wrapper = fallback.create(layer, field_idx, editor, parent)?;
        wrapper.set_config(config.clone());
        wrapper.set_context(context.clone());
        wrapper.widget();
        Some(wrapper)
    }

    /// Create a search wrapper; search controls always start empty
    pub fn create_search_widget(
        &self,
        widget_id: &str,
        layer: &VectorLayer,
        field_idx: usize,
        config: &WidgetConfig,
        parent: Option<&ControlRef>,
        context: &AttributeEditorContext,
    ) -> Option<BoxedSearchWrapper> {
        let factories = self.factories.borrow();
        let mut wrapper = factories
            .get(widget_id)?
            .create_search_widget(layer, field_idx, parent)?;
        wrapper.set_config(config.clone());
        wrapper.set_context(context.clone());
        wrapper.widget();
        wrapper.clear_widget();
        Some(wrapper)
    }

    /// Create the control used to edit a widget type's configuration
    pub fn create_config_widget(
        &self,
        widget_id: &str,
        layer: &VectorLayer,
        field_idx: usize,
        parent: Option<&ControlRef>,
    ) -> Option<BoxedConfigWidget> {
        self.factories
            .borrow()
            .get(widget_id)?
            .config_widget(layer, field_idx, parent)
    }

    /// Display name of a widget type, empty when unknown
    pub fn name(&self, widget_id: &str) -> String {
        self.factories
            .borrow()
            .get(widget_id)
            .map(|factory| factory.name().to_string())
            .unwrap_or_default()
    }

    /// All registered factories, sorted by widget type id
    pub fn factories(&self) -> Ref<'_, BTreeMap<String, BoxedEditorWidgetFactory>> {
        self.factories.borrow()
    }

    pub fn factory(&self, widget_id: &str) -> Option<Ref<'_, dyn EditorWidgetFactory>> {
        Ref::filter_map(self.factories.borrow(), |factories| {
            factories.get(widget_id).map(|factory| factory.as_ref())
        })
        .ok()
    }

    pub fn contains(&self, widget_id: &str) -> bool {
        self.factories.borrow().contains_key(widget_id)
    }

    /// `(priority, widget type)` recorded for a control class
    pub fn factory_for_control_class(&self, class: &str) -> Option<(i32, String)> {
        self.factories_by_type.borrow().get(class).cloned()
    }

    /// Register a factory under `widget_id`.
    ///
    /// The factory becomes the default for every control class it claims with
    /// a strictly higher priority than the one recorded so far, so on equal
    /// priorities the first registered factory keeps the class.
    pub fn register_widget(
        &self,
        widget_id: &str,
        factory: BoxedEditorWidgetFactory,
    ) -> Result<(), RegistryError> {
        if widget_id.is_empty() {
            log::warn!("EditorWidgetRegistry: Factory not valid.");
            return Err(RegistryError::EmptyWidgetId);
        }

        let mut factories = self.factories.borrow_mut();
        if factories.contains_key(widget_id) {
            log::warn!(
                "EditorWidgetRegistry: Factory with id {} already registered.",
                widget_id
            );
            return Err(RegistryError::AlreadyRegistered(widget_id.to_string()));
        }

        let supported = factory.supported_widget_types();
        factories.insert(widget_id.to_string(), factory);

        let mut by_type = self.factories_by_type.borrow_mut();
        for (class, priority) in supported {
            let current = by_type.get(&class).map_or(0, |(recorded, _)| *recorded);
            if priority > current {
                by_type.insert(class, (priority, widget_id.to_string()));
            }
        }
        Ok(())
    }

    /// Widget type best suited to drive `editor`.
    ///
    /// An exact class match wins outright. Otherwise the highest-priority
    /// factory claiming one of the control's ancestor classes is used, the
    /// nearest ancestor winning ties. Without a control or a match,
    /// `default_widget` is returned.
    pub fn find_suitable_wrapper(&self, editor: Option<&Control>, default_widget: &str) -> String {
        let Some(editor) = editor else {
            return default_widget.to_string();
        };

        let by_type = self.factories_by_type.borrow();
        if let Some((_, widget_id)) = by_type.get(editor.class_name()) {
            return widget_id.clone();
        }

        let mut weight = 0;
        let mut best: Option<&String> = None;
        for tag in editor.ancestors() {
            if let Some((priority, widget_id)) = by_type.get(tag) {
                if *priority > weight {
                    weight = *priority;
                    best = Some(widget_id);
                }
            }
        }

        best.cloned()
            .unwrap_or_else(|| default_widget.to_string())
    }

    /// Read the per-column widget setups stored in a layer element.
    ///
    /// Non-vector layers are ignored.
    pub fn read_map_layer(&self, layer: &mut MapLayer, element: &Element) {
        if let Some(vector) = layer.as_vector_mut() {
            self.read_vector_layer(vector, element);
        }
    }

    /// Write the explicitly configured widget setups of a layer.
    ///
    /// Non-vector layers are ignored.
    pub fn write_map_layer(&self, layer: &MapLayer, element: &mut Element) {
        if let Some(vector) = layer.as_vector() {
            self.write_vector_layer(vector, element);
        }
    }

    fn read_vector_layer(&self, layer: &mut VectorLayer, element: &Element) {
        let Some(edit_types) = element.named_child("edittypes") else {
            return;
        };

        let factories = self.factories.borrow();
        let mut form_config = layer.edit_form_config();
        let empty = Element::new("widgetv2config");

        for edit_type in edit_types.children_named("edittype") {
            let name = edit_type.attribute_or("name", "");
            let Some(idx) = layer.fields().lookup_field(name) else {
                continue;
            };
            let column = layer.fields().field_name(idx).unwrap_or(name).to_string();

            let widget_type = edit_type.attribute_or("widgetv2type", "");
            let Some(factory) = factories.get(widget_type) else {
                log::warn!(
                    "Unknown attribute editor widget '{}' for field '{}' of layer '{}'",
                    widget_type,
                    column,
                    layer.id()
                );
                continue;
            };

            form_config.set_widget_type(&column, widget_type);
            let config_element = edit_type.named_child("widgetv2config");
            let config = config_element
                .map(|config_element| factory.read_editor_config(config_element, layer, idx))
                .unwrap_or_default();
            let config_element = config_element.unwrap_or(&empty);

            form_config.set_read_only(
                &column,
                config_element.attribute_or("fieldEditable", "1") != "1",
            );
            form_config.set_label_on_top(
                &column,
                config_element.attribute_or("labelOnTop", "0") == "1",
            );
            if config_element.attribute_or("notNull", "0") == "1" {
                // upgrade from older config
                layer.set_field_constraint(idx, Constraint::NotNull);
            }
            if let Some(expression) = config_element
                .attribute("constraint")
                .filter(|expression| !expression.is_empty())
            {
                // upgrade from older config
                layer.set_constraint_expression(
                    idx,
                    expression,
                    config_element.attribute_or("constraintDescription", ""),
                );
            }

            form_config.set_widget_config(&column, config);
        }

        layer.set_edit_form_config(form_config);
    }

    fn write_vector_layer(&self, layer: &VectorLayer, element: &mut Element) {
        let factories = self.factories.borrow();
        let form_config = layer.edit_form_config();
        let mut edit_types = Element::new("edittypes");

        for (idx, field) in layer.fields().iter().enumerate() {
            // Columns never configured by hand are detected again on load
            let Some(widget_type) = form_config.widget_type(&field.name) else {
                continue;
            };
            let Some(factory) = factories.get(widget_type) else {
                log::warn!("Could not save unknown editor widget type '{}'.", widget_type);
                continue;
            };

            let mut edit_type = Element::new("edittype");
            edit_type.set_attribute("name", field.name.as_str());
            edit_type.set_attribute("widgetv2type", widget_type);

            let mut config_element = Element::new("widgetv2config");
            config_element.set_bool_attribute("fieldEditable", !form_config.read_only(&field.name));
            config_element.set_bool_attribute("labelOnTop", form_config.label_on_top(&field.name));
            factory.write_config(
                &form_config.widget_config(&field.name),
                &mut config_element,
                layer,
                idx,
            );
            for legacy in LEGACY_UPGRADE_ATTRIBUTES {
                config_element.remove_attribute(legacy);
            }

            edit_type.append_child(config_element);
            edit_types.append_child(edit_type);
        }

        element.append_child(edit_types);
    }

    fn map_layer_added(&self, layer: &mut MapLayer) {
        if let Some(vector) = layer.as_vector_mut() {
            let handler: Weak<dyn CustomSymbologyHandler> = self.self_ref.clone();
            vector.connect_custom_symbology(self.handler_id, handler);
            log::debug!("Attached style hooks to layer '{}'", vector.id());
        }
    }

    fn map_layer_will_be_removed(&self, layer: &mut MapLayer) {
        if let Some(vector) = layer.as_vector_mut() {
            vector.disconnect_custom_symbology(self.handler_id);
            log::debug!("Detached style hooks from layer '{}'", vector.id());
        }
    }

    /// Id under which the registry's style hooks are attached to layers
    pub fn handler_id(&self) -> HandlerId {
        self.handler_id
    }
}

impl ProjectListener for EditorWidgetRegistry {
    fn layer_read(&self, layer: &mut MapLayer, element: &Element) {
        self.read_map_layer(layer, element);
    }

    fn layer_added(&self, layer: &mut MapLayer) {
        self.map_layer_added(layer);
    }

    fn layer_will_be_removed(&self, layer: &mut MapLayer) {
        self.map_layer_will_be_removed(layer);
    }
}

impl CustomSymbologyHandler for EditorWidgetRegistry {
    fn read_symbology(&self, layer: &mut VectorLayer, element: &Element) {
        self.read_vector_layer(layer, element);
    }

    fn write_symbology(&self, layer: &VectorLayer, element: &mut Element) {
        self.write_vector_layer(layer, element);
    }
}

impl Drop for EditorWidgetRegistry {
    fn drop(&mut self) {
        let factories = self.factories.get_mut();
        log::debug!("Releasing {} editor widget factories", factories.len());
        factories.clear();
    }
}
