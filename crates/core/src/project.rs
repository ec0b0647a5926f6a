//! Project: the set of layers and the lifecycle notifications around them
//!
//! Listeners are held weakly; a listener that has been dropped is pruned the
//! next time an event fires.

use attrform_types::{
    ConstraintOrigin, DocumentError, Element, Field, FieldDomain, FieldType, Fields, LayerHandle,
    MapLayer, RasterLayer, Relation, VectorLayer,
};
use std::rc::{Rc, Weak};
use thiserror::Error;

/// Errors raised while reading or writing a project document
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("expected a <project> document, found <{0}>")]
    UnexpectedRoot(String),

    #[error("layer element without an id")]
    MissingLayerId,

    #[error("layer '{0}' has unknown type '{1}'")]
    UnknownLayerType(String, String),

    #[error("field '{field}' of layer '{layer}' has unknown type '{field_type}'")]
    UnknownFieldType {
        layer: String,
        field: String,
        field_type: String,
    },

    #[error("duplicate layer id '{0}'")]
    DuplicateLayer(String),
}

/// Receives project lifecycle notifications
pub trait ProjectListener {
    /// A layer was read from a project document; `element` is its `maplayer` element
    fn layer_read(&self, _layer: &mut MapLayer, _element: &Element) {}

    /// A layer was added to the project
    fn layer_added(&self, _layer: &mut MapLayer) {}

    /// A layer is about to be removed from the project
    fn layer_will_be_removed(&self, _layer: &mut MapLayer) {}
}

/// Handle returned by [`Project::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// An ordered collection of map layers
#[derive(Default)]
pub struct Project {
    title: String,
    layers: Vec<LayerHandle>,
    listeners: Vec<(SubscriptionId, Weak<dyn ProjectListener>)>,
    next_subscription: u64,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn subscribe(&mut self, listener: Weak<dyn ProjectListener>) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, listener));
        id
    }

    /// Returns false when the id was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners
            .iter()
            .filter(|(_, listener)| listener.strong_count() > 0)
            .count()
    }

    pub fn layers(&self) -> &[LayerHandle] {
        &self.layers
    }

    pub fn layer(&self, id: &str) -> Option<LayerHandle> {
        self.layers
            .iter()
            .find(|layer| layer.borrow().id() == id)
            .cloned()
    }

    /// Add a layer and notify listeners
    pub fn add_layer(&mut self, layer: MapLayer) -> Result<LayerHandle, ProjectError> {
        if self.layer(layer.id()).is_some() {
            return Err(ProjectError::DuplicateLayer(layer.id().to_string()));
        }
        let handle = layer.into_handle();
        self.layers.push(Rc::clone(&handle));
        log::debug!("Layer '{}' added", handle.borrow().id());

        for listener in self.live_listeners() {
            listener.layer_added(&mut handle.borrow_mut());
        }
        Ok(handle)
    }

    /// Notify listeners, then remove the layer
    pub fn remove_layer(&mut self, id: &str) -> Option<LayerHandle> {
        let position = self.layers.iter().position(|layer| layer.borrow().id() == id)?;
        let handle = Rc::clone(&self.layers[position]);

        for listener in self.live_listeners() {
            listener.layer_will_be_removed(&mut handle.borrow_mut());
        }
        self.layers.remove(position);
        log::debug!("Layer '{}' removed", id);
        Some(handle)
    }

    /// Remove every layer, notifying listeners for each
    pub fn clear(&mut self) {
        let ids: Vec<String> = self
            .layers
            .iter()
            .map(|layer| layer.borrow().id().to_string())
            .collect();
        for id in ids {
            self.remove_layer(&id);
        }
    }

    /// Read a project document, adding its layers to this project
    pub fn read_str(&mut self, xml: &str) -> Result<(), ProjectError> {
        let root = Element::parse(xml)?;
        if root.name() != "project" {
            return Err(ProjectError::UnexpectedRoot(root.name().to_string()));
        }
        if let Some(title) = root.attribute("title") {
            self.title = title.to_string();
        }

        let Some(layers) = root.named_child("layers") else {
            return Ok(());
        };
        for element in layers.children_named("maplayer") {
            self.read_layer(element)?;
        }
        log::info!("Read project '{}' with {} layer(s)", self.title, self.layers.len());
        Ok(())
    }

    /// Build a layer from its `maplayer` element, add it and fire `layer_read`
    pub fn read_layer(&mut self, element: &Element) -> Result<LayerHandle, ProjectError> {
        let layer = layer_from_element(element)?;
        let handle = self.add_layer(layer)?;
        for listener in self.live_listeners() {
            listener.layer_read(&mut handle.borrow_mut(), element);
        }
        Ok(handle)
    }

    /// Serialize the project.
    ///
    /// Each vector layer's style hooks append their part to the layer element.
    pub fn write_element(&self) -> Element {
        let mut root = Element::new("project");
        root.set_attribute("title", self.title.as_str());
        let layers = root.append_child(Element::new("layers"));

        for handle in &self.layers {
            let mut layer = handle.borrow_mut();
            let mut element = layer_to_element(&layer);
            if let Some(vector) = layer.as_vector_mut() {
                vector.write_style(&mut element);
            }
            layers.append_child(element);
        }
        root
    }

    pub fn write_string(&self) -> Result<String, ProjectError> {
        Ok(self.write_element().to_xml_string()?)
    }

    fn live_listeners(&mut self) -> Vec<Rc<dyn ProjectListener>> {
        self.listeners
            .retain(|(_, listener)| listener.strong_count() > 0);
        self.listeners
            .iter()
            .filter_map(|(_, listener)| listener.upgrade())
            .collect()
    }
}

fn layer_from_element(element: &Element) -> Result<MapLayer, ProjectError> {
    let id = element
        .attribute("id")
        .filter(|id| !id.is_empty())
        .ok_or(ProjectError::MissingLayerId)?
        .to_string();
    let name = element.attribute_or("name", &id).to_string();

    match element.attribute_or("type", "vector") {
        "vector" => {
            let mut fields = Fields::new();
            if let Some(fields_element) = element.named_child("fields") {
                for field_element in fields_element.children_named("field") {
                    fields.append(field_from_element(&id, field_element)?);
                }
            }

            let mut layer = VectorLayer::new(id, name, fields);
            if let Some(relations) = element.named_child("relations") {
                for relation in relations.children_named("relation") {
                    layer.add_relation(relation_from_element(relation));
                }
            }
            Ok(MapLayer::Vector(layer))
        }
        "raster" => Ok(MapLayer::Raster(RasterLayer { id, name })),
        other => Err(ProjectError::UnknownLayerType(id, other.to_string())),
    }
}

fn field_from_element(layer_id: &str, element: &Element) -> Result<Field, ProjectError> {
    let name = element.attribute_or("name", "");
    let type_name = element.attribute_or("type", "string");
    let field_type = FieldType::parse(type_name).ok_or_else(|| ProjectError::UnknownFieldType {
        layer: layer_id.to_string(),
        field: name.to_string(),
        field_type: type_name.to_string(),
    })?;

    let mut field = Field::new(name, field_type);
    field.alias = element.attribute("alias").map(str::to_string);
    field.comment = element.attribute("comment").map(str::to_string);

    let constraints = &mut field.constraints;
    constraints.not_null = element.attribute("constraintNotNull").and_then(parse_origin);
    constraints.unique = element.attribute("constraintUnique").and_then(parse_origin);
    if let Some(expression) = element.attribute("constraintExpression") {
        let origin = element
            .attribute("constraintExpressionOrigin")
            .and_then(parse_origin)
            .unwrap_or(ConstraintOrigin::Layer);
        constraints.set_expression(
            expression,
            element.attribute_or("constraintExpressionDescription", ""),
            origin,
        );
    }

    field.domain = element.named_child("domain").and_then(domain_from_element);
    Ok(field)
}

fn domain_from_element(element: &Element) -> Option<FieldDomain> {
    match element.attribute("type")? {
        "coded" => Some(FieldDomain::Coded(
            element
                .children_named("code")
                .map(|code| {
                    let value = code.attribute_or("value", "").to_string();
                    let label = code.attribute_or("label", &value).to_string();
                    (value, label)
                })
                .collect(),
        )),
        "range" => Some(FieldDomain::Range {
            min: element.attribute("min")?.parse().ok()?,
            max: element.attribute("max")?.parse().ok()?,
        }),
        "glob" => Some(FieldDomain::Glob(element.attribute_or("pattern", "*").to_string())),
        _ => None,
    }
}

fn relation_from_element(element: &Element) -> Relation {
    Relation {
        id: element.attribute_or("id", "").to_string(),
        name: element.attribute_or("name", "").to_string(),
        referenced_layer_id: element.attribute_or("referencedLayer", "").to_string(),
        field_pairs: element
            .children_named("fieldRef")
            .map(|pair| {
                (
                    pair.attribute_or("referencing", "").to_string(),
                    pair.attribute_or("referenced", "").to_string(),
                )
            })
            .collect(),
    }
}

fn layer_to_element(layer: &MapLayer) -> Element {
    let mut element = Element::new("maplayer");
    element.set_attribute("type", layer.type_name());
    element.set_attribute("id", layer.id());
    element.set_attribute("name", layer.name());

    let Some(vector) = layer.as_vector() else {
        return element;
    };

    let fields = element.append_child(Element::new("fields"));
    for field in vector.fields().iter() {
        fields.append_child(field_to_element(field));
    }

    if !vector.relations().is_empty() {
        let relations = element.append_child(Element::new("relations"));
        for relation in vector.relations() {
            let relation_element = relations.append_child(Element::new("relation"));
            relation_element.set_attribute("id", relation.id.as_str());
            relation_element.set_attribute("name", relation.name.as_str());
            relation_element.set_attribute("referencedLayer", relation.referenced_layer_id.as_str());
            for (referencing, referenced) in &relation.field_pairs {
                let pair = relation_element.append_child(Element::new("fieldRef"));
                pair.set_attribute("referencing", referencing.as_str());
                pair.set_attribute("referenced", referenced.as_str());
            }
        }
    }
    element
}

fn field_to_element(field: &Field) -> Element {
    let mut element = Element::new("field");
    element.set_attribute("name", field.name.as_str());
    element.set_attribute("type", field.field_type.as_str());
    if let Some(alias) = &field.alias {
        element.set_attribute("alias", alias.as_str());
    }
    if let Some(comment) = &field.comment {
        element.set_attribute("comment", comment.as_str());
    }

    let constraints = &field.constraints;
    if let Some(origin) = constraints.not_null {
        element.set_attribute("constraintNotNull", origin_name(origin));
    }
    if let Some(origin) = constraints.unique {
        element.set_attribute("constraintUnique", origin_name(origin));
    }
    if let Some(expression) = &constraints.expression {
        element.set_attribute("constraintExpression", expression.as_str());
        if let Some(description) = &constraints.expression_description {
            element.set_attribute("constraintExpressionDescription", description.as_str());
        }
        if let Some(origin) = constraints.expression_origin {
            element.set_attribute("constraintExpressionOrigin", origin_name(origin));
        }
    }

    if let Some(domain) = &field.domain {
        let domain_element = element.append_child(Element::new("domain"));
        match domain {
            FieldDomain::Coded(values) => {
                domain_element.set_attribute("type", "coded");
                for (value, label) in values {
                    let code = domain_element.append_child(Element::new("code"));
                    code.set_attribute("value", value.as_str());
                    code.set_attribute("label", label.as_str());
                }
            }
            FieldDomain::Range { min, max } => {
                domain_element.set_attribute("type", "range");
                domain_element.set_attribute("min", min.to_string());
                domain_element.set_attribute("max", max.to_string());
            }
            FieldDomain::Glob(pattern) => {
                domain_element.set_attribute("type", "glob");
                domain_element.set_attribute("pattern", pattern.as_str());
            }
        }
    }
    element
}

fn parse_origin(value: &str) -> Option<ConstraintOrigin> {
    match value {
        "provider" => Some(ConstraintOrigin::Provider),
        "layer" | "1" => Some(ConstraintOrigin::Layer),
        _ => None,
    }
}

fn origin_name(origin: ConstraintOrigin) -> &'static str {
    match origin {
        ConstraintOrigin::Provider => "provider",
        ConstraintOrigin::Layer => "layer",
    }
}
