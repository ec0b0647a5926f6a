//! Map layers and the hooks used by the per-layer style path

use crate::dom::Element;
use crate::field::{Constraint, ConstraintOrigin, FieldConstraints, Fields};
use crate::form::EditFormConfig;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared handle to a layer owned by a project
pub type LayerHandle = Rc<RefCell<MapLayer>>;

/// Identity of a custom symbology handler attached to a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

impl HandlerId {
    /// Allocate a process-unique id
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Receives the custom part of a layer style when it is read or written
///
/// The layer firing the hook is passed as the subject; handlers never have to
/// look it up themselves.
pub trait CustomSymbologyHandler {
    fn read_symbology(&self, layer: &mut VectorLayer, element: &Element);

    fn write_symbology(&self, layer: &VectorLayer, element: &mut Element);
}

/// Relation between a referencing column of this layer and another layer
#[derive(Debug, Clone, PartialEq)]
pub struct Relation {
    pub id: String,
    pub name: String,
    pub referenced_layer_id: String,
    /// `(referencing column, referenced column)` pairs
    pub field_pairs: Vec<(String, String)>,
}

impl Relation {
    pub fn references_column(&self, column: &str) -> bool {
        self.field_pairs
            .iter()
            .any(|(referencing, _)| referencing == column)
    }
}

/// Tabular layer: a column schema plus attribute form configuration
pub struct VectorLayer {
    id: String,
    name: String,
    fields: Fields,
    edit_form_config: EditFormConfig,
    relations: Vec<Relation>,
    features: Vec<Vec<Value>>,
    symbology_handlers: Vec<(HandlerId, Weak<dyn CustomSymbologyHandler>)>,
}

impl VectorLayer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            fields,
            edit_form_config: EditFormConfig::default(),
            relations: Vec::new(),
            features: Vec::new(),
            symbology_handlers: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Copy of the current form configuration
    pub fn edit_form_config(&self) -> EditFormConfig {
        self.edit_form_config.clone()
    }

    /// Replace the whole form configuration
    pub fn set_edit_form_config(&mut self, config: EditFormConfig) {
        self.edit_form_config = config;
    }

    pub fn field_constraints(&self, idx: usize) -> Option<&FieldConstraints> {
        self.fields.get(idx).map(|field| &field.constraints)
    }

    pub fn set_field_constraint(&mut self, idx: usize, constraint: Constraint) {
        if let Some(field) = self.fields.get_mut(idx) {
            field.constraints.set(constraint, ConstraintOrigin::Layer);
        }
    }

    pub fn remove_field_constraint(&mut self, idx: usize, constraint: Constraint) {
        if let Some(field) = self.fields.get_mut(idx) {
            field.constraints.remove(constraint);
        }
    }

    pub fn set_constraint_expression(&mut self, idx: usize, expression: &str, description: &str) {
        if let Some(field) = self.fields.get_mut(idx) {
            field
                .constraints
                .set_expression(expression, description, ConstraintOrigin::Layer);
        }
    }

    pub fn add_relation(&mut self, relation: Relation) {
        self.relations.push(relation);
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Relations in which the given column is a referencing column
    pub fn referencing_relations<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Relation> + 'a {
        self.relations
            .iter()
            .filter(move |relation| relation.references_column(column))
    }

    /// Append a row of attribute values, in column order
    pub fn add_feature(&mut self, attributes: Vec<Value>) {
        self.features.push(attributes);
    }

    /// Distinct non-null values of a column, in first-seen order
    pub fn unique_values(&self, idx: usize, limit: Option<usize>) -> Vec<Value> {
        let mut values: Vec<Value> = Vec::new();
        for feature in &self.features {
            if limit.is_some_and(|limit| values.len() >= limit) {
                break;
            }
            match feature.get(idx) {
                Some(value) if !value.is_null() && !values.contains(value) => {
                    values.push(value.clone());
                }
                _ => {}
            }
        }
        values
    }

    /// Attach a handler to the style hooks; attaching the same id twice is a no-op
    pub fn connect_custom_symbology(&mut self, id: HandlerId, handler: Weak<dyn CustomSymbologyHandler>) {
        if !self.symbology_handlers.iter().any(|(existing, _)| *existing == id) {
            self.symbology_handlers.push((id, handler));
        }
    }

    pub fn disconnect_custom_symbology(&mut self, id: HandlerId) {
        self.symbology_handlers.retain(|(existing, _)| *existing != id);
    }

    pub fn is_custom_symbology_connected(&self, id: HandlerId) -> bool {
        self.symbology_handlers.iter().any(|(existing, _)| *existing == id)
    }

    /// Apply a stored layer style, giving attached handlers a chance to read their part
    pub fn read_style(&mut self, element: &Element) {
        for handler in self.live_handlers() {
            handler.read_symbology(self, element);
        }
    }

    /// Write the custom part of the layer style into `element`
    pub fn write_style(&mut self, element: &mut Element) {
        for handler in self.live_handlers() {
            handler.write_symbology(self, element);
        }
    }

    fn live_handlers(&mut self) -> Vec<Rc<dyn CustomSymbologyHandler>> {
        self.symbology_handlers
            .retain(|(_, handler)| handler.strong_count() > 0);
        self.symbology_handlers
            .iter()
            .filter_map(|(_, handler)| handler.upgrade())
            .collect()
    }
}

impl std::fmt::Debug for VectorLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorLayer")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("fields", &self.fields.len())
            .field("handlers", &self.symbology_handlers.len())
            .finish()
    }
}

/// Non-tabular layer; carries no attribute form
#[derive(Debug, Clone, PartialEq)]
pub struct RasterLayer {
    pub id: String,
    pub name: String,
}

/// Any layer a project can hold
#[derive(Debug)]
pub enum MapLayer {
    Vector(VectorLayer),
    Raster(RasterLayer),
}

impl MapLayer {
    pub fn id(&self) -> &str {
        match self {
            MapLayer::Vector(layer) => layer.id(),
            MapLayer::Raster(layer) => &layer.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            MapLayer::Vector(layer) => layer.name(),
            MapLayer::Raster(layer) => &layer.name,
        }
    }

    /// Type name used in project documents
    pub fn type_name(&self) -> &'static str {
        match self {
            MapLayer::Vector(_) => "vector",
            MapLayer::Raster(_) => "raster",
        }
    }

    pub fn as_vector(&self) -> Option<&VectorLayer> {
        match self {
            MapLayer::Vector(layer) => Some(layer),
            MapLayer::Raster(_) => None,
        }
    }

    pub fn as_vector_mut(&mut self) -> Option<&mut VectorLayer> {
        match self {
            MapLayer::Vector(layer) => Some(layer),
            MapLayer::Raster(_) => None,
        }
    }

    pub fn into_handle(self) -> LayerHandle {
        Rc::new(RefCell::new(self))
    }
}

impl From<VectorLayer> for MapLayer {
    fn from(layer: VectorLayer) -> Self {
        MapLayer::Vector(layer)
    }
}

impl From<RasterLayer> for MapLayer {
    fn from(layer: RasterLayer) -> Self {
        MapLayer::Raster(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldType};
    use serde_json::json;
    use std::cell::Cell;

    struct CountingHandler {
        reads: Cell<usize>,
        writes: Cell<usize>,
    }

    impl CustomSymbologyHandler for CountingHandler {
        fn read_symbology(&self, layer: &mut VectorLayer, _element: &Element) {
            self.reads.set(self.reads.get() + 1);
            layer.set_field_constraint(0, Constraint::NotNull);
        }

        fn write_symbology(&self, layer: &VectorLayer, element: &mut Element) {
            self.writes.set(self.writes.get() + 1);
            element.set_attribute("layer", layer.id());
        }
    }

    fn layer() -> VectorLayer {
        let fields: Fields = vec![
            Field::new("name", FieldType::String),
            Field::new("kind", FieldType::Integer),
        ]
        .into_iter()
        .collect();
        VectorLayer::new("roads_1", "roads", fields)
    }

    #[test]
    fn test_style_hooks_fire_with_layer_as_subject() {
        let handler = Rc::new(CountingHandler {
            reads: Cell::new(0),
            writes: Cell::new(0),
        });
        let weak: Weak<dyn CustomSymbologyHandler> = Rc::downgrade(&handler) as Weak<dyn CustomSymbologyHandler>;
        let id = HandlerId::next();

        let mut layer = layer();
        layer.connect_custom_symbology(id, weak.clone());
        layer.connect_custom_symbology(id, weak);

        layer.read_style(&Element::new("maplayer"));
        let mut out = Element::new("maplayer");
        layer.write_style(&mut out);

        assert_eq!(handler.reads.get(), 1);
        assert_eq!(handler.writes.get(), 1);
        assert_eq!(out.attribute("layer"), Some("roads_1"));
        assert!(layer.field_constraints(0).unwrap().has(Constraint::NotNull));

        layer.disconnect_custom_symbology(id);
        layer.read_style(&Element::new("maplayer"));
        assert_eq!(handler.reads.get(), 1);
    }

    #[test]
    fn test_dropped_handlers_are_pruned() {
        let mut layer = layer();
        let id = HandlerId::next();
        {
            let handler: Rc<dyn CustomSymbologyHandler> = Rc::new(CountingHandler {
                reads: Cell::new(0),
                writes: Cell::new(0),
            });
            layer.connect_custom_symbology(id, Rc::downgrade(&handler));
        }
        layer.read_style(&Element::new("maplayer"));
        assert!(!layer.is_custom_symbology_connected(id));
    }

    #[test]
    fn test_unique_values_skip_nulls_and_duplicates() {
        let mut layer = layer();
        layer.add_feature(vec![json!("a"), json!(1)]);
        layer.add_feature(vec![json!("b"), json!(null)]);
        layer.add_feature(vec![json!("a"), json!(2)]);

        assert_eq!(layer.unique_values(0, None), vec![json!("a"), json!("b")]);
        assert_eq!(layer.unique_values(1, Some(1)), vec![json!(1)]);
    }
}
