//! attrform-types: Shared data types for the attribute form editor.
//!
//! This crate contains the data model the editor widget registry works on:
//! the document tree used for persistence, column metadata and constraints,
//! the per-column form configuration and the layer model. None of these
//! types know about widgets or controls.

pub mod color;
pub mod dom;
pub mod field;
pub mod form;
pub mod layer;

// Re-export commonly used types at the crate root for convenience
pub use color::Color;
pub use dom::{DocumentError, Element};
pub use field::{
    Constraint, ConstraintOrigin, Field, FieldConstraints, FieldDomain, FieldType, Fields,
};
pub use form::{EditFormConfig, EditorWidgetSetup, WidgetConfig};
pub use layer::{
    CustomSymbologyHandler, HandlerId, LayerHandle, MapLayer, RasterLayer, Relation, VectorLayer,
};
