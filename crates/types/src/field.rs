//! Column metadata for tabular (vector) layers

use crate::form::EditorWidgetSetup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of data a column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Double,
    Boolean,
    Date,
    Time,
    DateTime,
    Binary,
    /// Array of values (e.g. a provider list column)
    List,
    /// Key/value mapping (e.g. hstore or JSON object columns)
    Map,
}

impl FieldType {
    /// Textual form used in project documents
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Double => "double",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::DateTime => "datetime",
            FieldType::Binary => "binary",
            FieldType::List => "list",
            FieldType::Map => "map",
        }
    }

    /// Parse the textual form, accepting a few common aliases
    pub fn parse(value: &str) -> Option<Self> {
        let parsed = match value.to_ascii_lowercase().as_str() {
            "string" | "text" | "varchar" => FieldType::String,
            "integer" | "int" | "int4" | "int8" | "integer64" => FieldType::Integer,
            "double" | "real" | "float" | "numeric" => FieldType::Double,
            "boolean" | "bool" => FieldType::Boolean,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "datetime" | "timestamp" => FieldType::DateTime,
            "binary" | "blob" => FieldType::Binary,
            "list" | "array" | "stringlist" => FieldType::List,
            "map" | "hstore" | "json" => FieldType::Map,
            _ => return None,
        };
        Some(parsed)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Double)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, FieldType::Date | FieldType::Time | FieldType::DateTime)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider-side domain restricting the values of a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldDomain {
    /// Fixed list of `(code, label)` pairs
    Coded(Vec<(String, String)>),
    /// Inclusive numeric range
    Range { min: f64, max: f64 },
    /// Glob pattern the value must match
    Glob(String),
}

/// Where a constraint was defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConstraintOrigin {
    /// Enforced by the data provider, cannot be changed from the layer
    Provider,
    /// Added on the layer by the user or by a configuration upgrade
    Layer,
}

/// Kind of a simple (non-expression) constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Constraint {
    NotNull,
    Unique,
}

/// Constraints attached to a single column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraints {
    pub not_null: Option<ConstraintOrigin>,
    pub unique: Option<ConstraintOrigin>,
    pub expression: Option<String>,
    pub expression_description: Option<String>,
    pub expression_origin: Option<ConstraintOrigin>,
}

impl FieldConstraints {
    pub fn has(&self, constraint: Constraint) -> bool {
        self.origin(constraint).is_some()
    }

    pub fn origin(&self, constraint: Constraint) -> Option<ConstraintOrigin> {
        match constraint {
            Constraint::NotNull => self.not_null,
            Constraint::Unique => self.unique,
        }
    }

    /// Set a constraint. A provider constraint is never downgraded.
    pub fn set(&mut self, constraint: Constraint, origin: ConstraintOrigin) {
        let slot = match constraint {
            Constraint::NotNull => &mut self.not_null,
            Constraint::Unique => &mut self.unique,
        };
        if *slot != Some(ConstraintOrigin::Provider) {
            *slot = Some(origin);
        }
    }

    /// Remove a layer constraint. Provider constraints stay in place.
    pub fn remove(&mut self, constraint: Constraint) {
        let slot = match constraint {
            Constraint::NotNull => &mut self.not_null,
            Constraint::Unique => &mut self.unique,
        };
        if *slot == Some(ConstraintOrigin::Layer) {
            *slot = None;
        }
    }

    /// Set the constraint expression; an empty expression clears it
    pub fn set_expression(&mut self, expression: &str, description: &str, origin: ConstraintOrigin) {
        if expression.is_empty() {
            self.expression = None;
            self.expression_description = None;
            self.expression_origin = None;
        } else {
            self.expression = Some(expression.to_string());
            self.expression_description = (!description.is_empty()).then(|| description.to_string());
            self.expression_origin = Some(origin);
        }
    }
}

/// A single column of a tabular layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub domain: Option<FieldDomain>,
    #[serde(default)]
    pub constraints: FieldConstraints,
    /// Widget setup suggested by the data provider, if any
    #[serde(default)]
    pub editor_widget_setup: Option<EditorWidgetSetup>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            alias: None,
            comment: None,
            domain: None,
            constraints: FieldConstraints::default(),
            editor_widget_setup: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_domain(mut self, domain: FieldDomain) -> Self {
        self.domain = Some(domain);
        self
    }

    /// Alias when set, otherwise the column name
    pub fn display_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered column list of a tabular layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fields {
    fields: Vec<Field>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, field: Field) {
        self.fields.push(field);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Field> {
        self.fields.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Field> {
        self.fields.get_mut(idx)
    }

    pub fn field_name(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(|field| field.name.as_str())
    }

    /// Resolve a column name to its index.
    ///
    /// An exact match wins; otherwise the first case-insensitive match is used.
    pub fn lookup_field(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.name == name)
            .or_else(|| {
                self.fields
                    .iter()
                    .position(|field| field.name.eq_ignore_ascii_case(name))
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }
}

impl FromIterator<Field> for Fields {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_prefers_exact_match() {
        let fields: Fields = vec![
            Field::new("Name", FieldType::String),
            Field::new("name", FieldType::String),
            Field::new("population", FieldType::Integer),
        ]
        .into_iter()
        .collect();

        assert_eq!(fields.lookup_field("name"), Some(1));
        assert_eq!(fields.lookup_field("POPULATION"), Some(2));
        assert_eq!(fields.lookup_field("missing"), None);
    }

    #[test]
    fn test_provider_constraint_is_not_downgraded() {
        let mut constraints = FieldConstraints::default();
        constraints.set(Constraint::NotNull, ConstraintOrigin::Provider);
        constraints.set(Constraint::NotNull, ConstraintOrigin::Layer);
        assert_eq!(constraints.origin(Constraint::NotNull), Some(ConstraintOrigin::Provider));

        constraints.remove(Constraint::NotNull);
        assert!(constraints.has(Constraint::NotNull));
    }

    #[test]
    fn test_empty_expression_clears_constraint() {
        let mut constraints = FieldConstraints::default();
        constraints.set_expression("\"pop\" > 0", "must be positive", ConstraintOrigin::Layer);
        assert_eq!(constraints.expression.as_deref(), Some("\"pop\" > 0"));
        assert_eq!(constraints.expression_description.as_deref(), Some("must be positive"));

        constraints.set_expression("", "", ConstraintOrigin::Layer);
        assert!(constraints.expression.is_none());
        assert!(constraints.expression_origin.is_none());
    }

    #[test]
    fn test_field_type_aliases() {
        assert_eq!(FieldType::parse("INT"), Some(FieldType::Integer));
        assert_eq!(FieldType::parse("timestamp"), Some(FieldType::DateTime));
        assert_eq!(FieldType::parse("geometry"), None);
        assert_eq!(FieldType::DateTime.to_string(), "datetime");
    }
}
