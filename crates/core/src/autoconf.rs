//! Automatic widget selection for columns without an explicit setup

use attrform_types::{EditorWidgetSetup, FieldDomain, FieldType, VectorLayer, WidgetConfig};
use serde_json::{json, Value};

/// Widget type used when nothing better is known
pub const DEFAULT_WIDGET_TYPE: &str = "TextEdit";

/// Suggests a widget setup from a column's semantics
pub trait EditorWidgetAutoConf {
    /// Best-guess setup; a null setup when the column does not exist
    fn editor_widget_setup(&self, layer: &VectorLayer, field_name: &str) -> EditorWidgetSetup;
}

/// One source of suggestions for [`DefaultAutoConf`]
pub trait AutoConfPlugin {
    /// `(score, setup)` or `None` when this plugin has no opinion
    fn editor_widget_setup(
        &self,
        layer: &VectorLayer,
        field_idx: usize,
    ) -> Option<(i32, EditorWidgetSetup)>;
}

/// Runs scored plugins and keeps the highest-scoring suggestion
pub struct DefaultAutoConf {
    plugins: Vec<Box<dyn AutoConfPlugin>>,
}

impl DefaultAutoConf {
    pub fn new() -> Self {
        let mut autoconf = Self {
            plugins: Vec::new(),
        };
        autoconf.register_plugin(Box::new(ProviderSetupPlugin));
        autoconf.register_plugin(Box::new(RelationPlugin));
        autoconf.register_plugin(Box::new(DomainPlugin));
        autoconf.register_plugin(Box::new(FieldTypePlugin));
        autoconf
    }

    /// Add a plugin; on equal scores earlier plugins win
    pub fn register_plugin(&mut self, plugin: Box<dyn AutoConfPlugin>) {
        self.plugins.push(plugin);
    }
}

impl Default for DefaultAutoConf {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorWidgetAutoConf for DefaultAutoConf {
    fn editor_widget_setup(&self, layer: &VectorLayer, field_name: &str) -> EditorWidgetSetup {
        let Some(field_idx) = layer.fields().lookup_field(field_name) else {
            return EditorWidgetSetup::null();
        };

        let mut best: Option<(i32, EditorWidgetSetup)> = None;
        for plugin in &self.plugins {
            if let Some((score, setup)) = plugin.editor_widget_setup(layer, field_idx) {
                if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
                    best = Some((score, setup));
                }
            }
        }

        best.map(|(_, setup)| setup)
            .unwrap_or_else(|| EditorWidgetSetup::new(DEFAULT_WIDGET_TYPE, WidgetConfig::new()))
    }
}

/// Setup suggested by the data provider on the field itself
struct ProviderSetupPlugin;

impl AutoConfPlugin for ProviderSetupPlugin {
    fn editor_widget_setup(&self, layer: &VectorLayer, field_idx: usize) -> Option<(i32, EditorWidgetSetup)> {
        layer
            .fields()
            .get(field_idx)?
            .editor_widget_setup
            .clone()
            .filter(|setup| !setup.is_null())
            .map(|setup| (20, setup))
    }
}

/// Referencing columns of a relation get a relation reference widget
struct RelationPlugin;

impl AutoConfPlugin for RelationPlugin {
    fn editor_widget_setup(&self, layer: &VectorLayer, field_idx: usize) -> Option<(i32, EditorWidgetSetup)> {
        let field = layer.fields().get(field_idx)?;
        let relation = layer.referencing_relations(&field.name).next()?;
        let allow_null = !field
            .constraints
            .has(attrform_types::Constraint::NotNull);
        let config = WidgetConfig::from([
            ("Relation".to_string(), Value::String(relation.id.clone())),
            ("AllowNULL".to_string(), Value::Bool(allow_null)),
            ("ShowForm".to_string(), Value::Bool(false)),
        ]);
        Some((20, EditorWidgetSetup::new("RelationReference", config)))
    }
}

/// Provider domains map onto value maps and ranges
struct DomainPlugin;

impl AutoConfPlugin for DomainPlugin {
    fn editor_widget_setup(&self, layer: &VectorLayer, field_idx: usize) -> Option<(i32, EditorWidgetSetup)> {
        let setup = match layer.fields().get(field_idx)?.domain.as_ref()? {
            FieldDomain::Coded(values) => {
                let map: Vec<Value> = values
                    .iter()
                    .map(|(code, label)| {
                        let mut entry = serde_json::Map::new();
                        entry.insert(label.clone(), Value::String(code.clone()));
                        Value::Object(entry)
                    })
                    .collect();
                EditorWidgetSetup::new("ValueMap", WidgetConfig::from([("map".to_string(), Value::Array(map))]))
            }
            FieldDomain::Range { min, max } => EditorWidgetSetup::new(
                "Range",
                WidgetConfig::from([
                    ("Min".to_string(), json!(min)),
                    ("Max".to_string(), json!(max)),
                ]),
            ),
            FieldDomain::Glob(_) => return None,
        };
        Some((15, setup))
    }
}

/// Fallbacks by column type
struct FieldTypePlugin;

impl AutoConfPlugin for FieldTypePlugin {
    fn editor_widget_setup(&self, layer: &VectorLayer, field_idx: usize) -> Option<(i32, EditorWidgetSetup)> {
        let widget_type = match layer.fields().get(field_idx)?.field_type {
            FieldType::Boolean => "CheckBox",
            FieldType::Date | FieldType::Time | FieldType::DateTime => "DateTime",
            FieldType::List => "List",
            FieldType::Map => "KeyValue",
            _ => return None,
        };
        Some((5, EditorWidgetSetup::new(widget_type, WidgetConfig::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attrform_types::{Field, Fields, Relation};

    fn layer() -> VectorLayer {
        let mut provider_hint = Field::new("photo", FieldType::String);
        provider_hint.editor_widget_setup =
            Some(EditorWidgetSetup::new("ExternalResource", WidgetConfig::new()));

        let fields: Fields = vec![
            Field::new("name", FieldType::String),
            Field::new("visited", FieldType::Boolean),
            Field::new("built", FieldType::Date),
            Field::new("kind", FieldType::Integer).with_domain(FieldDomain::Coded(vec![
                ("1".to_string(), "Primary".to_string()),
                ("2".to_string(), "Secondary".to_string()),
            ])),
            Field::new("owner_id", FieldType::Integer),
            provider_hint,
            Field::new("tags", FieldType::List),
            Field::new("score", FieldType::Double).with_domain(FieldDomain::Range { min: 0.0, max: 10.0 }),
        ]
        .into_iter()
        .collect();

        let mut layer = VectorLayer::new("parcels", "parcels", fields);
        layer.add_relation(Relation {
            id: "parcel_owner".to_string(),
            name: "Owner".to_string(),
            referenced_layer_id: "owners".to_string(),
            field_pairs: vec![("owner_id".to_string(), "id".to_string())],
        });
        layer
    }

    fn widget_type(layer: &VectorLayer, column: &str) -> String {
        DefaultAutoConf::new()
            .editor_widget_setup(layer, column)
            .widget_type()
            .to_string()
    }

    #[test]
    fn test_type_based_defaults() {
        let layer = layer();
        assert_eq!(widget_type(&layer, "name"), "TextEdit");
        assert_eq!(widget_type(&layer, "visited"), "CheckBox");
        assert_eq!(widget_type(&layer, "built"), "DateTime");
        assert_eq!(widget_type(&layer, "tags"), "List");
    }

    #[test]
    fn test_domain_relation_and_provider_hints() {
        let layer = layer();
        let value_map = DefaultAutoConf::new().editor_widget_setup(&layer, "kind");
        assert_eq!(value_map.widget_type(), "ValueMap");
        assert_eq!(
            value_map.config()["map"],
            json!([{ "Primary": "1" }, { "Secondary": "2" }])
        );

        let range = DefaultAutoConf::new().editor_widget_setup(&layer, "score");
        assert_eq!(range.widget_type(), "Range");
        assert_eq!(range.config()["Max"], json!(10.0));

        let relation = DefaultAutoConf::new().editor_widget_setup(&layer, "owner_id");
        assert_eq!(relation.widget_type(), "RelationReference");
        assert_eq!(relation.config()["Relation"], json!("parcel_owner"));
        assert_eq!(relation.config()["AllowNULL"], json!(true));

        assert_eq!(widget_type(&layer, "photo"), "ExternalResource");
    }

    #[test]
    fn test_unknown_column_gives_null_setup() {
        assert!(DefaultAutoConf::new()
            .editor_widget_setup(&layer(), "missing")
            .is_null());
    }

    #[test]
    fn test_custom_plugin_outscores_builtins() {
        struct Everything;
        impl AutoConfPlugin for Everything {
            fn editor_widget_setup(&self, _: &VectorLayer, _: usize) -> Option<(i32, EditorWidgetSetup)> {
                Some((100, EditorWidgetSetup::new("Hidden", WidgetConfig::new())))
            }
        }

        let mut autoconf = DefaultAutoConf::new();
        autoconf.register_plugin(Box::new(Everything));
        assert_eq!(autoconf.editor_widget_setup(&layer(), "visited").widget_type(), "Hidden");
    }
}
