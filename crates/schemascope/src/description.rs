//! Normalized schema description handed over by the external loader.
//!
//! The shape mirrors the processed schema JSON: id-keyed maps of classes,
//! enums, slots and types plus a flat list of data variables. Maps keep
//! their declaration order, which later drives every ordered output of the
//! graph.

use indexmap::IndexMap;
use serde::Deserialize;

/// The complete normalized input for one schema graph.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaDescription {
    #[serde(default)]
    pub classes: IndexMap<String, ClassDeclaration>,
    #[serde(default)]
    pub enums: IndexMap<String, EnumDeclaration>,
    #[serde(default)]
    pub slots: IndexMap<String, SlotDeclaration>,
    #[serde(default)]
    pub types: IndexMap<String, TypeDeclaration>,
    #[serde(default)]
    pub variables: Vec<VariableDeclaration>,
}

impl SchemaDescription {
    /// Decodes a description from its JSON form.
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Adds a class declaration (builder style).
    pub fn with_class(mut self, id: &str, class: ClassDeclaration) -> Self {
        self.classes.insert(id.to_string(), class);
        self
    }

    /// Adds an enum declaration (builder style).
    pub fn with_enum(mut self, id: &str, declaration: EnumDeclaration) -> Self {
        self.enums.insert(id.to_string(), declaration);
        self
    }

    /// Adds a slot declaration (builder style).
    pub fn with_slot(mut self, id: &str, slot: SlotDeclaration) -> Self {
        self.slots.insert(id.to_string(), slot);
        self
    }

    /// Adds a primitive type declaration (builder style).
    pub fn with_type(mut self, id: &str) -> Self {
        self.types.insert(id.to_string(), TypeDeclaration::default());
        self
    }

    /// Adds a variable declaration (builder style).
    pub fn with_variable(mut self, variable: VariableDeclaration) -> Self {
        self.variables.push(variable);
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassDeclaration {
    /// Display name; defaults to the id.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Id of the parent class (`is_a`).
    #[serde(default, alias = "is_a")]
    pub parent: Option<String>,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeDeclaration>,
    /// Class-local refinements of attributes, keyed by attribute label.
    #[serde(default)]
    pub slot_usage: IndexMap<String, SlotUsageDeclaration>,
}

impl ClassDeclaration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    /// Adds an attribute with the given range.
    pub fn with_attribute(mut self, label: &str, range: &str) -> Self {
        self.attributes
            .insert(label.to_string(), AttributeDeclaration::with_range(range));
        self
    }

    /// Adds a fully specified attribute.
    pub fn with_attribute_declaration(mut self, label: &str, attribute: AttributeDeclaration) -> Self {
        self.attributes.insert(label.to_string(), attribute);
        self
    }

    /// Adds a slot usage refinement with the given range.
    pub fn with_slot_usage(mut self, label: &str, range: &str) -> Self {
        self.slot_usage.insert(
            label.to_string(),
            SlotUsageDeclaration {
                range: Some(range.to_string()),
                ..SlotUsageDeclaration::default()
            },
        );
        self
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttributeDeclaration {
    /// Id of the slot backing this attribute; `{label}-{Class}` marks a local refinement.
    #[serde(default, rename = "slotId")]
    pub slot_id: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub multivalued: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    /// Ancestor that originally declared the attribute, set on expanded copies.
    #[serde(default)]
    pub inherited_from: Option<String>,
}

impl AttributeDeclaration {
    pub fn with_range(range: &str) -> Self {
        Self {
            range: Some(range.to_string()),
            ..Self::default()
        }
    }

    /// Returns true when this entry is an expanded copy of an ancestor's
    /// definition rather than a definition made on the class itself.
    pub(crate) fn is_inherited_copy(&self, label: &str) -> bool {
        self.inherited_from.is_some()
            && self.slot_id.as_deref().is_none_or(|slot_id| slot_id == label)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotUsageDeclaration {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub multivalued: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnumDeclaration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissible_values: IndexMap<String, PermissibleValueDeclaration>,
}

impl EnumDeclaration {
    /// Creates an enum declaration with the given permissible values.
    pub fn with_values(values: &[&str]) -> Self {
        Self {
            permissible_values: values
                .iter()
                .map(|value| (value.to_string(), PermissibleValueDeclaration::default()))
                .collect(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissibleValueDeclaration {
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotDeclaration {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub multivalued: Option<bool>,
    /// Base slot refined by this class-specific instance.
    #[serde(default)]
    pub overrides: Option<String>,
}

impl SlotDeclaration {
    pub fn with_range(range: &str) -> Self {
        Self {
            range: Some(range.to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TypeDeclaration {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariableDeclaration {
    pub id: String,
    /// Display label; defaults to the id.
    #[serde(default)]
    pub label: Option<String>,
    /// Id of the class this variable is mapped to.
    #[serde(rename = "class")]
    pub class_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub curie: Option<String>,
}

impl VariableDeclaration {
    pub fn new(id: &str, class_id: &str) -> Self {
        Self {
            id: id.to_string(),
            class_id: class_id.to_string(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_keeps_declaration_order() {
        let json = r#"{
            "classes": {
                "Entity": { "abstract": true, "attributes": { "id": { "range": "string" } } },
                "Specimen": {
                    "parent": "Entity",
                    "attributes": {
                        "parent_specimen": { "range": "Specimen", "multivalued": false },
                        "id": { "range": "string", "inherited_from": "Entity", "slotId": "id" }
                    }
                }
            },
            "enums": {
                "SexEnum": { "permissible_values": { "female": {}, "male": {}, "unknown": {} } }
            },
            "types": { "string": { "uri": "xsd:string" } },
            "variables": [ { "id": "phv001", "label": "Age", "class": "Specimen" } ]
        }"#;

        let description = SchemaDescription::from_json_str(json).unwrap();

        let class_ids: Vec<&str> = description.classes.keys().map(String::as_str).collect();
        assert_eq!(class_ids, vec!["Entity", "Specimen"]);
        assert!(description.classes["Entity"].is_abstract);
        assert_eq!(
            description.classes["Specimen"].parent.as_deref(),
            Some("Entity")
        );

        let values: Vec<&str> = description.enums["SexEnum"]
            .permissible_values
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(values, vec!["female", "male", "unknown"]);

        assert_eq!(description.variables[0].class_id, "Specimen");
        assert_eq!(description.variables[0].label.as_deref(), Some("Age"));
    }

    #[test]
    fn test_is_a_alias() {
        let json = r#"{ "classes": { "A": {}, "B": { "is_a": "A" } } }"#;
        let description = SchemaDescription::from_json_str(json).unwrap();
        assert_eq!(description.classes["B"].parent.as_deref(), Some("A"));
    }

    #[test]
    fn test_inherited_copy_detection() {
        let copy = AttributeDeclaration {
            inherited_from: Some("Entity".to_string()),
            slot_id: Some("id".to_string()),
            ..AttributeDeclaration::default()
        };
        assert!(copy.is_inherited_copy("id"));

        let bare_copy = AttributeDeclaration {
            inherited_from: Some("Entity".to_string()),
            ..AttributeDeclaration::default()
        };
        assert!(bare_copy.is_inherited_copy("id"));

        let refinement = AttributeDeclaration {
            inherited_from: Some("ObservationSet".to_string()),
            slot_id: Some("observations-MeasurementObservationSet".to_string()),
            ..AttributeDeclaration::default()
        };
        assert!(!refinement.is_inherited_copy("observations"));

        let own = AttributeDeclaration::with_range("string");
        assert!(!own.is_inherited_copy("name"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(SchemaDescription::from_json_str("{ \"classes\": [] }").is_err());
        assert!(SchemaDescription::from_json_str("{ \"variables\": [ { \"id\": \"v\" } ] }").is_err());
    }
}
