//! Schema graph nodes.
//!
//! Every node carries an explicit [`NodeKind`] tag, set once at construction.
//! Code that branches on the kind of an element switches on this tag rather
//! than guessing from names.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use schemascope_core::identifier::Id;

/// The kind of a schema element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Class,
    Enum,
    Slot,
    Variable,
}

impl NodeKind {
    /// All kinds, in the order the builder adds them to the graph.
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Class,
        NodeKind::Enum,
        NodeKind::Slot,
        NodeKind::Variable,
    ];
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Class => "class",
            NodeKind::Enum => "enum",
            NodeKind::Slot => "slot",
            NodeKind::Variable => "variable",
        };
        f.write_str(name)
    }
}

/// What an attribute or slot points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Range {
    /// Another schema element (a class or an enum).
    Element(Id),
    /// A primitive type tag such as `string`; primitives never produce edges.
    Primitive(String),
}

impl Range {
    /// Returns the referenced element, or `None` for primitives.
    pub fn element(&self) -> Option<Id> {
        match self {
            Range::Element(id) => Some(*id),
            Range::Primitive(_) => None,
        }
    }
}

/// A named attribute declared on a class.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    label: String,
    range: Range,
    required: bool,
    multivalued: bool,
    slot: Option<Id>,
    description: Option<String>,
}

impl Attribute {
    pub fn new(label: impl Into<String>, range: Range) -> Self {
        Self {
            label: label.into(),
            range,
            required: false,
            multivalued: false,
            slot: None,
            description: None,
        }
    }

    pub fn with_cardinality(mut self, required: bool, multivalued: bool) -> Self {
        self.required = required;
        self.multivalued = multivalued;
        self
    }

    /// Sets the slot backing this attribute (builder style).
    pub fn with_slot(mut self, slot: Id) -> Self {
        self.slot = Some(slot);
        self
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn multivalued(&self) -> bool {
        self.multivalued
    }

    /// The slot instance backing this attribute, when it refines a shared slot.
    pub fn slot(&self) -> Option<Id> {
        self.slot
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassPayload {
    parent: Option<Id>,
    is_abstract: bool,
    attributes: IndexMap<String, Attribute>,
}

impl ClassPayload {
    pub fn new(parent: Option<Id>, is_abstract: bool) -> Self {
        Self {
            parent,
            is_abstract,
            attributes: IndexMap::new(),
        }
    }

    /// Adds or replaces an attribute, keyed by its label.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes
            .insert(attribute.label().to_string(), attribute);
        self
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// The attributes declared on this class itself, in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    pub fn attribute(&self, label: &str) -> Option<&Attribute> {
        self.attributes.get(label)
    }
}

/// One permissible value of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissibleValue {
    text: String,
    description: Option<String>,
}

impl PermissibleValue {
    pub fn new(text: impl Into<String>, description: Option<String>) -> Self {
        Self {
            text: text.into(),
            description,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumPayload {
    values: Vec<PermissibleValue>,
}

impl EnumPayload {
    /// Creates an enum payload; repeated value texts keep their first occurrence.
    pub fn new(values: impl IntoIterator<Item = PermissibleValue>) -> Self {
        let mut unique: IndexMap<String, PermissibleValue> = IndexMap::new();
        for value in values {
            unique.entry(value.text.clone()).or_insert(value);
        }
        Self {
            values: unique.into_values().collect(),
        }
    }

    /// Permissible values in declaration order.
    pub fn values(&self) -> &[PermissibleValue] {
        &self.values
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotPayload {
    range: Range,
    required: bool,
    multivalued: bool,
    overrides: Option<Id>,
}

impl SlotPayload {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            required: false,
            multivalued: false,
            overrides: None,
        }
    }

    pub fn with_cardinality(mut self, required: bool, multivalued: bool) -> Self {
        self.required = required;
        self.multivalued = multivalued;
        self
    }

    /// Marks this slot as a class-specific instance of `base` (builder style).
    pub fn with_overrides(mut self, base: Option<Id>) -> Self {
        self.overrides = base;
        self
    }

    pub fn range(&self) -> &Range {
        &self.range
    }

    pub fn required(&self) -> bool {
        self.required
    }

    pub fn multivalued(&self) -> bool {
        self.multivalued
    }

    /// The base slot this instance refines, if any.
    pub fn overrides(&self) -> Option<Id> {
        self.overrides
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariablePayload {
    mapped_class: Id,
    data_type: Option<String>,
    unit: Option<String>,
    curie: Option<String>,
}

impl VariablePayload {
    pub fn new(mapped_class: Id) -> Self {
        Self {
            mapped_class,
            data_type: None,
            unit: None,
            curie: None,
        }
    }

    pub fn with_details(
        mut self,
        data_type: Option<String>,
        unit: Option<String>,
        curie: Option<String>,
    ) -> Self {
        self.data_type = data_type;
        self.unit = unit;
        self.curie = curie;
        self
    }

    pub fn mapped_class(&self) -> Id {
        self.mapped_class
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn curie(&self) -> Option<&str> {
        self.curie.as_deref()
    }
}

/// Kind-specific node data.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Class(ClassPayload),
    Enum(EnumPayload),
    Slot(SlotPayload),
    Variable(VariablePayload),
}

/// A schema element stored in the [`SchemaGraph`](super::SchemaGraph).
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: Id,
    name: String,
    description: Option<String>,
    payload: Payload,
}

impl Node {
    pub fn new(id: Id, name: impl Into<String>, payload: Payload) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            payload,
        }
    }

    /// Creates a class node named after its id.
    pub fn class(id: Id, payload: ClassPayload) -> Self {
        Self::new(id, id.to_string(), Payload::Class(payload))
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    /// Human readable name shown by the display layer.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn kind(&self) -> NodeKind {
        match self.payload {
            Payload::Class(_) => NodeKind::Class,
            Payload::Enum(_) => NodeKind::Enum,
            Payload::Slot(_) => NodeKind::Slot,
            Payload::Variable(_) => NodeKind::Variable,
        }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn as_class(&self) -> Option<&ClassPayload> {
        match &self.payload {
            Payload::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumPayload> {
        match &self.payload {
            Payload::Enum(enumeration) => Some(enumeration),
            _ => None,
        }
    }

    pub fn as_slot(&self) -> Option<&SlotPayload> {
        match &self.payload {
            Payload::Slot(slot) => Some(slot),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariablePayload> {
        match &self.payload {
            Payload::Variable(variable) => Some(variable),
            _ => None,
        }
    }
}
