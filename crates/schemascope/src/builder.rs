//! Builds a [`SchemaGraph`] from a normalized [`SchemaDescription`].
//!
//! Construction runs in phases:
//!
//! 1. Collect every declared id and reject duplicates across kinds.
//! 2. Validate the class hierarchy (known parents, no cycles, bounded depth)
//!    on a `petgraph` digraph and derive a parents-first class order.
//! 3. Collect each class's own attribute definitions, folding in
//!    `slot_usage` refinements and dropping expanded copies of ancestor
//!    attributes.
//! 4. Emit nodes (classes, enums, slots, variables) and then edges.
//!
//! Any malformed input aborts the build with a [`GraphBuildError`].

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, info, trace, warn};
use petgraph::{
    Direction,
    algo::toposort,
    graph::{DiGraph, NodeIndex},
};

use schemascope_core::identifier::Id;

use crate::{
    config::SchemaConfig,
    description::{AttributeDeclaration, SchemaDescription, SlotUsageDeclaration},
    error::GraphBuildError,
    structure::{
        Attribute, ClassPayload, Edge, EnumPayload, Node, NodeKind, Payload, PermissibleValue,
        Range, SchemaGraph, SlotPayload, VariablePayload,
    },
};

/// Primitive type tags that are always known, independent of the `types` section.
const BUILTIN_PRIMITIVES: &[&str] = &[
    "string",
    "integer",
    "float",
    "double",
    "decimal",
    "boolean",
    "date",
    "datetime",
    "time",
    "uri",
    "uriorcurie",
    "curie",
    "ncname",
    "objectidentifier",
    "nodeidentifier",
    "jsonpointer",
    "jsonpath",
    "sparqlpath",
];

/// Range assumed for attributes and slots that declare none.
const DEFAULT_RANGE: &str = "string";

/// Builds the schema graph described by `description`.
///
/// # Errors
///
/// Returns a [`GraphBuildError`] for duplicate ids, dangling or invalid
/// references, and malformed class hierarchies.
pub fn build_graph(
    description: &SchemaDescription,
    config: &SchemaConfig,
) -> Result<SchemaGraph, GraphBuildError> {
    info!(
        classes = description.classes.len(),
        enums = description.enums.len(),
        slots = description.slots.len(),
        variables = description.variables.len();
        "Building schema graph",
    );

    let builder = Builder::new(description, config)?;
    let graph = builder.build()?;

    info!(
        nodes = graph.node_count(),
        edges = graph.edge_count();
        "Schema graph built",
    );
    Ok(graph)
}

/// A class's own definition of one attribute label.
#[derive(Debug, Clone)]
struct Definition {
    declaration: AttributeDeclaration,
    /// True when an ancestor also declares the label.
    refines: bool,
}

/// Slot nodes created by the builder rather than declared in the input.
#[derive(Debug, Default)]
struct GeneratedSlots {
    nodes: Vec<Node>,
    ids: HashSet<String>,
}

impl GeneratedSlots {
    fn push(&mut self, id: String, node: Node) {
        self.ids.insert(id);
        self.nodes.push(node);
    }
}

struct Builder<'a> {
    description: &'a SchemaDescription,
    config: &'a SchemaConfig,
    declared: HashMap<&'a str, NodeKind>,
    primitives: HashSet<&'a str>,
}

impl<'a> Builder<'a> {
    fn new(
        description: &'a SchemaDescription,
        config: &'a SchemaConfig,
    ) -> Result<Self, GraphBuildError> {
        let mut declared = HashMap::new();
        let ids = description
            .classes
            .keys()
            .map(|id| (id.as_str(), NodeKind::Class))
            .chain(description.enums.keys().map(|id| (id.as_str(), NodeKind::Enum)))
            .chain(description.slots.keys().map(|id| (id.as_str(), NodeKind::Slot)))
            .chain(
                description
                    .variables
                    .iter()
                    .map(|variable| (variable.id.as_str(), NodeKind::Variable)),
            );
        for (id, kind) in ids {
            if declared.insert(id, kind).is_some() {
                return Err(GraphBuildError::DuplicateId { id: Id::new(id) });
            }
        }

        let primitives = BUILTIN_PRIMITIVES
            .iter()
            .copied()
            .chain(description.types.keys().map(String::as_str))
            .collect();

        Ok(Self {
            description,
            config,
            declared,
            primitives,
        })
    }

    fn build(self) -> Result<SchemaGraph, GraphBuildError> {
        let order = self.validate_hierarchy()?;
        debug!(classes = order.len(); "Class hierarchy validated");

        let definitions = self.collect_definitions(&order);

        let mut graph = SchemaGraph::new();
        let mut edges = Vec::new();
        let mut generated = GeneratedSlots::default();

        for (id, class) in &self.description.classes {
            let class_id = Id::new(id);
            let mut payload =
                ClassPayload::new(class.parent.as_deref().map(Id::new), class.is_abstract);

            if let Some(parent) = class.parent.as_deref() {
                edges.push(Edge::inheritance(class_id, Id::new(parent)));
            }

            let own = definitions.get(id.as_str());
            for (label, definition) in own.into_iter().flatten() {
                let declaration = &definition.declaration;
                let range = self.resolve_range(class_id, label, declaration.range.as_deref())?;

                let mut attribute = Attribute::new(label.as_str(), range.clone())
                    .with_cardinality(
                        declaration.required.unwrap_or(false),
                        declaration.multivalued.unwrap_or(false),
                    )
                    .with_description(declaration.description.clone());

                if definition.refines {
                    let instance = self.override_instance(
                        id,
                        label,
                        declaration,
                        &range,
                        &definitions,
                        &mut generated,
                    )?;
                    if let Some(instance) = instance {
                        attribute = attribute.with_slot(instance);
                    }
                } else if let Some(slot_id) = declaration
                    .slot_id
                    .as_deref()
                    .filter(|slot_id| self.declared.get(*slot_id) == Some(&NodeKind::Slot))
                {
                    attribute = attribute.with_slot(Id::new(slot_id));
                }

                if let Some(target) = range.element() {
                    edges.push(Edge::property(class_id, target, label.as_str()));
                }
                payload = payload.with_attribute(attribute);
            }

            let node = Node::new(
                class_id,
                class.name.clone().unwrap_or_else(|| id.clone()),
                Payload::Class(payload),
            )
            .with_description(class.description.clone());
            trace!(id = id.as_str(); "Adding class node");
            graph.add_node(node)?;
        }

        for (id, declaration) in &self.description.enums {
            let values = declaration
                .permissible_values
                .iter()
                .map(|(text, value)| PermissibleValue::new(text.as_str(), value.description.clone()));
            let node = Node::new(
                Id::new(id),
                declaration.name.clone().unwrap_or_else(|| id.clone()),
                Payload::Enum(EnumPayload::new(values)),
            )
            .with_description(declaration.description.clone());
            graph.add_node(node)?;
        }

        for (id, declaration) in &self.description.slots {
            let slot_id = Id::new(id);
            let range = self.resolve_range(slot_id, id, declaration.range.as_deref())?;
            let overrides = match declaration.overrides.as_deref() {
                Some(base) if self.declared.get(base) == Some(&NodeKind::Slot) => {
                    Some(Id::new(base))
                }
                Some(base) => {
                    return Err(GraphBuildError::DanglingReference {
                        owner: slot_id,
                        reference: base.to_string(),
                    });
                }
                None => None,
            };
            // An override instance is labelled with the slot it refines,
            // as generated instances are.
            if let Some(target) = range.element() {
                let label = overrides.map_or_else(|| id.clone(), |base| base.to_string());
                edges.push(Edge::property(slot_id, target, label));
            }
            let payload = SlotPayload::new(range)
                .with_cardinality(
                    declaration.required.unwrap_or(false),
                    declaration.multivalued.unwrap_or(false),
                )
                .with_overrides(overrides);
            let node = Node::new(
                slot_id,
                declaration.name.clone().unwrap_or_else(|| id.clone()),
                Payload::Slot(payload),
            )
            .with_description(declaration.description.clone());
            graph.add_node(node)?;
        }

        debug!(count = generated.nodes.len(); "Adding generated slot nodes");
        for node in generated.nodes {
            if let Some(target) = node.as_slot().and_then(|slot| slot.range().element()) {
                edges.push(Edge::property(node.id(), target, node.name()));
            }
            graph.add_node(node)?;
        }

        for variable in &self.description.variables {
            let variable_id = Id::new(&variable.id);
            let class_id = match self.declared.get(variable.class_id.as_str()) {
                Some(NodeKind::Class) => Id::new(&variable.class_id),
                Some(&kind) => {
                    return Err(GraphBuildError::MappingTargetNotClass {
                        variable: variable_id,
                        target: Id::new(&variable.class_id),
                        kind,
                    });
                }
                None => {
                    return Err(GraphBuildError::DanglingReference {
                        owner: variable_id,
                        reference: variable.class_id.clone(),
                    });
                }
            };
            edges.push(Edge::variable_mapping(variable_id, class_id));

            let payload = VariablePayload::new(class_id).with_details(
                variable.data_type.clone(),
                variable.unit.clone(),
                variable.curie.clone(),
            );
            let node = Node::new(
                variable_id,
                variable.label.clone().unwrap_or_else(|| variable.id.clone()),
                Payload::Variable(payload),
            )
            .with_description(variable.description.clone());
            graph.add_node(node)?;
        }

        debug!(count = edges.len(); "Adding edges");
        for edge in edges {
            graph.add_edge(edge)?;
        }

        Ok(graph)
    }

    /// Checks parents and returns class ids ordered parents first.
    fn validate_hierarchy(&self) -> Result<Vec<&'a str>, GraphBuildError> {
        let classes = &self.description.classes;
        let mut hierarchy: DiGraph<&'a str, ()> = DiGraph::with_capacity(classes.len(), classes.len());
        let mut indices: HashMap<&'a str, NodeIndex> = HashMap::with_capacity(classes.len());
        for id in classes.keys() {
            indices.insert(id.as_str(), hierarchy.add_node(id.as_str()));
        }

        for (id, class) in classes {
            let Some(parent) = class.parent.as_deref() else {
                continue;
            };
            match self.declared.get(parent) {
                Some(NodeKind::Class) => {}
                Some(&kind) => {
                    return Err(GraphBuildError::ParentNotClass {
                        class: Id::new(id),
                        parent: Id::new(parent),
                        kind,
                    });
                }
                None => {
                    return Err(GraphBuildError::DanglingReference {
                        owner: Id::new(id),
                        reference: parent.to_string(),
                    });
                }
            }
            if let (Some(&parent_idx), Some(&child_idx)) =
                (indices.get(parent), indices.get(id.as_str()))
            {
                hierarchy.add_edge(parent_idx, child_idx, ());
            }
        }

        let order = toposort(&hierarchy, None).map_err(|cycle| {
            GraphBuildError::InheritanceCycle {
                class: Id::new(hierarchy[cycle.node_id()]),
            }
        })?;

        let max_depth = self.config.max_hierarchy_depth();
        let mut depths: HashMap<NodeIndex, usize> = HashMap::with_capacity(order.len());
        for &idx in &order {
            let depth = hierarchy
                .neighbors_directed(idx, Direction::Incoming)
                .next()
                .and_then(|parent| depths.get(&parent))
                .map_or(0, |depth| depth + 1);
            if depth > max_depth {
                return Err(GraphBuildError::HierarchyTooDeep {
                    class: Id::new(hierarchy[idx]),
                    max_depth,
                });
            }
            depths.insert(idx, depth);
        }

        Ok(order.into_iter().map(|idx| hierarchy[idx]).collect())
    }

    /// Collects each class's own attribute definitions, visiting parents first.
    fn collect_definitions(
        &self,
        order: &[&'a str],
    ) -> HashMap<&'a str, IndexMap<String, Definition>> {
        let mut definitions: HashMap<&'a str, IndexMap<String, Definition>> =
            HashMap::with_capacity(order.len());

        for &id in order {
            let Some(class) = self.description.classes.get(id) else {
                continue;
            };
            let mut own: IndexMap<String, AttributeDeclaration> = class
                .attributes
                .iter()
                .filter(|(label, attribute)| !attribute.is_inherited_copy(label))
                .map(|(label, attribute)| (label.clone(), attribute.clone()))
                .collect();

            for (label, usage) in &class.slot_usage {
                if let Some(existing) = own.get_mut(label) {
                    apply_usage(existing, usage);
                    continue;
                }
                let inherited = self
                    .nearest_definition(id, label, &definitions)
                    .map(|(_, definition)| definition.declaration.clone());
                match inherited {
                    Some(mut declaration) => {
                        declaration.inherited_from = None;
                        declaration.slot_id = None;
                        apply_usage(&mut declaration, usage);
                        own.insert(label.clone(), declaration);
                    }
                    None => {
                        warn!(class = id, label = label.as_str(); "Ignoring slot usage for an attribute the class does not have");
                    }
                }
            }

            let resolved = own
                .into_iter()
                .map(|(label, declaration)| {
                    let refines = self.nearest_definition(id, &label, &definitions).is_some();
                    (
                        label,
                        Definition {
                            declaration,
                            refines,
                        },
                    )
                })
                .collect();
            definitions.insert(id, resolved);
        }

        definitions
    }

    /// Finds the nearest strict ancestor of `class` that defines `label`.
    fn nearest_definition<'d>(
        &self,
        class: &str,
        label: &str,
        definitions: &'d HashMap<&'a str, IndexMap<String, Definition>>,
    ) -> Option<(&'a str, &'d Definition)> {
        let mut current = self.parent_of(class);
        while let Some(ancestor) = current {
            if let Some(definition) = definitions.get(ancestor).and_then(|own| own.get(label)) {
                return Some((ancestor, definition));
            }
            current = self.parent_of(ancestor);
        }
        None
    }

    fn parent_of(&self, class: &str) -> Option<&'a str> {
        self.description
            .classes
            .get(class)
            .and_then(|declaration| declaration.parent.as_deref())
    }

    /// Plans the `{label}-{Class}` slot instance for a class-local refinement.
    ///
    /// Returns the instance id when a slot node with that id exists after
    /// the call, either declared or generated.
    fn override_instance(
        &self,
        class: &'a str,
        label: &str,
        declaration: &AttributeDeclaration,
        range: &Range,
        definitions: &HashMap<&'a str, IndexMap<String, Definition>>,
        generated: &mut GeneratedSlots,
    ) -> Result<Option<Id>, GraphBuildError> {
        let instance_id = Id::new(label).suffixed(Id::new(class));
        let instance = instance_id.to_string();
        match self.declared.get(instance.as_str()) {
            Some(NodeKind::Slot) => return Ok(Some(instance_id)),
            Some(kind) => {
                warn!(id = instance.as_str(), kind:% = kind; "Override slot id is taken, skipping");
                return Ok(None);
            }
            None => {}
        }

        let base = match self.declared.get(label) {
            Some(NodeKind::Slot) => Some(Id::new(label)),
            Some(kind) => {
                warn!(id = label, kind:% = kind; "Base slot id is taken, skipping");
                None
            }
            None if generated.ids.contains(label) => Some(Id::new(label)),
            None => self.synthesize_base_slot(class, label, definitions, generated)?,
        };

        let payload = SlotPayload::new(range.clone())
            .with_cardinality(
                declaration.required.unwrap_or(false),
                declaration.multivalued.unwrap_or(false),
            )
            .with_overrides(base);
        trace!(id = instance.as_str(), base:? = base; "Generating override slot");
        generated.push(
            instance,
            Node::new(instance_id, label, Payload::Slot(payload))
                .with_description(declaration.description.clone()),
        );
        Ok(Some(instance_id))
    }

    /// Creates the base slot for `label` from the definition that introduced it.
    fn synthesize_base_slot(
        &self,
        class: &'a str,
        label: &str,
        definitions: &HashMap<&'a str, IndexMap<String, Definition>>,
        generated: &mut GeneratedSlots,
    ) -> Result<Option<Id>, GraphBuildError> {
        let mut origin = None;
        let mut current = class;
        while let Some((ancestor, definition)) = self.nearest_definition(current, label, definitions)
        {
            if !definition.refines {
                origin = Some((ancestor, definition));
                break;
            }
            current = ancestor;
        }
        let Some((ancestor, definition)) = origin else {
            return Ok(None);
        };

        let declaration = &definition.declaration;
        let range = self.resolve_range(Id::new(ancestor), label, declaration.range.as_deref())?;
        let payload = SlotPayload::new(range).with_cardinality(
            declaration.required.unwrap_or(false),
            declaration.multivalued.unwrap_or(false),
        );
        trace!(id = label, origin = ancestor; "Synthesizing base slot");
        generated.push(
            label.to_string(),
            Node::new(Id::new(label), label, Payload::Slot(payload))
                .with_description(declaration.description.clone()),
        );
        Ok(Some(Id::new(label)))
    }

    fn resolve_range(
        &self,
        owner: Id,
        label: &str,
        range: Option<&str>,
    ) -> Result<Range, GraphBuildError> {
        let range = range.unwrap_or(DEFAULT_RANGE);
        match self.declared.get(range) {
            Some(NodeKind::Class | NodeKind::Enum) => Ok(Range::Element(Id::new(range))),
            Some(&kind) => Err(GraphBuildError::InvalidRange {
                owner,
                label: label.to_string(),
                target: Id::new(range),
                kind,
            }),
            None if self.primitives.contains(range) => Ok(Range::Primitive(range.to_string())),
            None => Err(GraphBuildError::DanglingReference {
                owner,
                reference: range.to_string(),
            }),
        }
    }
}

/// Merges a slot usage on top of an attribute declaration; usage fields win.
fn apply_usage(declaration: &mut AttributeDeclaration, usage: &SlotUsageDeclaration) {
    if let Some(range) = &usage.range {
        declaration.range = Some(range.clone());
    }
    if let Some(required) = usage.required {
        declaration.required = Some(required);
    }
    if let Some(multivalued) = usage.multivalued {
        declaration.multivalued = Some(multivalued);
    }
    if let Some(description) = &usage.description {
        declaration.description = Some(description.clone());
    }
}
