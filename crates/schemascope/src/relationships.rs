//! Resolved per-node relationships.
//!
//! A class's resolved outgoing set is its inheritance edge followed by one
//! property edge per attribute label visible on the class, whether declared
//! on the class itself or inherited. The nearest definition of a label wins:
//! it decides the target, and a nearer definition with a primitive range
//! hides an ancestor's reference entirely.
//!
//! Resolution runs once for every node while the [`RelationshipIndex`] is
//! built. Incoming lists are derived from the resolved outgoing sets at the
//! same time, so queries are plain lookups.

use std::collections::{HashMap, HashSet};

use log::debug;

use schemascope_core::identifier::Id;

use crate::structure::{Attribute, Edge, EdgeKind, Node, NodeKind, SchemaGraph};

/// Resolved outgoing and incoming relationships of one node.
#[derive(Debug, Clone, Copy)]
pub struct Relationships<'a> {
    outgoing: &'a [Edge],
    incoming: &'a [Edge],
}

impl<'a> Relationships<'a> {
    /// Resolved outgoing edges in emission order.
    pub fn outgoing(&self) -> &'a [Edge] {
        self.outgoing
    }

    /// Resolved edges of other nodes that point at this node.
    pub fn incoming(&self) -> &'a [Edge] {
        self.incoming
    }

    /// Outgoing edges of one kind.
    pub fn outgoing_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &'a Edge> {
        self.outgoing.iter().filter(move |edge| edge.kind() == kind)
    }

    /// Returns true when the node has no relationships in either direction.
    pub fn is_empty(&self) -> bool {
        self.outgoing.is_empty() && self.incoming.is_empty()
    }
}

/// Precomputed resolved relationships for every node of a graph.
#[derive(Debug, Default)]
pub struct RelationshipIndex {
    outgoing: HashMap<Id, Vec<Edge>>,
    incoming: HashMap<Id, Vec<Edge>>,
}

impl RelationshipIndex {
    /// Resolves relationships for every node in `graph`.
    ///
    /// `max_depth` bounds every ancestor walk.
    pub fn build(graph: &SchemaGraph, max_depth: usize) -> Self {
        let mut outgoing: HashMap<Id, Vec<Edge>> = HashMap::with_capacity(graph.node_count());
        let mut incoming: HashMap<Id, Vec<Edge>> = HashMap::new();

        for node in graph.nodes() {
            let resolved = resolve_outgoing(graph, node, max_depth);
            for edge in &resolved {
                incoming.entry(edge.target()).or_default().push(edge.clone());
            }
            outgoing.insert(node.id(), resolved);
        }

        debug!(
            nodes = outgoing.len(),
            edges = outgoing.values().map(Vec::len).sum::<usize>();
            "Relationships resolved",
        );
        Self { outgoing, incoming }
    }

    /// Returns the relationships of `id`, or `None` for an unknown id.
    pub fn get(&self, id: Id) -> Option<Relationships<'_>> {
        let outgoing = self.outgoing.get(&id)?;
        let incoming = self.incoming.get(&id).map_or(&[][..], Vec::as_slice);
        Some(Relationships { outgoing, incoming })
    }

    /// Resolved outgoing edges of `id`; empty for unknown ids.
    pub fn outgoing(&self, id: Id) -> &[Edge] {
        self.outgoing.get(&id).map_or(&[][..], Vec::as_slice)
    }

    /// Resolved incoming edges of `id`; empty for unknown ids.
    pub fn incoming(&self, id: Id) -> &[Edge] {
        self.incoming.get(&id).map_or(&[][..], Vec::as_slice)
    }
}

fn resolve_outgoing(graph: &SchemaGraph, node: &Node, max_depth: usize) -> Vec<Edge> {
    let id = node.id();
    match node.kind() {
        NodeKind::Class => resolve_class(graph, id, max_depth),
        NodeKind::Enum => Vec::new(),
        NodeKind::Slot => graph
            .outgoing_edges(id, Some(EdgeKind::Property))
            .cloned()
            .collect(),
        NodeKind::Variable => graph
            .outgoing_edges(id, Some(EdgeKind::VariableMapping))
            .cloned()
            .collect(),
    }
}

fn resolve_class(graph: &SchemaGraph, class: Id, max_depth: usize) -> Vec<Edge> {
    let ancestors: Vec<Id> = graph.ancestors(class, max_depth).collect();
    let mut resolved: Vec<Edge> = graph
        .outgoing_edges(class, Some(EdgeKind::Inheritance))
        .cloned()
        .collect();
    // Labels already settled by a nearer definition, including primitive ones.
    let mut claimed: HashSet<&str> = HashSet::new();

    for attribute in attributes_of(graph, class) {
        claimed.insert(attribute.label());
        if let Some(edge) = declared_property(graph, class, attribute.label()) {
            let from = ancestors
                .iter()
                .copied()
                .find(|&ancestor| declares(graph, ancestor, attribute.label()));
            resolved.push(edge.inherited(class, edge.target(), from));
        }
    }

    for &ancestor in &ancestors {
        for attribute in attributes_of(graph, ancestor) {
            if !claimed.insert(attribute.label()) {
                continue;
            }
            if let Some(edge) = declared_property(graph, ancestor, attribute.label()) {
                resolved.push(edge.inherited(class, edge.target(), Some(ancestor)));
            }
        }
    }

    resolved
}

fn attributes_of(graph: &SchemaGraph, class: Id) -> impl Iterator<Item = &Attribute> {
    graph
        .node(class)
        .and_then(Node::as_class)
        .into_iter()
        .flat_map(|payload| payload.attributes())
}

fn declares(graph: &SchemaGraph, class: Id, label: &str) -> bool {
    graph
        .node(class)
        .and_then(Node::as_class)
        .is_some_and(|payload| payload.attribute(label).is_some())
}

fn declared_property<'g>(graph: &'g SchemaGraph, class: Id, label: &str) -> Option<&'g Edge> {
    graph
        .outgoing_edges(class, Some(EdgeKind::Property))
        .find(|edge| edge.label() == Some(label))
}
