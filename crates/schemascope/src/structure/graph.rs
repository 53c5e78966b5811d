//! Node arena and typed edge store with forward and reverse adjacency.
//!
//! # Architecture
//!
//! - Nodes live in a `Vec` arena in insertion order, with an `Id -> slot`
//!   map for O(1) lookup.
//! - Edges live in a `Vec` and are referenced by [`EdgeIndex`].
//! - Outgoing and incoming adjacency lists are appended as edges are added,
//!   so the reverse index is complete the moment construction finishes and
//!   incoming queries never scan the edge list.
//!
//! The graph itself is append-only. Once a [`Schema`](crate::Schema) has been
//! built it only hands out shared references, which makes the graph read-only
//! for the rest of the session.

use std::collections::HashMap;

use schemascope_core::identifier::Id;

use super::{Edge, EdgeKind, Node, NodeKind};
use crate::error::GraphBuildError;

/// Index of an edge in the graph's edge list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeIndex(usize);

impl EdgeIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Flat node store plus typed edges with forward and reverse indices.
#[derive(Debug, Default)]
pub struct SchemaGraph {
    nodes: Vec<Node>,
    node_slots: HashMap<Id, usize>,
    edges: Vec<Edge>,
    outgoing_edges: HashMap<Id, Vec<EdgeIndex>>,
    income_edges: HashMap<Id, Vec<EdgeIndex>>,
}

impl SchemaGraph {
    /// Creates a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node.
    ///
    /// # Errors
    ///
    /// Returns [`GraphBuildError::DuplicateId`] if a node with the same id
    /// already exists, regardless of its kind.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphBuildError> {
        let id = node.id();
        if self.node_slots.contains_key(&id) {
            return Err(GraphBuildError::DuplicateId { id });
        }
        self.node_slots.insert(id, self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Adds a directed edge and updates both adjacency indices.
    ///
    /// # Errors
    ///
    /// Returns [`GraphBuildError::UnknownNode`] if either endpoint is absent.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeIndex, GraphBuildError> {
        for endpoint in [edge.source(), edge.target()] {
            if !self.contains_node(endpoint) {
                return Err(GraphBuildError::UnknownNode {
                    kind: edge.kind(),
                    from: edge.source(),
                    to: edge.target(),
                    missing: endpoint,
                });
            }
        }

        let idx = EdgeIndex(self.edges.len());
        self.outgoing_edges
            .entry(edge.source())
            .or_default()
            .push(idx);
        self.income_edges.entry(edge.target()).or_default().push(idx);
        self.edges.push(edge);
        Ok(idx)
    }

    /// Returns the node with the given id, if it exists.
    pub fn node(&self, id: Id) -> Option<&Node> {
        self.node_slots.get(&id).map(|&slot| &self.nodes[slot])
    }

    /// Checks if a node with the given id exists.
    pub fn contains_node(&self, id: Id) -> bool {
        self.node_slots.contains_key(&id)
    }

    /// Returns the kind of the node with the given id, if it exists.
    pub fn kind_of(&self, id: Id) -> Option<NodeKind> {
        self.node(id).map(Node::kind)
    }

    /// Returns all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns all nodes of one kind in insertion order.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |node| node.kind() == kind)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the edge at the given index, if it exists.
    pub fn edge(&self, idx: EdgeIndex) -> Option<&Edge> {
        self.edges.get(idx.0)
    }

    /// Returns all edges in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Returns the edges leaving `id` in insertion order, optionally filtered by kind.
    ///
    /// Unknown ids have no edges.
    pub fn outgoing_edges(&self, id: Id, kind: Option<EdgeKind>) -> impl Iterator<Item = &Edge> {
        Self::select(&self.edges, self.outgoing_edges.get(&id), kind)
    }

    /// Returns the edges arriving at `id` in insertion order, optionally filtered by kind.
    pub fn incoming_edges(&self, id: Id, kind: Option<EdgeKind>) -> impl Iterator<Item = &Edge> {
        Self::select(&self.edges, self.income_edges.get(&id), kind)
    }

    /// Returns the parent class of `id` via its inheritance edge.
    pub fn parent(&self, id: Id) -> Option<Id> {
        self.outgoing_edges(id, Some(EdgeKind::Inheritance))
            .next()
            .map(Edge::target)
    }

    /// Walks the inheritance chain of `id`, nearest ancestor first.
    ///
    /// The walk stops after `max_depth` steps even if the chain continues, so
    /// it terminates on any input.
    pub fn ancestors(&self, id: Id, max_depth: usize) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            current: id,
            remaining: max_depth,
        }
    }

    fn select<'a>(
        edges: &'a [Edge],
        indices: Option<&'a Vec<EdgeIndex>>,
        kind: Option<EdgeKind>,
    ) -> impl Iterator<Item = &'a Edge> + 'a {
        indices
            .into_iter()
            .flatten()
            .map(move |idx| &edges[idx.0])
            .filter(move |edge| kind.is_none_or(|kind| edge.kind() == kind))
    }
}

/// Iterator over the ancestors of a class, nearest first.
#[derive(Debug)]
pub struct Ancestors<'a> {
    graph: &'a SchemaGraph,
    current: Id,
    remaining: usize,
}

impl Iterator for Ancestors<'_> {
    type Item = Id;

    fn next(&mut self) -> Option<Id> {
        if self.remaining == 0 {
            return None;
        }
        let parent = self.graph.parent(self.current)?;
        self.remaining -= 1;
        self.current = parent;
        Some(parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{ClassPayload, EnumPayload, Payload};

    fn class(name: &str) -> Node {
        Node::class(Id::new(name), ClassPayload::new(None, false))
    }

    fn enumeration(name: &str) -> Node {
        Node::new(Id::new(name), name, Payload::Enum(EnumPayload::default()))
    }

    #[test]
    fn test_graph_new() {
        let graph = SchemaGraph::new();

        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.nodes().count(), 0);
    }

    #[test]
    fn test_add_node_and_lookup() {
        let mut graph = SchemaGraph::new();
        graph.add_node(class("Entity")).unwrap();
        graph.add_node(enumeration("SexEnum")).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert!(graph.contains_node(Id::new("Entity")));
        assert_eq!(graph.kind_of(Id::new("SexEnum")), Some(NodeKind::Enum));
        assert!(graph.node(Id::new("Missing")).is_none());
    }

    #[test]
    fn test_duplicate_id_across_kinds() {
        let mut graph = SchemaGraph::new();
        graph.add_node(class("Thing")).unwrap();

        let err = graph.add_node(enumeration("Thing")).unwrap_err();
        assert_eq!(
            err,
            GraphBuildError::DuplicateId {
                id: Id::new("Thing")
            }
        );
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.kind_of(Id::new("Thing")), Some(NodeKind::Class));
    }

    #[test]
    fn test_add_edge_unknown_node() {
        let mut graph = SchemaGraph::new();
        graph.add_node(class("Condition")).unwrap();

        let err = graph
            .add_edge(Edge::property(
                Id::new("Condition"),
                Id::new("ConditionConceptEnum"),
                "condition_concept",
            ))
            .unwrap_err();

        assert!(matches!(
            err,
            GraphBuildError::UnknownNode { missing, kind: EdgeKind::Property, .. }
                if missing == "ConditionConceptEnum"
        ));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_outgoing_and_incoming_keep_insertion_order() {
        let mut graph = SchemaGraph::new();
        for name in ["Entity", "Specimen", "Sample", "SexEnum"] {
            graph.add_node(class(name)).unwrap();
        }
        let entity = Id::new("Entity");
        let specimen = Id::new("Specimen");
        let sample = Id::new("Sample");

        graph.add_edge(Edge::inheritance(specimen, entity)).unwrap();
        graph
            .add_edge(Edge::property(specimen, specimen, "parent_specimen"))
            .unwrap();
        graph
            .add_edge(Edge::property(specimen, sample, "derived_from"))
            .unwrap();
        graph.add_edge(Edge::inheritance(sample, entity)).unwrap();

        let labels: Vec<Option<&str>> = graph
            .outgoing_edges(specimen, None)
            .map(Edge::label)
            .collect();
        assert_eq!(labels, vec![None, Some("parent_specimen"), Some("derived_from")]);

        let properties: Vec<&str> = graph
            .outgoing_edges(specimen, Some(EdgeKind::Property))
            .filter_map(Edge::label)
            .collect();
        assert_eq!(properties, vec!["parent_specimen", "derived_from"]);

        let children: Vec<Id> = graph
            .incoming_edges(entity, Some(EdgeKind::Inheritance))
            .map(Edge::source)
            .collect();
        assert_eq!(children, vec![specimen, sample]);

        let into_specimen: Vec<&Edge> = graph.incoming_edges(specimen, None).collect();
        assert_eq!(into_specimen.len(), 1);
        assert!(into_specimen[0].is_self_ref());

        assert_eq!(graph.outgoing_edges(Id::new("Unknown"), None).count(), 0);
    }

    #[test]
    fn test_edge_index_lookup() {
        let mut graph = SchemaGraph::new();
        graph.add_node(class("A")).unwrap();
        graph.add_node(class("B")).unwrap();

        let idx = graph
            .add_edge(Edge::inheritance(Id::new("B"), Id::new("A")))
            .unwrap();

        assert_eq!(idx.index(), 0);
        assert_eq!(graph.edge(idx).map(Edge::kind), Some(EdgeKind::Inheritance));
        assert_eq!(graph.edges().count(), 1);
    }

    #[test]
    fn test_ancestors_nearest_first_and_bounded() {
        let mut graph = SchemaGraph::new();
        for name in ["A", "B", "C", "D"] {
            graph.add_node(class(name)).unwrap();
        }
        graph
            .add_edge(Edge::inheritance(Id::new("B"), Id::new("A")))
            .unwrap();
        graph
            .add_edge(Edge::inheritance(Id::new("C"), Id::new("B")))
            .unwrap();
        graph
            .add_edge(Edge::inheritance(Id::new("D"), Id::new("C")))
            .unwrap();

        let ancestors: Vec<Id> = graph.ancestors(Id::new("D"), 10).collect();
        assert_eq!(ancestors, vec![Id::new("C"), Id::new("B"), Id::new("A")]);

        let bounded: Vec<Id> = graph.ancestors(Id::new("D"), 2).collect();
        assert_eq!(bounded, vec![Id::new("C"), Id::new("B")]);

        assert_eq!(graph.parent(Id::new("A")), None);
        assert_eq!(graph.ancestors(Id::new("A"), 10).count(), 0);
    }
}
