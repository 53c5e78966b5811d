//! Kind-grouped views over the schema graph.
//!
//! [`ElementIndex`] groups node ids by kind and exposes the hierarchies the
//! panels display: the class forest, base slots with their class-specific
//! instances, and variables grouped by mapped class. Every list keeps the
//! graph's insertion order.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use schemascope_core::identifier::Id;

use crate::{
    error::NotFoundError,
    structure::{NodeKind, Payload, SchemaGraph},
};

/// Kind groups and rooted hierarchies of a built schema graph.
#[derive(Debug, Default)]
pub struct ElementIndex {
    kinds: HashMap<Id, NodeKind>,
    members: HashMap<NodeKind, Vec<Id>>,
    roots: HashMap<NodeKind, Vec<Id>>,
    children: HashMap<Id, Vec<Id>>,
    structural_parents: HashMap<Id, Id>,
    variable_groups: IndexMap<Id, Vec<Id>>,
}

impl ElementIndex {
    /// Indexes every node of `graph`.
    pub fn build(graph: &SchemaGraph) -> Self {
        let mut index = Self::default();

        for node in graph.nodes() {
            let id = node.id();
            index.kinds.insert(id, node.kind());
            index.members.entry(node.kind()).or_default().push(id);
            index.children.entry(id).or_default();

            let parent = match node.payload() {
                Payload::Class(class) => class.parent(),
                Payload::Enum(_) => None,
                Payload::Slot(slot) => slot.overrides(),
                Payload::Variable(variable) => {
                    index
                        .variable_groups
                        .entry(variable.mapped_class())
                        .or_default()
                        .push(id);
                    index
                        .structural_parents
                        .insert(id, variable.mapped_class());
                    // Variables are listed flat; the class only groups them.
                    index.roots.entry(NodeKind::Variable).or_default().push(id);
                    continue;
                }
            };

            match parent {
                Some(parent) => {
                    index.children.entry(parent).or_default().push(id);
                    index.structural_parents.insert(id, parent);
                }
                None => index.roots.entry(node.kind()).or_default().push(id),
            }
        }

        index
    }

    /// Top-level elements of one kind.
    ///
    /// Root classes, every enum, base slots (not class-specific instances),
    /// and every variable.
    pub fn roots(&self, kind: NodeKind) -> &[Id] {
        self.roots.get(&kind).map_or(&[][..], Vec::as_slice)
    }

    /// Direct children of `id`: subclasses of a class or instances of a base slot.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if `id` is not part of the schema.
    pub fn children(&self, id: Id) -> Result<&[Id], NotFoundError> {
        self.children
            .get(&id)
            .map(Vec::as_slice)
            .ok_or_else(|| NotFoundError::new(id))
    }

    /// All ids of one kind.
    pub fn members(&self, kind: NodeKind) -> &[Id] {
        self.members.get(&kind).map_or(&[][..], Vec::as_slice)
    }

    /// Variables mapped to `class`.
    pub fn variables_of(&self, class: Id) -> &[Id] {
        self.variable_groups
            .get(&class)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Variables grouped by mapped class, classes in first-seen order.
    pub fn variable_groups(&self) -> impl Iterator<Item = (Id, &[Id])> {
        self.variable_groups
            .iter()
            .map(|(class, variables)| (*class, variables.as_slice()))
    }

    /// The element `id` is nested under in its panel tree.
    pub fn structural_parent(&self, id: Id) -> Option<Id> {
        self.structural_parents.get(&id).copied()
    }

    /// Returns true if some structural ancestor of `id` is collapsed, that is
    /// missing from `expanded`.
    ///
    /// Variables are listed flat under their panel and are never hidden.
    pub fn is_hidden(&self, id: Id, expanded: &HashSet<Id>) -> bool {
        if self.kinds.get(&id) == Some(&NodeKind::Variable) {
            return false;
        }
        let mut visited = HashSet::new();
        let mut current = id;
        while let Some(parent) = self.structural_parent(current) {
            if !visited.insert(parent) {
                break;
            }
            if !expanded.contains(&parent) {
                return true;
            }
            current = parent;
        }
        false
    }

    /// All transitive children of `id`, depth first in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if `id` is not part of the schema.
    pub fn descendants(&self, id: Id) -> Result<Vec<Id>, NotFoundError> {
        let mut stack: Vec<Id> = self.children(id)?.iter().rev().copied().collect();
        let mut descendants = Vec::new();
        let mut visited = HashSet::new();
        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            descendants.push(current);
            if let Some(children) = self.children.get(&current) {
                stack.extend(children.iter().rev().copied());
            }
        }
        Ok(descendants)
    }
}
