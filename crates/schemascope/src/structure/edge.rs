//! Typed schema graph edges.

use std::fmt;

use serde::Serialize;

use schemascope_core::identifier::Id;

/// The relationship an edge expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Subclass to its single parent class.
    Inheritance,
    /// Class or slot to the class or enum a named attribute references.
    Property,
    /// Data variable to the class it is mapped to.
    VariableMapping,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeKind::Inheritance => "inheritance",
            EdgeKind::Property => "property",
            EdgeKind::VariableMapping => "variable mapping",
        };
        f.write_str(name)
    }
}

/// A directed, typed edge between two schema elements.
///
/// Edges are immutable values. Resolution of inherited properties produces
/// new edges through [`Edge::inherited`] instead of patching stored ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    kind: EdgeKind,
    source: Id,
    target: Id,
    label: Option<String>,
    inherited_from: Option<Id>,
    #[serde(rename = "is_self_ref")]
    self_ref: bool,
}

impl Edge {
    fn new(kind: EdgeKind, source: Id, target: Id, label: Option<String>) -> Self {
        Self {
            kind,
            source,
            target,
            label,
            inherited_from: None,
            self_ref: source == target,
        }
    }

    /// Creates an inheritance edge from `child` to `parent`.
    pub fn inheritance(child: Id, parent: Id) -> Self {
        Self::new(EdgeKind::Inheritance, child, parent, None)
    }

    /// Creates a property edge labeled with the attribute name.
    pub fn property(source: Id, target: Id, label: impl Into<String>) -> Self {
        Self::new(EdgeKind::Property, source, target, Some(label.into()))
    }

    /// Creates a mapping edge from a variable to its class.
    pub fn variable_mapping(variable: Id, class: Id) -> Self {
        Self::new(EdgeKind::VariableMapping, variable, class, None)
    }

    /// Returns a copy of this edge re-homed on `source`, pointing at `target`,
    /// and attributed to the ancestor `from` that the label was inherited from.
    pub fn inherited(&self, source: Id, target: Id, from: Option<Id>) -> Self {
        let mut edge = Self::new(self.kind, source, target, self.label.clone());
        edge.inherited_from = from;
        edge
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The ancestor class this resolved property was inherited from.
    pub fn inherited_from(&self) -> Option<Id> {
        self.inherited_from
    }

    /// True when source and target are the same element.
    pub fn is_self_ref(&self) -> bool {
        self.self_ref
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_ref_flag() {
        let specimen = Id::new("Specimen");
        let edge = Edge::property(specimen, specimen, "parent_specimen");
        assert!(edge.is_self_ref());
        assert_eq!(edge.label(), Some("parent_specimen"));
        assert_eq!(edge.kind(), EdgeKind::Property);

        let edge = Edge::inheritance(specimen, Id::new("Entity"));
        assert!(!edge.is_self_ref());
        assert_eq!(edge.label(), None);
    }

    #[test]
    fn test_inherited_recomputes_self_ref() {
        let parent = Id::new("ObservationSet");
        let child = Id::new("MeasurementObservationSet");
        let declared = Edge::property(parent, Id::new("Observation"), "observations");

        let resolved = declared.inherited(child, Id::new("MeasurementObservation"), Some(parent));
        assert_eq!(resolved.source(), child);
        assert_eq!(resolved.target(), "MeasurementObservation");
        assert_eq!(resolved.inherited_from(), Some(parent));
        assert_eq!(resolved.label(), Some("observations"));
        assert!(!resolved.is_self_ref());

        let looped = declared.inherited(child, child, Some(parent));
        assert!(looped.is_self_ref());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EdgeKind::Inheritance.to_string(), "inheritance");
        assert_eq!(EdgeKind::VariableMapping.to_string(), "variable mapping");
    }
}
