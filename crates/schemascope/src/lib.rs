//! Schemascope - typed relationship graph and link geometry for schema browsers.
//!
//! A schema browser shows classes, enumerations, slots and data variables in
//! side-by-side panels and draws connectors between related elements. This
//! crate is the model behind it:
//!
//! - [`Schema`] builds an immutable [`SchemaGraph`](structure::SchemaGraph)
//!   from a normalized [`SchemaDescription`](description::SchemaDescription),
//!   resolves inherited and overridden properties, and indexes elements by
//!   kind.
//! - [`LinkLayoutEngine`](links::LinkLayoutEngine) turns the visible items of
//!   two panels into connector curves.
//!
//! Loading raw schema files, panel UI state and rendering are left to the
//! host application.
//!
//! # Examples
//!
//! ```
//! use schemascope::{
//!     Schema,
//!     description::{ClassDeclaration, SchemaDescription},
//!     identifier::Id,
//! };
//!
//! let description = SchemaDescription::default()
//!     .with_class("Entity", ClassDeclaration::new().with_attribute("id", "string"))
//!     .with_class(
//!         "Specimen",
//!         ClassDeclaration::new()
//!             .with_parent("Entity")
//!             .with_attribute("parent_specimen", "Specimen"),
//!     );
//!
//! let schema = Schema::build(&description).unwrap();
//! let relationships = schema.relationships(Id::new("Specimen")).unwrap();
//! assert_eq!(relationships.outgoing().len(), 2);
//! ```

pub mod collections;
pub mod config;
pub mod description;
pub mod error;
pub mod links;
pub mod relationships;
pub mod structure;

mod builder;

pub use schemascope_core::{geometry, identifier};

pub use error::{GraphBuildError, NotFoundError, SchemascopeError};

use log::{debug, info};

use collections::ElementIndex;
use config::AppConfig;
use description::SchemaDescription;
use identifier::Id;
use links::LinkLayoutEngine;
use relationships::{RelationshipIndex, Relationships};
use structure::{Edge, EdgeKind, Node, NodeKind, SchemaGraph};

/// A built schema: the graph plus its derived relationship and element indices.
///
/// Built once from a description and read-only afterwards. Rebuilding means
/// constructing a new `Schema`.
#[derive(Debug)]
pub struct Schema {
    config: AppConfig,
    graph: SchemaGraph,
    relationships: RelationshipIndex,
    index: ElementIndex,
}

impl Schema {
    /// Builds a schema with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GraphBuildError`] for any malformed input; no partial schema
    /// is produced.
    pub fn build(description: &SchemaDescription) -> Result<Self, GraphBuildError> {
        Self::build_validated(description, AppConfig::default())
    }

    /// Builds a schema with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchemascopeError::Config`] when a configuration value is out
    /// of range, and [`SchemascopeError::Build`] for any malformed input.
    pub fn build_with_config(
        description: &SchemaDescription,
        config: AppConfig,
    ) -> Result<Self, SchemascopeError> {
        config.validate()?;
        Ok(Self::build_validated(description, config)?)
    }

    fn build_validated(
        description: &SchemaDescription,
        config: AppConfig,
    ) -> Result<Self, GraphBuildError> {
        let graph = builder::build_graph(description, config.schema())?;

        let relationships =
            RelationshipIndex::build(&graph, config.schema().max_hierarchy_depth());
        let index = ElementIndex::build(&graph);
        debug!("Relationship and element indices built");

        info!(
            classes = index.members(NodeKind::Class).len(),
            enums = index.members(NodeKind::Enum).len(),
            slots = index.members(NodeKind::Slot).len(),
            variables = index.members(NodeKind::Variable).len();
            "Schema ready",
        );

        Ok(Self {
            config,
            graph,
            relationships,
            index,
        })
    }

    /// Decodes a JSON description and builds a schema with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SchemascopeError::Description`] for malformed JSON and
    /// [`SchemascopeError::Build`] for malformed schema content.
    pub fn from_json_str(content: &str) -> Result<Self, SchemascopeError> {
        Self::from_json_str_with_config(content, AppConfig::default())
    }

    /// Decodes a JSON description and builds a schema with the given configuration.
    ///
    /// # Errors
    ///
    /// See [`Schema::from_json_str`]; an out-of-range configuration value
    /// yields [`SchemascopeError::Config`].
    pub fn from_json_str_with_config(
        content: &str,
        config: AppConfig,
    ) -> Result<Self, SchemascopeError> {
        let description = SchemaDescription::from_json_str(content)?;
        Self::build_with_config(&description, config)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// The underlying graph.
    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// Returns the element with the given id, if it exists.
    pub fn node(&self, id: Id) -> Option<&Node> {
        self.graph.node(id)
    }

    /// Declared edges leaving `id`, optionally filtered by kind.
    pub fn outgoing_edges(&self, id: Id, kind: Option<EdgeKind>) -> impl Iterator<Item = &Edge> {
        self.graph.outgoing_edges(id, kind)
    }

    /// Declared edges arriving at `id`, optionally filtered by kind.
    pub fn incoming_edges(&self, id: Id, kind: Option<EdgeKind>) -> impl Iterator<Item = &Edge> {
        self.graph.incoming_edges(id, kind)
    }

    /// Resolved relationships of `id`, including inherited properties.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if `id` is not part of the schema.
    pub fn relationships(&self, id: Id) -> Result<Relationships<'_>, NotFoundError> {
        self.relationships
            .get(id)
            .ok_or_else(|| NotFoundError::new(id))
    }

    pub fn relationship_index(&self) -> &RelationshipIndex {
        &self.relationships
    }

    /// Top-level elements of one kind. See [`ElementIndex::roots`].
    pub fn roots(&self, kind: NodeKind) -> &[Id] {
        self.index.roots(kind)
    }

    /// Direct children of `id`. See [`ElementIndex::children`].
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] if `id` is not part of the schema.
    pub fn children(&self, id: Id) -> Result<&[Id], NotFoundError> {
        self.index.children(id)
    }

    pub fn index(&self) -> &ElementIndex {
        &self.index
    }

    /// Creates a link layout engine using this schema's link configuration.
    pub fn link_engine(&self) -> LinkLayoutEngine<'_> {
        LinkLayoutEngine::new(self, self.config.links().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{ClassDeclaration, EnumDeclaration};

    #[test]
    fn test_build_and_query() {
        let description = SchemaDescription::default()
            .with_enum("SexEnum", EnumDeclaration::with_values(&["female", "male"]))
            .with_class("Participant", ClassDeclaration::new().with_attribute("sex", "SexEnum"));

        let schema = Schema::build(&description).unwrap();

        assert_eq!(schema.graph().node_count(), 2);
        assert_eq!(schema.roots(NodeKind::Enum), &[Id::new("SexEnum")]);
        assert!(schema.relationships(Id::new("SexEnum")).unwrap().outgoing().is_empty());
        assert_eq!(schema.incoming_edges(Id::new("SexEnum"), None).count(), 1);

        let err = schema.relationships(Id::new("Nope")).unwrap_err();
        assert_eq!(err.id(), Id::new("Nope"));
        assert!(schema.children(Id::new("Nope")).is_err());
    }

    #[test]
    fn test_from_json_errors() {
        let err = Schema::from_json_str("not json").unwrap_err();
        assert!(matches!(err, SchemascopeError::Description(_)));

        let err = Schema::from_json_str(r#"{ "classes": { "A": { "parent": "B" } } }"#).unwrap_err();
        assert!(matches!(
            err,
            SchemascopeError::Build(GraphBuildError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        use crate::config::{LinkConfig, SchemaConfig};
        use crate::error::ConfigError;

        let description = SchemaDescription::default().with_class("A", ClassDeclaration::new());

        let zero_depth = AppConfig::new(SchemaConfig::new(0), LinkConfig::default());
        let err = Schema::build_with_config(&description, zero_depth).unwrap_err();
        assert!(matches!(
            err,
            SchemascopeError::Config(ConfigError::InvalidValue { key: "schema.max_hierarchy_depth", .. })
        ));

        let negative_spacing = AppConfig::new(
            SchemaConfig::default(),
            LinkConfig::default().with_anchor_spacing(-1.0),
        );
        let err = Schema::from_json_str_with_config("{}", negative_spacing).unwrap_err();
        assert!(matches!(
            err,
            SchemascopeError::Config(ConfigError::InvalidValue { key: "links.anchor_spacing", .. })
        ));

        assert!(Schema::build_with_config(&description, AppConfig::default()).is_ok());
    }

    #[test]
    fn test_config_is_applied() {
        let config = AppConfig::from_toml_str("[schema]\nmax_hierarchy_depth = 1\n").unwrap();
        let json = r#"{ "classes": { "A": {}, "B": { "is_a": "A" }, "C": { "is_a": "B" } } }"#;

        let err = Schema::from_json_str_with_config(json, config).unwrap_err();
        assert!(matches!(
            err,
            SchemascopeError::Build(GraphBuildError::HierarchyTooDeep { max_depth: 1, .. })
        ));
    }
}
