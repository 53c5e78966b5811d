//! Error types for Schemascope operations.
//!
//! Two families of failures exist. [`GraphBuildError`] is fatal and only ever
//! raised while a [`Schema`](crate::Schema) is being constructed; no partial
//! graph escapes a failed build. [`NotFoundError`] is raised by queries
//! against an unknown id and is recoverable: callers render nothing.
//! [`SchemascopeError`] wraps both together with configuration and input
//! decoding failures.

use thiserror::Error;

use schemascope_core::identifier::Id;

use crate::structure::{EdgeKind, NodeKind};

/// Malformed schema input detected while building the graph.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphBuildError {
    #[error("duplicate element id `{id}`")]
    DuplicateId { id: Id },

    #[error("{kind} edge `{from}` -> `{to}` references unknown node `{missing}`")]
    UnknownNode {
        kind: EdgeKind,
        from: Id,
        to: Id,
        missing: Id,
    },

    #[error("`{owner}` references unknown element `{reference}`")]
    DanglingReference { owner: Id, reference: String },

    #[error("attribute `{label}` of `{owner}` targets {kind} `{target}`; only classes and enums can be attribute ranges")]
    InvalidRange {
        owner: Id,
        label: String,
        target: Id,
        kind: NodeKind,
    },

    #[error("class `{class}` declares parent `{parent}`, which is not a class (found {kind})")]
    ParentNotClass { class: Id, parent: Id, kind: NodeKind },

    #[error("variable `{variable}` maps to `{target}`, which is not a class (found {kind})")]
    MappingTargetNotClass {
        variable: Id,
        target: Id,
        kind: NodeKind,
    },

    #[error("inheritance cycle through class `{class}`")]
    InheritanceCycle { class: Id },

    #[error("class `{class}` is nested deeper than the maximum hierarchy depth of {max_depth}")]
    HierarchyTooDeep { class: Id, max_depth: usize },
}

/// A query named an id that is not part of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no schema element with id `{id}`")]
pub struct NotFoundError {
    id: Id,
}

impl NotFoundError {
    pub fn new(id: Id) -> Self {
        Self { id }
    }

    /// The id that was looked up.
    pub fn id(&self) -> Id {
        self.id
    }
}

/// Invalid configuration values or TOML syntax.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration value for `{key}`: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// The main error type for Schemascope operations.
#[derive(Debug, Error)]
pub enum SchemascopeError {
    #[error("Graph build error: {0}")]
    Build(#[from] GraphBuildError),

    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid schema description: {0}")]
    Description(#[from] serde_json::Error),
}
