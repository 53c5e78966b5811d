//! The typed schema graph.
//!
//! - [`Node`] / [`NodeKind`]: schema elements with kind-specific payloads
//! - [`Edge`] / [`EdgeKind`]: typed, directed relationships
//! - [`SchemaGraph`]: node arena with forward and reverse edge indices

mod edge;
mod graph;
mod node;

pub use edge::{Edge, EdgeKind};
pub use graph::{Ancestors, EdgeIndex, SchemaGraph};
pub use node::{
    Attribute, ClassPayload, EnumPayload, Node, NodeKind, Payload, PermissibleValue, Range,
    SlotPayload, VariablePayload,
};
