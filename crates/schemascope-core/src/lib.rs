//! Schemascope Core Types
//!
//! This crate provides the foundational types shared by the Schemascope
//! schema browser core. It includes:
//!
//! - **Identifiers**: String-interned element identifiers ([`identifier::Id`])
//!   and panel identifiers ([`identifier::PanelId`])
//! - **Geometry**: Points, bounding boxes, box sides and cubic curves
//!   ([`geometry`] module)

pub mod geometry;
pub mod identifier;
