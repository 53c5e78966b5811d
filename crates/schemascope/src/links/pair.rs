//! Computed connectors.

use std::fmt;

use serde::Serialize;

use schemascope_core::{
    geometry::{CubicCurve, Point},
    identifier::Id,
};

use super::ItemKey;
use crate::structure::{Edge, EdgeKind};

/// How a connector is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStrategy {
    /// Between boxes in different panels, joining their facing edges.
    CrossPanel,
    /// Between two boxes of one panel, bulging past the panel's outer side.
    SamePanel,
    /// From a box back to itself, as a small loop at its top-right corner.
    SelfLoop,
}

impl fmt::Display for RenderStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStrategy::CrossPanel => "cross-panel",
            RenderStrategy::SamePanel => "same-panel",
            RenderStrategy::SelfLoop => "self-loop",
        };
        f.write_str(name)
    }
}

/// Which end of the curve the arrow head belongs to.
///
/// - `Forward`: the curve starts at the relationship source (`->`)
/// - `Backward`: the curve starts at the relationship target (`<-`)
///
/// Cross-panel curves always start at the physically left box, so a
/// relationship pointing leftwards is drawn backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrowDirection {
    Forward,
    Backward,
}

impl fmt::Display for ArrowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Forward => "->",
            Self::Backward => "<-",
        })
    }
}

/// One renderable connector between two visible items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkPair {
    source: ItemKey,
    target: ItemKey,
    kind: EdgeKind,
    label: Option<String>,
    inherited_from: Option<Id>,
    strategy: RenderStrategy,
    direction: ArrowDirection,
    curve: CubicCurve,
    label_anchor: Point,
}

impl LinkPair {
    /// Creates a connector drawing `edge` between two visible items.
    pub(crate) fn new(
        source: ItemKey,
        target: ItemKey,
        edge: &Edge,
        strategy: RenderStrategy,
        direction: ArrowDirection,
        curve: CubicCurve,
    ) -> Self {
        Self {
            source,
            target,
            kind: edge.kind(),
            label: edge.label().map(str::to_string),
            inherited_from: edge.inherited_from(),
            strategy,
            direction,
            label_anchor: curve.midpoint(),
            curve,
        }
    }

    /// The visible copy of the relationship source.
    pub fn source(&self) -> ItemKey {
        self.source
    }

    /// The visible copy of the relationship target.
    pub fn target(&self) -> ItemKey {
        self.target
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn inherited_from(&self) -> Option<Id> {
        self.inherited_from
    }

    pub fn strategy(&self) -> RenderStrategy {
        self.strategy
    }

    pub fn direction(&self) -> ArrowDirection {
        self.direction
    }

    pub fn curve(&self) -> &CubicCurve {
        &self.curve
    }

    /// Where the renderer places the label text.
    pub fn label_anchor(&self) -> Point {
        self.label_anchor
    }

    /// Returns true when both ends are the same visible item.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
