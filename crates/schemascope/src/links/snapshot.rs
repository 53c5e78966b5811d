//! Visibility snapshots handed over by the display layer.

use std::collections::HashSet;

use serde::Serialize;

use schemascope_core::{
    geometry::Bounds,
    identifier::{Id, PanelId},
};

/// Identity of one visible copy of a schema element.
///
/// The same element can be shown in several panels, so every link endpoint
/// is keyed by the element and the panel it is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ItemKey {
    node: Id,
    panel: PanelId,
}

impl ItemKey {
    pub fn new(node: Id, panel: PanelId) -> Self {
        Self { node, panel }
    }

    pub fn node(&self) -> Id {
        self.node
    }

    pub fn panel(&self) -> PanelId {
        self.panel
    }
}

/// A schema element drawn in a panel, with its on-screen box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleItem {
    node: Id,
    bounds: Bounds,
}

impl VisibleItem {
    pub fn new(node: Id, bounds: Bounds) -> Self {
        Self { node, bounds }
    }

    pub fn node(&self) -> Id {
        self.node
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

/// What one panel currently shows.
///
/// Items are listed in display order. The expansion set names the elements
/// whose children are shown; items below a collapsed ancestor are treated as
/// not visible even when the caller lists them.
#[derive(Debug, Clone)]
pub struct PanelSnapshot {
    panel: PanelId,
    bounds: Bounds,
    items: Vec<VisibleItem>,
    expanded: HashSet<Id>,
}

impl PanelSnapshot {
    /// Creates an empty snapshot for `panel`, whose on-screen area is `bounds`.
    pub fn new(panel: PanelId, bounds: Bounds) -> Self {
        Self {
            panel,
            bounds,
            items: Vec::new(),
            expanded: HashSet::new(),
        }
    }

    /// Appends a visible item (builder style).
    pub fn with_item(mut self, node: Id, bounds: Bounds) -> Self {
        self.items.push(VisibleItem::new(node, bounds));
        self
    }

    /// Marks elements as expanded (builder style).
    pub fn with_expanded(mut self, ids: impl IntoIterator<Item = Id>) -> Self {
        self.expanded.extend(ids);
        self
    }

    /// Appends a visible item.
    pub fn push_item(&mut self, node: Id, bounds: Bounds) {
        self.items.push(VisibleItem::new(node, bounds));
    }

    pub fn panel(&self) -> PanelId {
        self.panel
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn items(&self) -> &[VisibleItem] {
        &self.items
    }

    pub fn expanded(&self) -> &HashSet<Id> {
        &self.expanded
    }

    /// Mean horizontal center of the items with finite boxes, or `None` when
    /// there are none.
    pub(crate) fn mean_item_center_x(&self) -> Option<f32> {
        let (sum, count) = self
            .items
            .iter()
            .filter(|item| item.bounds.is_finite())
            .fold((0.0_f32, 0_usize), |(sum, count), item| {
                (sum + item.bounds.center().x(), count + 1)
            });
        (count > 0).then(|| sum / count as f32)
    }
}
