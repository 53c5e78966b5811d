//! Cross-panel link geometry.
//!
//! The [`LinkLayoutEngine`] turns two panel snapshots into the connectors a
//! renderer draws between visible schema elements:
//!
//! - [`PanelSnapshot`] / [`VisibleItem`]: what each panel shows and where
//! - [`ItemKey`]: one visible copy of an element, `(node, panel)`
//! - [`LinkPair`]: one connector with its [`RenderStrategy`] and curve
//!
//! Only property and variable-mapping relationships are drawn; inheritance
//! is already visible as panel tree nesting.
//!
//! # Placement rules
//!
//! A relationship whose target is visible in the other panel becomes a
//! cross-panel curve. Otherwise, if the target is visible in the same panel,
//! it becomes a same-panel curve bulging past the panel's outer side. A
//! self-reference gets a loop on every visible copy of its element, plus one
//! cross-panel curve from the left copy to the right copy when the element
//! is visible in both panels.
//!
//! Cross-panel curves always run from the physically left box to the
//! physically right one; [`ArrowDirection`] records which end is the
//! relationship source.

mod pair;
mod route;
mod snapshot;

use indexmap::IndexMap;
use log::{debug, trace, warn};

use schemascope_core::{
    geometry::{Bounds, Side},
    identifier::{Id, PanelId},
};

pub use pair::{ArrowDirection, LinkPair, RenderStrategy};
pub use snapshot::{ItemKey, PanelSnapshot, VisibleItem};

use crate::{
    Schema,
    config::LinkConfig,
    structure::{Edge, EdgeKind},
};
use route::AnchorAllocator;

/// Computes connector geometry between the visible items of two panels.
///
/// The engine borrows the built [`Schema`] and holds no other state;
/// [`compute_links`](Self::compute_links) is a pure function of its inputs.
#[derive(Debug)]
pub struct LinkLayoutEngine<'a> {
    schema: &'a Schema,
    config: LinkConfig,
}

impl<'a> LinkLayoutEngine<'a> {
    pub fn new(schema: &'a Schema, config: LinkConfig) -> Self {
        Self { schema, config }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// Computes every connector between and within the two panels.
    ///
    /// Pairs are ordered by panel (argument order), then item (snapshot
    /// order), then relationship (resolved order), so identical inputs yield
    /// identical output.
    pub fn compute_links(&self, first: &PanelSnapshot, second: &PanelSnapshot) -> Vec<LinkPair> {
        let first_is_left = first_is_left(first, second);
        let mut panels = [
            self.visible_panel(first, first_is_left),
            self.visible_panel(second, !first_is_left),
        ];
        if first.panel() == second.panel() {
            warn!(panel:% = first.panel(); "Both snapshots name the same panel, ignoring the second");
            panels[1].items.clear();
        }
        let mut anchors = AnchorAllocator::new(self.config.anchor_spacing());
        let mut pairs = Vec::new();

        for (this, other) in [(&panels[0], &panels[1]), (&panels[1], &panels[0])] {
            for (&node, &bounds) in &this.items {
                let source = this.key(node);
                for edge in self.schema.relationship_index().outgoing(node) {
                    if !matches!(edge.kind(), EdgeKind::Property | EdgeKind::VariableMapping) {
                        continue;
                    }
                    let target = edge.target();

                    if edge.is_self_ref() {
                        pairs.push(self.self_loop(source, bounds, edge, &mut anchors));
                        if this.is_left {
                            if let Some(&other_bounds) = other.items.get(&node) {
                                pairs.push(self.cross_panel(
                                    (source, bounds, this),
                                    (other.key(node), other_bounds),
                                    edge,
                                    &mut anchors,
                                ));
                            }
                        }
                    } else if let Some(&target_bounds) = other.items.get(&target) {
                        pairs.push(self.cross_panel(
                            (source, bounds, this),
                            (other.key(target), target_bounds),
                            edge,
                            &mut anchors,
                        ));
                    } else if let Some(&target_bounds) = this.items.get(&target) {
                        pairs.push(self.same_panel(
                            (source, bounds),
                            (this.key(target), target_bounds),
                            this,
                            edge,
                            &mut anchors,
                        ));
                    }
                }
            }
        }

        debug!(
            left:% = if first_is_left { first.panel() } else { second.panel() },
            pairs = pairs.len();
            "Links computed",
        );
        pairs
    }

    fn visible_panel(&self, snapshot: &PanelSnapshot, is_left: bool) -> VisiblePanel {
        let mut items: IndexMap<Id, Bounds> = IndexMap::with_capacity(snapshot.items().len());
        for item in snapshot.items() {
            let node = item.node();
            if self.schema.node(node).is_none() {
                debug!(node:% = node, panel:% = snapshot.panel(); "Skipping unknown visible item");
                continue;
            }
            if self.schema.index().is_hidden(node, snapshot.expanded()) {
                trace!(node:% = node, panel:% = snapshot.panel(); "Skipping collapsed item");
                continue;
            }
            if !item.bounds().is_finite() {
                debug!(node:% = node, panel:% = snapshot.panel(); "Skipping item with non-finite bounds");
                continue;
            }
            items.entry(node).or_insert(item.bounds());
        }
        let outer = outer_edge(snapshot.bounds(), items.values().copied(), is_left);
        VisiblePanel {
            panel: snapshot.panel(),
            is_left,
            outer,
            items,
        }
    }

    fn self_loop(
        &self,
        key: ItemKey,
        bounds: Bounds,
        edge: &Edge,
        anchors: &mut AnchorAllocator,
    ) -> LinkPair {
        // Nested loops grow outwards so labels on one item stay apart.
        let growth = anchors.next_loop(key) as f32 * self.config.anchor_spacing();
        let curve = route::self_loop_curve(
            bounds,
            self.config.loop_size() + growth,
            self.config.loop_inset() + growth,
        );
        trace!(node:% = key.node(), panel:% = key.panel(); "Self loop");
        LinkPair::new(
            key,
            key,
            edge,
            RenderStrategy::SelfLoop,
            ArrowDirection::Forward,
            curve,
        )
    }

    fn cross_panel(
        &self,
        (source, source_bounds, source_panel): (ItemKey, Bounds, &VisiblePanel),
        (target, target_bounds): (ItemKey, Bounds),
        edge: &Edge,
        anchors: &mut AnchorAllocator,
    ) -> LinkPair {
        let (left, left_bounds, right, right_bounds, direction) = if source_panel.is_left {
            (source, source_bounds, target, target_bounds, ArrowDirection::Forward)
        } else {
            (target, target_bounds, source, source_bounds, ArrowDirection::Backward)
        };
        let start = anchors.anchor(left, left_bounds, Side::Right);
        let end = anchors.anchor(right, right_bounds, Side::Left);
        let curve = route::cross_panel_curve(start, end, self.config.curve_tension());
        LinkPair::new(
            source,
            target,
            edge,
            RenderStrategy::CrossPanel,
            direction,
            curve,
        )
    }

    fn same_panel(
        &self,
        (source, source_bounds): (ItemKey, Bounds),
        (target, target_bounds): (ItemKey, Bounds),
        panel: &VisiblePanel,
        edge: &Edge,
        anchors: &mut AnchorAllocator,
    ) -> LinkPair {
        let side = panel.outer_side();
        let start = anchors.anchor(source, source_bounds, side);
        let end = anchors.anchor(target, target_bounds, side);
        let bulge = self.config.bulge_for_span(end.y() - start.y());
        let obstacles: Vec<Bounds> = panel
            .items
            .iter()
            .filter(|&(&node, _)| node != source.node() && node != target.node())
            .map(|(_, &bounds)| bounds)
            .collect();
        let curve = route::same_panel_curve(
            start,
            end,
            side,
            panel.outer,
            bulge,
            &obstacles,
            self.config.anchor_spacing(),
        );
        LinkPair::new(
            source,
            target,
            edge,
            RenderStrategy::SamePanel,
            ArrowDirection::Forward,
            curve,
        )
    }
}

/// The visible, known items of one panel, first occurrence per node.
#[derive(Debug)]
struct VisiblePanel {
    panel: PanelId,
    is_left: bool,
    /// Outermost x on the outer side, over the panel box and its items.
    outer: f32,
    items: IndexMap<Id, Bounds>,
}

impl VisiblePanel {
    fn key(&self, node: Id) -> ItemKey {
        ItemKey::new(node, self.panel)
    }

    /// The side facing away from the other panel.
    fn outer_side(&self) -> Side {
        if self.is_left { Side::Left } else { Side::Right }
    }
}

/// Outermost x of a panel on its outer side. Non-finite panel bounds are
/// ignored.
fn outer_edge(panel: Bounds, items: impl Iterator<Item = Bounds>, is_left: bool) -> f32 {
    let panel = panel.is_finite().then_some(panel);
    if is_left {
        items
            .chain(panel)
            .map(Bounds::min_x)
            .fold(f32::INFINITY, f32::min)
    } else {
        items
            .chain(panel)
            .map(Bounds::max_x)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

/// Decides whether `first` is drawn to the left of `second`.
///
/// Panel boxes decide; equal or non-finite centers fall back to the mean
/// item position, and a complete tie keeps argument order.
fn first_is_left(first: &PanelSnapshot, second: &PanelSnapshot) -> bool {
    let first_x = first.bounds().center().x();
    let second_x = second.bounds().center().x();
    if first_x.is_finite() && second_x.is_finite() && first_x != second_x {
        return first_x < second_x;
    }
    match (first.mean_item_center_x(), second.mean_item_center_x()) {
        (Some(first_x), Some(second_x)) if first_x != second_x => first_x < second_x,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(name: &str, min_x: f32) -> PanelSnapshot {
        PanelSnapshot::new(PanelId::new(name), Bounds::new(min_x, 0.0, min_x + 300.0, 600.0))
    }

    #[test]
    fn test_first_is_left_by_panel_bounds() {
        assert!(first_is_left(&snapshot("a", 0.0), &snapshot("b", 400.0)));
        assert!(!first_is_left(&snapshot("a", 400.0), &snapshot("b", 0.0)));
    }

    #[test]
    fn test_first_is_left_falls_back_to_items() {
        let first = snapshot("a", 0.0).with_item(Id::new("X"), Bounds::new(500.0, 0.0, 600.0, 20.0));
        let second = snapshot("b", 0.0).with_item(Id::new("Y"), Bounds::new(0.0, 0.0, 100.0, 20.0));
        assert!(!first_is_left(&first, &second));

        assert!(first_is_left(&snapshot("a", 0.0), &snapshot("b", 0.0)));
    }

    #[test]
    fn test_first_is_left_with_nan_panel_bounds() {
        let nan = Bounds::new(f32::NAN, f32::NAN, f32::NAN, f32::NAN);
        let first = PanelSnapshot::new(PanelId::new("a"), nan)
            .with_item(Id::new("X"), Bounds::new(500.0, 0.0, 600.0, 20.0));
        let second = snapshot("b", 0.0).with_item(Id::new("Y"), Bounds::new(0.0, 0.0, 100.0, 20.0));

        assert!(!first_is_left(&first, &second));
        assert!(first_is_left(&second, &first), "the decision is order free");
    }

    #[test]
    fn test_outer_edge_covers_items_past_the_panel() {
        let panel = Bounds::new(0.0, 0.0, 300.0, 600.0);
        let items = [
            Bounds::new(-40.0, 0.0, 100.0, 20.0),
            Bounds::new(20.0, 30.0, 340.0, 50.0),
        ];
        assert_eq!(outer_edge(panel, items.into_iter(), true), -40.0);
        assert_eq!(outer_edge(panel, items.into_iter(), false), 340.0);

        let nan = Bounds::new(f32::NAN, f32::NAN, f32::NAN, f32::NAN);
        assert_eq!(outer_edge(nan, items.into_iter(), true), -40.0);
    }
}
