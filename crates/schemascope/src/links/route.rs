//! Anchor placement and curve shapes for the three connector strategies.

use std::collections::HashMap;

use schemascope_core::geometry::{Bounds, CubicCurve, Point, Side};

use super::ItemKey;

/// Hands out anchor points on box edges.
///
/// The first anchor on a side sits at the side's midpoint. Later anchors on
/// the same side of the same item alternate below and above it, one
/// `spacing` step further each time, so no two connectors share an anchor.
#[derive(Debug)]
pub(crate) struct AnchorAllocator {
    spacing: f32,
    used: HashMap<(ItemKey, Side), usize>,
    loops: HashMap<ItemKey, usize>,
}

impl AnchorAllocator {
    pub(crate) fn new(spacing: f32) -> Self {
        Self {
            spacing,
            used: HashMap::new(),
            loops: HashMap::new(),
        }
    }

    /// Returns the next free anchor on `side` of the item's box.
    pub(crate) fn anchor(&mut self, key: ItemKey, bounds: Bounds, side: Side) -> Point {
        let slot = self.used.entry((key, side)).or_insert(0);
        let offset = spread_offset(*slot) * self.spacing;
        *slot += 1;

        // `f32::clamp` panics on inverted or NaN limits; max/min never does.
        let base = bounds.side_midpoint(side);
        if side.is_vertical_edge() {
            let y = (base.y() + offset).max(bounds.min_y()).min(bounds.max_y());
            Point::new(base.x(), y)
        } else {
            let x = (base.x() + offset).max(bounds.min_x()).min(bounds.max_x());
            Point::new(x, base.y())
        }
    }

    /// Returns how many self-loops the item already carries, then counts one more.
    pub(crate) fn next_loop(&mut self, key: ItemKey) -> usize {
        let count = self.loops.entry(key).or_insert(0);
        let index = *count;
        *count += 1;
        index
    }
}

/// Offset, in spacing steps, of the `slot`-th anchor on one side: 0, 1, -1, 2, -2, ...
fn spread_offset(slot: usize) -> f32 {
    if slot == 0 {
        return 0.0;
    }
    let step = slot.div_ceil(2) as f32;
    if slot % 2 == 1 { step } else { -step }
}

/// Curve between facing edges of boxes in two panels.
///
/// Control points extend horizontally from both anchors by `tension` times
/// the horizontal gap, giving the familiar S-shaped connector.
pub(crate) fn cross_panel_curve(start: Point, end: Point, tension: f32) -> CubicCurve {
    let reach = (end.x() - start.x()).abs() * tension;
    CubicCurve::new(
        start,
        start.add_point(Point::new(reach, 0.0)),
        end.sub_point(Point::new(reach, 0.0)),
        end,
    )
}

/// Curve between two boxes of one panel that bulges out past `side`.
///
/// Both control points sit on one vertical line `bulge` pixels beyond
/// `outer`, the panel's outermost x on that side. The line moves further out
/// until the curve keeps `clearance` pixels from every obstacle box it passes
/// on the way between the two anchors.
pub(crate) fn same_panel_curve(
    start: Point,
    end: Point,
    side: Side,
    outer: f32,
    bulge: f32,
    obstacles: &[Bounds],
    clearance: f32,
) -> CubicCurve {
    // Distances below are measured outwards: `sign * x`.
    let sign = side.outward().x();
    let (start_out, end_out) = (sign * start.x(), sign * end.x());
    let mut reach = (sign * outer).max(start_out).max(end_out) + bulge;

    let (low_y, high_y) = (start.y().min(end.y()), start.y().max(end.y()));
    for obstacle in obstacles {
        let above = obstacle.max_y() < low_y;
        let below = obstacle.min_y() > high_y;
        let touches_anchor = [start.y(), end.y()]
            .iter()
            .any(|&y| y >= obstacle.min_y() && y <= obstacle.max_y());
        if above || below || touches_anchor {
            continue;
        }

        let limit = (sign * obstacle.min_x()).max(sign * obstacle.max_x()) + clearance;
        let (from, to) = span_parameters(start.y(), end.y(), obstacle);
        for step in 0..=OBSTACLE_SAMPLES {
            let t = from + (to - from) * step as f32 / OBSTACLE_SAMPLES as f32;
            let weight = 3.0 * t * (1.0 - t);
            if weight <= f32::EPSILON {
                continue;
            }
            let fixed = start_out * (1.0 - t).powi(3) + end_out * t.powi(3);
            reach = reach.max((limit - fixed) / weight);
        }
    }

    let x = sign * reach;
    CubicCurve::new(start, Point::new(x, start.y()), Point::new(x, end.y()), end)
}

const OBSTACLE_SAMPLES: usize = 16;

/// Curve parameters between which the same-panel curve from `start_y` to
/// `end_y` is level with `obstacle`.
///
/// With both control points level with their anchors, the curve's y is
/// `start_y + (end_y - start_y) * smoothstep(t)`, which is monotonic, so the
/// range is found by inverting smoothstep.
fn span_parameters(start_y: f32, end_y: f32, obstacle: &Bounds) -> (f32, f32) {
    let span = end_y - start_y;
    let fraction = |y: f32| ((y - start_y) / span).max(0.0).min(1.0);
    let (a, b) = (fraction(obstacle.min_y()), fraction(obstacle.max_y()));
    (inverse_smoothstep(a.min(b)), inverse_smoothstep(a.max(b)))
}

fn inverse_smoothstep(value: f32) -> f32 {
    let (mut low, mut high) = (0.0_f32, 1.0_f32);
    for _ in 0..24 {
        let mid = (low + high) / 2.0;
        if mid * mid * (3.0 - 2.0 * mid) < value {
            low = mid;
        } else {
            high = mid;
        }
    }
    (low + high) / 2.0
}

/// Small loop wrapping the top-right corner of `bounds`.
///
/// The loop leaves the top edge `inset` pixels left of the corner and comes
/// back on the right edge `inset` pixels below it, reaching `size` pixels
/// out.
pub(crate) fn self_loop_curve(bounds: Bounds, size: f32, inset: f32) -> CubicCurve {
    let corner = bounds.top_right();
    let inset_x = inset.min(bounds.width());
    let inset_y = inset.min(bounds.height());
    let start = corner.sub_point(Point::new(inset_x, 0.0));
    let end = corner.add_point(Point::new(0.0, inset_y));
    CubicCurve::new(
        start,
        start.add_point(Point::new(0.0, -size)),
        end.add_point(Point::new(size, 0.0)),
        end,
    )
}
