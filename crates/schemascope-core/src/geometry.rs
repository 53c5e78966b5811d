//! Screen-space geometry used by the link layout engine.
//!
//! All coordinates are in the host UI's screen space: x grows to the right,
//! y grows downwards.

use serde::{Deserialize, Serialize};

/// A point in screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Multiplies both coordinates by the given factor
    pub fn scale(self, factor: f32) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }

    /// Returns true if both points are within `epsilon` of each other on both axes.
    pub fn approx_eq(self, other: Point, epsilon: f32) -> bool {
        (self.x - other.x).abs() <= epsilon && (self.y - other.y).abs() <= epsilon
    }
}

/// One of the four sides of a bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

impl Side {
    /// Returns true for the left and right sides.
    ///
    /// Anchors on vertical edges are spread along y, anchors on horizontal
    /// edges along x.
    pub fn is_vertical_edge(self) -> bool {
        matches!(self, Side::Left | Side::Right)
    }

    /// Returns the unit outward normal of this side.
    pub fn outward(self) -> Point {
        match self {
            Side::Left => Point::new(-1.0, 0.0),
            Side::Right => Point::new(1.0, 0.0),
            Side::Top => Point::new(0.0, -1.0),
            Side::Bottom => Point::new(0.0, 1.0),
        }
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
///
/// Deserialized boxes go through [`Bounds::new`], so swapped coordinates
/// from the host are normalized the same way as constructed ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBounds")]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

/// Wire form of [`Bounds`] before normalization.
#[derive(Deserialize)]
struct RawBounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl From<RawBounds> for Bounds {
    fn from(raw: RawBounds) -> Self {
        Self::new(raw.min_x, raw.min_y, raw.max_x, raw.max_y)
    }
}

impl Bounds {
    /// Creates bounds from its edges, normalizing swapped coordinates.
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns the center of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the midpoint of the given side.
    pub fn side_midpoint(self, side: Side) -> Point {
        let center = self.center();
        match side {
            Side::Left => Point::new(self.min_x, center.y()),
            Side::Right => Point::new(self.max_x, center.y()),
            Side::Top => Point::new(center.x(), self.min_y),
            Side::Bottom => Point::new(center.x(), self.max_y),
        }
    }

    /// Returns the top-right corner.
    pub fn top_right(self) -> Point {
        Point::new(self.max_x, self.min_y)
    }

    /// Returns true if every coordinate is finite.
    pub fn is_finite(self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// Returns true if the point lies inside or on the bounds.
    pub fn contains(self, point: Point) -> bool {
        point.x() >= self.min_x
            && point.x() <= self.max_x
            && point.y() >= self.min_y
            && point.y() <= self.max_y
    }
}

/// A cubic bezier curve.
///
/// Every connector the link layout engine produces is a single cubic segment:
/// cross-panel curves, same-panel bulges and self-loops differ only in where
/// the control points sit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubicCurve {
    start: Point,
    control1: Point,
    control2: Point,
    end: Point,
}

impl CubicCurve {
    pub fn new(start: Point, control1: Point, control2: Point, end: Point) -> Self {
        Self {
            start,
            control1,
            control2,
            end,
        }
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn control1(&self) -> Point {
        self.control1
    }

    pub fn control2(&self) -> Point {
        self.control2
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// Evaluates the curve at parameter `t` in `[0, 1]`.
    pub fn point_at(&self, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        self.start
            .scale(b0)
            .add_point(self.control1.scale(b1))
            .add_point(self.control2.scale(b2))
            .add_point(self.end.scale(b3))
    }

    /// Returns the point halfway along the curve parameter, used to place labels.
    pub fn midpoint(&self) -> Point {
        self.point_at(0.5)
    }

    /// Returns the bounding box of the control polygon.
    ///
    /// A cubic bezier always lies inside the convex hull of its control
    /// points, so this is a conservative bound of the drawn curve.
    pub fn hull_bounds(&self) -> Bounds {
        let xs = [
            self.start.x(),
            self.control1.x(),
            self.control2.x(),
            self.end.x(),
        ];
        let ys = [
            self.start.y(),
            self.control1.y(),
            self.control2.y(),
            self.end.y(),
        ];
        Bounds::new(
            xs.iter().copied().fold(f32::INFINITY, f32::min),
            ys.iter().copied().fold(f32::INFINITY, f32::min),
            xs.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            ys.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        )
    }

    /// Formats the curve as SVG path data (`M x y C ...`).
    pub fn to_path_data(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.start.x(),
            self.start.y(),
            self.control1.x(),
            self.control1.y(),
            self.control2.x(),
            self.control2.y(),
            self.end.x(),
            self.end.y()
        )
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let p1 = Point::new(5.0, 8.0);
        let p2 = Point::new(2.0, 3.0);

        assert_eq!(p1.add_point(p2), Point::new(7.0, 11.0));
        assert_eq!(p1.sub_point(p2), Point::new(3.0, 5.0));
        assert_eq!(p2.scale(2.0), Point::new(4.0, 6.0));
    }

    #[test]
    fn test_point_approx_eq() {
        let p = Point::new(1.0, 1.0);
        assert!(p.approx_eq(Point::new(1.0005, 0.9995), 0.001));
        assert!(!p.approx_eq(Point::new(1.01, 1.0), 0.001));
    }

    #[test]
    fn test_bounds_new_normalizes() {
        let bounds = Bounds::new(10.0, 20.0, 0.0, 5.0);
        assert_eq!(bounds.min_x(), 0.0);
        assert_eq!(bounds.min_y(), 5.0);
        assert_eq!(bounds.max_x(), 10.0);
        assert_eq!(bounds.max_y(), 20.0);
    }

    #[test]
    fn test_bounds_deserialize_normalizes() {
        let bounds: Bounds =
            serde_json::from_str(r#"{"min_x":20,"min_y":130,"max_x":220,"max_y":110}"#).unwrap();
        assert_eq!(bounds, Bounds::new(20.0, 110.0, 220.0, 130.0));
        assert_eq!(bounds.min_y(), 110.0);
        assert_eq!(bounds.max_y(), 130.0);
    }

    #[test]
    fn test_bounds_is_finite() {
        assert!(Bounds::new(0.0, 0.0, 10.0, 10.0).is_finite());
        assert!(!Bounds::new(f32::NAN, f32::NAN, f32::NAN, f32::NAN).is_finite());
        assert!(!Bounds::new(0.0, 0.0, f32::INFINITY, 10.0).is_finite());
    }

    #[test]
    fn test_side_midpoints() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 20.0);
        assert_eq!(bounds.side_midpoint(Side::Left), Point::new(0.0, 10.0));
        assert_eq!(bounds.side_midpoint(Side::Right), Point::new(10.0, 10.0));
        assert_eq!(bounds.side_midpoint(Side::Top), Point::new(5.0, 0.0));
        assert_eq!(bounds.side_midpoint(Side::Bottom), Point::new(5.0, 20.0));
        assert_eq!(bounds.top_right(), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_side_outward() {
        assert_eq!(Side::Left.outward(), Point::new(-1.0, 0.0));
        assert_eq!(Side::Bottom.outward(), Point::new(0.0, 1.0));
        assert!(Side::Left.is_vertical_edge());
        assert!(!Side::Top.is_vertical_edge());
    }

    #[test]
    fn test_bounds_contains() {
        let a = Bounds::new(1.0, 2.0, 5.0, 6.0);

        assert!(a.contains(Point::new(1.0, 2.0)));
        assert!(a.contains(Point::new(3.0, 4.0)));
        assert!(!a.contains(Point::new(0.0, 4.0)));
    }

    #[test]
    fn test_curve_endpoints_and_midpoint() {
        let curve = CubicCurve::new(
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 0.0),
        );
        assert_eq!(curve.point_at(0.0), curve.start());
        assert_eq!(curve.point_at(1.0), curve.end());
        assert_approx_eq!(f32, curve.midpoint().x(), 15.0);
        assert_approx_eq!(f32, curve.midpoint().y(), 0.0);
    }

    #[test]
    fn test_curve_path_data() {
        let curve = CubicCurve::new(
            Point::new(0.0, 1.0),
            Point::new(2.0, 3.0),
            Point::new(4.0, 5.0),
            Point::new(6.0, 7.0),
        );
        assert_eq!(curve.to_path_data(), "M 0 1 C 2 3, 4 5, 6 7");
    }

    #[test]
    fn test_hull_bounds() {
        let curve = CubicCurve::new(
            Point::new(0.0, 10.0),
            Point::new(-5.0, 0.0),
            Point::new(20.0, 30.0),
            Point::new(8.0, 4.0),
        );
        assert_eq!(curve.hull_bounds(), Bounds::new(-5.0, 0.0, 20.0, 30.0));
    }

    proptest! {
        #[test]
        fn prop_curve_stays_in_hull(
            coords in proptest::collection::vec(-500.0f32..500.0, 8),
            t in 0.0f32..=1.0,
        ) {
            let curve = CubicCurve::new(
                Point::new(coords[0], coords[1]),
                Point::new(coords[2], coords[3]),
                Point::new(coords[4], coords[5]),
                Point::new(coords[6], coords[7]),
            );
            let hull = curve.hull_bounds();
            let p = curve.point_at(t);
            let slack = 1e-2;
            prop_assert!(p.x() >= hull.min_x() - slack && p.x() <= hull.max_x() + slack);
            prop_assert!(p.y() >= hull.min_y() - slack && p.y() <= hull.max_y() + slack);
        }
    }
}
