//! Geometry primitives shared by the packer.
//!
//! Coordinates follow screen conventions: `y` grows downward, so the "upper" tangent solution of a
//! left-to-right pair has a negative `y`.

use serde::{Deserialize, Serialize};

/// Squared-distance slack for intersection tests. Circles that are tangent up to floating-point
/// noise are not considered intersecting.
pub const INTERSECT_TOLERANCE: f64 = 0.999;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A placed circle: center plus radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disc {
    pub center: Point,
    pub radius: f64,
}

impl Disc {
    pub const fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// The closed interval this disc covers on the baseline.
    pub fn span(&self) -> Interval {
        Interval::around(self.center.x, self.radius)
    }
}

/// Closed 1-D interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn around(center: f64, radius: f64) -> Self {
        Self {
            min: center - radius,
            max: center + radius,
        }
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        interval_overlap(*self, *other)
    }

    pub fn union(&self, other: &Interval) -> Interval {
        Interval {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// True when two closed intervals share at least one point.
pub fn interval_overlap(a: Interval, b: Interval) -> bool {
    !(a.max < b.min || b.max < a.min)
}

/// Center of a circle of `radius` externally tangent to both `a` and `b`.
///
/// Of the two solutions this picks the one on the right-hand side of the directed pair `a -> b`
/// (non-negative perpendicular offset along `(dy, -dx)`), so walking a ring in one rotational
/// direction always grows outward. When `a` and `b` share a center, or `a` has no extent, the
/// circle is placed directly right of `a` on its baseline.
pub fn tangent_place(a: Disc, b: Disc, radius: f64) -> Point {
    let mut db = a.radius + radius;
    let dx = b.center.x - a.center.x;
    let dy = b.center.y - a.center.y;
    if db != 0.0 && (dx != 0.0 || dy != 0.0) {
        let mut da = b.radius + radius;
        let dc = dx * dx + dy * dy;
        da *= da;
        db *= db;
        let along = 0.5 + (db - da) / (2.0 * dc);
        let spread = db - dc;
        // Law of cosines; rounding can push the discriminant slightly below zero.
        let across =
            (2.0 * da * (db + dc) - spread * spread - da * da).max(0.0).sqrt() / (2.0 * dc);
        Point {
            x: a.center.x + along * dx + across * dy,
            y: a.center.y + along * dy - across * dx,
        }
    } else {
        Point {
            x: a.center.x + db,
            y: a.center.y,
        }
    }
}

pub fn intersects(a: Disc, b: Disc) -> bool {
    let dx = b.center.x - a.center.x;
    let dy = b.center.y - a.center.y;
    let dr = a.radius + b.radius;
    INTERSECT_TOLERANCE * dr * dr > dx * dx + dy * dy
}

/// Center distance minus the sum of radii. Zero at exact tangency, negative when overlapping.
pub fn tangent_gap(a: Disc, b: Disc) -> f64 {
    a.center.distance(b.center) - a.radius - b.radius
}

/// Euclidean distance from `p` to the baseline point `(target, 0)`.
pub fn distance_to_target(p: Point, target: f64) -> f64 {
    p.distance(Point::new(target, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc(x: f64, y: f64, r: f64) -> Disc {
        Disc::new(Point::new(x, y), r)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn tangent_place_unit_circles_forms_equilateral_triangle() {
        let p = tangent_place(disc(0.0, 0.0, 1.0), disc(2.0, 0.0, 1.0), 1.0);
        assert_close(p.x, 1.0);
        assert_close(p.y, -(3.0_f64).sqrt());
    }

    #[test]
    fn tangent_place_is_tangent_to_both_inputs() {
        let a = disc(1.0, 2.0, 1.5);
        let b = disc(4.0, 3.0, 0.75);
        let r = 2.25;
        let p = tangent_place(a, b, r);
        assert_close(p.distance(a.center), a.radius + r);
        assert_close(p.distance(b.center), b.radius + r);
    }

    #[test]
    fn tangent_place_reversed_pair_mirrors_across_the_center_line() {
        let a = disc(0.0, 0.0, 1.0);
        let b = disc(2.0, 0.0, 1.0);
        let up = tangent_place(a, b, 1.0);
        let down = tangent_place(b, a, 1.0);
        assert_close(up.x, down.x);
        assert_close(up.y, -down.y);
    }

    #[test]
    fn tangent_place_coincident_centers_goes_right() {
        let p = tangent_place(disc(3.0, 1.0, 2.0), disc(3.0, 1.0, 5.0), 1.0);
        assert_eq!(p, Point::new(6.0, 1.0));
    }

    #[test]
    fn tangent_place_clamps_negative_discriminant() {
        // Far apart: no exact double tangency exists, the solution collapses onto the center line.
        let p = tangent_place(disc(0.0, 0.0, 1.0), disc(100.0, 0.0, 1.0), 1.0);
        assert!(p.x.is_finite() && p.y.is_finite());
        assert_close(p.y, 0.0);
    }

    #[test]
    fn intersects_ignores_near_tangency() {
        let a = disc(0.0, 0.0, 1.0);
        assert!(!intersects(a, disc(2.0, 0.0, 1.0)));
        assert!(!intersects(a, disc(1.9995, 0.0, 1.0)));
        assert!(intersects(a, disc(1.99, 0.0, 1.0)));
        assert!(intersects(a, disc(0.0, 0.0, 0.5)));
    }

    #[test]
    fn interval_overlap_is_closed() {
        let a = Interval::new(0.0, 1.0);
        assert!(interval_overlap(a, Interval::new(1.0, 2.0)));
        assert!(interval_overlap(Interval::new(-3.0, 5.0), a));
        assert!(!interval_overlap(a, Interval::new(1.0001, 2.0)));
    }

    #[test]
    fn tangent_gap_sign() {
        let a = disc(0.0, 0.0, 1.0);
        assert_close(tangent_gap(a, disc(2.0, 0.0, 1.0)), 0.0);
        assert_close(tangent_gap(a, disc(5.0, 0.0, 1.0)), 3.0);
        assert!(tangent_gap(a, disc(1.0, 0.0, 1.0)) < 0.0);
    }

    #[test]
    fn distance_to_target_measures_from_baseline() {
        assert_close(distance_to_target(Point::new(3.0, 4.0), 0.0), 5.0);
        assert_close(distance_to_target(Point::new(7.0, 0.0), 7.0), 0.0);
    }
}
