//! Point and canonical airfoil types.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

/// A 2-D coordinate pair, serialized as `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    /// Chordwise coordinate.
    pub x: f64,
    /// Thickness-wise coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Whether two points are coincident within `epsilon`.
    #[must_use]
    pub fn coincides(&self, other: &Self, epsilon: f64) -> bool {
        self.distance(other) < epsilon
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// Airfoil coordinates in solver order: trailing edge, along one surface to
/// the leading edge, and back along the other surface to the trailing edge.
///
/// Only the normalizer can build one, so a value of this type always went
/// through parsing, reordering and de-duplication.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalAirfoil {
    points: Vec<Point>,
}

impl CanonicalAirfoil {
    pub(crate) fn from_normalized(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// The ordered points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the airfoil has no points. Never true for normalizer output.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the first point of minimum x.
    #[must_use]
    pub fn leading_edge_index(&self) -> usize {
        min_x_index(&self.points)
    }

    /// Points from the first trailing-edge point to the leading edge (inclusive).
    #[must_use]
    pub fn upper(&self) -> &[Point] {
        &self.points[..=self.leading_edge_index()]
    }

    /// Points from the leading edge (inclusive) to the last trailing-edge point.
    #[must_use]
    pub fn lower(&self) -> &[Point] {
        &self.points[self.leading_edge_index()..]
    }

    /// Render in the plain `.dat` layout the solver loads: a name line
    /// followed by one `x y` row per point.
    #[must_use]
    pub fn to_dat(&self, name: &str) -> String {
        let mut out = String::with_capacity(self.points.len() * 24 + name.len() + 1);
        out.push_str(name);
        out.push('\n');
        for p in &self.points {
            let _ = writeln!(out, " {:.6} {:.6}", p.x, p.y);
        }
        out
    }
}

/// Index of the first point with minimum x.
pub(crate) fn min_x_index(points: &[Point]) -> usize {
    points
        .iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, best_x), (i, p)| {
            if p.x < best_x {
                (i, p.x)
            } else {
                (best, best_x)
            }
        })
        .0
}

/// Index of the first point with maximum x.
pub(crate) fn max_x_index(points: &[Point]) -> usize {
    points
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, best_x), (i, p)| {
            if p.x > best_x {
                (i, p.x)
            } else {
                (best, best_x)
            }
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> CanonicalAirfoil {
        CanonicalAirfoil::from_normalized(vec![
            Point::new(1.0, 0.0),
            Point::new(0.5, 0.1),
            Point::new(0.0, 0.0),
            Point::new(0.5, -0.1),
            Point::new(1.0, -0.001),
        ])
    }

    #[test]
    fn point_coincidence() {
        let a = Point::new(0.0, 0.0);
        assert!(a.coincides(&Point::new(0.0005, 0.0), 1e-3));
        assert!(!a.coincides(&Point::new(0.002, 0.0), 1e-3));
    }

    #[test]
    fn point_serializes_as_pair() {
        let json = serde_json::to_string(&Point::new(0.25, -0.5)).unwrap();
        assert_eq!(json, "[0.25,-0.5]");
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Point::new(0.25, -0.5));
    }

    #[test]
    fn surfaces_share_leading_edge() {
        let airfoil = diamond();
        assert_eq!(airfoil.leading_edge_index(), 2);
        assert_eq!(airfoil.upper().len(), 3);
        assert_eq!(airfoil.lower().len(), 3);
        assert_eq!(airfoil.upper().last(), airfoil.lower().first());
    }

    #[test]
    fn dat_rendering() {
        let dat = diamond().to_dat("AIRFOIL");
        let mut lines = dat.lines();
        assert_eq!(lines.next(), Some("AIRFOIL"));
        assert_eq!(lines.next(), Some(" 1.000000 0.000000"));
        assert_eq!(dat.lines().count(), 6);
    }

    #[test]
    fn extreme_indices() {
        let pts = diamond().points().to_vec();
        assert_eq!(min_x_index(&pts), 2);
        assert_eq!(max_x_index(&pts), 0);
    }
}
