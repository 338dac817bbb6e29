//! Normalizer options and configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    MAX_GEOMETRY_BYTES, MAX_POINTS, MIN_POINTS, POINT_EPSILON, SECTION_BREAK_HIGH_X,
    SECTION_BREAK_LOW_X, TRAILING_EDGE_TOLERANCE, X_DOMAIN, Y_DOMAIN,
};

/// Options for geometry normalization.
///
/// The section-break thresholds are empirical; they are exposed here so a
/// deployment can retune them against its own corpus of coordinate files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerOptions {
    /// Maximum payload size in bytes.
    pub max_bytes: usize,
    /// Minimum number of valid points.
    pub min_points: usize,
    /// Maximum number of valid points.
    pub max_points: usize,
    /// Accepted x range (inclusive).
    pub x_domain: (f64, f64),
    /// Accepted y range (inclusive).
    pub y_domain: (f64, f64),
    /// Coincidence tolerance.
    pub epsilon: f64,
    /// Two-section detector: "at the leading edge" threshold.
    pub break_low_x: f64,
    /// Two-section detector: "near the trailing edge" threshold.
    pub break_high_x: f64,
    /// Fraction of chord within which a first point counts as trailing edge.
    pub trailing_edge_tolerance: f64,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self {
            max_bytes: MAX_GEOMETRY_BYTES,
            min_points: MIN_POINTS,
            max_points: MAX_POINTS,
            x_domain: X_DOMAIN,
            y_domain: Y_DOMAIN,
            epsilon: POINT_EPSILON,
            break_low_x: SECTION_BREAK_LOW_X,
            break_high_x: SECTION_BREAK_HIGH_X,
            trailing_edge_tolerance: TRAILING_EDGE_TOLERANCE,
        }
    }
}

impl NormalizerOptions {
    /// Normalize options, restoring defaults for zero or inconsistent values.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        let defaults = Self::default();
        if self.max_bytes == 0 {
            self.max_bytes = defaults.max_bytes;
        }
        if self.min_points < 3 {
            self.min_points = defaults.min_points;
        }
        if self.max_points < self.min_points {
            self.max_points = defaults.max_points.max(self.min_points);
        }
        if self.epsilon.is_nan() || self.epsilon <= 0.0 {
            self.epsilon = defaults.epsilon;
        }
        if self.break_low_x.is_nan()
            || self.break_high_x.is_nan()
            || self.break_low_x >= self.break_high_x
        {
            self.break_low_x = defaults.break_low_x;
            self.break_high_x = defaults.break_high_x;
        }
        if self.trailing_edge_tolerance.is_nan() || self.trailing_edge_tolerance <= 0.0 {
            self.trailing_edge_tolerance = defaults.trailing_edge_tolerance;
        }
        self
    }

    /// Whether a parsed pair lies inside the accepted coordinate domain.
    #[must_use]
    pub fn accepts(&self, x: f64, y: f64) -> bool {
        (self.x_domain.0..=self.x_domain.1).contains(&x)
            && (self.y_domain.0..=self.y_domain.1).contains(&y)
    }
}
