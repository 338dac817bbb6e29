//! Constants for geometry validation, flow bounds, and solver defaults.

/// Maximum accepted size (in bytes) of a raw geometry upload.
pub const MAX_GEOMETRY_BYTES: usize = 64 * 1024;

/// Minimum number of valid points for a usable airfoil.
pub const MIN_POINTS: usize = 10;

/// Maximum number of points accepted from a single geometry.
pub const MAX_POINTS: usize = 500;

/// Coincidence tolerance between two points.
pub const POINT_EPSILON: f64 = 1e-3;

/// Accepted chordwise coordinate domain.
pub const X_DOMAIN: (f64, f64) = (-0.5, 1.5);

/// Accepted thickness-wise coordinate domain.
pub const Y_DOMAIN: (f64, f64) = (-1.0, 1.0);

/// A point below this x is treated as "at the leading edge" by the
/// two-section detector.
pub const SECTION_BREAK_LOW_X: f64 = 0.01;

/// A point above this x is treated as "near the trailing edge" by the
/// two-section detector.
pub const SECTION_BREAK_HIGH_X: f64 = 0.5;

/// Fraction of the chord within which the first point counts as the
/// trailing edge.
pub const TRAILING_EDGE_TOLERANCE: f64 = 0.01;

/// Reynolds number bounds (inclusive).
pub const REYNOLDS_RANGE: (f64, f64) = (1e4, 1e7);

/// Angle of attack bounds in degrees (inclusive).
pub const ALPHA_RANGE: (f64, f64) = (-10.0, 20.0);

/// Coefficient labels recognised in solver output.
pub mod coefficients {
    /// Lift coefficient.
    pub const CL: &str = "CL";
    /// Total drag coefficient.
    pub const CD: &str = "CD";
    /// Pressure drag coefficient.
    pub const CDP: &str = "CDp";
    /// Friction drag coefficient.
    pub const CDF: &str = "CDf";
    /// Pitching moment coefficient.
    pub const CM: &str = "CM";

    /// All labels, in reporting order.
    pub const ALL: [&str; 5] = [CL, CD, CDP, CDF, CM];
}

/// Process exit codes.
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;
    /// Generic error.
    pub const ERROR_GENERIC: i32 = 1;
    /// The submitted geometry or flow parameters were rejected.
    pub const ERROR_VALIDATION: i32 = 2;
    /// Every execution mode failed.
    pub const ERROR_EXHAUSTED: i32 = 3;
    /// Invalid configuration.
    pub const ERROR_CONFIG: i32 = 4;
    /// The solver binary could not be launched.
    pub const ERROR_SOLVER_UNAVAILABLE: i32 = 5;
}
