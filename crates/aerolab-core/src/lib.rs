//! # aerolab-core
//!
//! Core library for the AeroLab airfoil analysis service.
//! Turns untrusted coordinate files into canonical airfoils, validates flow
//! conditions, and defines the result types shared by the solver,
//! orchestration and server crates.

pub mod constants;
pub mod errors;
pub mod flow;
pub mod geometry;
pub mod normalizer;
pub mod options;
pub mod result;
pub mod summary;

// Re-exports
pub use errors::InputValidationError;
pub use flow::FlowCondition;
pub use geometry::{CanonicalAirfoil, Point};
pub use normalizer::{GeometryNormalizer, Layout};
pub use options::NormalizerOptions;
pub use result::{FidelityTag, PressureSample, SolverResult};
pub use summary::{Advisory, AerodynamicSummary};

/// Normalize raw coordinate text with default options.
///
/// This is a convenience function for simple use cases. For custom limits
/// or detector thresholds, build a [`GeometryNormalizer`] directly.
///
/// # Example
/// ```
/// let text = "NACA 0012\n1 0\n0.75 0.04\n0.5 0.06\n0.25 0.05\n0 0\n\
///             0.25 -0.05\n0.5 -0.06\n0.75 -0.04\n0.9 -0.02\n1 -0.002\n";
/// let airfoil = aerolab_core::normalize(text).unwrap();
/// assert_eq!(airfoil.len(), 10);
/// assert_eq!(airfoil.leading_edge_index(), 4);
/// ```
pub fn normalize(raw: &str) -> Result<CanonicalAirfoil, InputValidationError> {
    GeometryNormalizer::default().normalize(raw)
}
