//! Solver result types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::coefficients::{CD, CL};

/// Whether a result came from a viscous run or the inviscid fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FidelityTag {
    /// Boundary-layer coupled solution.
    Viscous,
    /// Potential-flow only; drag is not physically meaningful.
    Inviscid,
}

impl FidelityTag {
    /// Tag as reported to clients.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viscous => "viscous",
            Self::Inviscid => "inviscid",
        }
    }

    /// Whether consumers should warn about reduced physical accuracy.
    #[must_use]
    pub fn is_reduced(self) -> bool {
        matches!(self, Self::Inviscid)
    }
}

impl fmt::Display for FidelityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sample of the surface pressure distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureSample {
    /// Chordwise station.
    pub x: f64,
    /// Pressure coefficient.
    pub cp: f64,
}

/// Output of one successful solver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    /// Pressure coefficient along the surface, in solver output order.
    pub pressure: Vec<PressureSample>,
    /// Coefficient name to value. Only keys the solver reported are present.
    pub coefficients: BTreeMap<String, f64>,
    /// Fidelity of the run that produced this result.
    pub fidelity: FidelityTag,
}

impl SolverResult {
    /// Lift coefficient, if reported.
    #[must_use]
    pub fn cl(&self) -> Option<f64> {
        self.coefficients.get(CL).copied()
    }

    /// Drag coefficient, if reported.
    #[must_use]
    pub fn cd(&self) -> Option<f64> {
        self.coefficients.get(CD).copied()
    }

    /// Chordwise stations of the pressure distribution.
    #[must_use]
    pub fn cp_x(&self) -> Vec<f64> {
        self.pressure.iter().map(|s| s.x).collect()
    }

    /// Pressure coefficients, parallel to [`SolverResult::cp_x`].
    #[must_use]
    pub fn cp_values(&self) -> Vec<f64> {
        self.pressure.iter().map(|s| s.cp).collect()
    }
}
