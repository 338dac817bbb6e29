//! Response bodies.

use std::collections::BTreeMap;

use aerolab_core::{AerodynamicSummary, FidelityTag, Point};
use aerolab_orchestration::{AnalysisOutcome, AttemptReport, EngineHealth};
use serde::Serialize;

/// Body of a successful analysis.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub success: bool,
    /// Parsed points in submission order.
    pub coords_before: Vec<Point>,
    /// Canonical points as fed to the solver.
    pub coords_after: Vec<Point>,
    pub cp_x: Vec<f64>,
    pub cp_values: Vec<f64>,
    pub coefficients: BTreeMap<String, f64>,
    pub fidelity: FidelityTag,
    pub cached: bool,
    pub summary: AerodynamicSummary,
    pub attempts: Vec<AttemptReport>,
    pub metadata: Metadata,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    pub reynolds: f64,
    pub alpha: f64,
    pub num_points: usize,
}

impl From<AnalysisOutcome> for AnalysisResponse {
    fn from(outcome: AnalysisOutcome) -> Self {
        let result = outcome.result;
        Self {
            success: true,
            coords_before: outcome.raw_points,
            coords_after: outcome.airfoil.points().to_vec(),
            cp_x: result.cp_x(),
            cp_values: result.cp_values(),
            coefficients: result.coefficients.clone(),
            fidelity: result.fidelity,
            cached: outcome.cached,
            summary: outcome.summary,
            attempts: outcome.attempts,
            metadata: Metadata {
                reynolds: outcome.flow.reynolds(),
                alpha: outcome.flow.alpha(),
                num_points: outcome.airfoil.len(),
            },
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(flatten)]
    pub engine: EngineHealth,
}

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct Banner {
    pub status: &'static str,
    pub message: &'static str,
}
