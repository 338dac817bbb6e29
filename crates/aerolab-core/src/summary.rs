//! Derived performance figures and advisories for a solver result.

use serde::Serialize;

use crate::flow::FlowCondition;
use crate::result::SolverResult;

/// |CL| below this is treated as zero lift.
const NEAR_ZERO_LIFT: f64 = 0.001;

/// CL below this is reported as downforce.
const NEGATIVE_LIFT: f64 = -0.1;

/// Low-lift threshold used together with a high angle of attack to flag stall.
const STALL_CL: f64 = 0.5;

/// Angle of attack (degrees, absolute) beyond which low lift suggests stall.
const STALL_ALPHA: f64 = 10.0;

/// Condition a client should be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    /// The airfoil produces downforce.
    NegativeLift,
    /// Lift is effectively zero; L/D is not meaningful.
    NearZeroLift,
    /// Low lift at a high angle of attack.
    PossibleStall,
    /// The result came from the inviscid fallback.
    ReducedFidelity,
}

/// Lift-to-drag ratio and advisories derived from a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AerodynamicSummary {
    /// CL / CD, when both are present and meaningful.
    pub lift_to_drag: Option<f64>,
    /// Advisories in severity order.
    pub advisories: Vec<Advisory>,
}

impl AerodynamicSummary {
    /// Summarize a result for the flow condition it was computed at.
    #[must_use]
    pub fn from_result(result: &SolverResult, flow: &FlowCondition) -> Self {
        let mut advisories = Vec::new();

        if let Some(cl) = result.cl() {
            if cl < NEGATIVE_LIFT {
                advisories.push(Advisory::NegativeLift);
            } else if cl.abs() < NEAR_ZERO_LIFT {
                advisories.push(Advisory::NearZeroLift);
            } else if cl < STALL_CL && flow.alpha().abs() > STALL_ALPHA {
                advisories.push(Advisory::PossibleStall);
            }
        }
        if result.fidelity.is_reduced() {
            advisories.push(Advisory::ReducedFidelity);
        }

        let lift_to_drag = match (result.cl(), result.cd()) {
            (Some(cl), Some(cd)) if cl.abs() >= NEAR_ZERO_LIFT && cd != 0.0 => Some(cl / cd),
            _ => None,
        };

        Self {
            lift_to_drag,
            advisories,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::result::FidelityTag;

    fn result(cl: f64, cd: Option<f64>, fidelity: FidelityTag) -> SolverResult {
        let mut coefficients = BTreeMap::from([("CL".to_string(), cl)]);
        if let Some(cd) = cd {
            coefficients.insert("CD".to_string(), cd);
        }
        SolverResult {
            pressure: vec![],
            coefficients,
            fidelity,
        }
    }

    #[test]
    fn lift_to_drag_ratio() {
        let flow = FlowCondition::new(5e5, 5.0).unwrap();
        let summary =
            AerodynamicSummary::from_result(&result(0.8, Some(0.01), FidelityTag::Viscous), &flow);
        assert!((summary.lift_to_drag.unwrap() - 80.0).abs() < 1e-9);
        assert!(summary.advisories.is_empty());
    }

    #[test]
    fn near_zero_lift_has_no_ratio() {
        let flow = FlowCondition::new(5e5, 0.0).unwrap();
        let summary = AerodynamicSummary::from_result(
            &result(0.0001, Some(0.006), FidelityTag::Viscous),
            &flow,
        );
        assert_eq!(summary.lift_to_drag, None);
        assert_eq!(summary.advisories, vec![Advisory::NearZeroLift]);
    }

    #[test]
    fn negative_lift_and_stall() {
        let flow = FlowCondition::new(5e5, -8.0).unwrap();
        let s = AerodynamicSummary::from_result(&result(-0.6, Some(0.02), FidelityTag::Viscous), &flow);
        assert_eq!(s.advisories, vec![Advisory::NegativeLift]);

        let flow = FlowCondition::new(5e5, 15.0).unwrap();
        let s = AerodynamicSummary::from_result(&result(0.3, Some(0.08), FidelityTag::Viscous), &flow);
        assert_eq!(s.advisories, vec![Advisory::PossibleStall]);
    }

    #[test]
    fn inviscid_is_flagged() {
        let flow = FlowCondition::new(5e5, 5.0).unwrap();
        let s = AerodynamicSummary::from_result(&result(0.9, None, FidelityTag::Inviscid), &flow);
        assert_eq!(s.advisories, vec![Advisory::ReducedFidelity]);
        assert_eq!(s.lift_to_drag, None);
    }
}
