//! Flow conditions.

use serde::Serialize;

use crate::constants::{ALPHA_RANGE, REYNOLDS_RANGE};
use crate::errors::InputValidationError;

/// Reynolds number and angle of attack for one analysis.
///
/// Construct through [`FlowCondition::new`], which enforces the accepted
/// bounds; the fields are read-only afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlowCondition {
    reynolds: f64,
    alpha: f64,
}

impl FlowCondition {
    /// Validate and build a flow condition.
    pub fn new(reynolds: f64, alpha: f64) -> Result<Self, InputValidationError> {
        if !reynolds.is_finite() {
            return Err(InputValidationError::NonFiniteParameter("reynolds"));
        }
        if !alpha.is_finite() {
            return Err(InputValidationError::NonFiniteParameter("alpha"));
        }
        let (re_min, re_max) = REYNOLDS_RANGE;
        if !(re_min..=re_max).contains(&reynolds) {
            return Err(InputValidationError::ReynoldsOutOfRange {
                value: reynolds,
                min: re_min,
                max: re_max,
            });
        }
        let (a_min, a_max) = ALPHA_RANGE;
        if !(a_min..=a_max).contains(&alpha) {
            return Err(InputValidationError::AlphaOutOfRange {
                value: alpha,
                min: a_min,
                max: a_max,
            });
        }
        Ok(Self { reynolds, alpha })
    }

    /// Reynolds number.
    #[must_use]
    pub fn reynolds(&self) -> f64 {
        self.reynolds
    }

    /// Angle of attack in degrees.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}
