//! Execution modes and their resource budgets.

use std::fmt;
use std::time::Duration;

use aerolab_core::FidelityTag;
use serde::Serialize;

/// Iteration cap of the standard viscous run.
pub const VISCOUS_STANDARD_ITERATIONS: u32 = 200;

/// Iteration cap of the smoothed viscous retry.
pub const VISCOUS_SMOOTHED_ITERATIONS: u32 = 400;

/// Wall-clock budget of the standard viscous run.
pub const VISCOUS_STANDARD_TIMEOUT: Duration = Duration::from_secs(30);

/// Wall-clock budget of the smoothed viscous retry.
pub const VISCOUS_SMOOTHED_TIMEOUT: Duration = Duration::from_secs(45);

/// Wall-clock budget of the inviscid fallback.
pub const INVISCID_FALLBACK_TIMEOUT: Duration = Duration::from_secs(20);

/// Solver configuration of one attempt, in escalation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Viscous analysis on the geometry as submitted.
    ViscousStandard,
    /// Viscous analysis after curvature smoothing, with a larger iteration cap.
    ViscousSmoothed,
    /// Potential-flow analysis; always the last resort.
    InviscidFallback,
}

impl ExecutionMode {
    /// All modes, in the order the strategy tries them.
    pub const ESCALATION: [Self; 3] = [
        Self::ViscousStandard,
        Self::ViscousSmoothed,
        Self::InviscidFallback,
    ];

    /// The mode to try after this one fails, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::ViscousStandard => Some(Self::ViscousSmoothed),
            Self::ViscousSmoothed => Some(Self::InviscidFallback),
            Self::InviscidFallback => None,
        }
    }

    /// Whether this mode couples the boundary layer.
    #[must_use]
    pub fn is_viscous(self) -> bool {
        !matches!(self, Self::InviscidFallback)
    }

    /// Whether results from this mode carry reduced physical accuracy.
    #[must_use]
    pub fn reduced_fidelity(self) -> bool {
        matches!(self, Self::InviscidFallback)
    }

    /// Fidelity tag attached to results produced in this mode.
    #[must_use]
    pub fn fidelity(self) -> FidelityTag {
        if self.reduced_fidelity() {
            FidelityTag::Inviscid
        } else {
            FidelityTag::Viscous
        }
    }

    /// Mode name for logs and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ViscousStandard => "viscous_standard",
            Self::ViscousSmoothed => "viscous_smoothed",
            Self::InviscidFallback => "inviscid_fallback",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mode together with the budget it runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDescriptor {
    pub mode: ExecutionMode,
    /// Viscous iteration cap; unused by the inviscid fallback.
    pub iteration_cap: u32,
    /// Hard wall-clock limit for the whole process.
    pub timeout: Duration,
}

impl ModeDescriptor {
    /// Default budget for `mode`.
    #[must_use]
    pub fn default_for(mode: ExecutionMode) -> Self {
        let (iteration_cap, timeout) = match mode {
            ExecutionMode::ViscousStandard => {
                (VISCOUS_STANDARD_ITERATIONS, VISCOUS_STANDARD_TIMEOUT)
            }
            ExecutionMode::ViscousSmoothed => {
                (VISCOUS_SMOOTHED_ITERATIONS, VISCOUS_SMOOTHED_TIMEOUT)
            }
            ExecutionMode::InviscidFallback => (0, INVISCID_FALLBACK_TIMEOUT),
        };
        Self {
            mode,
            iteration_cap,
            timeout,
        }
    }

    /// Default budgets for the whole escalation ladder.
    #[must_use]
    pub fn defaults() -> [Self; 3] {
        ExecutionMode::ESCALATION.map(Self::default_for)
    }
}
