//! Multi-attempt solver execution with fidelity fallback.
//!
//! The strategy walks `ViscousStandard -> ViscousSmoothed -> InviscidFallback`
//! and stops at the first success. Retryable failures escalate to the next
//! mode; anything else fails immediately. Every path ends after at most
//! three attempts.

use std::time::Instant;

use aerolab_core::{CanonicalAirfoil, FlowCondition, SolverResult};
use aerolab_solver::{AttemptError, ExecutionMode, ModeDescriptor, SolverBackend};
use tracing::{error, info};

use crate::interfaces::{AttemptObserver, AttemptReport};

/// A result together with the attempts it took to get it.
#[derive(Debug, Clone)]
pub struct StrategySuccess {
    pub result: SolverResult,
    /// Every attempt made, the successful one last.
    pub attempts: Vec<AttemptReport>,
}

/// Every attempt failed, or a non-retryable failure stopped the strategy.
#[derive(Debug, thiserror::Error)]
#[error("solver failed after {} attempt(s): {}", .attempts.len(), summarize(.attempts))]
pub struct StrategyFailure {
    attempts: Vec<AttemptReport>,
    #[source]
    terminal: AttemptError,
}

impl StrategyFailure {
    /// Every attempt made, in order.
    #[must_use]
    pub fn attempts(&self) -> &[AttemptReport] {
        &self.attempts
    }

    /// The error that ended the strategy.
    #[must_use]
    pub fn terminal(&self) -> &AttemptError {
        &self.terminal
    }

    /// Split into the attempt log and the terminal error.
    #[must_use]
    pub fn into_parts(self) -> (Vec<AttemptReport>, AttemptError) {
        (self.attempts, self.terminal)
    }
}

fn summarize(attempts: &[AttemptReport]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.mode, a.detail.as_deref().unwrap_or("ok")))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Escalating execution strategy.
#[derive(Debug, Clone)]
pub struct SolverExecutionStrategy {
    descriptors: [ModeDescriptor; 3],
}

impl SolverExecutionStrategy {
    /// Create a strategy with one descriptor per mode.
    ///
    /// Descriptors are looked up by mode, so their order does not matter; a
    /// mode without a descriptor runs with its default budget.
    #[must_use]
    pub fn new(descriptors: [ModeDescriptor; 3]) -> Self {
        Self { descriptors }
    }

    /// The descriptor used for `mode`.
    #[must_use]
    pub fn descriptor(&self, mode: ExecutionMode) -> ModeDescriptor {
        self.descriptors
            .iter()
            .find(|d| d.mode == mode)
            .copied()
            .unwrap_or_else(|| ModeDescriptor::default_for(mode))
    }

    /// Run attempts until one succeeds or the ladder is exhausted.
    ///
    /// Blocks for up to the sum of the three timeouts.
    pub fn execute(
        &self,
        backend: &dyn SolverBackend,
        airfoil: &CanonicalAirfoil,
        flow: &FlowCondition,
        observer: &dyn AttemptObserver,
    ) -> Result<StrategySuccess, StrategyFailure> {
        let mut attempts = Vec::with_capacity(ExecutionMode::ESCALATION.len());
        let mut mode = ExecutionMode::ViscousStandard;

        loop {
            let descriptor = self.descriptor(mode);
            observer.on_attempt_start(&descriptor);

            let start = Instant::now();
            let outcome = backend.run(airfoil, flow, &descriptor);
            let elapsed = start.elapsed();

            let err = match outcome {
                Ok(mut result) => {
                    result.fidelity = mode.fidelity();
                    let report = AttemptReport::success(mode, elapsed);
                    observer.on_attempt_end(&report);
                    attempts.push(report);
                    return Ok(StrategySuccess { result, attempts });
                }
                Err(err) => err,
            };

            let report = AttemptReport::failed(mode, &err, elapsed);
            observer.on_attempt_end(&report);
            attempts.push(report);

            let next = if err.is_retryable() { mode.next() } else { None };
            match next {
                Some(next) => {
                    info!(from = %mode, to = %next, reason = %err, "Escalating solver mode");
                    mode = next;
                }
                None => {
                    error!(attempts = attempts.len(), reason = %err, "Solver strategy failed");
                    return Err(StrategyFailure {
                        attempts,
                        terminal: err,
                    });
                }
            }
        }
    }
}

impl Default for SolverExecutionStrategy {
    fn default() -> Self {
        Self::new(ModeDescriptor::defaults())
    }
}
