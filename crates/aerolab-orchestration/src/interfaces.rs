//! Orchestration interfaces.

use std::time::Duration;

use aerolab_solver::{AttemptError, ExecutionMode, FailureKind, ModeDescriptor};
use serde::{Serialize, Serializer};

/// Trait for observing solver attempts as the strategy runs them.
pub trait AttemptObserver: Send + Sync {
    /// An attempt is about to start.
    fn on_attempt_start(&self, descriptor: &ModeDescriptor);

    /// An attempt finished, successfully or not.
    fn on_attempt_end(&self, report: &AttemptReport);
}

/// Record of one solver attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttemptReport {
    /// Mode the attempt ran in.
    pub mode: ExecutionMode,
    /// Failure classification, `None` on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
    /// Human-readable failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Wall-clock duration of the attempt.
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

impl AttemptReport {
    /// Report for an attempt that produced a result.
    #[must_use]
    pub fn success(mode: ExecutionMode, elapsed: Duration) -> Self {
        Self {
            mode,
            failure: None,
            detail: None,
            elapsed,
        }
    }

    /// Report for an attempt that failed with `error`.
    #[must_use]
    pub fn failed(mode: ExecutionMode, error: &AttemptError, elapsed: Duration) -> Self {
        Self {
            mode,
            failure: Some(error.kind()),
            detail: Some(error.to_string()),
            elapsed,
        }
    }

    /// Whether the attempt produced a result.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

#[allow(clippy::cast_possible_truncation)]
fn as_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(elapsed.as_millis() as u64)
}
