//! Concrete attempt observer implementations.

use aerolab_solver::ModeDescriptor;
use tracing::{debug, info, warn};

use crate::interfaces::{AttemptObserver, AttemptReport};

/// Observer that emits a tracing event per attempt.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingObserver;

impl LoggingObserver {
    /// Create a new logging observer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AttemptObserver for LoggingObserver {
    fn on_attempt_start(&self, descriptor: &ModeDescriptor) {
        debug!(
            mode = %descriptor.mode,
            iteration_cap = descriptor.iteration_cap,
            timeout_ms = descriptor.timeout.as_millis(),
            "Solver attempt started"
        );
    }

    fn on_attempt_end(&self, report: &AttemptReport) {
        let elapsed_ms = report.elapsed.as_millis();
        match &report.failure {
            None => info!(mode = %report.mode, elapsed_ms, "Solver attempt succeeded"),
            Some(kind) => warn!(
                mode = %report.mode,
                ?kind,
                detail = report.detail.as_deref().unwrap_or_default(),
                elapsed_ms,
                "Solver attempt failed"
            ),
        }
    }
}

/// Observer that does nothing (null object pattern).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpObserver;

impl NoOpObserver {
    /// Create a new no-op observer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl AttemptObserver for NoOpObserver {
    fn on_attempt_start(&self, _descriptor: &ModeDescriptor) {}
    fn on_attempt_end(&self, _report: &AttemptReport) {}
}
