//! Error types for a single solver attempt.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

/// Why a single solver attempt did not produce a result.
///
/// The first four variants mean "this mode did not work for this input";
/// the strategy escalates to the next mode. A solver that exits abnormally
/// lands in one of them through the output it failed to write. The rest mean
/// the solver cannot be run at all, and retrying in another mode would fail
/// the same way.
#[derive(Debug, thiserror::Error)]
pub enum AttemptError {
    /// The wall-clock budget ran out and the process tree was killed.
    #[error("solver timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// The solver reported that its viscous iteration did not converge.
    #[error("solver reported convergence failure")]
    ConvergenceFailure,

    /// No lift coefficient was found in the solver output.
    #[error("solver output contained no lift coefficient")]
    MissingCoefficients,

    /// The pressure output file was missing or held no numeric rows.
    #[error("solver produced no pressure data")]
    MissingPressureData,

    /// The solver executable could not be started.
    #[error("failed to launch solver `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The isolated working directory could not be prepared or used.
    #[error("working directory error: {0}")]
    WorkDir(#[source] io::Error),
}

impl AttemptError {
    /// Whether a less demanding mode may still succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout(_)
                | Self::ConvergenceFailure
                | Self::MissingCoefficients
                | Self::MissingPressureData
        )
    }

    /// Whether the solver could not be started at all.
    #[must_use]
    pub fn is_launch_failure(&self) -> bool {
        matches!(self, Self::Launch { .. })
    }

    /// Stable, serializable classification of this error.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Timeout(_) => FailureKind::Timeout,
            Self::ConvergenceFailure => FailureKind::ConvergenceFailure,
            Self::MissingCoefficients => FailureKind::MissingCoefficients,
            Self::MissingPressureData => FailureKind::MissingPressureData,
            Self::Launch { .. } => FailureKind::LaunchFailure,
            Self::WorkDir(_) => FailureKind::WorkDir,
        }
    }
}

/// Classification of an [`AttemptError`], as reported to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Timeout,
    ConvergenceFailure,
    MissingCoefficients,
    MissingPressureData,
    LaunchFailure,
    WorkDir,
}

/// A working directory could not be removed. Logged, never fatal.
#[derive(Debug, thiserror::Error)]
#[error("failed to remove working directory {}: {source}", path.display())]
pub struct CleanupError {
    /// Directory that was left behind.
    pub path: PathBuf,
    /// Underlying I/O error.
    #[source]
    pub source: io::Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_variants() {
        assert!(AttemptError::Timeout(Duration::from_secs(30)).is_retryable());
        assert!(AttemptError::ConvergenceFailure.is_retryable());
        assert!(AttemptError::MissingCoefficients.is_retryable());
        assert!(AttemptError::MissingPressureData.is_retryable());
    }

    #[test]
    fn non_retryable_variants() {
        let launch = AttemptError::Launch {
            program: "xfoil".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!launch.is_retryable());
        assert!(launch.is_launch_failure());
        assert!(!AttemptError::WorkDir(io::Error::from(io::ErrorKind::PermissionDenied)).is_retryable());
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            AttemptError::Timeout(Duration::from_secs(30)).to_string(),
            "solver timed out after 30s"
        );
        assert_eq!(
            AttemptError::ConvergenceFailure.to_string(),
            "solver reported convergence failure"
        );
    }

    #[test]
    fn kind_serializes_snake_case() {
        let kind = AttemptError::MissingPressureData.kind();
        assert_eq!(
            serde_json::to_string(&kind).unwrap(),
            "\"missing_pressure_data\""
        );
    }
}
