//! The solver capability consumed by orchestration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use aerolab_core::{CanonicalAirfoil, FlowCondition, SolverResult};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::AttemptError;
use crate::extractor::ResultExtractor;
use crate::mode::ModeDescriptor;
use crate::platform::SolverPlatform;
use crate::session::{LaunchSpec, ProcessSession};

/// Runs one solver attempt in a given mode.
pub trait SolverBackend: Send + Sync {
    /// Run a single attempt. Blocks until the solver finishes or times out.
    fn run(
        &self,
        airfoil: &CanonicalAirfoil,
        flow: &FlowCondition,
        descriptor: &ModeDescriptor,
    ) -> Result<SolverResult, AttemptError>;

    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Report whether the solver can be launched, without launching it.
    fn probe(&self) -> SolverProbe;
}

/// Availability of the solver executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SolverProbe {
    pub path: PathBuf,
    pub present: bool,
    pub executable: bool,
}

impl SolverProbe {
    /// Inspect `path` on the filesystem.
    #[must_use]
    pub fn inspect(path: &Path) -> Self {
        let metadata = path.metadata().ok().filter(std::fs::Metadata::is_file);
        let present = metadata.is_some();
        let executable = metadata.is_some_and(|m| is_executable(&m));
        Self {
            path: path.to_path_buf(),
            present,
            executable,
        }
    }

    /// Whether a launch is expected to succeed.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.present && self.executable
    }
}

#[cfg(unix)]
fn is_executable(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// Backend that launches the solver as an external process per attempt.
#[derive(Debug)]
pub struct ProcessBackend {
    launch: LaunchSpec,
    work_root: PathBuf,
    extractor: ResultExtractor,
}

impl ProcessBackend {
    /// Create a backend for an already resolved executable.
    #[must_use]
    pub fn new(
        executable: PathBuf,
        args: Vec<String>,
        work_root: PathBuf,
        platform: Arc<dyn SolverPlatform>,
    ) -> Self {
        Self {
            launch: LaunchSpec {
                executable,
                args,
                platform,
            },
            work_root,
            extractor: ResultExtractor::new(),
        }
    }

    /// Root under which session directories are created.
    #[must_use]
    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    /// Solver executable.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.launch.executable
    }
}

impl SolverBackend for ProcessBackend {
    fn run(
        &self,
        airfoil: &CanonicalAirfoil,
        flow: &FlowCondition,
        descriptor: &ModeDescriptor,
    ) -> Result<SolverResult, AttemptError> {
        let session = ProcessSession::create(&self.work_root)?;
        let output = session.run(&self.launch, airfoil, flow, descriptor)?;

        let extracted = self.extractor.extract(
            &output.stdout,
            &session.pressure_path(),
            descriptor.mode.fidelity(),
        );

        if let Err(err) = session.close() {
            warn!(error = %err, "Working directory cleanup failed");
        }

        if !output.status.success() {
            warn!(status = %output.status, mode = %descriptor.mode, "Solver exited abnormally");
            if !output.stderr.is_empty() {
                debug!(stderr = %output.stderr.trim_end(), "Solver stderr");
            }
        }

        // A dead solver is judged by what it left behind, so an abnormal exit
        // still escalates through the missing-output variants.
        extracted
    }

    fn name(&self) -> &str {
        self.launch.platform.name()
    }

    fn probe(&self) -> SolverProbe {
        SolverProbe::inspect(&self.launch.executable)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::fs;
    use std::time::Duration;

    use aerolab_core::FidelityTag;

    use super::*;
    use crate::mode::ExecutionMode;
    use crate::platform::PosixPlatform;

    const FAKE_OUTPUT: &str = "echo '  a = 5.000  CL = 0.8012'; \
        echo '  Cm = -0.0536  CD = 0.00823  =>  CDf = 0.00541  CDp = 0.00282'; \
        printf '#  x  Cp\\n 1.0 0.2\\n 0.5 -0.4\\n 0.0 1.0\\n' > cp.txt";

    fn airfoil() -> CanonicalAirfoil {
        let text = "T\n1 0.001\n0.75 0.04\n0.5 0.06\n0.25 0.05\n0 0\n\
                    0.25 -0.05\n0.5 -0.06\n0.75 -0.04\n0.9 -0.02\n1 -0.002\n";
        aerolab_core::normalize(text).unwrap()
    }

    fn backend(root: &Path, script: &str) -> ProcessBackend {
        ProcessBackend::new(
            PathBuf::from("/bin/sh"),
            vec!["-c".into(), format!("cat > /dev/null; {script}")],
            root.to_path_buf(),
            Arc::new(PosixPlatform),
        )
    }

    fn run(backend: &ProcessBackend, mode: ExecutionMode) -> Result<SolverResult, AttemptError> {
        let flow = FlowCondition::new(5e5, 5.0).unwrap();
        backend.run(&airfoil(), &flow, &ModeDescriptor::default_for(mode))
    }

    #[test]
    fn successful_run_extracts_and_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let b = backend(root.path(), FAKE_OUTPUT);
        let result = run(&b, ExecutionMode::ViscousStandard).unwrap();
        assert_eq!(result.pressure.len(), 3);
        assert_eq!(result.cl(), Some(0.8012));
        assert_eq!(result.cd(), Some(0.00823));
        assert_eq!(result.fidelity, FidelityTag::Viscous);
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn inviscid_mode_tags_result() {
        let root = tempfile::tempdir().unwrap();
        let b = backend(root.path(), FAKE_OUTPUT);
        let result = run(&b, ExecutionMode::InviscidFallback).unwrap();
        assert_eq!(result.fidelity, FidelityTag::Inviscid);
    }

    #[test]
    fn abnormal_exit_without_output_is_retryable() {
        let root = tempfile::tempdir().unwrap();
        let b = backend(root.path(), "echo 'Floating point exception'; exit 136");
        let err = run(&b, ExecutionMode::ViscousStandard).unwrap_err();
        assert!(matches!(err, AttemptError::MissingCoefficients));
        assert!(err.is_retryable());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn abnormal_exit_after_results_is_success() {
        let root = tempfile::tempdir().unwrap();
        let b = backend(root.path(), &format!("{FAKE_OUTPUT}; exit 2"));
        let result = run(&b, ExecutionMode::ViscousStandard).unwrap();
        assert_eq!(result.cl(), Some(0.8012));
    }

    #[test]
    fn abnormal_exit_with_coefficients_only_is_missing_pressure() {
        let root = tempfile::tempdir().unwrap();
        let b = backend(root.path(), "echo 'CL = 0.1'; exit 1");
        let err = run(&b, ExecutionMode::ViscousStandard).unwrap_err();
        assert!(matches!(err, AttemptError::MissingPressureData));
    }

    #[test]
    fn convergence_failure_is_reported() {
        let root = tempfile::tempdir().unwrap();
        let b = backend(root.path(), "echo ' VISCAL:  Convergence failed'; echo 'CL = 0.1'");
        let err = run(&b, ExecutionMode::ViscousStandard).unwrap_err();
        assert!(matches!(err, AttemptError::ConvergenceFailure));
    }

    #[test]
    fn clean_exit_without_pressure_file() {
        let root = tempfile::tempdir().unwrap();
        let b = backend(root.path(), "echo 'CL = 0.1'");
        let err = run(&b, ExecutionMode::ViscousStandard).unwrap_err();
        assert!(matches!(err, AttemptError::MissingPressureData));
    }

    #[test]
    fn timeout_cleans_up() {
        let root = tempfile::tempdir().unwrap();
        let b = backend(root.path(), "sleep 30");
        let flow = FlowCondition::new(5e5, 5.0).unwrap();
        let descriptor = ModeDescriptor {
            timeout: Duration::from_millis(200),
            ..ModeDescriptor::default_for(ExecutionMode::ViscousStandard)
        };
        let err = b.run(&airfoil(), &flow, &descriptor).unwrap_err();
        assert!(matches!(err, AttemptError::Timeout(_)));
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn probe_reports_presence() {
        let root = tempfile::tempdir().unwrap();
        assert!(backend(root.path(), "").probe().is_ready());

        let missing = ProcessBackend::new(
            PathBuf::from("/nonexistent/xfoil"),
            vec![],
            root.path().to_path_buf(),
            Arc::new(PosixPlatform),
        );
        let probe = missing.probe();
        assert!(!probe.present);
        assert!(!probe.is_ready());
    }
}
