//! One isolated solver process run.
//!
//! Every session owns a uniquely named working directory, so concurrent
//! sessions never see each other's geometry or output files. The directory
//! is removed when the session is closed or dropped.

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use aerolab_core::{CanonicalAirfoil, FlowCondition};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::{AttemptError, CleanupError};
use crate::mode::ModeDescriptor;
use crate::platform::{CommandContext, SolverPlatform};

/// Prefix of every session working directory.
pub const WORKDIR_PREFIX: &str = "aerolab-";

/// Geometry file written into the working directory.
pub const GEOMETRY_FILE: &str = "airfoil.dat";

/// Header line of the geometry file.
pub const GEOMETRY_HEADER: &str = "AIRFOIL";

/// Pressure output file the solver is asked to write.
pub const PRESSURE_FILE: &str = "cp.txt";

/// How often a running solver is checked for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How to start the solver.
#[derive(Debug, Clone)]
pub struct LaunchSpec {
    /// Solver executable, already resolved.
    pub executable: PathBuf,
    /// Extra arguments passed before the command script is piped in.
    pub args: Vec<String>,
    pub platform: Arc<dyn SolverPlatform>,
}

/// Everything captured from a finished solver process.
#[derive(Debug)]
pub struct SessionOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
    pub elapsed: Duration,
}

/// An isolated working directory plus the solver run inside it.
#[derive(Debug)]
pub struct ProcessSession {
    workdir: Option<TempDir>,
    path: PathBuf,
}

impl ProcessSession {
    /// Create a fresh working directory under `work_root`.
    pub fn create(work_root: &Path) -> Result<Self, AttemptError> {
        fs::create_dir_all(work_root).map_err(AttemptError::WorkDir)?;
        let workdir = tempfile::Builder::new()
            .prefix(WORKDIR_PREFIX)
            .tempdir_in(work_root)
            .map_err(AttemptError::WorkDir)?;
        let path = workdir.path().to_path_buf();
        Ok(Self {
            workdir: Some(workdir),
            path,
        })
    }

    /// The working directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the solver writes the pressure distribution.
    #[must_use]
    pub fn pressure_path(&self) -> PathBuf {
        self.path.join(PRESSURE_FILE)
    }

    /// Write the geometry, run the solver and capture its output.
    ///
    /// The process is killed together with its descendants when
    /// `descriptor.timeout` elapses. A non-zero exit status is returned in
    /// the output rather than as an error; whether it matters depends on
    /// what the solver managed to write.
    pub fn run(
        &self,
        launch: &LaunchSpec,
        airfoil: &CanonicalAirfoil,
        flow: &FlowCondition,
        descriptor: &ModeDescriptor,
    ) -> Result<SessionOutput, AttemptError> {
        fs::write(
            self.path.join(GEOMETRY_FILE),
            airfoil.to_dat(GEOMETRY_HEADER),
        )
        .map_err(AttemptError::WorkDir)?;

        let script = launch.platform.command_script(&CommandContext {
            geometry_file: GEOMETRY_FILE,
            pressure_file: PRESSURE_FILE,
            flow,
            descriptor,
        });

        let mut command = Command::new(&launch.executable);
        command
            .args(&launch.args)
            .current_dir(&self.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        launch.platform.configure(&mut command);

        let start = Instant::now();
        let mut child = command.spawn().map_err(|source| AttemptError::Launch {
            program: launch.executable.display().to_string(),
            source,
        })?;
        debug!(
            pid = child.id(),
            mode = %descriptor.mode,
            workdir = %self.path.display(),
            "Solver started"
        );

        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        if let Some(mut stdin) = child.stdin.take() {
            // A solver that exits early closes its end; that is not our error.
            if let Err(err) = stdin.write_all(script.as_bytes()) {
                if err.kind() != io::ErrorKind::BrokenPipe {
                    let _ = launch.platform.terminate(&mut child);
                    return Err(AttemptError::WorkDir(err));
                }
            }
        }

        let status = loop {
            if let Some(status) = child.try_wait().map_err(AttemptError::WorkDir)? {
                break status;
            }
            if start.elapsed() >= descriptor.timeout {
                warn!(
                    pid = child.id(),
                    mode = %descriptor.mode,
                    timeout_ms = descriptor.timeout.as_millis(),
                    "Solver timed out, terminating process tree"
                );
                if let Err(err) = launch.platform.terminate(&mut child) {
                    warn!(error = %err, "Failed to terminate solver");
                }
                // Reader threads finish on their own once the pipes close.
                return Err(AttemptError::Timeout(descriptor.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        let output = SessionOutput {
            stdout: collect(stdout),
            stderr: collect(stderr),
            status,
            elapsed: start.elapsed(),
        };
        debug!(
            status = %output.status,
            elapsed_ms = output.elapsed.as_millis(),
            stdout_bytes = output.stdout.len(),
            "Solver exited"
        );
        Ok(output)
    }

    /// Remove the working directory, reporting failure.
    pub fn close(mut self) -> Result<(), CleanupError> {
        match self.workdir.take() {
            Some(dir) => dir.close().map_err(|source| CleanupError {
                path: self.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }
}

fn spawn_reader<R>(source: Option<R>) -> Option<JoinHandle<String>>
where
    R: Read + Send + 'static,
{
    source.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn collect(handle: Option<JoinHandle<String>>) -> String {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
