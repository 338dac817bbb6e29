//! Operating-system specific process control.
//!
//! Everything that differs between hosts (default executable name, process
//! grouping, killing a process tree) sits behind [`SolverPlatform`], chosen
//! once at startup with [`native`].

use std::env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Arc;

use aerolab_core::FlowCondition;
use tracing::debug;

use crate::mode::{ExecutionMode, ModeDescriptor};

/// Inputs for rendering one solver command script.
#[derive(Debug, Clone, Copy)]
pub struct CommandContext<'a> {
    /// Geometry file name, relative to the working directory.
    pub geometry_file: &'a str,
    /// Pressure output file name, relative to the working directory.
    pub pressure_file: &'a str,
    pub flow: &'a FlowCondition,
    pub descriptor: &'a ModeDescriptor,
}

/// Host capability used by process sessions.
pub trait SolverPlatform: Send + Sync + fmt::Debug {
    /// Platform name for logs.
    fn name(&self) -> &'static str;

    /// Executable looked up on `PATH` when none is configured.
    fn default_executable(&self) -> &'static str;

    /// Adjust a solver command before it is spawned.
    fn configure(&self, command: &mut Command);

    /// Forcibly stop `child` and everything it started, then reap it.
    fn terminate(&self, child: &mut Child) -> io::Result<()>;

    /// Interactive command script fed to the solver on stdin.
    fn command_script(&self, ctx: &CommandContext<'_>) -> String {
        xfoil_script(ctx)
    }
}

/// Render the XFOIL keystroke script for one attempt.
///
/// Graphics are disabled first so the solver never waits on a display.
#[must_use]
pub fn xfoil_script(ctx: &CommandContext<'_>) -> String {
    let mode = ctx.descriptor.mode;
    let mut lines: Vec<String> = vec!["PLOP".into(), "G".into(), String::new()];
    lines.push(format!("LOAD {}", ctx.geometry_file));

    if mode == ExecutionMode::ViscousSmoothed {
        // Curvature smoothing in the full-inverse design menu.
        lines.extend(["MDES", "FILT", "EXEC", ""].map(String::from));
    }

    lines.push("PANE".into());
    lines.push("OPER".into());
    if mode.is_viscous() {
        lines.push(format!("VISC {}", ctx.flow.reynolds()));
        lines.push(format!("ITER {}", ctx.descriptor.iteration_cap));
    }
    lines.push(format!("ALFA {}", ctx.flow.alpha()));
    lines.push(format!("CPWR {}", ctx.pressure_file));
    lines.push(String::new());
    lines.push("QUIT".into());

    let mut script = lines.join("\n");
    script.push('\n');
    script
}

/// POSIX hosts: the solver leads its own process group, which is killed as a
/// whole on timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixPlatform;

impl SolverPlatform for PosixPlatform {
    fn name(&self) -> &'static str {
        "posix"
    }

    fn default_executable(&self) -> &'static str {
        "xfoil"
    }

    fn configure(&self, command: &mut Command) {
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        #[cfg(not(unix))]
        let _ = command;
    }

    fn terminate(&self, child: &mut Child) -> io::Result<()> {
        let group = format!("-{}", child.id());
        let killed_group = Command::new("kill")
            .args(["-s", "KILL", "--", &group])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success());

        if !killed_group {
            debug!(pid = child.id(), "Process group kill failed, killing solver only");
            child.kill()?;
        }
        child.wait().map(drop)
    }
}

/// Windows hosts: the process tree is killed with `taskkill /T`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPlatform;

impl SolverPlatform for WindowsPlatform {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn default_executable(&self) -> &'static str {
        "xfoil.exe"
    }

    fn configure(&self, _command: &mut Command) {}

    fn terminate(&self, child: &mut Child) -> io::Result<()> {
        let killed_tree = Command::new("taskkill")
            .args(["/PID", &child.id().to_string(), "/T", "/F"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success());

        if !killed_tree {
            child.kill()?;
        }
        child.wait().map(drop)
    }
}

/// The platform of the running host.
#[must_use]
pub fn native() -> Arc<dyn SolverPlatform> {
    if cfg!(windows) {
        Arc::new(WindowsPlatform)
    } else {
        Arc::new(PosixPlatform)
    }
}

/// Resolve a bare executable name against `PATH`.
///
/// Paths with a directory component are returned unchanged. A name that is
/// not found is also returned unchanged; launching it will then fail with a
/// launch error.
#[must_use]
pub fn resolve_executable(program: &Path) -> PathBuf {
    if program.components().count() != 1 {
        return program.to_path_buf();
    }
    let Some(path_var) = env::var_os("PATH") else {
        return program.to_path_buf();
    };

    env::split_paths(&path_var)
        .flat_map(|dir| {
            let plain = dir.join(program);
            let exe = cfg!(windows).then(|| dir.join(program).with_extension("exe"));
            std::iter::once(plain).chain(exe)
        })
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| program.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_for(mode: ExecutionMode) -> String {
        let flow = FlowCondition::new(500_000.0, 5.0).unwrap();
        let descriptor = ModeDescriptor::default_for(mode);
        xfoil_script(&CommandContext {
            geometry_file: "airfoil.dat",
            pressure_file: "cp.txt",
            flow: &flow,
            descriptor: &descriptor,
        })
    }

    #[test]
    fn viscous_standard_script() {
        let script = script_for(ExecutionMode::ViscousStandard);
        assert_eq!(
            script,
            "PLOP\nG\n\nLOAD airfoil.dat\nPANE\nOPER\nVISC 500000\nITER 200\nALFA 5\nCPWR cp.txt\n\nQUIT\n"
        );
    }

    #[test]
    fn smoothed_script_filters_before_paneling() {
        let script = script_for(ExecutionMode::ViscousSmoothed);
        let filt = script.find("FILT").unwrap();
        let pane = script.find("PANE").unwrap();
        assert!(filt < pane);
        assert!(script.contains("ITER 400"));
    }

    #[test]
    fn inviscid_script_has_no_viscous_commands() {
        let script = script_for(ExecutionMode::InviscidFallback);
        assert!(!script.contains("VISC"));
        assert!(!script.contains("ITER"));
        assert!(script.contains("ALFA 5"));
        assert!(script.ends_with("QUIT\n"));
    }

    #[test]
    fn platform_defaults() {
        assert_eq!(PosixPlatform.default_executable(), "xfoil");
        assert_eq!(WindowsPlatform.default_executable(), "xfoil.exe");
        let native = native();
        assert!(["posix", "windows"].contains(&native.name()));
    }

    #[test]
    fn resolve_keeps_explicit_paths() {
        let explicit = Path::new("/opt/xfoil/bin/xfoil");
        assert_eq!(resolve_executable(explicit), explicit);
    }

    #[test]
    fn resolve_unknown_name_is_unchanged() {
        let name = Path::new("definitely-not-a-solver-binary");
        assert_eq!(resolve_executable(name), name);
    }

    #[cfg(unix)]
    #[test]
    fn resolve_finds_sh_on_path() {
        let resolved = resolve_executable(Path::new("sh"));
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("sh"));
    }

    #[cfg(unix)]
    #[test]
    fn posix_terminate_kills_group() {
        let mut command = Command::new("/bin/sh");
        command.args(["-c", "sleep 30 & wait"]);
        PosixPlatform.configure(&mut command);
        let mut child = command.spawn().unwrap();
        let start = std::time::Instant::now();
        PosixPlatform.terminate(&mut child).unwrap();
        assert!(start.elapsed() < std::time::Duration::from_secs(10));
        assert!(child.try_wait().unwrap().is_some());
    }
}
