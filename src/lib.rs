//! Fixtures shared by the workspace integration tests.
//!
//! [`FakeSolver`] stands in for the real panel-method binary with a shell
//! script run through `/bin/sh`, so tests exercise real process sessions
//! without needing the solver installed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use aerolab_solver::{PosixPlatform, ProcessBackend};
use tempfile::TempDir;

/// Prints plausible coefficients and one pressure row per geometry point.
pub const CONVERGING: &str = "cat > /dev/null\n\
    echo ' a = 5.000  CL = 0.8421'\n\
    echo ' Cm = -0.0531  CD = 0.00912  =>  CDf = 0.00620  CDp = 0.00292'\n\
    awk 'NR > 1 { print $1, $2, 1 - 2 * $1 }' airfoil.dat > cp.txt\n";

/// Fails to converge whenever the command script enables viscous mode.
pub const VISCOUS_DIVERGES: &str = "if grep -q '^VISC' ; then\n\
    echo '     VISCAL:  Convergence failed'\n\
    exit 0\n\
    fi\n\
    echo ' a = 5.000  CL = 0.7012'\n\
    echo ' Cm = -0.0400  CD = -0.00031'\n\
    awk 'NR > 1 { print $1, 1 - $1 }' airfoil.dat > cp.txt\n";

/// Dies with a floating-point trap whenever viscous mode is enabled.
pub const VISCOUS_CRASHES: &str = "if grep -q '^VISC' ; then\n\
    echo 'Floating point exception'\n\
    exit 136\n\
    fi\n\
    echo ' a = 5.000  CL = 0.7012'\n\
    echo ' Cm = -0.0400  CD = -0.00031'\n\
    awk 'NR > 1 { print $1, 1 - $1 }' airfoil.dat > cp.txt\n";

/// Hangs in viscous mode until killed.
pub const VISCOUS_HANGS: &str = "if grep -q '^VISC' ; then\n\
    sleep 30\n\
    fi\n\
    echo ' a = 5.000  CL = 0.6900'\n\
    echo ' Cm = -0.0400  CD = 0.00000'\n\
    awk 'NR > 1 { print $1, 1 - $1 }' airfoil.dat > cp.txt\n";

/// A solver script on disk plus the work root its sessions live under.
#[derive(Debug)]
pub struct FakeSolver {
    dir: TempDir,
    script: PathBuf,
}

impl FakeSolver {
    /// Write `script` into a fresh temporary directory.
    pub fn new(script: &str) -> io::Result<Self> {
        let dir = TempDir::new()?;
        let script_path = dir.path().join("fake-solver.sh");
        fs::write(&script_path, script)?;
        fs::create_dir_all(dir.path().join("work"))?;
        Ok(Self {
            dir,
            script: script_path,
        })
    }

    /// Root of the per-run work directories.
    pub fn work_root(&self) -> PathBuf {
        self.dir.path().join("work")
    }

    /// Path of the script file.
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// A backend that runs the script through `/bin/sh`.
    pub fn backend(&self) -> ProcessBackend {
        ProcessBackend::new(
            PathBuf::from("/bin/sh"),
            vec![self.script.to_string_lossy().into_owned()],
            self.work_root(),
            Arc::new(PosixPlatform),
        )
    }

    /// Session directories left behind under the work root.
    pub fn leftover_sessions(&self) -> io::Result<usize> {
        Ok(fs::read_dir(self.work_root())?.count())
    }
}

/// Read a file from `tests/testdata`.
pub fn testdata(name: &str) -> io::Result<Vec<u8>> {
    fs::read(Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/testdata").join(name))
}
