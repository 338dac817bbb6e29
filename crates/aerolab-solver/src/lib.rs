//! # aerolab-solver
//!
//! Runs the external panel-method solver. Each attempt gets its own working
//! directory and process tree, a hard timeout, and a typed outcome the
//! orchestration layer can act on.

pub mod backend;
pub mod error;
pub mod extractor;
pub mod mode;
pub mod platform;
pub mod session;

// Re-exports
pub use backend::{ProcessBackend, SolverBackend, SolverProbe};
pub use error::{AttemptError, CleanupError, FailureKind};
pub use extractor::ResultExtractor;
pub use mode::{ExecutionMode, ModeDescriptor};
pub use platform::{PosixPlatform, SolverPlatform, WindowsPlatform};
pub use session::{LaunchSpec, ProcessSession, SessionOutput};
