//! Error handling and exit codes.

use aerolab_core::constants::exit_codes;
use aerolab_core::InputValidationError;
use aerolab_orchestration::EngineError;

use crate::config::ConfigError;

/// Map an application error to the process exit code.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(engine) = err.downcast_ref::<EngineError>() {
        return engine_exit_code(engine);
    }
    if err.downcast_ref::<InputValidationError>().is_some() {
        return exit_codes::ERROR_VALIDATION;
    }
    if err.downcast_ref::<ConfigError>().is_some() {
        return exit_codes::ERROR_CONFIG;
    }
    exit_codes::ERROR_GENERIC
}

fn engine_exit_code(err: &EngineError) -> i32 {
    match err {
        EngineError::Validation(_) => exit_codes::ERROR_VALIDATION,
        EngineError::Exhausted(_) => exit_codes::ERROR_EXHAUSTED,
        EngineError::SolverUnavailable(_) => exit_codes::ERROR_SOLVER_UNAVAILABLE,
        EngineError::RateLimited { .. } | EngineError::Worker(_) => exit_codes::ERROR_GENERIC,
    }
}
