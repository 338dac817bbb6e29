//! Input validation errors.
//!
//! Every variant is non-retryable: it describes a problem with what the
//! client submitted, never with the solver.

/// Error raised when a submitted geometry or flow parameter is unusable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputValidationError {
    /// The geometry payload exceeds the configured byte limit.
    #[error("geometry payload is {size} bytes, limit is {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Too few valid coordinate rows survived parsing.
    #[error("insufficient valid coordinates: found {found}, need at least {min}")]
    InsufficientPoints { found: usize, min: usize },

    /// More coordinate rows than the solver can be fed.
    #[error("too many coordinates: found {found}, limit is {max}")]
    TooManyPoints { found: usize, max: usize },

    /// Reynolds number outside the accepted band.
    #[error("reynolds number {value} outside [{min}, {max}]")]
    ReynoldsOutOfRange { value: f64, min: f64, max: f64 },

    /// Angle of attack outside the accepted band.
    #[error("angle of attack {value} outside [{min}, {max}] degrees")]
    AlphaOutOfRange { value: f64, min: f64, max: f64 },

    /// A parameter was NaN or infinite.
    #[error("parameter `{0}` must be a finite number")]
    NonFiniteParameter(&'static str),

    /// The uploaded file name does not carry an accepted extension.
    #[error("unsupported file extension for `{name}` (expected one of: {expected})")]
    UnsupportedExtension { name: String, expected: String },

    /// A required form field was absent.
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    /// A form field could not be parsed.
    #[error("malformed field `{field}`: {reason}")]
    MalformedField { field: &'static str, reason: String },
}

impl InputValidationError {
    /// Whether the error stems from the payload size limit.
    #[must_use]
    pub fn is_payload_too_large(&self) -> bool {
        matches!(self, Self::PayloadTooLarge { .. })
    }
}
