//! Mapping of engine failures onto HTTP responses.

use std::time::Duration;

use aerolab_core::InputValidationError;
use aerolab_orchestration::{AttemptReport, EngineError};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    attempts: Vec<AttemptReport>,
}

/// An error response with its status code.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    retry_after: Option<Duration>,
    attempts: Vec<AttemptReport>,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            retry_after: None,
            attempts: Vec::new(),
        }
    }

    /// 400 with the given message.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 413 with the given message.
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    /// Status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<InputValidationError> for ApiError {
    fn from(err: InputValidationError) -> Self {
        if err.is_payload_too_large() {
            Self::payload_too_large(err.to_string())
        } else {
            Self::bad_request(err.to_string())
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(inner) => inner.into(),
            EngineError::RateLimited { retry_after } => Self {
                retry_after: Some(retry_after),
                ..Self::new(StatusCode::TOO_MANY_REQUESTS, err.to_string())
            },
            EngineError::Exhausted(failure) => {
                warn!(%failure, "Analysis failed");
                let message = failure.to_string();
                let (attempts, _) = failure.into_parts();
                Self {
                    attempts,
                    ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
                }
            }
            EngineError::SolverUnavailable(ref source) => {
                error!(error = %source, "Solver cannot be launched");
                Self::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string())
            }
            EngineError::Worker(ref reason) => {
                error!(reason, "Analysis worker failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let retry_after = self.retry_after;
        let mut response = (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                attempts: self.attempts,
            }),
        )
            .into_response();

        if let Some(wait) = retry_after {
            let secs = wait
                .as_secs()
                .saturating_add(u64::from(wait.subsec_nanos() > 0));
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs.max(1)));
        }
        response
    }
}
