//! Multipart submission parsing.

use std::path::Path;

use aerolab_core::InputValidationError;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;

use crate::error::ApiError;

/// File extensions accepted for geometry uploads.
pub const ALLOWED_EXTENSIONS: &[&str] = &["dat", "txt"];

/// A decoded analysis submission.
#[derive(Debug)]
pub struct Submission {
    pub file_name: String,
    pub geometry: Bytes,
    pub reynolds: f64,
    pub alpha: f64,
}

impl Submission {
    /// Read the `file`, `reynolds` and `alpha` fields; other fields are ignored.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut file = None;
        let mut reynolds = None;
        let mut alpha = None;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            match field.name() {
                Some("file") => {
                    let name = field.file_name().unwrap_or_default().to_owned();
                    check_extension(&name)?;
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    file = Some((name, bytes));
                }
                Some("reynolds") => {
                    let text = field.text().await.map_err(multipart_error)?;
                    reynolds = Some(parse_number("reynolds", &text)?);
                }
                Some("alpha") => {
                    let text = field.text().await.map_err(multipart_error)?;
                    alpha = Some(parse_number("alpha", &text)?);
                }
                _ => {}
            }
        }

        let (file_name, geometry) = file.ok_or(InputValidationError::MissingField("file"))?;
        Ok(Self {
            file_name,
            geometry,
            reynolds: reynolds.ok_or(InputValidationError::MissingField("reynolds"))?,
            alpha: alpha.ok_or(InputValidationError::MissingField("alpha"))?,
        })
    }
}

/// Reject file names without an accepted extension.
pub fn check_extension(name: &str) -> Result<(), InputValidationError> {
    let accepted = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ALLOWED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        });
    if accepted {
        Ok(())
    } else {
        Err(InputValidationError::UnsupportedExtension {
            name: name.to_owned(),
            expected: ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| format!(".{ext}"))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

fn parse_number(field: &'static str, text: &str) -> Result<f64, InputValidationError> {
    text.trim()
        .parse::<f64>()
        .map_err(|err| InputValidationError::MalformedField {
            field,
            reason: err.to_string(),
        })
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}
