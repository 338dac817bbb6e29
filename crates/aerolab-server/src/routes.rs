//! Request handlers.

use std::sync::Arc;

use aerolab_orchestration::AnalysisEngine;
use axum::extract::{Multipart, State};
use axum::Json;
use tracing::info;

use crate::client::ClientId;
use crate::error::ApiError;
use crate::response::{AnalysisResponse, Banner, HealthResponse};
use crate::upload::Submission;

pub(crate) async fn root() -> Json<Banner> {
    Json(Banner {
        status: "running",
        message: "AeroLab airfoil analysis API",
    })
}

pub(crate) async fn health(State(engine): State<Arc<AnalysisEngine>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        engine: engine.health(),
    })
}

pub(crate) async fn analyze(
    State(engine): State<Arc<AnalysisEngine>>,
    client: ClientId,
    multipart: Multipart,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let submission = Submission::from_multipart(multipart).await?;
    info!(
        client = client.as_str(),
        file = %submission.file_name,
        bytes = submission.geometry.len(),
        reynolds = submission.reynolds,
        alpha = submission.alpha,
        "Analysis requested"
    );

    let outcome = engine
        .analyze(
            client.as_str(),
            &submission.geometry,
            submission.reynolds,
            submission.alpha,
        )
        .await?;
    Ok(Json(outcome.into()))
}
