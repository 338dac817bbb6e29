//! # aerolab-server
//!
//! HTTP surface over an [`AnalysisEngine`]: multipart submissions, health,
//! and a liveness banner.

pub mod client;
pub mod error;
pub mod response;
mod routes;
pub mod upload;

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use aerolab_orchestration::AnalysisEngine;
use axum::extract::{DefaultBodyLimit, FromRef};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub use client::{ClientId, ClientPolicy};
pub use error::ApiError;
pub use response::{AnalysisResponse, HealthResponse};

/// Room for multipart framing and the form fields beside the geometry file.
const FORM_OVERHEAD_BYTES: usize = 16 * 1024;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<AnalysisEngine>,
    clients: ClientPolicy,
}

impl FromRef<AppState> for Arc<AnalysisEngine> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.engine)
    }
}

impl FromRef<AppState> for ClientPolicy {
    fn from_ref(state: &AppState) -> Self {
        state.clients
    }
}

/// Build the router, identifying clients by peer address.
pub fn app(engine: Arc<AnalysisEngine>) -> Router {
    app_with(engine, ClientPolicy::default())
}

/// Build the router with an explicit client identification policy.
pub fn app_with(engine: Arc<AnalysisEngine>, clients: ClientPolicy) -> Router {
    let body_limit = engine.normalizer().options().max_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/upload_airfoil/", post(routes::analyze))
        .route("/analyze", post(routes::analyze))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer())
        .with_state(AppState { engine, clients })
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Serve until `shutdown` resolves, exposing peer addresses to handlers.
pub async fn serve(
    listener: TcpListener,
    engine: Arc<AnalysisEngine>,
    clients: ClientPolicy,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, trust_forwarded_for = clients.trust_forwarded_for, "Listening");
    }
    axum::serve(
        listener,
        app_with(engine, clients).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
