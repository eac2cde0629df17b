//! FlowField Gateway: HTTP surface over the flowfield_core dispatcher.
//! `GET /` liveness, `POST /generate` flow fields, `POST /transcribe` voice prompts.

pub mod error;
pub mod routes;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::Request,
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use flowfield_core::{Dispatcher, SpeechToText};
use std::sync::Arc;
use std::time::Instant;

pub use error::ApiError;

/// Upload cap for `/transcribe`: about 27 minutes of 16 kHz 16-bit mono WAV.
pub const TRANSCRIBE_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Shared, read-only after startup.
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub stt: Option<Arc<dyn SpeechToText>>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/generate", post(routes::generate))
        .route(
            "/transcribe",
            post(routes::transcribe).layer(DefaultBodyLimit::max(TRANSCRIBE_BODY_LIMIT)),
        )
        .with_state(state)
        .layer(axum::middleware::from_fn(log_request))
}

async fn log_request(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        target: "flowfield::http",
        "{} {} -> {} ({} ms)",
        method,
        path,
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    response
}
