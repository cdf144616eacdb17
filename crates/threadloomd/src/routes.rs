//! API routes for threadloomd.

use crate::pipeline::{self, GenerateError};
use crate::server::AppState;
use crate::sink;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use threadloom_common::{CalendarResult, GenerationRequest};
use tracing::error;

type AppStateArc = Arc<AppState>;

pub fn generate_routes() -> Router<AppStateArc> {
    Router::new().route("/generate", post(generate))
}

pub fn health_routes() -> Router<AppStateArc> {
    Router::new().route("/health", get(health))
}

pub fn metrics_routes() -> Router<AppStateArc> {
    Router::new().route("/metrics", get(metrics))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

async fn generate(
    State(state): State<AppStateArc>,
    Json(req): Json<GenerationRequest>,
) -> Result<Json<CalendarResult>, (StatusCode, Json<ErrorBody>)> {
    let deadline = state.config.pipeline.deadline_secs();
    let started = Instant::now();

    let outcome = tokio::time::timeout(
        Duration::from_secs(deadline),
        pipeline::run_generation(state.client.as_ref(), &state.config.pipeline, &req),
    )
    .await
    .unwrap_or(Err(GenerateError::Timeout(deadline)));

    state
        .metrics
        .generation_seconds
        .observe(started.elapsed().as_secs_f64());

    match outcome {
        Ok(calendar) => {
            state.metrics.generations_total.inc();
            // Best-effort audit write; the response does not wait for it.
            if let Some(audit) = &state.sink {
                sink::spawn_append(audit.clone(), req.company_info.clone(), calendar.clone());
            }
            Ok(Json(calendar))
        }
        Err(e) => {
            state.metrics.observe_failure(e.reason());
            error!("Generation failed: {}", e);
            Err(error_response(e))
        }
    }
}

fn error_response(err: GenerateError) -> (StatusCode, Json<ErrorBody>) {
    match err {
        GenerateError::Input(_) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody {
                error: err.to_string(),
            }),
        ),
        GenerateError::UpstreamAuth => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: "Authentication failed. Check API Key.".to_string(),
            }),
        ),
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody {
                error: format!("Generation failed: {}", other),
            }),
        ),
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_secs: u64,
    passes: u8,
}

async fn health(State(state): State<AppStateArc>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.start_time.elapsed().as_secs(),
        passes: state.config.pipeline.passes,
    })
}

async fn metrics(State(state): State<AppStateArc>) -> String {
    state.metrics.encode()
}
