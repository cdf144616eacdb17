//! HTTP server for threadloomd.

use crate::config::Config;
use crate::metrics::GenerationMetrics;
use crate::routes;
use crate::sink::AuditSink;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use threadloom_common::CompletionClient;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers. The completion client is
/// injected once at startup (process lifetime) so tests can substitute
/// a scripted implementation.
pub struct AppState {
    pub client: Arc<dyn CompletionClient>,
    pub config: Config,
    pub sink: Option<Arc<AuditSink>>,
    pub metrics: GenerationMetrics,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config, client: Arc<dyn CompletionClient>) -> Self {
        let sink = config
            .sink
            .path
            .clone()
            .map(|path| Arc::new(AuditSink::new(path)));
        Self {
            client,
            config,
            sink,
            metrics: GenerationMetrics::new(),
            start_time: Instant::now(),
        }
    }
}

/// Assemble the router. Split out of `run` so tests can drive it with
/// `tower::ServiceExt::oneshot`.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::generate_routes())
        .merge(routes::health_routes())
        .merge(routes::metrics_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until shutdown.
pub async fn run(state: AppState) -> Result<()> {
    let bind = state.config.server.bind.clone();
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("  Listening on http://{}", bind);

    axum::serve(listener, app).await?;
    Ok(())
}
