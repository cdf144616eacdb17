//! Threadloom daemon - content calendar generation service.
//!
//! Orchestrates one or two chained completion calls per request,
//! normalizes and enriches the result, and serves it over HTTP.

use anyhow::Result;
use std::sync::Arc;
use threadloom_common::HttpCompletionClient;
use threadloomd::{config, server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Threadloom daemon v{} starting", env!("CARGO_PKG_VERSION"));

    let config = config::load_default();
    info!(
        "Pipeline: {} pass(es), model {}, deadline {}s",
        config.pipeline.passes,
        config.llm.model,
        config.pipeline.deadline_secs()
    );

    let client = Arc::new(HttpCompletionClient::new(config.llm.completion_config())?);
    let state = server::AppState::new(config, client);

    server::run(state).await
}
