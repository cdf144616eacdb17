//! Generation pipeline.
//!
//! One request runs to completion inside its handler: topic selection,
//! prompt composition, one or two sequential completion passes,
//! normalization, enrichment. The two passes have a strict data
//! dependency (the review pass embeds the draft text), so there is
//! nothing to parallelize. No retries anywhere; a single upstream
//! failure is terminal for the request.

mod enrich;
mod invoke;
mod normalize;
mod prompt;
mod topics;

pub use enrich::{enrich, week_start_for};
pub use normalize::normalize;
pub use prompt::{draft_prompt, review_prompt, DRAFT_SYSTEM_PROMPT, REVIEW_SYSTEM_PROMPT};
pub use topics::select_topics;

use crate::config::PipelineConfig;
use threadloom_common::{CalendarResult, CompletionClient, GenerationRequest};
use tracing::info;

/// Pipeline failure taxonomy. Everything here aborts the request;
/// only the audit sink (outside the pipeline) swallows its own errors.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("invalid request: {0}")]
    Input(String),

    #[error("Authentication failed. Check API Key.")]
    UpstreamAuth,

    #[error("completion service returned no content for the {0} pass")]
    UpstreamEmpty(&'static str),

    #[error("completion service error: {0}")]
    Upstream(String),

    #[error("model output is not a valid calendar: {0}")]
    Malformed(String),

    #[error("generation timed out after {0} seconds")]
    Timeout(u64),
}

impl GenerateError {
    /// Stable label for the failure counter.
    pub fn reason(&self) -> &'static str {
        match self {
            GenerateError::Input(_) => "input",
            GenerateError::UpstreamAuth => "auth",
            GenerateError::UpstreamEmpty(_) => "empty",
            GenerateError::Upstream(_) => "upstream",
            GenerateError::Malformed(_) => "malformed",
            GenerateError::Timeout(_) => "timeout",
        }
    }
}

/// Reject structurally unusable requests before any upstream call.
pub fn validate(req: &GenerationRequest) -> Result<(), GenerateError> {
    if req.personas.is_empty() {
        return Err(GenerateError::Input(
            "at least one persona is required".to_string(),
        ));
    }
    if req
        .personas
        .iter()
        .any(|p| p.username.trim().is_empty() || p.bio.trim().is_empty())
    {
        return Err(GenerateError::Input(
            "every persona needs a username and a bio".to_string(),
        ));
    }
    if req.subreddits.is_empty() {
        return Err(GenerateError::Input(
            "at least one target community is required".to_string(),
        ));
    }
    if req.topics.is_empty() {
        return Err(GenerateError::Input(
            "at least one topic is required".to_string(),
        ));
    }
    Ok(())
}

/// Run the whole pipeline for one request.
pub async fn run_generation(
    client: &dyn CompletionClient,
    config: &PipelineConfig,
    req: &GenerationRequest,
) -> Result<CalendarResult, GenerateError> {
    validate(req)?;

    let week_start = week_start_for(req.week_offset);
    let topics_to_use = select_topics(&req.topics, &req.previous_topics);
    info!(
        "Generating week {} ({} topics, {} pass{})",
        week_start,
        topics_to_use.len(),
        config.passes,
        if config.passes == 1 { "" } else { "es" }
    );

    let draft_text = invoke::invoke_pass(
        client,
        DRAFT_SYSTEM_PROMPT,
        draft_prompt(req, &topics_to_use, week_start),
        config.draft_temperature,
        "draft",
    )
    .await?;

    let final_text = if config.passes >= 2 {
        invoke::invoke_pass(
            client,
            REVIEW_SYSTEM_PROMPT,
            review_prompt(&req.personas, &draft_text),
            config.review_temperature,
            "review",
        )
        .await?
    } else {
        draft_text
    };

    let draft = normalize(&final_text)?;
    Ok(enrich(draft, week_start))
}
