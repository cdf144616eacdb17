//! One completion pass.

use super::GenerateError;
use std::time::Instant;
use threadloom_common::{ChatMessage, CompletionClient, CompletionError};
use tracing::info;

/// Submit one composed prompt and return the raw text. Upstream
/// failures map onto the pipeline taxonomy; nothing is retried.
pub(crate) async fn invoke_pass(
    client: &dyn CompletionClient,
    system_prompt: &str,
    user_prompt: String,
    temperature: f32,
    pass: &'static str,
) -> Result<String, GenerateError> {
    info!("[{} pass] prompt ({} chars)", pass, user_prompt.len());
    let started = Instant::now();

    let messages = vec![
        ChatMessage::system(system_prompt),
        ChatMessage::user(user_prompt),
    ];

    let text = client
        .complete(messages, temperature)
        .await
        .map_err(|e| match e {
            CompletionError::AuthFailed => GenerateError::UpstreamAuth,
            CompletionError::EmptyResponse => GenerateError::UpstreamEmpty(pass),
            CompletionError::Timeout(secs) => {
                GenerateError::Upstream(format!("{} pass timed out after {}s", pass, secs))
            }
            CompletionError::Http(msg) => GenerateError::Upstream(msg),
        })?;

    if text.trim().is_empty() {
        return Err(GenerateError::UpstreamEmpty(pass));
    }

    info!(
        "[{} pass] response ({} chars) in {:.2}s",
        pass,
        text.len(),
        started.elapsed().as_secs_f64()
    );
    Ok(text)
}
