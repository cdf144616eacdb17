//! Completion client abstraction.
//!
//! Provides a generic interface for calling an OpenAI-compatible
//! chat-completion service, plus a scripted fake for tests. The daemon
//! holds the client as `Arc<dyn CompletionClient>` with process
//! lifetime, so the pipeline never constructs its own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;

/// One role-tagged chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Completion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

/// Completion errors. Never retried locally; a single failure is
/// terminal for the request that triggered the call.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CompletionError {
    #[error("authentication rejected by completion service")]
    AuthFailed,

    #[error("completion service returned empty content")]
    EmptyResponse,

    #[error("request timeout after {0} seconds")]
    Timeout(u64),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Generic completion client. One call per pass; passes are chained
/// sequentially because the second consumes the first's text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Submit a message list and return the raw text of the first choice.
    /// The service is asked for strict JSON output.
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<String, CompletionError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Real client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct HttpCompletionClient {
    config: CompletionConfig,
    client: reqwest::Client,
}

impl HttpCompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Http(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<String, CompletionError> {
        let url = format!(
            "{}/chat/completions",
            self.config.endpoint.trim_end_matches('/')
        );

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        info!(
            "[>]  completion call [{}] temperature={}",
            self.config.model, temperature
        );

        let mut builder = self.client.post(&url).json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout(self.config.timeout_secs)
            } else {
                CompletionError::Http(format!("request failed: {}", e))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CompletionError::AuthFailed);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            // Some gateways tunnel the upstream auth failure inside a 4xx/5xx body.
            if error_text.contains("401") {
                return Err(CompletionError::AuthFailed);
            }
            return Err(CompletionError::Http(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Http(format!("unreadable completion body: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(CompletionError::EmptyResponse);
        }

        info!("[<]  completion response ({} chars)", content.len());
        Ok(content)
    }
}

/// Scripted fake client: pops one canned outcome per call and records
/// the messages it was handed, so tests can assert pass counts and
/// prompt contents without any network.
pub struct ScriptedCompletionClient {
    script: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedCompletionClient {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn push_ok(self, text: impl Into<String>) -> Self {
        self.script
            .lock()
            .expect("script lock")
            .push_back(Ok(text.into()));
        self
    }

    pub fn push_err(self, err: CompletionError) -> Self {
        self.script
            .lock()
            .expect("script lock")
            .push_back(Err(err));
        self
    }

    /// Messages recorded across all calls, in order.
    pub fn recorded_calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

impl Default for ScriptedCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletionClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _temperature: f32,
    ) -> Result<String, CompletionError> {
        self.calls.lock().expect("calls lock").push(messages);
        self.script
            .lock()
            .expect("script lock")
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Http("script exhausted".to_string())))
    }
}
