//! Configuration management for threadloomd.
//!
//! Loads settings from a TOML file (THREADLOOM_CONFIG or
//! /etc/threadloom/config.toml) or uses defaults. The completion API key
//! never lives in the file; it is read from the environment variable the
//! file names.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use threadloom_common::CompletionConfig;
use tracing::{info, warn};

/// Default config file path
pub const CONFIG_PATH: &str = "/etc/threadloom/config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    // Localhost only; there is no auth layer in front of /generate.
    "127.0.0.1:7910".to_string()
}

/// Completion service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Per-call HTTP timeout in seconds.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_api_key_env() -> String {
    "THREADLOOM_API_KEY".to_string()
}

fn default_call_timeout() -> u64 {
    120
}

impl LlmConfig {
    pub fn completion_config(&self) -> CompletionConfig {
        let api_key = std::env::var(&self.api_key_env).ok();
        if api_key.is_none() {
            warn!("{} is not set; completion calls will be unauthenticated", self.api_key_env);
        }
        CompletionConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            api_key,
            timeout_secs: self.call_timeout_secs,
        }
    }
}

/// Pipeline shape: how many passes and at which temperatures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 1 = draft only, 2 = draft then review.
    #[serde(default = "default_passes")]
    pub passes: u8,

    #[serde(default = "default_draft_temperature")]
    pub draft_temperature: f32,

    #[serde(default = "default_review_temperature")]
    pub review_temperature: f32,

    /// Whole-request deadline. Unset means 60s for one pass, 120s for two.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            passes: default_passes(),
            draft_temperature: default_draft_temperature(),
            review_temperature: default_review_temperature(),
            request_timeout_secs: None,
        }
    }
}

fn default_passes() -> u8 {
    2
}

fn default_draft_temperature() -> f32 {
    0.85
}

fn default_review_temperature() -> f32 {
    0.7
}

impl PipelineConfig {
    pub fn deadline_secs(&self) -> u64 {
        self.request_timeout_secs
            .unwrap_or(if self.passes >= 2 { 120 } else { 60 })
    }
}

/// Audit sink. No path configured means the write is skipped entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Load config from the given path, falling back to defaults when the
/// file is absent or unparseable.
pub fn load(path: &Path) -> Config {
    match fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                warn!("Invalid config at {}: {} - using defaults", path.display(), e);
                Config::default()
            }
        },
        Err(_) => {
            info!("No config at {}, using defaults", path.display());
            Config::default()
        }
    }
}

/// Resolve the config location (THREADLOOM_CONFIG overrides the system
/// path) and load it.
pub fn load_default() -> Config {
    let path = std::env::var("THREADLOOM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(CONFIG_PATH));
    load(&path)
}
