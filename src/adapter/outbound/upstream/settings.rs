//! Upstream API connection settings.

use serde::Deserialize;

/// HTTP settings for the upstream trading-data API.
#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// API root; category endpoints are resolved relative to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-attempt timeout covering both the request and the body read.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Total attempts per fetch, including the first.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Models whose detail is fetched from `analytics/<model>`.
    #[serde(default = "default_models")]
    pub models: Vec<String>,
}

fn default_base_url() -> String {
    "https://nof1.ai/api".into()
}

const fn default_timeout_ms() -> u64 {
    30_000
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_backoff_ms() -> u64 {
    1_000
}

const fn default_max_backoff_ms() -> u64 {
    10_000
}

fn default_models() -> Vec<String> {
    [
        "qwen3-max",
        "deepseek-chat-v3.1",
        "claude-sonnet-4-5",
        "grok-4",
        "gemini-2.5-pro",
        "gpt-5",
    ]
    .map(String::from)
    .to_vec()
}

fn default_user_agent() -> String {
    concat!("arena-sync/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            user_agent: default_user_agent(),
            models: default_models(),
        }
    }
}
