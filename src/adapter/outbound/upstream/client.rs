//! HTTP client for the upstream trading-competition API.
//!
//! Each category maps to one JSON endpoint under the configured base URL;
//! model analytics add the model id as a final path segment.
//! Every attempt is bounded by a timeout that drops the in-flight request;
//! failed attempts are retried by [`RetryPolicy`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use super::retry::RetryPolicy;
use super::settings::UpstreamConfig;
use crate::domain::Category;
use crate::error::{FetchError, Result};
use crate::port::UpstreamSource;

/// Upstream API client.
pub struct UpstreamClient {
    http: HttpClient,
    base_url: Url,
    timeout: Duration,
    retry: RetryPolicy,
    models: Vec<String>,
}

impl UpstreamClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    /// Returns an error if the base URL does not parse or the HTTP client
    /// cannot be constructed.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            base_url: Self::normalize_base(&config.base_url)?,
            timeout: Duration::from_millis(config.timeout_ms),
            retry: RetryPolicy::from_config(config),
            models: config.models.clone(),
        })
    }

    /// Replace the retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Base URLs without a trailing slash would lose their last path segment
    /// on join.
    fn normalize_base(raw: &str) -> Result<Url> {
        let mut base = raw.trim().trim_end_matches('/').to_string();
        base.push('/');
        Ok(Url::parse(&base)?)
    }

    /// Endpoint URL for a category.
    ///
    /// # Errors
    /// Returns an error if the endpoint cannot be joined onto the base URL.
    pub fn endpoint(&self, category: Category) -> Result<Url> {
        Ok(self.base_url.join(category.endpoint())?)
    }

    /// Per-model analytics URL. The model id is percent-encoded as one
    /// path segment.
    ///
    /// # Errors
    /// Returns an error if the endpoint cannot be joined onto the base URL.
    pub fn model_endpoint(&self, model: &str) -> Result<Url> {
        let mut url = self.endpoint(Category::ModelAnalytics)?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .push(model);
        Ok(url)
    }

    /// Fetch a JSON document with timeout and retry.
    ///
    /// # Errors
    /// Returns [`crate::error::SyncError::UpstreamUnavailable`] once every
    /// attempt has failed.
    pub async fn fetch_json(&self, url: &Url) -> Result<Value> {
        let body = self
            .retry
            .run(url.as_str(), |attempt| {
                debug!(url = %url, attempt, "Fetching upstream");
                self.attempt(url)
            })
            .await?;
        Ok(body)
    }

    async fn attempt(&self, url: &Url) -> std::result::Result<Value, FetchError> {
        let request = async {
            let response = self
                .http
                .get(url.clone())
                .send()
                .await
                .map_err(FetchError::Transport)?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status {
                    status: status.as_u16(),
                });
            }

            let bytes = response.bytes().await.map_err(FetchError::Transport)?;
            serde_json::from_slice(&bytes).map_err(FetchError::Decode)
        };

        match tokio::time::timeout(self.timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }),
        }
    }
}

#[async_trait]
impl UpstreamSource for UpstreamClient {
    async fn fetch(&self, category: Category) -> Result<Value> {
        let url = self.endpoint(category)?;
        let body = self.fetch_json(&url).await?;
        info!(category = %category, url = %url, "Fetched upstream payload");
        Ok(body)
    }

    fn models(&self) -> Vec<String> {
        self.models.clone()
    }

    async fn fetch_model_analytics(&self, model: &str) -> Result<Value> {
        let url = self.model_endpoint(model)?;
        let body = self.fetch_json(&url).await?;
        debug!(model, url = %url, "Fetched model analytics");
        Ok(body)
    }
}

impl std::fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("models", &self.models)
            .finish()
    }
}
