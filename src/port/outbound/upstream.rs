//! Upstream data source port.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::Category;
use crate::error::Result;

/// Source of raw category payloads.
///
/// Implementations own timeout and retry. An `Err` means the category could
/// not be fetched at all.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    async fn fetch(&self, category: Category) -> Result<Value>;

    /// Upstream model ids served by the per-model analytics endpoint.
    fn models(&self) -> Vec<String>;

    /// Full analytics payload of one upstream model.
    async fn fetch_model_analytics(&self, model: &str) -> Result<Value>;
}
