//! Scripted upstream source.
//!
//! Each category replays its scripted responses in order; the last one
//! repeats once the script runs out. Unscripted categories answer 404.
//! Per-model analytics are scripted by model id and count as fetches of
//! [`Category::ModelAnalytics`].

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::domain::Category;
use crate::error::{FetchError, Result, SyncError};
use crate::port::UpstreamSource;

#[derive(Debug, Clone)]
enum Response {
    Payload(Value),
    Status(u16),
}

#[derive(Debug, Default)]
struct Script {
    responses: HashMap<Category, VecDeque<Response>>,
    models: Vec<(String, Response)>,
    fetches: HashMap<Category, usize>,
}

impl Script {
    fn next(&mut self, category: Category) -> Option<Response> {
        *self.fetches.entry(category).or_default() += 1;
        match self.responses.get_mut(&category) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    }
}

fn answer(response: Option<Response>, url: String) -> Result<Value> {
    match response.unwrap_or(Response::Status(404)) {
        Response::Payload(payload) => Ok(payload),
        Response::Status(status) => Err(SyncError::UpstreamUnavailable {
            url,
            attempts: 1,
            last: FetchError::Status { status },
        }
        .into()),
    }
}

/// Cloning shares the script and the fetch counters.
#[derive(Debug, Clone, Default)]
pub struct ScriptedUpstream {
    script: Arc<Mutex<Script>>,
}

impl ScriptedUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, category: Category, response: Response) -> Self {
        self.script
            .lock()
            .responses
            .entry(category)
            .or_default()
            .push_back(response);
        self
    }

    #[must_use]
    pub fn with_payload(self, category: Category, payload: Value) -> Self {
        self.push(category, Response::Payload(payload))
    }

    /// Fail the fetch as if retries were exhausted on `status`.
    #[must_use]
    pub fn with_failure(self, category: Category, status: u16) -> Self {
        self.push(category, Response::Status(status))
    }

    /// Serve `payload` for one model of the per-model analytics endpoint.
    #[must_use]
    pub fn with_model_payload(self, model: &str, payload: Value) -> Self {
        self.script
            .lock()
            .models
            .push((model.to_string(), Response::Payload(payload)));
        self
    }

    #[must_use]
    pub fn with_model_failure(self, model: &str, status: u16) -> Self {
        self.script
            .lock()
            .models
            .push((model.to_string(), Response::Status(status)));
        self
    }

    pub fn fetch_count(&self, category: Category) -> usize {
        self.script
            .lock()
            .fetches
            .get(&category)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl UpstreamSource for ScriptedUpstream {
    async fn fetch(&self, category: Category) -> Result<Value> {
        let response = self.script.lock().next(category);
        answer(response, format!("scripted://{}", category.endpoint()))
    }

    fn models(&self) -> Vec<String> {
        self.script
            .lock()
            .models
            .iter()
            .map(|(model, _)| model.clone())
            .collect()
    }

    async fn fetch_model_analytics(&self, model: &str) -> Result<Value> {
        let response = {
            let mut script = self.script.lock();
            *script.fetches.entry(Category::ModelAnalytics).or_default() += 1;
            script
                .models
                .iter()
                .find(|(m, _)| m == model)
                .map(|(_, r)| r.clone())
        };
        answer(response, format!("scripted://analytics/{model}"))
    }
}
