//! Edge SQL query API client.
//!
//! Sends one parameterized statement per request. Values always travel in
//! `params`; the SQL text never contains record data.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::settings::EdgeConfig;
use crate::error::{Error, Result};

/// A parameterized SQL statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    #[serde(default)]
    result: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    meta: QueryMeta,
}

#[derive(Debug, Default, Deserialize)]
struct QueryMeta {
    #[serde(default)]
    changes: u64,
}

/// HTTP client for the edge database query endpoint.
#[derive(Debug)]
pub struct EdgeClient {
    client: Client,
    url: String,
    api_token: String,
}

impl EdgeClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &EdgeConfig, api_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            url: config.query_url(),
            api_token: api_token.into(),
        })
    }

    /// Execute one statement and return the number of rows it changed.
    ///
    /// # Errors
    /// Returns [`Error::Edge`] on a non-2xx status or an unsuccessful API
    /// response, and a transport error when the request cannot be sent.
    pub async fn execute(&self, statement: &Statement) -> Result<u64> {
        let response = self
            .client
            .post(&self.url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(statement)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Edge(format!("HTTP {}: {}", status.as_u16(), body)));
        }

        let body: QueryResponse = response.json().await?;
        if !body.success {
            let reason = body
                .errors
                .iter()
                .map(|e| format!("{} ({})", e.message, e.code))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::Edge(if reason.is_empty() {
                "query failed".into()
            } else {
                reason
            }));
        }

        Ok(body.result.iter().map(|r| r.meta.changes).sum())
    }
}
