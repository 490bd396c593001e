//! Competing agents as known to the relational store.

use serde::Serialize;

use super::id::CanonicalId;

/// A registered trading agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub id: CanonicalId,
    /// Display name, e.g. `Claude Sonnet 4.5`.
    pub name: String,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CanonicalId::new(id),
            name: name.into(),
        }
    }
}
