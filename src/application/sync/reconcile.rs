//! Upstream identifier reconciliation.
//!
//! Upstream endpoints name the same agent inconsistently (`gpt-5`,
//! `GPT-5`, `chatgpt`). The reconciler maps every known variant onto one
//! [`CanonicalId`]. Lookup is case-insensitive.
//!
//! Precedence: the static alias table is loaded first and the store-derived
//! entries second, so on a key collision the store-derived entry wins.

use std::collections::HashMap;

use tracing::debug;

use crate::domain::{Agent, CanonicalId};
use crate::error::Result;
use crate::port::AgentDirectory;

/// Hand-curated upstream name variants.
pub const STATIC_ALIASES: &[(&str, &str)] = &[
    ("claude-sonnet-4-5", "claude-1"),
    ("claude-sonnet", "claude-1"),
    ("claude", "claude-1"),
    ("deepseek-chat-v3.1", "deepseek-1"),
    ("deepseek-chat", "deepseek-1"),
    ("deepseek", "deepseek-1"),
    ("gemini-2.5-pro", "gemini-1"),
    ("gemini-pro", "gemini-1"),
    ("gemini", "gemini-1"),
    ("gpt-5", "chatgpt-1"),
    ("gpt-4", "chatgpt-1"),
    ("chatgpt", "chatgpt-1"),
    ("grok-4", "grok-1"),
    ("grok", "grok-1"),
    ("qwen3-max", "qwen-1"),
    ("qwen", "qwen-1"),
];

/// Read-only mapping from upstream identifiers to canonical ids.
///
/// Built once per sync cycle and shared by every pipeline.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    table: HashMap<String, CanonicalId>,
}

impl Reconciler {
    /// Reconciler with the static alias table only.
    #[must_use]
    pub fn with_static_aliases() -> Self {
        let mut reconciler = Self::default();
        for (alias, canonical) in STATIC_ALIASES {
            reconciler.insert(alias, CanonicalId::from(*canonical));
        }
        reconciler
    }

    /// Static aliases first, then each agent's id and display name.
    #[must_use]
    pub fn with_agents(agents: &[Agent]) -> Self {
        let mut reconciler = Self::with_static_aliases();
        for agent in agents {
            reconciler.insert(agent.id.as_str(), agent.id.clone());
            if !agent.name.trim().is_empty() {
                reconciler.insert(&agent.name, agent.id.clone());
            }
        }
        reconciler
    }

    /// Build from the relational store's current agent list.
    ///
    /// # Errors
    /// Returns an error if the agent list cannot be read.
    pub async fn load<D: AgentDirectory>(directory: &D) -> Result<Self> {
        let agents = directory.list_agents().await?;
        let reconciler = Self::with_agents(&agents);
        debug!(
            agents = agents.len(),
            keys = reconciler.len(),
            "Identifier reconciler loaded"
        );
        Ok(reconciler)
    }

    fn insert(&mut self, key: &str, canonical: CanonicalId) {
        self.table.insert(normalize(key), canonical);
    }

    /// Canonical id for an upstream identifier, or `None` when unmapped.
    #[must_use]
    pub fn resolve(&self, upstream_id: &str) -> Option<CanonicalId> {
        self.table.get(&normalize(upstream_id)).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn normalize(id: &str) -> String {
    id.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Vec<Agent> {
        vec![
            Agent::new("claude-1", "Claude Sonnet 4.5"),
            Agent::new("chatgpt-1", "GPT-5"),
        ]
    }

    #[test]
    fn every_alias_resolves_regardless_of_casing() {
        let reconciler = Reconciler::with_agents(&seeded());
        for (alias, canonical) in STATIC_ALIASES {
            let expected = Some(CanonicalId::from(*canonical));
            assert_eq!(reconciler.resolve(alias), expected, "{alias}");
            assert_eq!(reconciler.resolve(&alias.to_uppercase()), expected, "{alias}");
            let mixed: String = alias
                .chars()
                .enumerate()
                .map(|(i, c)| if i % 2 == 0 { c.to_ascii_uppercase() } else { c })
                .collect();
            assert_eq!(reconciler.resolve(&mixed), expected, "{mixed}");
        }
    }

    #[test]
    fn claude_sonnet_variants_resolve_identically() {
        let reconciler = Reconciler::with_static_aliases();
        let a = reconciler.resolve("Claude-Sonnet");
        assert_eq!(a, reconciler.resolve("claude-sonnet"));
        assert_eq!(a, reconciler.resolve("CLAUDE-SONNET"));
        assert_eq!(a, Some(CanonicalId::from("claude-1")));
    }

    #[test]
    fn canonical_ids_and_names_self_map() {
        let reconciler = Reconciler::with_agents(&seeded());
        assert_eq!(reconciler.resolve("CLAUDE-1"), Some(CanonicalId::from("claude-1")));
        assert_eq!(
            reconciler.resolve("claude sonnet 4.5"),
            Some(CanonicalId::from("claude-1"))
        );
    }

    #[test]
    fn store_derived_entry_wins_on_collision() {
        // An agent registered under a key the static table also claims.
        let agents = vec![Agent::new("gpt-5", "GPT-5 (new account)")];
        let reconciler = Reconciler::with_agents(&agents);
        assert_eq!(reconciler.resolve("gpt-5"), Some(CanonicalId::from("gpt-5")));
        assert_eq!(reconciler.resolve("chatgpt"), Some(CanonicalId::from("chatgpt-1")));
    }

    #[test]
    fn unknown_id_is_none() {
        let reconciler = Reconciler::with_agents(&seeded());
        assert_eq!(reconciler.resolve("llama-3"), None);
        assert_eq!(reconciler.resolve(""), None);
    }
}
