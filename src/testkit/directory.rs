//! Fixed agent directory.

use crate::domain::Agent;
use crate::error::Result;
use crate::port::AgentDirectory;

#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    agents: Vec<Agent>,
}

impl StaticDirectory {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    /// The six competing agents, as seeded by the relational migrations.
    pub fn canonical() -> Self {
        Self::new(vec![
            Agent::new("claude-1", "Claude Sonnet 4.5"),
            Agent::new("deepseek-1", "DeepSeek Chat V3.1"),
            Agent::new("gemini-1", "Gemini 2.5 Pro"),
            Agent::new("chatgpt-1", "GPT-5"),
            Agent::new("grok-1", "Grok 4"),
            Agent::new("qwen-1", "Qwen3 Max"),
        ])
    }
}

impl AgentDirectory for StaticDirectory {
    async fn list_agents(&self) -> Result<Vec<Agent>> {
        Ok(self.agents.clone())
    }
}
