//! Entity model
//!
//! Agents are live, monitored instances with a runtime status. Agent configs
//! are reusable definitions. The two collections are deliberately separate
//! and are never reconciled, even where fixture identities overlap.

pub mod agent;
pub mod agent_config;
pub mod fixtures;
pub mod log_entry;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use agent::{Agent, AgentStatus};
pub use agent_config::{AgentConfig, MAX_ITER, MIN_ITER, Tool};
pub use log_entry::{LogEntry, LogLevel, NewLogEntry};

/// Kind of entity collection held by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Agents,
    AgentConfigs,
    Logs,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Agents, Self::AgentConfigs, Self::Logs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agents => "agents",
            Self::AgentConfigs => "agent-configs",
            Self::Logs => "logs",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A whole collection as returned by a list read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "kebab-case")]
pub enum Collection {
    Agents(Vec<Agent>),
    AgentConfigs(Vec<AgentConfig>),
    Logs(Vec<LogEntry>),
}

impl Collection {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Agents(_) => EntityKind::Agents,
            Self::AgentConfigs(_) => EntityKind::AgentConfigs,
            Self::Logs(_) => EntityKind::Logs,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Agents(items) => items.len(),
            Self::AgentConfigs(items) => items.len(),
            Self::Logs(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_agents(&self) -> Option<&[Agent]> {
        match self {
            Self::Agents(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_agent_configs(&self) -> Option<&[AgentConfig]> {
        match self {
            Self::AgentConfigs(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_logs(&self) -> Option<&[LogEntry]> {
        match self {
            Self::Logs(items) => Some(items),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_display() {
        assert_eq!(EntityKind::Agents.to_string(), "agents");
        assert_eq!(EntityKind::AgentConfigs.to_string(), "agent-configs");
        assert_eq!(EntityKind::Logs.to_string(), "logs");
    }

    #[test]
    fn test_collection_accessors() {
        let logs = Collection::Logs(Vec::new());
        assert_eq!(logs.kind(), EntityKind::Logs);
        assert!(logs.is_empty());
        assert!(logs.as_agents().is_none());
        assert!(logs.as_logs().is_some());
    }
}
