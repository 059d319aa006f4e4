//! Named mutations and their published outcomes

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::model::EntityKind;
use crate::status::StatusEvent;

/// A write the dashboard can perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    CreateAgentConfig { name: String },
    UpdateAgentConfig { id: String },
    DeleteAgentConfig { id: String },
    ToggleAgentStatus { id: String, event: StatusEvent },
}

impl Mutation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAgentConfig { .. } => "createAgentConfig",
            Self::UpdateAgentConfig { .. } => "updateAgentConfig",
            Self::DeleteAgentConfig { .. } => "deleteAgentConfig",
            Self::ToggleAgentStatus { .. } => "toggleAgentStatus",
        }
    }

    /// Collections whose cached queries this mutation makes stale
    pub fn invalidates(&self) -> &'static [EntityKind] {
        match self {
            Self::CreateAgentConfig { .. }
            | Self::UpdateAgentConfig { .. }
            | Self::DeleteAgentConfig { .. } => &[EntityKind::AgentConfigs],
            // toggles also append an audit entry to the log
            Self::ToggleAgentStatus { .. } => &[EntityKind::Agents, EntityKind::Logs],
        }
    }

    /// Id of the entity written, when known before the write
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::CreateAgentConfig { .. } => None,
            Self::UpdateAgentConfig { id }
            | Self::DeleteAgentConfig { id }
            | Self::ToggleAgentStatus { id, .. } => Some(id.as_str()),
        }
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target_id() {
            Some(id) => write!(f, "{}({})", self.name(), id),
            None => f.write_str(self.name()),
        }
    }
}

/// Result of one mutation as published to listeners
#[derive(Debug, Clone, PartialEq)]
pub struct MutationOutcome {
    pub mutation: Mutation,
    /// `None` on success
    pub error: Option<Error>,
    pub completed_at: DateTime<Utc>,
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Short default notification text; presentation may replace it
    pub fn summary(&self) -> String {
        let subject = match &self.mutation {
            Mutation::CreateAgentConfig { .. } => "create agent",
            Mutation::UpdateAgentConfig { .. } => "update agent",
            Mutation::DeleteAgentConfig { .. } => "delete agent",
            Mutation::ToggleAgentStatus { .. } => "update agent status",
        };
        match (&self.error, &self.mutation) {
            (None, Mutation::CreateAgentConfig { .. }) => "Agent created successfully".to_string(),
            (None, Mutation::UpdateAgentConfig { .. }) => "Agent updated successfully".to_string(),
            (None, Mutation::DeleteAgentConfig { .. }) => "Agent deleted successfully".to_string(),
            (None, Mutation::ToggleAgentStatus { event, .. }) => match event {
                StatusEvent::Start => "Agent started successfully".to_string(),
                StatusEvent::Stop => "Agent stopped successfully".to_string(),
            },
            (Some(error), _) => format!("Failed to {}: {}", subject, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_invalidations() {
        let create = Mutation::CreateAgentConfig {
            name: "X".to_string(),
        };
        assert_eq!(create.invalidates(), &[EntityKind::AgentConfigs]);

        let toggle = Mutation::ToggleAgentStatus {
            id: "1".to_string(),
            event: StatusEvent::Stop,
        };
        assert_eq!(toggle.invalidates(), &[EntityKind::Agents, EntityKind::Logs]);
        assert_eq!(toggle.to_string(), "toggleAgentStatus(1)");
    }

    #[test]
    fn test_summary() {
        let outcome = MutationOutcome {
            mutation: Mutation::ToggleAgentStatus {
                id: "1".to_string(),
                event: StatusEvent::Start,
            },
            error: None,
            completed_at: Utc::now(),
        };
        assert_eq!(outcome.summary(), "Agent started successfully");

        let failed = MutationOutcome {
            mutation: Mutation::DeleteAgentConfig {
                id: "9".to_string(),
            },
            error: Some(Error::not_found(EntityKind::AgentConfigs, "9")),
            completed_at: Utc::now(),
        };
        assert!(!failed.is_success());
        assert!(failed.summary().starts_with("Failed to delete agent"));
    }
}
