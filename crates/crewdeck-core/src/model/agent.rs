//! Monitored agent instances

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Runtime status of an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Active,
    Idle,
    Error,
    Stopped,
}

impl AgentStatus {
    pub const ALL: [AgentStatus; 4] = [Self::Active, Self::Idle, Self::Error, Self::Stopped];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Idle => "idle",
            Self::Error => "error",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::ValidationFailed(format!("unknown agent status '{}'", s)))
    }
}

/// A monitored agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub role: String,
    pub status: AgentStatus,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub last_active: DateTime<Utc>,
    pub tasks_completed: u32,
    /// Percentage in `0..=100`
    pub success_rate: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crew: Option<String>,
}

impl Agent {
    /// Check the invariants the store relies on
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::ValidationFailed("agent id must not be empty".to_string()));
        }
        if self.success_rate > 100 {
            return Err(Error::ValidationFailed(format!(
                "success rate {} is outside 0..=100",
                self.success_rate
            )));
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(success_rate: u8) -> Agent {
        Agent {
            id: "a".to_string(),
            name: "Agent".to_string(),
            role: "Role".to_string(),
            status: AgentStatus::Idle,
            description: String::new(),
            avatar: None,
            last_active: Utc::now(),
            tasks_completed: 0,
            success_rate,
            current_task: None,
            crew: None,
        }
    }

    #[test]
    fn test_status_round_trips_through_str() {
        for status in AgentStatus::ALL {
            assert_eq!(status.as_str().parse::<AgentStatus>().unwrap(), status);
        }
        assert!("paused".parse::<AgentStatus>().is_err());
    }

    #[test]
    fn test_success_rate_bounds() {
        assert!(agent(100).validate().is_ok());
        assert!(matches!(
            agent(101).validate(),
            Err(Error::ValidationFailed(_))
        ));
    }

    #[test]
    fn test_serializes_camel_case_without_empty_options() {
        let json = serde_json::to_value(agent(90)).unwrap();
        assert!(json.get("successRate").is_some());
        assert!(json.get("lastActive").is_some());
        assert!(json.get("currentTask").is_none());
        assert_eq!(json["status"], "idle");
    }
}
