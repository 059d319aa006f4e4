//! Agent status state machine
//!
//! Operators can only `start` or `stop` an agent. The `error` state is entered
//! when the backend reports an execution fault and is left only through an
//! explicit `start`.
//!
//! | from \ event | start  | stop    |
//! |--------------|--------|---------|
//! | active       | no-op  | stopped |
//! | idle         | active | stopped |
//! | error        | active | no-op   |
//! | stopped      | active | no-op   |
//!
//! Every event refreshes `last_active`, including no-ops.

pub mod style;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Agent, AgentStatus};

pub use style::{BadgeVariant, StatusColor, StatusStyle};

/// Operator intent for an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusEvent {
    Start,
    Stop,
}

impl StatusEvent {
    /// The event a toggle button issues for the current status
    pub fn toggle_for(status: AgentStatus) -> Self {
        match status {
            AgentStatus::Active => Self::Stop,
            _ => Self::Start,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
        }
    }
}

impl fmt::Display for StatusEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target status for `event` from `from`, or `None` when undefined
pub fn next_status(from: AgentStatus, event: StatusEvent) -> Option<AgentStatus> {
    use AgentStatus::*;

    match (from, event) {
        (Idle | Stopped | Error, StatusEvent::Start) => Some(Active),
        (Active | Idle, StatusEvent::Stop) => Some(Stopped),
        _ => None,
    }
}

/// Record of one applied event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub event: StatusEvent,
    pub from: AgentStatus,
    pub to: AgentStatus,
    pub at: DateTime<Utc>,
}

impl Transition {
    /// False for events that were not defined for the starting status
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Apply `event` to `agent` in place
pub fn apply(agent: &mut Agent, event: StatusEvent, at: DateTime<Utc>) -> Transition {
    let from = agent.status;
    let to = next_status(from, event).unwrap_or(from);

    agent.status = to;
    agent.last_active = at;
    if to == AgentStatus::Stopped && from != AgentStatus::Stopped {
        agent.current_task = None;
    }

    Transition { event, from, to, at }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn agent(status: AgentStatus) -> Agent {
        Agent {
            id: "7".to_string(),
            name: "Ops Agent".to_string(),
            role: "Operator".to_string(),
            status,
            description: String::new(),
            avatar: None,
            last_active: Utc::now() - Duration::hours(1),
            tasks_completed: 3,
            success_rate: 80,
            current_task: Some("Reconciling invoices".to_string()),
            crew: None,
        }
    }

    #[test]
    fn test_transition_table() {
        use AgentStatus::*;

        assert_eq!(next_status(Idle, StatusEvent::Start), Some(Active));
        assert_eq!(next_status(Stopped, StatusEvent::Start), Some(Active));
        assert_eq!(next_status(Error, StatusEvent::Start), Some(Active));
        assert_eq!(next_status(Active, StatusEvent::Start), None);
        assert_eq!(next_status(Active, StatusEvent::Stop), Some(Stopped));
        assert_eq!(next_status(Idle, StatusEvent::Stop), Some(Stopped));
        assert_eq!(next_status(Stopped, StatusEvent::Stop), None);
        assert_eq!(next_status(Error, StatusEvent::Stop), None);
    }

    #[test]
    fn test_start_clears_error() {
        let mut agent = agent(AgentStatus::Error);
        let before = agent.last_active;
        let now = Utc::now();

        let transition = apply(&mut agent, StatusEvent::Start, now);

        assert_eq!(agent.status, AgentStatus::Active);
        assert_eq!(agent.last_active, now);
        assert!(agent.last_active > before);
        assert!(transition.changed());
    }

    #[test]
    fn test_stop_on_stopped_only_refreshes_last_active() {
        let mut agent = agent(AgentStatus::Stopped);
        let now = Utc::now();

        let transition = apply(&mut agent, StatusEvent::Stop, now);

        assert_eq!(agent.status, AgentStatus::Stopped);
        assert_eq!(agent.last_active, now);
        assert!(!transition.changed());
    }

    #[test]
    fn test_stop_clears_current_task() {
        let mut agent = agent(AgentStatus::Active);
        apply(&mut agent, StatusEvent::Stop, Utc::now());
        assert_eq!(agent.status, AgentStatus::Stopped);
        assert_eq!(agent.current_task, None);
    }

    #[test]
    fn test_start_while_active_keeps_task() {
        let mut agent = agent(AgentStatus::Active);
        apply(&mut agent, StatusEvent::Start, Utc::now());
        assert_eq!(agent.status, AgentStatus::Active);
        assert!(agent.current_task.is_some());
    }

    #[test]
    fn test_toggle_for() {
        assert_eq!(StatusEvent::toggle_for(AgentStatus::Active), StatusEvent::Stop);
        assert_eq!(StatusEvent::toggle_for(AgentStatus::Error), StatusEvent::Start);
        assert_eq!(StatusEvent::toggle_for(AgentStatus::Idle), StatusEvent::Start);
    }
}
