//! Observable state of a cache entry

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::model::{Agent, AgentConfig, Collection, LogEntry};

/// Lifecycle of a cached query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStatus {
    /// Never fetched
    Idle,
    /// A fetch is in flight; `data` still holds the last good value, if any
    Loading,
    Success,
    Error,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one cache entry as seen by readers
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    /// Last successfully fetched value; kept through later failures
    pub data: Option<Collection>,
    pub status: QueryStatus,
    /// Failure that settled the latest fetch, cleared by the next success
    pub error: Option<Error>,
    pub last_fetched_at: Option<DateTime<Utc>>,
    /// Invalidated since `data` was fetched
    pub is_stale: bool,
    /// Generation of the entry when this snapshot was published
    pub(crate) generation: u64,
    /// Generation the latest settled fetch answered
    pub(crate) settled_generation: Option<u64>,
}

impl QueryState {
    pub(crate) fn idle() -> Self {
        Self {
            data: None,
            status: QueryStatus::Idle,
            error: None,
            last_fetched_at: None,
            is_stale: false,
            generation: 0,
            settled_generation: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    /// Settled for the current generation, successfully or not
    pub fn is_settled(&self) -> bool {
        self.settled_generation == Some(self.generation)
            && matches!(self.status, QueryStatus::Success | QueryStatus::Error)
    }

    pub(crate) fn settled_since(&self, generation: u64) -> bool {
        self.settled_generation.is_some_and(|g| g >= generation)
            && matches!(self.status, QueryStatus::Success | QueryStatus::Error)
    }

    pub fn agents(&self) -> &[Agent] {
        self.data
            .as_ref()
            .and_then(Collection::as_agents)
            .unwrap_or_default()
    }

    pub fn agent_configs(&self) -> &[AgentConfig] {
        self.data
            .as_ref()
            .and_then(Collection::as_agent_configs)
            .unwrap_or_default()
    }

    pub fn logs(&self) -> &[LogEntry] {
        self.data
            .as_ref()
            .and_then(Collection::as_logs)
            .unwrap_or_default()
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::idle()
    }
}
