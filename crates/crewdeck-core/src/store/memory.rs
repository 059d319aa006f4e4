//! In-memory store with simulated latency
//!
//! Holds the fixture collections for one session. Reads take their snapshot
//! when the request arrives and deliver it after the simulated latency, the
//! way a response is already fixed while it is in transit. Writes apply
//! after the latency and return as soon as they are applied.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use tracing::{debug, info, warn};

use super::{EntityStore, StatusChange};
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::model::{
    Agent, AgentConfig, AgentStatus, Collection, EntityKind, LogEntry, LogLevel, NewLogEntry,
    fixtures,
};
use crate::status::{self, StatusEvent};

/// Mutable collections behind the store
#[derive(Debug)]
struct StoreState {
    agents: Vec<Agent>,
    configs: Vec<AgentConfig>,
    logs: Vec<LogEntry>,
    /// Last id handed out, in milliseconds since the epoch
    last_id: i64,
    reads: HashMap<EntityKind, usize>,
}

impl StoreState {
    fn seeded() -> Self {
        Self {
            agents: fixtures::agents(Utc::now()),
            configs: fixtures::agent_configs(),
            logs: fixtures::logs(),
            last_id: 0,
            reads: HashMap::new(),
        }
    }

    /// Creation timestamp, bumped so ids stay unique within a millisecond
    fn next_id(&mut self) -> String {
        let now = Utc::now().timestamp_millis();
        self.last_id = now.max(self.last_id + 1);
        self.last_id.to_string()
    }

    fn push_log(&mut self, entry: NewLogEntry) -> LogEntry {
        let log = LogEntry {
            id: self.next_id(),
            agent_id: entry.agent_id,
            agent_name: entry.agent_name,
            timestamp: Utc::now(),
            level: entry.level,
            message: entry.message,
            details: entry.details,
        };
        self.logs.push(log.clone());
        log
    }
}

/// Operation classes with their own latency
#[derive(Debug, Clone, Copy)]
enum Op {
    List(EntityKind),
    Write,
    Delete,
}

/// In-memory [`EntityStore`] seeded with the dashboard fixtures
#[derive(Debug)]
pub struct MockStore {
    config: StoreConfig,
    state: Mutex<StoreState>,
    failures: Mutex<VecDeque<Error>>,
}

impl MockStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            state: Mutex::new(StoreState::seeded()),
            failures: Mutex::new(VecDeque::new()),
        }
    }

    /// Store without simulated latency
    pub fn instant() -> Self {
        Self::new(StoreConfig::instant())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Restore the fixture collections and drop pending injected failures
    pub fn reset(&self) {
        *self.state() = StoreState::seeded();
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        info!("Mock store reset to fixtures");
    }

    /// Make the next operation fail with `error`
    ///
    /// Failures queue up: injecting twice fails the next two operations.
    pub fn fail_next(&self, error: Error) {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
    }

    /// Report an execution fault on an agent, moving it into `error`
    pub fn record_fault(&self, agent_id: &str, message: &str) -> Result<Agent> {
        let mut state = self.state();
        let agent = state
            .agents
            .iter_mut()
            .find(|a| a.id == agent_id)
            .ok_or_else(|| Error::not_found(EntityKind::Agents, agent_id))?;

        agent.status = AgentStatus::Error;
        agent.last_active = Utc::now();
        let agent = agent.clone();

        state.push_log(NewLogEntry::new(
            &agent.id,
            &agent.name,
            LogLevel::Error,
            message,
        ));
        warn!(agent_id = %agent.id, reason = message, "Agent fault recorded");
        Ok(agent)
    }

    /// Current agents without latency, for assertions and tooling
    pub fn agents(&self) -> Vec<Agent> {
        self.state().agents.clone()
    }

    pub fn agent_configs(&self) -> Vec<AgentConfig> {
        self.state().configs.clone()
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.state().logs.clone()
    }

    /// How many list reads of `kind` have been served
    pub fn read_count(&self, kind: EntityKind) -> usize {
        self.state().reads.get(&kind).copied().unwrap_or(0)
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_failure(&self) -> Result<()> {
        match self
            .failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            Some(error) => {
                debug!(code = error.code(), "Injected store failure");
                Err(error)
            }
            None => Ok(()),
        }
    }

    fn latency(&self, op: Op) -> Duration {
        let base = match op {
            Op::List(EntityKind::Agents) => self.config.agents_latency_ms,
            Op::List(EntityKind::AgentConfigs) => self.config.configs_latency_ms,
            Op::List(EntityKind::Logs) => self.config.logs_latency_ms,
            Op::Write => self.config.write_latency_ms,
            Op::Delete => self.config.delete_latency_ms,
        };
        let jitter = if self.config.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.config.jitter_ms)
        } else {
            0
        };
        Duration::from_millis(base.saturating_add(jitter))
    }

    async fn simulate(&self, op: Op) {
        let delay = self.latency(op);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

#[async_trait]
impl EntityStore for MockStore {
    async fn list(&self, kind: EntityKind) -> Result<Collection> {
        self.take_failure()?;
        let snapshot = {
            let mut state = self.state();
            *state.reads.entry(kind).or_insert(0) += 1;
            match kind {
                EntityKind::Agents => Collection::Agents(state.agents.clone()),
                EntityKind::AgentConfigs => Collection::AgentConfigs(state.configs.clone()),
                EntityKind::Logs => Collection::Logs(state.logs.clone()),
            }
        };
        self.simulate(Op::List(kind)).await;
        debug!(kind = %kind, count = snapshot.len(), "Served list");
        Ok(snapshot)
    }

    async fn create_agent_config(&self, mut config: AgentConfig) -> Result<AgentConfig> {
        self.simulate(Op::Write).await;
        self.take_failure()?;
        config.validate()?;

        let mut state = self.state();
        match config.id.clone() {
            Some(id) => {
                if state.configs.iter().any(|c| c.id.as_ref() == Some(&id)) {
                    return Err(Error::ValidationFailed(format!(
                        "agent config id '{}' already exists",
                        id
                    )));
                }
            }
            None => config.id = Some(state.next_id()),
        }
        state.configs.push(config.clone());
        debug!(id = ?config.id, name = %config.name, "Created agent config");
        Ok(config)
    }

    async fn update_agent_config(&self, id: &str, mut config: AgentConfig) -> Result<AgentConfig> {
        self.simulate(Op::Write).await;
        self.take_failure()?;
        config.validate()?;

        let mut state = self.state();
        let slot = state
            .configs
            .iter_mut()
            .find(|c| c.id.as_deref() == Some(id))
            .ok_or_else(|| Error::not_found(EntityKind::AgentConfigs, id))?;

        config.id = Some(id.to_string());
        *slot = config.clone();
        debug!(id, name = %config.name, "Updated agent config");
        Ok(config)
    }

    async fn delete_agent_config(&self, id: &str) -> Result<String> {
        self.simulate(Op::Delete).await;
        self.take_failure()?;

        let mut state = self.state();
        let index = state
            .configs
            .iter()
            .position(|c| c.id.as_deref() == Some(id))
            .ok_or_else(|| Error::not_found(EntityKind::AgentConfigs, id))?;
        state.configs.remove(index);
        debug!(id, "Deleted agent config");
        Ok(id.to_string())
    }

    async fn transition_agent(&self, id: &str, event: StatusEvent) -> Result<StatusChange> {
        self.simulate(Op::Write).await;
        self.take_failure()?;

        let mut state = self.state();
        let slot = state
            .agents
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::not_found(EntityKind::Agents, id))?;

        // Only a record that still holds its invariants is committed
        let mut agent = slot.clone();
        let transition = status::apply(&mut agent, event, Utc::now());
        agent.validate()?;
        *slot = agent.clone();

        let entry = if transition.changed() {
            NewLogEntry::new(
                &agent.id,
                &agent.name,
                LogLevel::Success,
                format!("Agent {}", transition.to),
            )
            .with_details(format!("{} -> {}", transition.from, transition.to))
        } else {
            NewLogEntry::new(
                &agent.id,
                &agent.name,
                LogLevel::Info,
                format!("Ignored {} while {}", event, transition.from),
            )
        };
        state.push_log(entry);

        debug!(
            id,
            event = %event,
            from = %transition.from,
            to = %transition.to,
            "Applied status event"
        );
        Ok(StatusChange { agent, transition })
    }

    async fn append_log(&self, entry: NewLogEntry) -> Result<LogEntry> {
        self.simulate(Op::Write).await;
        self.take_failure()?;
        Ok(self.state().push_log(entry))
    }
}
