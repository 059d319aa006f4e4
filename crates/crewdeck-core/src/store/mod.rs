//! Entity store
//!
//! The store is the authority on what the backend holds. Everything above it
//! (the query cache, the mutation coordinator) only ever sees the store
//! through the [`EntityStore`] trait, which is the seam where a network
//! client will replace the in-memory mock.

pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Agent, AgentConfig, Collection, EntityKind, LogEntry, NewLogEntry};
use crate::status::{StatusEvent, Transition};

pub use memory::MockStore;

/// Agent after a status event, together with what the event did
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub agent: Agent,
    pub transition: Transition,
}

/// Backend operations over the entity collections
///
/// Every method completes asynchronously. Failures are always returned as
/// typed errors; implementations never panic on unknown ids.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Read a whole collection in store order
    async fn list(&self, kind: EntityKind) -> Result<Collection>;

    /// Create a config, assigning an id when the payload has none
    async fn create_agent_config(&self, config: AgentConfig) -> Result<AgentConfig>;

    /// Replace the config stored under `id`
    async fn update_agent_config(&self, id: &str, config: AgentConfig) -> Result<AgentConfig>;

    /// Remove a config, returning its id
    async fn delete_agent_config(&self, id: &str) -> Result<String>;

    /// Apply a status event to an agent
    async fn transition_agent(&self, id: &str, event: StatusEvent) -> Result<StatusChange>;

    /// Append to the log collection
    async fn append_log(&self, entry: NewLogEntry) -> Result<LogEntry>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    fn _assert_object_safe(_: &dyn EntityStore) {}
}
