//! Crewdeck Core Library
//!
//! Client-side data layer for the agent crew dashboard:
//! - Entity model (agents, agent configurations, activity logs)
//! - Entity store trait and an in-memory mock with simulated latency
//! - Query cache with request coalescing, invalidation and polling
//! - Mutation coordinator that reconciles the cache after writes
//! - Agent status state machine and status presentation
//! - Derived view state (search, crew stats, activity feed)

pub mod cache;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod model;
pub mod mutation;
pub mod status;
pub mod store;
pub mod view;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::cache::{QueryCache, QueryKey, QueryOptions, QueryState, QueryStatus, Subscription};
    pub use crate::config::Config;
    pub use crate::dashboard::Dashboard;
    pub use crate::error::{Error, Result};
    pub use crate::model::{Agent, AgentConfig, AgentStatus, Collection, EntityKind, LogEntry, LogLevel, Tool};
    pub use crate::mutation::{Mutation, MutationCoordinator, MutationOutcome};
    pub use crate::status::StatusEvent;
    pub use crate::store::{EntityStore, MockStore};
}

#[cfg(test)]
mod config_tests;
