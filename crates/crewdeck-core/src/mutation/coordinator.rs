//! Executes writes and reconciles the cache afterwards

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::outcome::{Mutation, MutationOutcome};
use crate::cache::QueryCache;
use crate::error::{Error, Result};
use crate::model::AgentConfig;
use crate::status::StatusEvent;
use crate::store::{EntityStore, StatusChange};

/// Capacity of the outcome channel; slow listeners skip older outcomes
const OUTCOME_CHANNEL_CAPACITY: usize = 64;

/// Runs named mutations against the store and invalidates what they touch
///
/// Invalidation happens when a write completes, so the order in which keys
/// go stale follows completion order rather than the order calls were made.
/// Invalidation never writes data into the cache; the refetch it triggers
/// always reads the store as it is after the latest completed write.
#[derive(Clone)]
pub struct MutationCoordinator {
    store: Arc<dyn EntityStore>,
    cache: QueryCache,
    timeout: Duration,
    outcomes: broadcast::Sender<MutationOutcome>,
}

impl std::fmt::Debug for MutationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCoordinator")
            .field("timeout", &self.timeout)
            .field("listeners", &self.outcomes.receiver_count())
            .finish()
    }
}

impl MutationCoordinator {
    pub fn new(store: Arc<dyn EntityStore>, cache: QueryCache, timeout: Duration) -> Self {
        let (outcomes, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            store,
            cache,
            timeout,
            outcomes,
        }
    }

    /// Listen for outcomes of every mutation run from now on
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<MutationOutcome> {
        self.outcomes.subscribe()
    }

    pub async fn create_agent_config(&self, config: AgentConfig) -> Result<AgentConfig> {
        let mutation = Mutation::CreateAgentConfig {
            name: config.name.clone(),
        };
        self.run(mutation, async {
            config.validate()?;
            self.store.create_agent_config(config).await
        })
        .await
    }

    pub async fn update_agent_config(&self, id: &str, config: AgentConfig) -> Result<AgentConfig> {
        let mutation = Mutation::UpdateAgentConfig { id: id.to_string() };
        self.run(mutation, async {
            config.validate()?;
            self.store.update_agent_config(id, config).await
        })
        .await
    }

    /// Delete a config; deleting it again reports `NotFound`
    pub async fn delete_agent_config(&self, id: &str) -> Result<String> {
        let mutation = Mutation::DeleteAgentConfig { id: id.to_string() };
        self.run(mutation, self.store.delete_agent_config(id)).await
    }

    /// Send `event` to an agent
    ///
    /// Events that are undefined for the agent's status still succeed; they
    /// only refresh `last_active`.
    pub async fn toggle_agent_status(&self, id: &str, event: StatusEvent) -> Result<StatusChange> {
        let mutation = Mutation::ToggleAgentStatus {
            id: id.to_string(),
            event,
        };
        self.run(mutation, self.store.transition_agent(id, event)).await
    }

    async fn run<T, F>(&self, mutation: Mutation, write: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        debug!(mutation = %mutation, "Mutation started");

        let result = match tokio::time::timeout(self.timeout, write).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.timeout.as_millis() as u64)),
        };

        let error = match &result {
            Ok(_) => {
                let invalidated: usize = mutation
                    .invalidates()
                    .iter()
                    .map(|kind| self.cache.invalidate_kind(*kind))
                    .sum();
                info!(mutation = %mutation, invalidated, "Mutation succeeded");
                None
            }
            Err(error) => {
                warn!(mutation = %mutation, code = error.code(), error = %error, "Mutation failed");
                Some(error.clone())
            }
        };

        // No listeners is not an error
        let _ = self.outcomes.send(MutationOutcome {
            mutation,
            error,
            completed_at: Utc::now(),
        });

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::QueryKey;
    use crate::config::StoreConfig;
    use crate::model::{EntityKind, Tool};
    use crate::store::MockStore;

    fn setup(store: MockStore) -> (Arc<MockStore>, QueryCache, MutationCoordinator) {
        let store = Arc::new(store);
        let cache = QueryCache::new(store.clone(), Duration::from_secs(10));
        let mutations = MutationCoordinator::new(store.clone(), cache.clone(), Duration::from_secs(10));
        (store, cache, mutations)
    }

    fn draft() -> AgentConfig {
        AgentConfig::new("Scout", "Researcher").with_tools([Tool::WebSearch])
    }

    #[tokio::test]
    async fn test_create_invalidates_config_keys_only() {
        let (_store, cache, mutations) = setup(MockStore::instant());
        cache.fetch(&QueryKey::agent_configs()).await.unwrap();
        cache.fetch(&QueryKey::agents()).await.unwrap();

        mutations.create_agent_config(draft()).await.unwrap();

        assert!(cache.peek(&QueryKey::agent_configs()).unwrap().is_stale);
        assert!(!cache.peek(&QueryKey::agents()).unwrap().is_stale);

        let configs = cache.fetch(&QueryKey::agent_configs()).await.unwrap();
        assert_eq!(configs.len(), 3);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let (store, cache, mutations) = setup(MockStore::instant());
        let before = cache.fetch(&QueryKey::agent_configs()).await.unwrap();

        store.fail_next(Error::TransportFailure("connection reset".to_string()));
        let result = mutations.delete_agent_config("1").await;
        assert!(matches!(result, Err(Error::TransportFailure(_))));

        let state = cache.peek(&QueryKey::agent_configs()).unwrap();
        assert!(!state.is_stale);
        assert_eq!(state.data, Some(before));
        assert_eq!(store.agent_configs().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_store() {
        let (store, _cache, mutations) = setup(MockStore::instant());
        let mut outcomes = mutations.subscribe_outcomes();

        let result = mutations.create_agent_config(AgentConfig::new("", "Writer")).await;
        assert!(matches!(result, Err(Error::ValidationFailed(_))));
        assert_eq!(store.agent_configs().len(), 2);

        let outcome = outcomes.recv().await.unwrap();
        assert!(!outcome.is_success());
    }

    #[tokio::test]
    async fn test_delete_twice_reports_not_found() {
        let (store, cache, mutations) = setup(MockStore::instant());
        let key = QueryKey::agent_configs();
        assert_eq!(mutations.delete_agent_config("2").await.unwrap(), "2");

        let after_first = cache.fetch(&key).await.unwrap();
        let stored = store.agent_configs();
        assert_eq!(after_first.len(), 1);

        assert_eq!(
            mutations.delete_agent_config("2").await,
            Err(Error::not_found(EntityKind::AgentConfigs, "2"))
        );

        let state = cache.peek(&key).unwrap();
        assert!(!state.is_stale);
        assert_eq!(state.data, Some(after_first));
        assert_eq!(store.agent_configs(), stored);
    }

    #[tokio::test]
    async fn test_toggle_invalidates_agents_and_logs() {
        let (_store, cache, mutations) = setup(MockStore::instant());
        cache.fetch(&QueryKey::agents()).await.unwrap();
        cache.fetch(&QueryKey::logs()).await.unwrap();
        cache.fetch(&QueryKey::agent_configs()).await.unwrap();

        let change = mutations
            .toggle_agent_status("3", StatusEvent::Stop)
            .await
            .unwrap();
        assert_eq!(change.agent.status, crate::model::AgentStatus::Stopped);

        assert!(cache.peek(&QueryKey::agents()).unwrap().is_stale);
        assert!(cache.peek(&QueryKey::logs()).unwrap().is_stale);
        assert!(!cache.peek(&QueryKey::agent_configs()).unwrap().is_stale);

        let agents = cache.fetch(&QueryKey::agents()).await.unwrap();
        let agent = agents.as_agents().unwrap().iter().find(|a| a.id == "3").unwrap().clone();
        assert_eq!(agent.status, crate::model::AgentStatus::Stopped);
    }

    #[tokio::test]
    async fn test_outcomes_are_broadcast() {
        let (_store, _cache, mutations) = setup(MockStore::instant());
        let mut outcomes = mutations.subscribe_outcomes();

        mutations.delete_agent_config("1").await.unwrap();
        let _ = mutations.delete_agent_config("1").await;

        let first = outcomes.recv().await.unwrap();
        assert!(first.is_success());
        assert_eq!(first.mutation.target_id(), Some("1"));

        let second = outcomes.recv().await.unwrap();
        assert!(matches!(second.error, Some(Error::NotFound { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_write_times_out() {
        let store = MockStore::new(StoreConfig {
            delete_latency_ms: 5_000,
            ..StoreConfig::instant()
        });
        let store = Arc::new(store);
        let cache = QueryCache::new(store.clone(), Duration::from_secs(10));
        let mutations = MutationCoordinator::new(store.clone(), cache, Duration::from_secs(1));

        assert_eq!(
            mutations.delete_agent_config("1").await,
            Err(Error::Timeout(1000))
        );
        // The write was abandoned before it applied
        assert_eq!(store.agent_configs().len(), 2);
    }
}
