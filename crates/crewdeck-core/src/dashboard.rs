//! Session wiring for the dashboard
//!
//! One [`Dashboard`] owns the store, the query cache in front of it and the
//! mutation coordinator, all built from a single [`Config`].

use std::sync::Arc;

use futures_util::future::try_join_all;
use tracing::info;

use crate::cache::{QueryCache, QueryKey, QueryOptions, Subscription};
use crate::config::Config;
use crate::error::Result;
use crate::model::{Collection, EntityKind};
use crate::mutation::MutationCoordinator;
use crate::store::MockStore;

#[derive(Debug, Clone)]
pub struct Dashboard {
    config: Config,
    store: Arc<MockStore>,
    cache: QueryCache,
    mutations: MutationCoordinator,
}

impl Dashboard {
    /// Build a session over a freshly seeded mock store
    pub fn new(config: Config) -> Self {
        let store = Arc::new(MockStore::new(config.store.clone()));
        let cache = QueryCache::new(store.clone(), config.cache.fetch_timeout());
        let mutations =
            MutationCoordinator::new(store.clone(), cache.clone(), config.mutation.timeout());
        info!(
            refetch_ms = config.cache.agents_refetch_interval_ms,
            "Dashboard session started"
        );
        Self {
            config,
            store,
            cache,
            mutations,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<MockStore> {
        &self.store
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn mutations(&self) -> &MutationCoordinator {
        &self.mutations
    }

    /// Agents list, polled on the configured interval while subscribed
    pub fn watch_agents(&self, search: &str) -> Subscription {
        let options = QueryOptions {
            refetch_interval: self.config.cache.agents_refetch_interval(),
        };
        self.cache
            .subscribe(QueryKey::agents().with_search(search), options)
    }

    pub fn watch_configs(&self, search: &str) -> Subscription {
        self.cache.subscribe(
            QueryKey::agent_configs().with_search(search),
            QueryOptions::default(),
        )
    }

    pub fn watch_logs(&self) -> Subscription {
        self.cache.subscribe(QueryKey::logs(), QueryOptions::default())
    }

    /// Load every collection once, concurrently
    pub async fn prefetch(&self) -> Result<Vec<Collection>> {
        let keys: Vec<QueryKey> = EntityKind::ALL.iter().copied().map(QueryKey::new).collect();
        try_join_all(keys.iter().map(|key| self.cache.fetch(key))).await
    }

    /// Reseed the store and mark every cached key stale
    pub fn reset(&self) -> usize {
        self.store.reset();
        let invalidated = self.cache.invalidate_all();
        info!(invalidated, "Dashboard reset");
        invalidated
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
