//! Scoped attachment to a cache key

use std::sync::Weak;
use std::time::Duration;

use tokio::sync::watch;

use super::client::CacheInner;
use super::key::QueryKey;
use super::state::QueryState;
use crate::error::{Error, Result};

/// Per-subscription query behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Invalidate and refetch the key on this period while subscribed
    pub refetch_interval: Option<Duration>,
}

impl QueryOptions {
    pub fn refetch_every(interval: Duration) -> Self {
        Self {
            refetch_interval: Some(interval),
        }
    }
}

/// A live view of one cache entry
///
/// Dropping the subscription detaches it. A fetch that is still running
/// keeps going and its result is cached for other readers; it is simply no
/// longer delivered here.
pub struct Subscription {
    key: QueryKey,
    rx: watch::Receiver<QueryState>,
    cache: Weak<CacheInner>,
}

impl Subscription {
    pub(crate) fn new(key: QueryKey, rx: watch::Receiver<QueryState>, cache: Weak<CacheInner>) -> Self {
        Self { key, rx, cache }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Latest published state
    pub fn current(&self) -> QueryState {
        self.rx.borrow().clone()
    }

    /// Whether a state was published since the last `changed` or `mark_seen`
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Acknowledge the current state without waiting
    pub fn mark_seen(&mut self) -> QueryState {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the entry to publish a new state
    pub async fn changed(&mut self) -> Result<QueryState> {
        self.rx
            .changed()
            .await
            .map_err(|_| Error::CacheClosed(self.key.to_string()))?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Wait until the entry has settled for its current generation
    pub async fn settled(&mut self) -> Result<QueryState> {
        let state = self
            .rx
            .wait_for(QueryState::is_settled)
            .await
            .map_err(|_| Error::CacheClosed(self.key.to_string()))?
            .clone();
        Ok(state)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .field("status", &self.rx.borrow().status)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cache) = self.cache.upgrade() {
            cache.detach(&self.key);
        }
    }
}
