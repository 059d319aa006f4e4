//! Read-through cache over an [`EntityStore`]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::key::QueryKey;
use super::state::{QueryState, QueryStatus};
use super::subscription::{QueryOptions, Subscription};
use crate::error::{Error, Result};
use crate::model::{Collection, EntityKind};
use crate::store::EntityStore;

/// Bookkeeping for one key
struct Entry {
    tx: watch::Sender<QueryState>,
    generation: u64,
    /// Generation the running fetch was issued under
    in_flight: Option<u64>,
    subscribers: usize,
    refetch_interval: Option<Duration>,
    timer: Option<JoinHandle<()>>,
}

impl Entry {
    fn new() -> Self {
        let (tx, _) = watch::channel(QueryState::idle());
        Self {
            tx,
            generation: 0,
            in_flight: None,
            subscribers: 0,
            refetch_interval: None,
            timer: None,
        }
    }

    /// Fresh entries answer reads without touching the store
    fn needs_fetch(&self) -> bool {
        if self.in_flight.is_some() {
            return false;
        }
        let state = self.tx.borrow();
        state.settled_generation != Some(self.generation)
    }
}

pub(crate) struct CacheInner {
    store: Arc<dyn EntityStore>,
    fetch_timeout: Duration,
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

/// Keyed, read-through cache of entity collections
///
/// Cheap to clone; clones share entries. Methods that may start a fetch
/// spawn onto the current tokio runtime and must be called from within one.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("fetch_timeout", &self.inner.fetch_timeout)
            .field("entries", &self.inner.entries().len())
            .finish()
    }
}

impl QueryCache {
    pub fn new(store: Arc<dyn EntityStore>, fetch_timeout: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                store,
                fetch_timeout,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Current state of `key`, starting a fetch when it is missing or stale
    ///
    /// Never waits: while the fetch runs the state reports `Loading` and
    /// still carries the previous data, if any. Entries that settled with an
    /// error are not fetched again until invalidated.
    pub fn get(&self, key: &QueryKey) -> QueryState {
        let mut entries = self.inner.entries();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
        if entry.needs_fetch() {
            self.inner.start_fetch(key, entry);
        }
        entry.tx.borrow().clone()
    }

    /// Resolve with data at least as new as the latest invalidation of `key`
    ///
    /// Joins a fetch already in flight for the current generation instead of
    /// issuing another one.
    pub async fn fetch(&self, key: &QueryKey) -> Result<Collection> {
        let (mut rx, target) = {
            let mut entries = self.inner.entries();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            if entry.needs_fetch() {
                self.inner.start_fetch(key, entry);
            }
            (entry.tx.subscribe(), entry.generation)
        };

        let state = rx
            .wait_for(|state| state.settled_since(target))
            .await
            .map_err(|_| Error::CacheClosed(key.to_string()))?
            .clone();

        match state.status {
            QueryStatus::Error => Err(state
                .error
                .unwrap_or_else(|| Error::Other(format!("fetch of '{}' failed", key)))),
            _ => state
                .data
                .ok_or_else(|| Error::Other(format!("fetch of '{}' returned no data", key))),
        }
    }

    /// Attach to `key`, fetching it if needed
    ///
    /// With a refetch interval the key is refetched periodically for as
    /// long as at least one subscription is alive. A tick that lands while a
    /// fetch is running is skipped.
    ///
    /// Keys with a search term are evicted when their last subscription is
    /// dropped and no fetch is running for them.
    pub fn subscribe(&self, key: QueryKey, options: QueryOptions) -> Subscription {
        let rx = {
            let mut entries = self.inner.entries();
            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.subscribers += 1;

            // The shortest interval asked for by any live subscriber wins
            let shorter = options
                .refetch_interval
                .filter(|interval| entry.refetch_interval.is_none_or(|current| *interval < current));
            if let Some(interval) = shorter {
                entry.refetch_interval = Some(interval);
                if let Some(timer) = entry.timer.take() {
                    timer.abort();
                }
                entry.timer = Some(self.inner.spawn_timer(key.clone(), interval));
            }

            if entry.needs_fetch() {
                self.inner.start_fetch(&key, entry);
            }
            debug!(key = %key, subscribers = entry.subscribers, "Subscribed");
            entry.tx.subscribe()
        };

        Subscription::new(key, rx, Arc::downgrade(&self.inner))
    }

    /// Mark every key matching `prefix` stale
    ///
    /// Subscribers observe the stale flag immediately. Keys that have
    /// subscribers are fetched again right away; the rest on their next read.
    /// Returns how many entries were invalidated.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        self.invalidate_where(|key| key.matches(prefix))
    }

    /// Invalidate every key of `kind`, whatever its search term
    pub fn invalidate_kind(&self, kind: EntityKind) -> usize {
        self.invalidate(&QueryKey::new(kind))
    }

    pub fn invalidate_all(&self) -> usize {
        self.invalidate_where(|_| true)
    }

    pub fn invalidate_where(&self, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        self.inner.invalidate_where(predicate)
    }

    /// Number of live subscriptions on `key`
    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.inner
            .entries()
            .get(key)
            .map_or(0, |entry| entry.subscribers)
    }

    /// Whether a periodic refetch timer is running for `key`
    pub fn has_refetch_timer(&self, key: &QueryKey) -> bool {
        self.inner
            .entries()
            .get(key)
            .is_some_and(|entry| entry.timer.is_some())
    }

    /// Current state without starting a fetch
    pub fn peek(&self, key: &QueryKey) -> Option<QueryState> {
        self.inner
            .entries()
            .get(key)
            .map(|entry| entry.tx.borrow().clone())
    }
}

impl CacheInner {
    fn entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Issue a fetch for the entry's current generation
    ///
    /// Called with the entries lock held; the spawned task only takes the
    /// lock again once the store has answered.
    fn start_fetch(self: &Arc<Self>, key: &QueryKey, entry: &mut Entry) {
        let generation = entry.generation;
        entry.in_flight = Some(generation);
        entry.tx.send_modify(|state| {
            state.status = QueryStatus::Loading;
            state.generation = generation;
        });
        debug!(key = %key, generation, "Fetch started");

        let inner = Arc::clone(self);
        let store = Arc::clone(&self.store);
        let key = key.clone();
        let timeout = self.fetch_timeout;
        tokio::spawn(async move {
            let result = match tokio::time::timeout(timeout, store.list(key.kind())).await {
                Ok(result) => result.map(|collection| key.narrow(collection)),
                Err(_) => Err(Error::Timeout(timeout.as_millis() as u64)),
            };
            inner.settle(&key, generation, result);
        });
    }

    fn settle(self: &Arc<Self>, key: &QueryKey, issued: u64, result: Result<Collection>) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        entry.in_flight = None;

        if issued != entry.generation {
            debug!(
                key = %key,
                issued,
                current = entry.generation,
                "Discarding fetch result superseded by invalidation"
            );
            self.start_fetch(key, entry);
            return;
        }

        entry.tx.send_modify(|state| {
            match result {
                Ok(data) => {
                    debug!(key = %key, generation = issued, count = data.len(), "Fetch settled");
                    state.data = Some(data);
                    state.status = QueryStatus::Success;
                    state.error = None;
                    state.last_fetched_at = Some(Utc::now());
                }
                Err(error) => {
                    warn!(key = %key, generation = issued, error = %error, "Fetch failed");
                    state.status = QueryStatus::Error;
                    state.error = Some(error);
                }
            }
            state.is_stale = false;
            state.generation = issued;
            state.settled_generation = Some(issued);
        });
    }

    fn invalidate_where(self: &Arc<Self>, predicate: impl Fn(&QueryKey) -> bool) -> usize {
        let mut entries = self.entries();
        let mut count = 0;
        for (key, entry) in entries.iter_mut().filter(|(key, _)| predicate(*key)) {
            self.mark_stale(key, entry);
            count += 1;
        }
        count
    }

    /// Bump the generation so older answers are discarded, then refetch
    /// if anyone is watching
    fn mark_stale(self: &Arc<Self>, key: &QueryKey, entry: &mut Entry) {
        entry.generation += 1;
        let generation = entry.generation;
        entry.tx.send_modify(|state| {
            state.is_stale = true;
            state.generation = generation;
        });
        if entry.subscribers > 0 && entry.in_flight.is_none() {
            self.start_fetch(key, entry);
        }
        debug!(key = %key, generation, subscribers = entry.subscribers, "Invalidated");
    }

    /// Periodic refetch
    ///
    /// A tick reflects no write, so a fetch already in flight still answers
    /// it and is left alone.
    fn poll(self: &Arc<Self>, key: &QueryKey) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.in_flight.is_some() {
            debug!(key = %key, "Poll skipped, fetch in flight");
            return;
        }
        self.mark_stale(key, entry);
    }

    /// Drop one subscription; the last one out stops the refetch timer
    pub(crate) fn detach(&self, key: &QueryKey) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        entry.subscribers = entry.subscribers.saturating_sub(1);
        debug!(key = %key, subscribers = entry.subscribers, "Unsubscribed");
        if entry.subscribers > 0 {
            return;
        }

        if let Some(timer) = entry.timer.take() {
            timer.abort();
            debug!(key = %key, "Refetch timer stopped");
        }
        entry.refetch_interval = None;

        // One entry per search term typed would otherwise pile up; bare kind
        // keys stay so later reads are answered from memory
        if key.search().is_some() && entry.in_flight.is_none() {
            entries.remove(key);
            debug!(key = %key, "Evicted unwatched search entry");
        }
    }

    fn spawn_timer(self: &Arc<Self>, key: QueryKey, period: Duration) -> JoinHandle<()> {
        debug!(key = %key, period_ms = period.as_millis() as u64, "Refetch timer started");
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                inner.poll(&key);
            }
        })
    }
}
