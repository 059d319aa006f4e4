//! Composite cache keys

use std::fmt;

use crate::model::{Collection, EntityKind};
use crate::view;

/// Identifies one logical query: an entity kind plus an optional search term
///
/// Search terms are stored lowercased since matching is case-insensitive,
/// so `"Alpha"` and `"alpha"` share an entry. An empty term is the same key
/// as no term at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    kind: EntityKind,
    search: Option<String>,
}

impl QueryKey {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind, search: None }
    }

    pub fn agents() -> Self {
        Self::new(EntityKind::Agents)
    }

    pub fn agent_configs() -> Self {
        Self::new(EntityKind::AgentConfigs)
    }

    pub fn logs() -> Self {
        Self::new(EntityKind::Logs)
    }

    pub fn with_search(mut self, term: &str) -> Self {
        self.search = (!term.is_empty()).then(|| term.to_lowercase());
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Prefix match: the bare kind key matches every search under that kind
    pub fn matches(&self, prefix: &QueryKey) -> bool {
        self.kind == prefix.kind && (prefix.search.is_none() || self.search == prefix.search)
    }

    /// Restrict a full collection to what this key asks for
    pub(crate) fn narrow(&self, collection: Collection) -> Collection {
        let Some(term) = self.search.as_deref() else {
            return collection;
        };
        match collection {
            Collection::Agents(items) => Collection::Agents(view::filter(&items, term)),
            Collection::AgentConfigs(items) => Collection::AgentConfigs(view::filter(&items, term)),
            Collection::Logs(items) => Collection::Logs(view::filter(&items, term)),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.search {
            Some(term) => write!(f, "{}?search={}", self.kind, term),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl From<EntityKind> for QueryKey {
    fn from(kind: EntityKind) -> Self {
        Self::new(kind)
    }
}
