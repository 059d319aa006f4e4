//! Derived view state
//!
//! Pure functions over the latest cached collections. Nothing here is
//! stored; every value is recomputed from a snapshot whenever the snapshot
//! changes.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{QueryState, QueryStatus};
use crate::model::{Agent, AgentConfig, LogEntry, LogLevel};

/// Entities that take part in free-text search
pub trait Searchable {
    /// Fields matched against the search term
    fn search_fields(&self) -> [&str; 2];
}

impl Searchable for Agent {
    fn search_fields(&self) -> [&str; 2] {
        [&self.name, &self.role]
    }
}

impl Searchable for AgentConfig {
    fn search_fields(&self) -> [&str; 2] {
        [&self.name, &self.role]
    }
}

impl Searchable for LogEntry {
    fn search_fields(&self) -> [&str; 2] {
        [&self.agent_name, &self.message]
    }
}

/// Whether `item` contains `term` in any searchable field, ignoring case
pub fn matches<T: Searchable>(item: &T, term: &str) -> bool {
    contains_lowered(item, &term.to_lowercase())
}

fn contains_lowered<T: Searchable>(item: &T, lowered: &str) -> bool {
    item.search_fields()
        .iter()
        .any(|field| field.to_lowercase().contains(lowered))
}

/// Items matching `term`, in source order; an empty term keeps everything
pub fn filter<T: Searchable + Clone>(items: &[T], term: &str) -> Vec<T> {
    if term.is_empty() {
        return items.to_vec();
    }
    let lowered = term.to_lowercase();
    items
        .iter()
        .filter(|item| contains_lowered(*item, &lowered))
        .cloned()
        .collect()
}

/// Aggregate figures for the crew header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrewStats {
    pub total_agents: usize,
    pub active_agents: usize,
    pub completed_tasks: u64,
    /// Rounded mean success rate; zero for an empty crew
    pub average_success_rate: u8,
}

pub fn crew_stats(agents: &[Agent]) -> CrewStats {
    let total_agents = agents.len();
    if total_agents == 0 {
        return CrewStats::default();
    }

    let rate_sum: u64 = agents.iter().map(|a| u64::from(a.success_rate)).sum();
    let average = (rate_sum as f64 / total_agents as f64).round();

    CrewStats {
        total_agents,
        active_agents: agents.iter().filter(|a| a.is_active()).count(),
        completed_tasks: agents.iter().map(|a| u64::from(a.tasks_completed)).sum(),
        average_success_rate: average.clamp(0.0, 100.0) as u8,
    }
}

/// One line of the real-time activity panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub agent_id: String,
    pub agent_name: String,
    pub task: String,
}

/// Active agents with their current task; agents without a task are left out
pub fn activity_feed(agents: &[Agent]) -> Vec<Activity> {
    agents
        .iter()
        .filter(|a| a.is_active())
        .filter_map(|a| {
            a.current_task.as_ref().map(|task| Activity {
                agent_id: a.id.clone(),
                agent_name: a.name.clone(),
                task: task.clone(),
            })
        })
        .collect()
}

/// One row of the performance panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformanceRow {
    pub agent_id: String,
    pub initials: String,
    pub agent_name: String,
    pub success_rate: u8,
}

pub fn performance(agents: &[Agent]) -> Vec<PerformanceRow> {
    agents
        .iter()
        .map(|a| PerformanceRow {
            agent_id: a.id.clone(),
            initials: initials(&a.name),
            agent_name: a.name.clone(),
            success_rate: a.success_rate,
        })
        .collect()
}

/// Log narrowing used by the logs panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub level: Option<LogLevel>,
    pub agent_id: Option<String>,
    pub search: String,
}

impl LogFilter {
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.level.is_none_or(|level| entry.level == level)
            && self
                .agent_id
                .as_deref()
                .is_none_or(|id| entry.agent_id == id)
            && (self.search.is_empty() || matches(entry, &self.search))
    }
}

/// Logs passing `filter`, newest first
pub fn filter_logs(logs: &[LogEntry], filter: &LogFilter) -> Vec<LogEntry> {
    let mut selected: Vec<LogEntry> = logs
        .iter()
        .filter(|entry| filter.matches(entry))
        .cloned()
        .collect();
    selected.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    selected
}

/// First letter of each word, as shown in avatar fallbacks
pub fn initials(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().next())
        .collect()
}

/// Coarse "N minutes ago" text for `then`
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    let seconds = elapsed.num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let (count, unit) = if elapsed.num_minutes() < 60 {
        (elapsed.num_minutes(), "minute")
    } else if elapsed.num_hours() < 24 {
        (elapsed.num_hours(), "hour")
    } else {
        (elapsed.num_days(), "day")
    };
    let plural = if count == 1 { "" } else { "s" };
    format!("{} {}{} ago", count, unit, plural)
}

/// Everything the agents screen renders, recomputed from one snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct AgentsView {
    pub status: QueryStatus,
    /// Agents matching the search term, in store order
    pub agents: Vec<Agent>,
    /// Computed over the whole crew, not the filtered list
    pub stats: CrewStats,
    pub activity: Vec<Activity>,
    pub performance: Vec<PerformanceRow>,
}

impl AgentsView {
    pub fn from_state(state: &QueryState, search: &str) -> Self {
        let all = state.agents();
        Self {
            status: state.status,
            agents: filter(all, search),
            stats: crew_stats(all),
            activity: activity_feed(all),
            performance: performance(all),
        }
    }
}
