//! Monitor state and key handling
//!
//! Everything here is independent of the terminal so it can be driven from
//! tests. The main loop turns the returned [`Action`]s into cache and
//! mutation calls.

use crossterm::event::KeyCode;
use crewdeck_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Agents,
    Monitoring,
    Logs,
    Configs,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Self::Agents, Self::Monitoring, Self::Logs, Self::Configs];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Agents => "Agents",
            Self::Monitoring => "Monitoring",
            Self::Logs => "Logs",
            Self::Configs => "Configs",
        }
    }

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What the main loop should do after a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Refresh,
    Toggle { agent_id: String, event: StatusEvent },
    DeleteConfig(String),
}

#[derive(Debug, Clone)]
pub struct App {
    pub tab: Tab,
    pub selected: usize,
    pub search: String,
    pub editing_search: bool,
    pub toast: Option<String>,
}

impl App {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            tab: Tab::Agents,
            selected: 0,
            search: search.into(),
            editing_search: false,
            toast: None,
        }
    }

    /// Handle one key press against the rows currently on screen
    pub fn on_key(&mut self, code: KeyCode, agents: &[Agent], configs: &[AgentConfig]) -> Action {
        if self.editing_search {
            return self.on_search_key(code);
        }

        match code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('/') => {
                self.editing_search = true;
                Action::None
            }
            KeyCode::Tab => {
                self.tab = self.tab.next();
                self.selected = 0;
                Action::None
            }
            KeyCode::BackTab => {
                self.tab = self.tab.prev();
                self.selected = 0;
                Action::None
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                Action::None
            }
            KeyCode::Down => {
                let rows = match self.tab {
                    Tab::Configs => configs.len(),
                    _ => agents.len(),
                };
                if self.selected + 1 < rows {
                    self.selected += 1;
                }
                Action::None
            }
            KeyCode::Char('s') => self.toggle(agents, StatusEvent::Start),
            KeyCode::Char('x') => self.toggle(agents, StatusEvent::Stop),
            KeyCode::Char('d') if self.tab == Tab::Configs => configs
                .get(self.selected)
                .and_then(|config| config.id.clone())
                .map_or(Action::None, Action::DeleteConfig),
            _ => Action::None,
        }
    }

    fn on_search_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Enter | KeyCode::Esc => {
                self.editing_search = false;
                Action::None
            }
            KeyCode::Backspace => {
                self.search.pop();
                self.selected = 0;
                Action::None
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                self.selected = 0;
                Action::None
            }
            _ => Action::None,
        }
    }

    fn toggle(&self, agents: &[Agent], event: StatusEvent) -> Action {
        if self.tab != Tab::Agents {
            return Action::None;
        }
        agents
            .get(self.selected)
            .map_or(Action::None, |agent| Action::Toggle {
                agent_id: agent.id.clone(),
                event,
            })
    }

    pub fn on_outcome(&mut self, outcome: &MutationOutcome) {
        self.toast = Some(outcome.summary());
    }

    /// Keep the selection inside the current row count
    pub fn clamp_selection(&mut self, rows: usize) {
        self.selected = self.selected.min(rows.saturating_sub(1));
    }
}
