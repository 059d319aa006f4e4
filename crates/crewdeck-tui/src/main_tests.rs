//! TUI tests
//!
//! Tests for the monitor's state and key handling.

use chrono::Utc;
use crossterm::event::KeyCode;
use crewdeck_core::model::fixtures;
use crewdeck_core::prelude::*;

use crate::app::{Action, App, Tab};

fn rows() -> (Vec<Agent>, Vec<AgentConfig>) {
    (fixtures::agents(Utc::now()), fixtures::agent_configs())
}

mod app_state_tests {
    use super::*;

    #[test]
    fn test_app_initial_state() {
        let app = App::new("");
        assert_eq!(app.tab, Tab::Agents);
        assert_eq!(app.selected, 0);
        assert!(!app.editing_search);
        assert!(app.toast.is_none());
    }

    #[test]
    fn test_tabs_wrap_both_ways() {
        let (agents, configs) = rows();
        let mut app = App::new("");

        app.on_key(KeyCode::BackTab, &agents, &configs);
        assert_eq!(app.tab, Tab::Configs);

        app.on_key(KeyCode::Tab, &agents, &configs);
        assert_eq!(app.tab, Tab::Agents);

        for _ in 0..Tab::ALL.len() {
            app.on_key(KeyCode::Tab, &agents, &configs);
        }
        assert_eq!(app.tab, Tab::Agents);
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let (agents, configs) = rows();
        let mut app = App::new("");

        app.on_key(KeyCode::Up, &agents, &configs);
        assert_eq!(app.selected, 0);

        for _ in 0..10 {
            app.on_key(KeyCode::Down, &agents, &configs);
        }
        assert_eq!(app.selected, agents.len() - 1);

        app.clamp_selection(1);
        assert_eq!(app.selected, 0);
        app.clamp_selection(0);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_switching_tab_resets_selection() {
        let (agents, configs) = rows();
        let mut app = App::new("");
        app.on_key(KeyCode::Down, &agents, &configs);
        app.on_key(KeyCode::Tab, &agents, &configs);
        assert_eq!(app.selected, 0);
    }
}

mod key_action_tests {
    use super::*;

    #[test]
    fn test_quit_and_refresh() {
        let (agents, configs) = rows();
        let mut app = App::new("");
        assert_eq!(app.on_key(KeyCode::Char('q'), &agents, &configs), Action::Quit);
        assert_eq!(app.on_key(KeyCode::Char('r'), &agents, &configs), Action::Refresh);
    }

    #[test]
    fn test_start_and_stop_selected_agent() {
        let (agents, configs) = rows();
        let mut app = App::new("");
        app.on_key(KeyCode::Down, &agents, &configs);

        assert_eq!(
            app.on_key(KeyCode::Char('s'), &agents, &configs),
            Action::Toggle {
                agent_id: "2".to_string(),
                event: StatusEvent::Start,
            }
        );
        assert_eq!(
            app.on_key(KeyCode::Char('x'), &agents, &configs),
            Action::Toggle {
                agent_id: "2".to_string(),
                event: StatusEvent::Stop,
            }
        );
    }

    #[test]
    fn test_toggle_only_on_agents_tab() {
        let (agents, configs) = rows();
        let mut app = App::new("");
        app.on_key(KeyCode::Tab, &agents, &configs);
        assert_eq!(app.on_key(KeyCode::Char('s'), &agents, &configs), Action::None);
    }

    #[test]
    fn test_delete_only_on_configs_tab() {
        let (agents, configs) = rows();
        let mut app = App::new("");
        assert_eq!(app.on_key(KeyCode::Char('d'), &agents, &configs), Action::None);

        app.on_key(KeyCode::BackTab, &agents, &configs);
        app.on_key(KeyCode::Down, &agents, &configs);
        assert_eq!(
            app.on_key(KeyCode::Char('d'), &agents, &configs),
            Action::DeleteConfig("2".to_string())
        );
    }

    #[test]
    fn test_no_rows_means_no_action() {
        let mut app = App::new("");
        assert_eq!(app.on_key(KeyCode::Char('s'), &[], &[]), Action::None);
    }
}

mod search_tests {
    use super::*;

    #[test]
    fn test_search_mode_captures_keys() {
        let (agents, configs) = rows();
        let mut app = App::new("");

        app.on_key(KeyCode::Char('/'), &agents, &configs);
        assert!(app.editing_search);

        // 'q' is text while editing, not quit
        assert_eq!(app.on_key(KeyCode::Char('q'), &agents, &configs), Action::None);
        app.on_key(KeyCode::Char('a'), &agents, &configs);
        assert_eq!(app.search, "qa");

        app.on_key(KeyCode::Backspace, &agents, &configs);
        assert_eq!(app.search, "q");

        app.on_key(KeyCode::Esc, &agents, &configs);
        assert!(!app.editing_search);
        assert_eq!(app.on_key(KeyCode::Char('q'), &agents, &configs), Action::Quit);
    }

    #[test]
    fn test_initial_search_from_arguments() {
        let app = App::new("beta");
        assert_eq!(app.search, "beta");
    }
}

mod outcome_tests {
    use super::*;

    #[tokio::test]
    async fn test_outcome_sets_toast() {
        let mut config = Config::default();
        config.store = crewdeck_core::config::StoreConfig::instant();
        let dashboard = Dashboard::new(config);
        let mut outcomes = dashboard.mutations().subscribe_outcomes();

        dashboard.mutations().delete_agent_config("1").await.unwrap();

        let mut app = App::new("");
        app.on_outcome(&outcomes.recv().await.unwrap());
        assert_eq!(app.toast.as_deref(), Some("Agent deleted successfully"));
    }
}
