//! End-to-end dashboard flows over the public API

use crewdeck_core::prelude::*;
use crewdeck_core::config::StoreConfig;
use crewdeck_core::view::{self, AgentsView};

fn instant_dashboard() -> Dashboard {
    let mut config = Config::default();
    config.store = StoreConfig::instant();
    Dashboard::new(config)
}

#[tokio::test]
async fn test_config_lifecycle() {
    let dashboard = instant_dashboard();
    let mut configs = dashboard.watch_configs("");
    assert_eq!(configs.settled().await.unwrap().agent_configs().len(), 2);

    let created = dashboard
        .mutations()
        .create_agent_config(
            AgentConfig::new("X", "Y").with_tools([Tool::WebSearch, Tool::FileManager]),
        )
        .await
        .unwrap();
    let id = created.id.clone().unwrap();

    let state = configs.settled().await.unwrap();
    assert_eq!(state.agent_configs().len(), 3);
    assert!(state.agent_configs().iter().any(|c| c.id.as_deref() == Some(id.as_str())));

    dashboard.mutations().delete_agent_config(&id).await.unwrap();
    let state = configs.settled().await.unwrap();
    assert_eq!(state.agent_configs().len(), 2);

    let stored = dashboard.store().agent_configs();

    let again = dashboard.mutations().delete_agent_config(&id).await;
    assert!(matches!(again, Err(Error::NotFound { .. })));
    assert_eq!(again.unwrap_err().code(), "E001");

    // A failed delete touches neither the cache nor the collection
    let current = configs.current();
    assert!(!current.is_stale);
    assert!(!current.is_loading());
    assert_eq!(current.data, state.data);
    assert_eq!(dashboard.store().agent_configs(), stored);
}

#[tokio::test]
async fn test_toggle_flow_updates_stats_and_logs() {
    let dashboard = instant_dashboard();
    let mut agents = dashboard.watch_agents("");
    let mut logs = dashboard.watch_logs();

    let before = AgentsView::from_state(&agents.settled().await.unwrap(), "");
    assert_eq!(before.stats.active_agents, 2);
    logs.settled().await.unwrap();

    let change = dashboard
        .mutations()
        .toggle_agent_status("2", StatusEvent::toggle_for(AgentStatus::Idle))
        .await
        .unwrap();
    assert_eq!(change.transition.to, AgentStatus::Active);

    let after = AgentsView::from_state(&agents.settled().await.unwrap(), "");
    assert_eq!(after.stats.active_agents, 3);

    let logs = logs.settled().await.unwrap();
    let newest = view::filter_logs(logs.logs(), &view::LogFilter::default());
    assert_eq!(newest[0].agent_id, "2");
    assert_eq!(newest[0].level, LogLevel::Success);
}

#[tokio::test]
async fn test_undefined_event_only_touches_last_active() {
    let dashboard = instant_dashboard();
    let before = dashboard.store().agents()[3].clone();
    assert_eq!(before.status, AgentStatus::Error);

    let change = dashboard
        .mutations()
        .toggle_agent_status(&before.id, StatusEvent::Stop)
        .await
        .unwrap();
    assert!(!change.transition.changed());
    assert_eq!(change.agent.status, AgentStatus::Error);
    assert!(change.agent.last_active >= before.last_active);
}

#[tokio::test]
async fn test_search_narrows_agents_but_not_stats() {
    let dashboard = instant_dashboard();
    let mut searched = dashboard.watch_agents("ANALYST");
    let state = searched.settled().await.unwrap();
    assert_eq!(state.agents().len(), 1);
    assert_eq!(state.agents()[0].name, "Data Analyst Gamma");

    let full = dashboard.cache().fetch(&QueryKey::agents()).await.unwrap();
    let stats = view::crew_stats(full.as_agents().unwrap());
    assert_eq!(stats.total_agents, 4);
}

#[tokio::test]
async fn test_prefetch_and_reset() {
    let dashboard = instant_dashboard();
    let loaded = dashboard.prefetch().await.unwrap();
    assert_eq!(loaded.len(), 3);

    dashboard.mutations().delete_agent_config("1").await.unwrap();
    assert_eq!(dashboard.reset(), 3);

    let configs = dashboard.cache().fetch(&QueryKey::agent_configs()).await.unwrap();
    assert_eq!(configs.len(), 2);
}
