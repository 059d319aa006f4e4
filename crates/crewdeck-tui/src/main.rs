//! Crewdeck TUI - live monitor for an agent crew
//!
//! Shows the crew's agents with their status, the real-time activity feed,
//! the log stream and the saved agent configurations. Agents can be started
//! and stopped and configurations deleted from the keyboard.

mod app;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use crewdeck_core::prelude::*;
use crewdeck_core::view;
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info};

use app::{Action, App, Tab};
use ui::Screen;

#[derive(Parser)]
#[command(name = "crewdeck-tui")]
#[command(author, version, about = "Live monitor for an agent crew", long_about = None)]
struct Cli {
    /// Initial search term for agents, logs and configurations
    #[arg(short, long, default_value = "")]
    search: String,

    /// Agents refetch interval in milliseconds (0 disables polling)
    #[arg(long)]
    refresh_ms: Option<u64>,
}

/// Log to a file next to the config; the terminal belongs to the UI
fn init_tracing() -> anyhow::Result<()> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("crewdeck-tui.log"))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("crewdeck_core=info".parse()?)
                .add_directive("crewdeck_tui=info".parse()?),
        )
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    let mut config = Config::load()?;
    if let Some(refresh_ms) = cli.refresh_ms {
        config.cache.agents_refetch_interval_ms = refresh_ms;
        config.validate()?;
    }
    let dashboard = Dashboard::new(config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &dashboard, App::new(cli.search)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("Monitor closed");
    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    dashboard: &Dashboard,
    mut app: App,
) -> anyhow::Result<()> {
    // Subscriptions live for the whole session; dropping them stops polling
    let agents = dashboard.watch_agents("");
    let configs = dashboard.watch_configs("");
    let logs = dashboard.watch_logs();
    let mut outcomes = dashboard.mutations().subscribe_outcomes();

    loop {
        while let Ok(outcome) = outcomes.try_recv() {
            app.on_outcome(&outcome);
        }

        let screen = Screen {
            agents: agents.current(),
            configs: configs.current(),
            logs: logs.current(),
        };
        let visible_agents = view::filter(screen.agents.agents(), &app.search);
        let visible_configs = view::filter(screen.configs.agent_configs(), &app.search);
        app.clamp_selection(match app.tab {
            Tab::Configs => visible_configs.len(),
            _ => visible_agents.len(),
        });

        terminal.draw(|frame| ui::render(frame, &app, &screen))?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match app.on_key(key.code, &visible_agents, &visible_configs) {
            Action::None => {}
            Action::Quit => return Ok(()),
            Action::Refresh => {
                let invalidated = dashboard.cache().invalidate_all();
                debug!(invalidated, "Manual refresh");
            }
            Action::Toggle { agent_id, event } => {
                let mutations = dashboard.mutations().clone();
                // Failures reach the toast through the outcome stream
                tokio::spawn(async move {
                    let _ = mutations.toggle_agent_status(&agent_id, event).await;
                });
            }
            Action::DeleteConfig(id) => {
                let mutations = dashboard.mutations().clone();
                tokio::spawn(async move {
                    let _ = mutations.delete_agent_config(&id).await;
                });
            }
        }
    }
}

#[cfg(test)]
mod main_tests;
