//! Rendering

use chrono::Utc;
use crewdeck_core::prelude::*;
use crewdeck_core::status::StatusColor;
use crewdeck_core::view::{self, AgentsView, LogFilter};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table, TableState, Tabs},
};

use crate::app::{App, Tab};

/// Latest cache states the screen is drawn from
#[derive(Debug, Clone)]
pub struct Screen {
    pub agents: QueryState,
    pub configs: QueryState,
    pub logs: QueryState,
}

fn status_color(color: StatusColor) -> Color {
    match color {
        StatusColor::Green => Color::Green,
        StatusColor::Yellow => Color::Yellow,
        StatusColor::Red => Color::Red,
        StatusColor::Gray => Color::DarkGray,
    }
}

fn query_label(state: &QueryState) -> String {
    match (&state.error, state.status) {
        (Some(error), QueryStatus::Error) => format!("error: {}", error),
        _ if state.is_stale => format!("{} (stale)", state.status),
        _ => state.status.to_string(),
    }
}

pub fn render(frame: &mut Frame, app: &App, screen: &Screen) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Stats
            Constraint::Length(3), // Tabs
            Constraint::Min(8),    // Content
            Constraint::Length(3), // Toast / search
        ])
        .split(frame.area());

    let agents_view = AgentsView::from_state(&screen.agents, &app.search);
    render_stats(frame, chunks[0], &agents_view, &screen.agents);

    let tabs = Tabs::new(Tab::ALL.iter().map(|t| t.title()))
        .select(app.tab.index())
        .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL).title("Crewdeck"));
    frame.render_widget(tabs, chunks[1]);

    match app.tab {
        Tab::Agents => render_agents(frame, chunks[2], app, &agents_view),
        Tab::Monitoring => render_monitoring(frame, chunks[2], &agents_view),
        Tab::Logs => render_logs(frame, chunks[2], app, &screen.logs),
        Tab::Configs => render_configs(frame, chunks[2], app, &screen.configs),
    }

    let footer = if app.editing_search {
        Paragraph::new(format!("/{}", app.search)).style(Style::default().fg(Color::Cyan))
    } else if let Some(toast) = &app.toast {
        Paragraph::new(toast.as_str())
    } else {
        Paragraph::new("q: Quit | r: Refresh | /: Search | s: Start | x: Stop | d: Delete config | Tab: Switch")
            .style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(footer.block(Block::default().borders(Borders::ALL)), chunks[3]);
}

fn render_stats(frame: &mut Frame, area: Rect, view: &AgentsView, state: &QueryState) {
    let stats = &view.stats;
    let line = Line::from(vec![
        Span::raw(format!("Agents: {}  ", stats.total_agents)),
        Span::styled(
            format!("Active: {}  ", stats.active_agents),
            Style::default().fg(Color::Green),
        ),
        Span::raw(format!("Tasks: {}  ", stats.completed_tasks)),
        Span::raw(format!("Success: {}%  ", stats.average_success_rate)),
        Span::styled(query_label(state), Style::default().fg(Color::DarkGray)),
    ]);
    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Crew"));
    frame.render_widget(paragraph, area);
}

fn render_agents(frame: &mut Frame, area: Rect, app: &App, view: &AgentsView) {
    let now = Utc::now();
    let rows = view.agents.iter().map(|agent| {
        let style = agent.status.style();
        Row::new(vec![
            Cell::from(agent.name.clone()),
            Cell::from(agent.role.clone()),
            Cell::from(style.label).style(Style::default().fg(status_color(style.color))),
            Cell::from(agent.current_task.clone().unwrap_or_default()),
            Cell::from(view::relative_time(agent.last_active, now)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(15),
            Constraint::Length(8),
            Constraint::Percentage(35),
            Constraint::Percentage(15),
        ],
    )
    .header(
        Row::new(vec!["Name", "Role", "Status", "Task", "Last active"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray))
    .block(Block::default().borders(Borders::ALL).title("Agents"));

    let mut state = TableState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_monitoring(frame: &mut Frame, area: Rect, view: &AgentsView) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let activity: Vec<ListItem> = view
        .activity
        .iter()
        .map(|a| ListItem::new(format!("{}: {}", a.agent_name, a.task)))
        .collect();
    let activity = List::new(activity).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Real-time Activity"),
    );
    frame.render_widget(activity, columns[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Agent Performance");
    let inner = block.inner(columns[1]);
    frame.render_widget(block, columns[1]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(view.performance.iter().map(|_| Constraint::Length(1)))
        .split(inner);
    for (row, area) in view.performance.iter().zip(rows.iter()) {
        let gauge = Gauge::default()
            .label(format!("{} {}%", row.initials, row.success_rate))
            .percent(u16::from(row.success_rate))
            .gauge_style(Style::default().fg(Color::Cyan));
        frame.render_widget(gauge, *area);
    }
}

fn render_logs(frame: &mut Frame, area: Rect, app: &App, state: &QueryState) {
    let filter = LogFilter {
        search: app.search.clone(),
        ..LogFilter::default()
    };
    let items: Vec<ListItem> = view::filter_logs(state.logs(), &filter)
        .into_iter()
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Info => Color::Blue,
                LogLevel::Warning => Color::Yellow,
                LogLevel::Error => Color::Red,
                LogLevel::Success => Color::Green,
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<8}", entry.level.as_str()),
                    Style::default().fg(color),
                ),
                Span::raw(format!(
                    "{} {}: {}",
                    entry.timestamp.format("%H:%M:%S"),
                    entry.agent_name,
                    entry.message
                )),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Logs [{}]", query_label(state))),
    );
    frame.render_widget(list, area);
}

fn render_configs(frame: &mut Frame, area: Rect, app: &App, state: &QueryState) {
    let configs = view::filter(state.agent_configs(), &app.search);
    let rows = configs.iter().map(|config| {
        let tools: Vec<&str> = config.tools.iter().map(|t| t.as_str()).collect();
        Row::new(vec![
            Cell::from(config.name.clone()),
            Cell::from(config.role.clone()),
            Cell::from(config.max_iter.to_string()),
            Cell::from(tools.join(", ")),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Length(5),
            Constraint::Percentage(50),
        ],
    )
    .header(
        Row::new(vec!["Name", "Role", "Iter", "Tools"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("Agent Configurations [{}]", query_label(state))),
    );

    let mut table_state = TableState::default().with_selected(Some(app.selected));
    frame.render_stateful_widget(table, area, &mut table_state);
}
