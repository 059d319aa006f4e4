//! Seed data for the in-memory store

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::{Agent, AgentConfig, AgentStatus, LogEntry, LogLevel, Tool};

/// Seed agents; `last_active` is expressed relative to `now`
pub fn agents(now: DateTime<Utc>) -> Vec<Agent> {
    vec![
        Agent {
            id: "1".to_string(),
            name: "Research Agent Alpha".to_string(),
            role: "Researcher".to_string(),
            status: AgentStatus::Active,
            description: "Specialized in market research and data analysis".to_string(),
            avatar: None,
            last_active: now - Duration::minutes(2),
            tasks_completed: 47,
            success_rate: 94,
            current_task: Some("Analyzing competitor pricing strategies".to_string()),
            crew: Some("Market Analysis Crew".to_string()),
        },
        Agent {
            id: "2".to_string(),
            name: "Content Writer Beta".to_string(),
            role: "Writer".to_string(),
            status: AgentStatus::Idle,
            description: "Creates engaging content and documentation".to_string(),
            avatar: None,
            last_active: now - Duration::minutes(15),
            tasks_completed: 32,
            success_rate: 89,
            current_task: None,
            crew: Some("Content Creation Crew".to_string()),
        },
        Agent {
            id: "3".to_string(),
            name: "Data Analyst Gamma".to_string(),
            role: "Analyst".to_string(),
            status: AgentStatus::Active,
            description: "Processes and interprets complex datasets".to_string(),
            avatar: None,
            last_active: now - Duration::minutes(1),
            tasks_completed: 28,
            success_rate: 97,
            current_task: Some("Processing quarterly sales data".to_string()),
            crew: Some("Analytics Crew".to_string()),
        },
        Agent {
            id: "4".to_string(),
            name: "QA Specialist Delta".to_string(),
            role: "Quality Assurance".to_string(),
            status: AgentStatus::Error,
            description: "Ensures quality and accuracy of outputs".to_string(),
            avatar: None,
            last_active: now - Duration::minutes(5),
            tasks_completed: 15,
            success_rate: 85,
            current_task: None,
            crew: Some("Quality Control Crew".to_string()),
        },
    ]
}

pub fn agent_configs() -> Vec<AgentConfig> {
    vec![
        AgentConfig {
            id: Some("1".to_string()),
            name: "Research Agent Alpha".to_string(),
            role: "Researcher".to_string(),
            description: "Specialized in market research and data analysis".to_string(),
            goal: "Conduct thorough market research and provide actionable insights".to_string(),
            backstory: "An experienced market researcher with 10+ years in the industry"
                .to_string(),
            tools: [Tool::WebSearch, Tool::DataAnalysis, Tool::ReportGenerator]
                .into_iter()
                .collect(),
            max_iter: 5,
            verbose: true,
            allow_delegation: false,
        },
        AgentConfig {
            id: Some("2".to_string()),
            name: "Content Writer Beta".to_string(),
            role: "Writer".to_string(),
            description: "Creates engaging content and documentation".to_string(),
            goal: "Create high-quality, engaging content that resonates with the target audience"
                .to_string(),
            backstory: "A creative writer with expertise in technical and marketing content"
                .to_string(),
            tools: [Tool::TextGenerator, Tool::GrammarChecker, Tool::SeoOptimizer]
                .into_iter()
                .collect(),
            max_iter: 3,
            verbose: false,
            allow_delegation: true,
        },
    ]
}

pub fn logs() -> Vec<LogEntry> {
    let at = |h, m, s| {
        Utc.with_ymd_and_hms(2024, 1, 15, h, m, s)
            .single()
            .unwrap_or_default()
    };
    vec![
        LogEntry {
            id: "1".to_string(),
            agent_id: "1".to_string(),
            agent_name: "Research Agent Alpha".to_string(),
            timestamp: at(14, 30, 25),
            level: LogLevel::Success,
            message: "Task completed successfully".to_string(),
            details: Some(
                "Market research analysis completed with 94% confidence score".to_string(),
            ),
        },
        LogEntry {
            id: "2".to_string(),
            agent_id: "3".to_string(),
            agent_name: "Data Analyst Gamma".to_string(),
            timestamp: at(14, 28, 15),
            level: LogLevel::Info,
            message: "Processing data batch".to_string(),
            details: Some("Processing 1,247 records from quarterly sales dataset".to_string()),
        },
        LogEntry {
            id: "3".to_string(),
            agent_id: "4".to_string(),
            agent_name: "QA Specialist Delta".to_string(),
            timestamp: at(14, 25, 10),
            level: LogLevel::Error,
            message: "Quality check failed".to_string(),
            details: Some(
                "Output quality below threshold (75%). Requires manual review.".to_string(),
            ),
        },
        LogEntry {
            id: "4".to_string(),
            agent_id: "2".to_string(),
            agent_name: "Content Writer Beta".to_string(),
            timestamp: at(14, 20, 5),
            level: LogLevel::Warning,
            message: "Low confidence score".to_string(),
            details: Some(
                "Content generation completed with 68% confidence. Consider review.".to_string(),
            ),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_satisfy_invariants() {
        let now = Utc::now();
        for agent in agents(now) {
            agent.validate().unwrap();
            assert!(agent.last_active <= now);
        }
        for config in agent_configs() {
            config.validate().unwrap();
            assert!(config.id.is_some());
        }
        assert_eq!(logs().len(), 4);
    }
}
