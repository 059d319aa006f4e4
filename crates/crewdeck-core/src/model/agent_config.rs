//! Agent configurations and the tool catalog

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Lowest accepted iteration limit
pub const MIN_ITER: u8 = 1;

/// Highest accepted iteration limit
pub const MAX_ITER: u8 = 10;

/// Fixed catalog of tools an agent config may enable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    WebSearch,
    DataAnalysis,
    ReportGenerator,
    TextGenerator,
    GrammarChecker,
    SeoOptimizer,
    EmailSender,
    FileManager,
    ApiCaller,
}

impl Tool {
    /// Catalog in display order
    pub const ALL: [Tool; 9] = [
        Self::WebSearch,
        Self::DataAnalysis,
        Self::ReportGenerator,
        Self::TextGenerator,
        Self::GrammarChecker,
        Self::SeoOptimizer,
        Self::EmailSender,
        Self::FileManager,
        Self::ApiCaller,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebSearch => "web_search",
            Self::DataAnalysis => "data_analysis",
            Self::ReportGenerator => "report_generator",
            Self::TextGenerator => "text_generator",
            Self::GrammarChecker => "grammar_checker",
            Self::SeoOptimizer => "seo_optimizer",
            Self::EmailSender => "email_sender",
            Self::FileManager => "file_manager",
            Self::ApiCaller => "api_caller",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| Error::ValidationFailed(format!("'{}' is not in the tool catalog", s)))
    }
}

/// Reusable definition of how an agent behaves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Assigned by the store on creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub role: String,
    pub description: String,
    pub goal: String,
    pub backstory: String,
    pub tools: BTreeSet<Tool>,
    pub max_iter: u8,
    pub verbose: bool,
    pub allow_delegation: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            role: String::new(),
            description: String::new(),
            goal: String::new(),
            backstory: String::new(),
            tools: BTreeSet::new(),
            max_iter: 5,
            verbose: true,
            allow_delegation: false,
        }
    }
}

impl AgentConfig {
    /// Start a config with the two fields every form requires
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            ..Self::default()
        }
    }

    pub fn with_tools(mut self, tools: impl IntoIterator<Item = Tool>) -> Self {
        self.tools = tools.into_iter().collect();
        self
    }

    pub fn with_max_iter(mut self, max_iter: u8) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Add the tool if absent, remove it if present
    pub fn toggle_tool(&mut self, tool: Tool) {
        if !self.tools.remove(&tool) {
            self.tools.insert(tool);
        }
    }

    /// Reject payloads that slipped past form validation
    ///
    /// Only `name` and `role` are required; the longer text fields may be
    /// left empty by programmatic callers.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [("name", &self.name), ("role", &self.role)] {
            if value.trim().is_empty() {
                return Err(Error::ValidationFailed(format!("{} must not be empty", field)));
            }
        }
        if !(MIN_ITER..=MAX_ITER).contains(&self.max_iter) {
            return Err(Error::ValidationFailed(format!(
                "maxIter {} must be between {} and {}",
                self.max_iter, MIN_ITER, MAX_ITER
            )));
        }
        Ok(())
    }
}
