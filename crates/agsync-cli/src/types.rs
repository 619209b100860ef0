use agsync_types::AgentKind;
use clap::ValueEnum;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Plain => write!(f, "plain"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum StatsGroup {
    Workspace,
    Source,
    Agent,
}

impl fmt::Display for StatsGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsGroup::Workspace => write!(f, "workspace"),
            StatsGroup::Source => write!(f, "source"),
            StatsGroup::Agent => write!(f, "agent"),
        }
    }
}

impl From<StatsGroup> for agsync_index::GroupBy {
    fn from(group: StatsGroup) -> Self {
        match group {
            StatsGroup::Workspace => Self::Workspace,
            StatsGroup::Source => Self::Source,
            StatsGroup::Agent => Self::Agent,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum AgentSelector {
    Claude,
    Gemini,
    #[default]
    All,
}

impl fmt::Display for AgentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentSelector::Claude => write!(f, "claude"),
            AgentSelector::Gemini => write!(f, "gemini"),
            AgentSelector::All => write!(f, "all"),
        }
    }
}

impl AgentSelector {
    pub fn agents(self) -> Vec<AgentKind> {
        match self {
            AgentSelector::Claude => vec![AgentKind::Claude],
            AgentSelector::Gemini => vec![AgentKind::Gemini],
            AgentSelector::All => AgentKind::ALL.to_vec(),
        }
    }
}
