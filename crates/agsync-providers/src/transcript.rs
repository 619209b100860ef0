use agsync_types::AgentKind;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptMessage {
    pub role: Role,
    pub timestamp: Option<DateTime<Utc>>,
    pub text: String,
    /// Tool names, in call order
    pub tool_calls: Vec<String>,
}

/// Fully parsed session, agent-independent. Only built for selected sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub session_id: Option<String>,
    pub cwd: Option<String>,
    pub messages: Vec<TranscriptMessage>,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Transcript {
    pub fn count(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }

    pub fn tool_call_count(&self) -> usize {
        self.messages.iter().map(|m| m.tool_calls.len()).sum()
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.messages.iter().filter_map(|m| m.timestamp).min()
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.messages.iter().filter_map(|m| m.timestamp).max()
    }
}

pub fn parse_transcript(agent: AgentKind, path: &Path) -> Result<Transcript> {
    match agent {
        AgentKind::Claude => crate::claude::parse_claude_transcript(path),
        AgentKind::Gemini => crate::gemini::parse_gemini_transcript(path),
    }
}

pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
