use serde::{Deserialize, Serialize};
use std::fmt;

/// Which assistant produced a session log.
///
/// Claude lays projects out as path-encoded directories; Gemini names them
/// by a sha256 of the project path and needs the hash index to show a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Claude,
    Gemini,
}

impl AgentKind {
    pub const ALL: [AgentKind; 2] = [AgentKind::Claude, AgentKind::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Claude => "claude",
            AgentKind::Gemini => "gemini",
        }
    }

    /// Log root relative to a home directory, with `/` separators.
    pub fn home_relative_root(&self) -> &'static str {
        match self {
            AgentKind::Claude => ".claude/projects",
            AgentKind::Gemini => ".gemini/tmp",
        }
    }

    pub fn is_hash_indexed(&self) -> bool {
        matches!(self, AgentKind::Gemini)
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
