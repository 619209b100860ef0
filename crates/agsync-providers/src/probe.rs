use agsync_types::AgentKind;
use chrono::{DateTime, Utc};
use std::path::Path;

use crate::Result;

/// What a listing can learn about a session file without a full parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProbe {
    pub session_id: String,
    pub mtime: DateTime<Utc>,
    pub size_bytes: u64,
    pub message_count: u64,
    /// Working directory recorded in the log, when the format has one
    pub cwd: Option<String>,
}

pub fn probe_session(agent: AgentKind, path: &Path) -> Result<SessionProbe> {
    match agent {
        AgentKind::Claude => crate::claude::probe_claude_file(path),
        AgentKind::Gemini => crate::gemini::probe_gemini_file(path),
    }
}

/// Modification time and size of a file.
pub(crate) fn file_stamp(path: &Path) -> Result<(DateTime<Utc>, u64)> {
    let metadata = std::fs::metadata(path)?;
    Ok((DateTime::<Utc>::from(metadata.modified()?), metadata.len()))
}
