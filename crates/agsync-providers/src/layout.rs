//! On-disk naming rules of each agent's log tree.

use agsync_types::{AgentKind, is_64_char_hex, is_cache_namespace};
use std::path::{Path, PathBuf};

/// Whether a directory directly under the agent root is a workspace.
pub fn is_workspace_dir(agent: AgentKind, name: &str) -> bool {
    if name.starts_with('.') || is_cache_namespace(name) {
        return false;
    }
    match agent {
        AgentKind::Claude => true,
        AgentKind::Gemini => is_64_char_hex(name),
    }
}

/// Directory holding a workspace's session files.
pub fn sessions_dir(agent: AgentKind, workspace_dir: &Path) -> PathBuf {
    match agent {
        AgentKind::Claude => workspace_dir.to_path_buf(),
        AgentKind::Gemini => workspace_dir.join("chats"),
    }
}

/// Sub-path between the workspace directory and its session files.
pub fn sessions_subdir(agent: AgentKind) -> Option<&'static str> {
    match agent {
        AgentKind::Claude => None,
        AgentKind::Gemini => Some("chats"),
    }
}

pub fn is_session_file(agent: AgentKind, file_name: &str) -> bool {
    match agent {
        AgentKind::Claude => file_name.ends_with(".jsonl") && file_name.len() > ".jsonl".len(),
        AgentKind::Gemini => file_name.starts_with("session-") && file_name.ends_with(".json"),
    }
}

/// Session id implied by the file name, used when the file cannot be read.
pub fn session_id_from_file_name(agent: AgentKind, file_name: &str) -> String {
    match agent {
        AgentKind::Claude => file_name.trim_end_matches(".jsonl").to_string(),
        AgentKind::Gemini => file_name
            .trim_start_matches("session-")
            .trim_end_matches(".json")
            .to_string(),
    }
}
