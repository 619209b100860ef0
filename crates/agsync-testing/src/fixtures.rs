//! Session file fixtures.
//!
//! Files are written in the on-disk layout each agent uses, under an arbitrary
//! home directory, so the same helpers populate the local home, a mounted
//! distro home or a fake remote home.

use agsync_types::{encode_project_path, project_hash_from_root};
use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use filetime::FileTime;
use serde_json::json;
use std::path::{Path, PathBuf};

/// One message of a fixture conversation.
#[derive(Debug, Clone)]
pub struct Turn {
    pub role: &'static str,
    pub text: String,
    pub tool: Option<String>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            text: text.into(),
            tool: None,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: "assistant",
            text: text.into(),
            tool: None,
        }
    }

    pub fn with_tool(mut self, name: impl Into<String>) -> Self {
        self.tool = Some(name.into());
        self
    }
}

/// Noon UTC on the given day.
pub fn day(year: i32, month: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, d, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

pub fn default_turns() -> Vec<Turn> {
    vec![
        Turn::user("Please fix the failing test"),
        Turn::assistant("Running the suite now.").with_tool("Bash"),
    ]
}

/// A Claude Code `.jsonl` transcript.
pub fn claude_jsonl(session_id: &str, cwd: &str, turns: &[Turn], ts: DateTime<Utc>) -> String {
    let mut lines = Vec::new();
    for (i, turn) in turns.iter().enumerate() {
        let timestamp = (ts + chrono::Duration::seconds(i as i64)).to_rfc3339();
        let mut blocks = vec![json!({"type": "text", "text": turn.text})];
        if let Some(tool) = &turn.tool {
            blocks.push(json!({"type": "tool_use", "id": format!("tool-{}", i), "name": tool, "input": {}}));
        }
        let mut message = json!({"role": turn.role, "content": blocks});
        if turn.role == "assistant" {
            message["usage"] = json!({"input_tokens": 10, "output_tokens": 20});
        }
        lines.push(
            json!({
                "type": turn.role,
                "sessionId": session_id,
                "cwd": cwd,
                "timestamp": timestamp,
                "message": message,
            })
            .to_string(),
        );
    }
    lines.join("\n") + "\n"
}

/// A Gemini CLI chat document.
pub fn gemini_json(session_id: &str, project_path: &str, turns: &[Turn], ts: DateTime<Utc>) -> String {
    let messages: Vec<_> = turns
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            let kind = if turn.role == "user" { "user" } else { "gemini" };
            let mut message = json!({
                "id": format!("m{}", i),
                "type": kind,
                "timestamp": (ts + chrono::Duration::seconds(i as i64)).to_rfc3339(),
                "content": turn.text,
            });
            if let Some(tool) = &turn.tool {
                message["toolCalls"] = json!([{"name": tool}]);
            }
            if kind == "gemini" {
                message["tokens"] = json!({"input": 10, "output": 20, "cached": 0});
            }
            message
        })
        .collect();

    json!({
        "sessionId": session_id,
        "projectHash": project_hash_from_root(project_path),
        "messages": messages,
    })
    .to_string()
}

pub fn set_mtime(path: &Path, mtime: DateTime<Utc>) -> Result<()> {
    let ft = FileTime::from_unix_time(mtime.timestamp(), mtime.timestamp_subsec_nanos());
    filetime::set_file_mtime(path, ft)?;
    Ok(())
}

fn write_file(path: &Path, content: &str, mtime: DateTime<Utc>) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    set_mtime(path, mtime)
}

/// `<home>/.claude/projects/<encoded project>/<session>.jsonl`
pub fn write_claude_session(
    home: &Path,
    project_path: &str,
    session_id: &str,
    turns: &[Turn],
    mtime: DateTime<Utc>,
) -> Result<PathBuf> {
    let path = home
        .join(".claude/projects")
        .join(encode_project_path(project_path))
        .join(format!("{}.jsonl", session_id));
    write_file(&path, &claude_jsonl(session_id, project_path, turns, mtime), mtime)?;
    Ok(path)
}

/// `<home>/.gemini/tmp/<sha256 of project>/chats/session-<id>.json`
pub fn write_gemini_session(
    home: &Path,
    project_path: &str,
    session_id: &str,
    turns: &[Turn],
    mtime: DateTime<Utc>,
) -> Result<PathBuf> {
    let path = home
        .join(".gemini/tmp")
        .join(project_hash_from_root(project_path))
        .join("chats")
        .join(format!("session-{}.json", session_id));
    write_file(&path, &gemini_json(session_id, project_path, turns, mtime), mtime)?;
    Ok(path)
}
