use std::io::{BufRead, BufReader};
use std::path::Path;

use super::schema::{ClaudeEntry, ClaudeRecord, ContentBlock, MessageContent};
use crate::layout::is_session_file;
use crate::probe::{SessionProbe, file_stamp};
use crate::transcript::{Role, Transcript, TranscriptMessage, parse_timestamp};
use crate::{Error, Result};
use agsync_types::AgentKind;

/// Count conversational records and pick up the session id without building messages.
pub fn probe_claude_file(path: &Path) -> Result<SessionProbe> {
    let (mtime, size_bytes) = file_stamp(path)?;
    let reader = BufReader::new(std::fs::File::open(path)?);

    let mut session_id = None;
    let mut cwd = None;
    let mut message_count = 0;

    for line in reader.lines() {
        let line = line?;
        let Ok(record) = serde_json::from_str::<ClaudeRecord>(&line) else {
            continue;
        };
        let entry = match &record {
            ClaudeRecord::User(entry) | ClaudeRecord::Assistant(entry) => entry,
            ClaudeRecord::Unknown => continue,
        };

        if session_id.is_none() {
            session_id = entry.session_id.clone();
        }
        if cwd.is_none() {
            cwd = entry.cwd.clone();
        }
        if !entry.is_meta {
            message_count += 1;
        }
    }

    let session_id = session_id.unwrap_or_else(|| file_stem(path));

    Ok(SessionProbe {
        session_id,
        mtime,
        size_bytes,
        message_count,
        cwd,
    })
}

/// Recover the project path of a Claude workspace directory from its session headers.
///
/// Directory names are a lossy encoding, so the `cwd` recorded in the logs is
/// preferred. Files are tried in name order, reading only the first lines.
pub fn read_claude_cwd(workspace_dir: &Path) -> Option<String> {
    let mut files: Vec<_> = std::fs::read_dir(workspace_dir)
        .ok()?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| is_session_file(AgentKind::Claude, n))
        })
        .collect();
    files.sort();

    for path in files {
        let Ok(file) = std::fs::File::open(&path) else {
            continue;
        };
        for line in BufReader::new(file).lines().take(10).map_while(|l| l.ok()) {
            if let Ok(ClaudeRecord::User(entry) | ClaudeRecord::Assistant(entry)) =
                serde_json::from_str::<ClaudeRecord>(&line)
                && let Some(cwd) = entry.cwd
            {
                return Some(cwd);
            }
        }
    }
    None
}

/// Parse a Claude Code JSONL file into a transcript.
///
/// Lines that fail to parse are skipped; a file where no line parses is an error.
pub fn parse_claude_transcript(path: &Path) -> Result<Transcript> {
    let text = std::fs::read_to_string(path)?;
    let mut transcript = Transcript::default();
    let mut first_error = None;
    let mut parsed_any = false;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let record = match serde_json::from_str::<ClaudeRecord>(line) {
            Ok(record) => record,
            Err(err) => {
                first_error.get_or_insert(err);
                continue;
            }
        };
        parsed_any = true;

        match record {
            ClaudeRecord::User(entry) => push_entry(&mut transcript, Role::User, entry),
            ClaudeRecord::Assistant(entry) => push_entry(&mut transcript, Role::Assistant, entry),
            ClaudeRecord::Unknown => {}
        }
    }

    if !parsed_any && let Some(source) = first_error {
        return Err(Error::Json {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(transcript)
}

fn push_entry(transcript: &mut Transcript, role: Role, entry: ClaudeEntry) {
    if transcript.session_id.is_none() {
        transcript.session_id = entry.session_id.clone();
    }
    if transcript.cwd.is_none() {
        transcript.cwd = entry.cwd.clone();
    }
    if entry.is_meta {
        return;
    }

    let Some(message) = entry.message else {
        return;
    };

    if let Some(usage) = &message.usage {
        transcript.input_tokens += usage.input_tokens
            + usage.cache_creation_input_tokens
            + usage.cache_read_input_tokens;
        transcript.output_tokens += usage.output_tokens;
    }

    let mut texts = Vec::new();
    let mut tool_calls = Vec::new();
    let mut only_tool_results = true;

    match message.content {
        MessageContent::Text(text) => {
            only_tool_results = false;
            texts.push(text);
        }
        MessageContent::Blocks(blocks) => {
            for block in blocks {
                match block {
                    ContentBlock::Text { text } => {
                        only_tool_results = false;
                        texts.push(text);
                    }
                    ContentBlock::ToolUse { name } => {
                        only_tool_results = false;
                        tool_calls.push(name);
                    }
                    ContentBlock::ToolResult => {}
                    ContentBlock::Other => only_tool_results = false,
                }
            }
        }
    }

    // Tool output is fed back as a user record; it is not something the user said.
    if role == Role::User && only_tool_results {
        return;
    }

    transcript.messages.push(TranscriptMessage {
        role,
        timestamp: entry.timestamp.as_deref().and_then(parse_timestamp),
        text: texts.join("\n\n"),
        tool_calls,
    });
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default()
}
