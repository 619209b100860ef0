use serde_json::Value;
use std::path::Path;

use super::schema::{GeminiHeader, GeminiMessage, GeminiSession};
use crate::probe::{SessionProbe, file_stamp};
use crate::transcript::{Role, Transcript, TranscriptMessage, parse_timestamp};
use crate::{Error, Result};

fn role_of(kind: &str) -> Role {
    match kind {
        "user" => Role::User,
        "gemini" | "model" => Role::Assistant,
        _ => Role::System,
    }
}

pub fn probe_gemini_file(path: &Path) -> Result<SessionProbe> {
    let (mtime, size_bytes) = file_stamp(path)?;
    let text = std::fs::read_to_string(path)?;
    let header: GeminiHeader = serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let message_count = header
        .messages
        .iter()
        .filter(|m| role_of(&m.kind) != Role::System)
        .count() as u64;

    let session_id = header.session_id.unwrap_or_else(|| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        crate::layout::session_id_from_file_name(agsync_types::AgentKind::Gemini, &name)
    });

    Ok(SessionProbe {
        session_id,
        mtime,
        size_bytes,
        message_count,
        cwd: None,
    })
}

pub fn parse_gemini_transcript(path: &Path) -> Result<Transcript> {
    let text = std::fs::read_to_string(path)?;
    let session: GeminiSession = serde_json::from_str(&text).map_err(|source| Error::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let mut transcript = Transcript {
        session_id: session.session_id,
        ..Default::default()
    };
    for message in session.messages {
        push_message(&mut transcript, message);
    }

    Ok(transcript)
}

fn push_message(transcript: &mut Transcript, message: GeminiMessage) {
    if let Some(tokens) = &message.tokens {
        transcript.input_tokens += tokens.input + tokens.cached;
        transcript.output_tokens += tokens.output;
    }

    transcript.messages.push(TranscriptMessage {
        role: role_of(&message.kind),
        timestamp: message.timestamp.as_deref().and_then(parse_timestamp),
        text: content_text(&message.content),
        tool_calls: message.tool_calls.into_iter().map(|c| c.name).collect(),
    });
}

fn content_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(parts) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n\n"),
        _ => String::new(),
    }
}
