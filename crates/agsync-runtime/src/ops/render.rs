use agsync_providers::{Transcript, TranscriptMessage};
use agsync_types::Session;
use chrono::SecondsFormat;
use std::fmt;

/// Markdown view of a parsed session.
///
/// `minimal` keeps only the conversation: no metadata header, no tool calls,
/// no timestamps.
pub struct MarkdownView<'a> {
    pub session: &'a Session,
    pub transcript: &'a Transcript,
    pub minimal: bool,
}

pub fn render_markdown(session: &Session, transcript: &Transcript, minimal: bool) -> String {
    MarkdownView {
        session,
        transcript,
        minimal,
    }
    .to_string()
}

impl fmt::Display for MarkdownView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.minimal {
            self.fmt_header(f)?;
        }

        for message in &self.transcript.messages {
            if self.minimal && message.text.trim().is_empty() {
                continue;
            }
            self.fmt_message(f, message)?;
        }
        Ok(())
    }
}

impl MarkdownView<'_> {
    fn fmt_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let session = self.session;
        let transcript = self.transcript;

        writeln!(f, "# Session {}", session.session_id)?;
        writeln!(f)?;
        writeln!(f, "- Workspace: {}", session.workspace.display_path)?;
        writeln!(f, "- Source: {}", session.workspace.source)?;
        writeln!(f, "- Agent: {}", session.workspace.agent)?;
        if let Some(cwd) = &transcript.cwd {
            writeln!(f, "- Directory: {}", cwd)?;
        }
        writeln!(
            f,
            "- Modified: {}",
            session.mtime.to_rfc3339_opts(SecondsFormat::Secs, true)
        )?;
        writeln!(f, "- Messages: {}", transcript.messages.len())?;
        if transcript.input_tokens + transcript.output_tokens > 0 {
            writeln!(
                f,
                "- Tokens: {} in / {} out",
                transcript.input_tokens, transcript.output_tokens
            )?;
        }
        writeln!(f)?;
        writeln!(f, "---")?;
        writeln!(f)
    }

    fn fmt_message(&self, f: &mut fmt::Formatter<'_>, message: &TranscriptMessage) -> fmt::Result {
        match (self.minimal, message.timestamp) {
            (false, Some(ts)) => writeln!(
                f,
                "## {} ({})",
                message.role.label(),
                ts.to_rfc3339_opts(SecondsFormat::Secs, true)
            )?,
            _ => writeln!(f, "## {}", message.role.label())?,
        }
        writeln!(f)?;

        let text = message.text.trim();
        if !text.is_empty() {
            writeln!(f, "{}", text)?;
            writeln!(f)?;
        }

        if !self.minimal && !message.tool_calls.is_empty() {
            for tool in &message.tool_calls {
                writeln!(f, "> Tool: {}", tool)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
