use agsync_providers::{SourceAdapter, Transcript, parse_transcript};
use agsync_types::{Session, sanitize_component};
use std::path::{Path, PathBuf};

use super::render::render_markdown;
use crate::oracle::{Decision, decide, file_mtime};
use crate::resolver::Resolution;
use crate::runner::{ActionOutcome, ActionRunner, ProgressEvent, RunSummary};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputLayout {
    /// `<out>/<prefix><slug>/<session>.md`
    #[default]
    Tree,
    /// `<out>/<prefix><slug>__<session>.md`
    Flat,
}

/// Where each session's markdown goes.
///
/// Paths depend only on the session's identity, so concurrent workers never
/// write the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPolicy {
    pub out_dir: PathBuf,
    pub layout: OutputLayout,
}

impl OutputPolicy {
    pub fn new(out_dir: impl Into<PathBuf>, layout: OutputLayout) -> Self {
        Self {
            out_dir: out_dir.into(),
            layout,
        }
    }

    pub fn primary_path(&self, session: &Session) -> PathBuf {
        let slug = session.workspace.namespaced_slug();
        let id = sanitize_component(&session.session_id);
        match self.layout {
            OutputLayout::Tree => self.out_dir.join(slug).join(format!("{}.md", id)),
            OutputLayout::Flat => self.out_dir.join(format!("{}__{}.md", slug, id)),
        }
    }

    /// `<stem>_partK.md` next to the primary file, for K >= 2.
    pub fn part_path(primary: &Path, part: usize) -> PathBuf {
        let stem = primary
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        primary.with_file_name(format!("{}_part{}.md", stem, part))
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub policy: OutputPolicy,
    pub minimal: bool,
    /// Maximum lines per output file
    pub split_lines: Option<usize>,
    pub force: bool,
    pub jobs: usize,
}

/// Fetch the session through its adapter and parse it fully.
pub(crate) fn load_transcript(
    adapter: &dyn SourceAdapter,
    session: &Session,
    cache_root: &Path,
) -> Result<Transcript> {
    let local = adapter.fetch(session, cache_root)?;
    Ok(parse_transcript(session.workspace.agent, &local)?)
}

/// Export one session and return the files written, primary first.
pub fn export_session(
    adapter: &dyn SourceAdapter,
    session: &Session,
    options: &ExportOptions,
    cache_root: &Path,
) -> Result<Vec<PathBuf>> {
    let transcript = load_transcript(adapter, session, cache_root)?;
    let markdown = render_markdown(session, &transcript, options.minimal);

    let primary = options.policy.primary_path(session);
    if let Some(parent) = primary.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let parts = split_lines(&markdown, options.split_lines);
    let mut written = Vec::with_capacity(parts.len());
    for (index, part) in parts.iter().enumerate() {
        let path = if index == 0 {
            primary.clone()
        } else {
            OutputPolicy::part_path(&primary, index + 1)
        };
        std::fs::write(&path, part)?;
        written.push(path);
    }

    // Parts left over from an earlier, longer export.
    let mut stale = parts.len() + 1;
    loop {
        let path = OutputPolicy::part_path(&primary, stale);
        if !path.exists() {
            break;
        }
        std::fs::remove_file(&path)?;
        stale += 1;
    }

    tracing::debug!(session = %session.session_id, files = written.len(), "exported");
    Ok(written)
}

fn split_lines(content: &str, max_lines: Option<usize>) -> Vec<String> {
    let Some(max) = max_lines.filter(|n| *n > 0) else {
        return vec![content.to_string()];
    };

    let lines: Vec<&str> = content.lines().collect();
    if lines.len() <= max {
        return vec![content.to_string()];
    }
    lines
        .chunks(max)
        .map(|chunk| {
            let mut part = chunk.join("\n");
            part.push('\n');
            part
        })
        .collect()
}

/// Export every resolved session that changed since its last export.
pub fn export_sessions<P>(
    resolution: &Resolution,
    options: &ExportOptions,
    cache_root: &Path,
    progress: P,
) -> Result<RunSummary>
where
    P: Fn(ProgressEvent<'_>) + Sync,
{
    let runner = ActionRunner::new(options.jobs);

    runner.run(
        &resolution.sessions,
        Session::label,
        |session| {
            let primary = options.policy.primary_path(session);
            if decide(session.mtime, file_mtime(&primary), options.force) == Decision::Skip {
                return ActionOutcome::Skipped;
            }

            let result = resolution
                .adapter(session.source())
                .ok_or_else(|| Error::unavailable(session.source(), "source was not listed"))
                .and_then(|adapter| export_session(adapter, session, options, cache_root));

            match result {
                Ok(_) => ActionOutcome::Success,
                Err(err) => ActionOutcome::Failure(err.to_string()),
            }
        },
        progress,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use agsync_types::{AgentKind, DisplayPath, Source, Workspace};
    use chrono::Utc;

    fn session(source: Source, display: &str, id: &str) -> Session {
        Session {
            workspace: Workspace {
                source,
                agent: AgentKind::Claude,
                encoded_name: "-srv-proj".into(),
                display_path: DisplayPath::Resolved(display.into()),
                root_dir: "/tmp".into(),
            },
            session_id: id.into(),
            file_path: "/tmp/x.jsonl".into(),
            mtime: Utc::now(),
            size_bytes: 0,
            message_count_hint: None,
        }
    }

    #[test]
    fn test_output_paths() {
        let tree = OutputPolicy::new("/out", OutputLayout::Tree);
        let flat = OutputPolicy::new("/out", OutputLayout::Flat);

        let local = session(Source::Local, "/home/me/proj", "abc");
        assert_eq!(
            tree.primary_path(&local),
            PathBuf::from("/out/-home-me-proj/abc.md")
        );

        let remote = session(Source::remote("vm01"), "/home/me/proj", "abc");
        assert_eq!(
            tree.primary_path(&remote),
            PathBuf::from("/out/remote_vm01_-home-me-proj/abc.md")
        );
        assert_eq!(
            flat.primary_path(&remote),
            PathBuf::from("/out/remote_vm01_-home-me-proj__abc.md")
        );
    }

    #[test]
    fn test_part_path() {
        assert_eq!(
            OutputPolicy::part_path(Path::new("/out/p/abc.md"), 2),
            PathBuf::from("/out/p/abc_part2.md")
        );
    }

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb\nc\n", None), vec!["a\nb\nc\n"]);
        assert_eq!(split_lines("a\nb\nc\n", Some(3)), vec!["a\nb\nc\n"]);
        assert_eq!(
            split_lines("a\nb\nc\n", Some(2)),
            vec!["a\nb\n".to_string(), "c\n".to_string()]
        );
    }
}
