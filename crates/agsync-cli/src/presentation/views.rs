use owo_colors::OwoColorize;
use std::fmt;

use super::Style;
use super::view_models::{
    AliasChangeViewModel, AliasListViewModel, ChangeKind, RemoteChangeViewModel, RemoteListViewModel,
    RunAction, RunResultViewModel, SessionListViewModel, StatsViewModel, WarningViewModel,
    WorkspaceListViewModel,
};

fn bold(style: Style, text: &str) -> String {
    if style.color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn dim(style: Style, text: &str) -> String {
    if style.color {
        text.dimmed().to_string()
    } else {
        text.to_string()
    }
}

fn red(style: Style, text: &str) -> String {
    if style.color {
        text.red().to_string()
    } else {
        text.to_string()
    }
}

fn yellow(style: Style, text: &str) -> String {
    if style.color {
        text.yellow().to_string()
    } else {
        text.to_string()
    }
}

fn write_warnings(f: &mut fmt::Formatter, style: Style, warnings: &[WarningViewModel]) -> fmt::Result {
    if warnings.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{}", yellow(style, "Unavailable sources:"))?;
    for warning in warnings {
        writeln!(f, "  {}: {}", warning.source, warning.reason)?;
    }
    Ok(())
}

/// Headline for an empty result; blames the sources when none answered.
fn empty_line(style: Style, no_sources_available: bool, nothing: &str) -> String {
    if no_sources_available {
        yellow(style, "No sources available.")
    } else {
        nothing.to_string()
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

// --------------------------------------------------------
// export / sync
// --------------------------------------------------------

pub struct RunResultView<'a> {
    data: &'a RunResultViewModel,
    style: Style,
}

impl<'a> RunResultView<'a> {
    pub fn new(data: &'a RunResultViewModel, style: Style) -> Self {
        Self { data, style }
    }
}

impl fmt::Display for RunResultView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let d = self.data;
        let verb = match d.action {
            RunAction::Export => "Exported",
            RunAction::Sync => "Synced",
        };

        if let Some(alias) = &d.alias {
            writeln!(f, "{}", dim(self.style, &format!("Using alias @{}", alias)))?;
        }

        if d.matched == 0 {
            writeln!(f, "{}", empty_line(self.style, d.no_sources_available, "No sessions in scope."))?;
        } else {
            writeln!(
                f,
                "{} {} to {} ({} unchanged, {} failed)",
                verb,
                bold(self.style, &plural(d.processed, "session")),
                d.destination,
                d.skipped,
                d.failed.len()
            )?;
        }

        if !d.failed.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", red(self.style, "Failed:"))?;
            for item in &d.failed {
                writeln!(f, "  {}: {}", item.session, item.reason)?;
            }
        }

        write_warnings(f, self.style, &d.warnings)
    }
}

// --------------------------------------------------------
// list
// --------------------------------------------------------

pub struct WorkspaceListView<'a> {
    data: &'a WorkspaceListViewModel,
    style: Style,
}

impl<'a> WorkspaceListView<'a> {
    pub fn new(data: &'a WorkspaceListViewModel, style: Style) -> Self {
        Self { data, style }
    }
}

impl fmt::Display for WorkspaceListView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(alias) = &self.data.alias {
            writeln!(f, "{}", dim(self.style, &format!("Using alias @{}", alias)))?;
        }

        if self.data.workspaces.is_empty() {
            writeln!(
                f,
                "{}",
                empty_line(self.style, self.data.no_sources_available, "No matching workspaces.")
            )?;
        } else {
            writeln!(
                f,
                "{}",
                bold(
                    self.style,
                    &format!("{:<20} {:<8} {:>8}  {:<20} WORKSPACE", "SOURCE", "AGENT", "SESSIONS", "LAST MODIFIED")
                )
            )?;
            for w in &self.data.workspaces {
                writeln!(
                    f,
                    "{:<20} {:<8} {:>8}  {:<20} {}",
                    w.source,
                    w.agent,
                    w.sessions,
                    w.last_modified.as_deref().unwrap_or("-"),
                    w.display_path
                )?;
            }
        }

        write_warnings(f, self.style, &self.data.warnings)
    }
}

pub struct SessionListView<'a> {
    data: &'a SessionListViewModel,
    style: Style,
}

impl<'a> SessionListView<'a> {
    pub fn new(data: &'a SessionListViewModel, style: Style) -> Self {
        Self { data, style }
    }
}

impl fmt::Display for SessionListView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(alias) = &self.data.alias {
            writeln!(f, "{}", dim(self.style, &format!("Using alias @{}", alias)))?;
        }

        if self.data.sessions.is_empty() {
            writeln!(
                f,
                "{}",
                empty_line(self.style, self.data.no_sources_available, "No sessions in scope.")
            )?;
        } else {
            writeln!(
                f,
                "{}",
                bold(
                    self.style,
                    &format!("{:<20} {:<20} {:>5}  {:<38} WORKSPACE", "MODIFIED", "SOURCE", "MSGS", "SESSION")
                )
            )?;
            for s in &self.data.sessions {
                let messages = s
                    .messages
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "-".to_string());
                writeln!(
                    f,
                    "{:<20} {:<20} {:>5}  {:<38} {}",
                    s.mtime, s.source, messages, s.session_id, s.workspace
                )?;
            }
        }

        write_warnings(f, self.style, &self.data.warnings)
    }
}

// --------------------------------------------------------
// stats
// --------------------------------------------------------

pub struct StatsView<'a> {
    data: &'a StatsViewModel,
    style: Style,
}

impl<'a> StatsView<'a> {
    pub fn new(data: &'a StatsViewModel, style: Style) -> Self {
        Self { data, style }
    }
}

impl fmt::Display for StatsView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.data.rows.is_empty() {
            writeln!(f, "No synced sessions. Run 'agsync sync' first.")?;
            return Ok(());
        }

        writeln!(
            f,
            "{}",
            bold(
                self.style,
                &format!(
                    "{:>8} {:>9} {:>6} {:>12} {:>12}  {:<10}  {}",
                    "SESSIONS",
                    "MESSAGES",
                    "TOOLS",
                    "IN TOKENS",
                    "OUT TOKENS",
                    "LAST",
                    self.data.group_by.to_uppercase()
                )
            )
        )?;
        for row in &self.data.rows {
            let last = row
                .last_activity
                .as_deref()
                .and_then(|ts| ts.get(..10))
                .unwrap_or("-");
            writeln!(
                f,
                "{:>8} {:>9} {:>6} {:>12} {:>12}  {:<10}  {}",
                row.sessions,
                row.messages,
                row.tool_calls,
                row.input_tokens,
                row.output_tokens,
                last,
                row.group
            )?;
        }
        Ok(())
    }
}

// --------------------------------------------------------
// alias
// --------------------------------------------------------

pub struct AliasListView<'a> {
    data: &'a AliasListViewModel,
    style: Style,
}

impl<'a> AliasListView<'a> {
    pub fn new(data: &'a AliasListViewModel, style: Style) -> Self {
        Self { data, style }
    }
}

impl fmt::Display for AliasListView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.data.aliases.is_empty() {
            writeln!(f, "No aliases. Create one with 'agsync alias create <NAME>'.")?;
            return Ok(());
        }

        for alias in &self.data.aliases {
            writeln!(f, "{}", bold(self.style, &format!("@{}", alias.name)))?;
            if alias.members.is_empty() {
                writeln!(f, "  {}", dim(self.style, "(no members)"))?;
            }
            for member in &alias.members {
                writeln!(f, "  {:<20} {}", member.source, member.pattern)?;
            }
        }
        Ok(())
    }
}

pub struct AliasChangeView<'a> {
    data: &'a AliasChangeViewModel,
    style: Style,
}

impl<'a> AliasChangeView<'a> {
    pub fn new(data: &'a AliasChangeViewModel, style: Style) -> Self {
        Self { data, style }
    }
}

impl fmt::Display for AliasChangeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names = self
            .data
            .aliases
            .iter()
            .map(|n| format!("@{}", n))
            .collect::<Vec<_>>()
            .join(", ");

        match self.data.change {
            ChangeKind::Created | ChangeKind::Deleted | ChangeKind::Imported => {
                writeln!(f, "{} {}", self.data.change, bold(self.style, &names))?;
            }
            ChangeKind::Added | ChangeKind::Removed => {
                writeln!(
                    f,
                    "{} {} in {}",
                    self.data.change,
                    plural(self.data.members.len(), "member"),
                    bold(self.style, &names)
                )?;
                for member in &self.data.members {
                    writeln!(f, "  {:<20} {}", member.source, member.pattern)?;
                }
            }
        }
        Ok(())
    }
}

// --------------------------------------------------------
// remote
// --------------------------------------------------------

pub struct RemoteListView<'a> {
    data: &'a RemoteListViewModel,
    style: Style,
}

impl<'a> RemoteListView<'a> {
    pub fn new(data: &'a RemoteListViewModel, style: Style) -> Self {
        Self { data, style }
    }
}

impl fmt::Display for RemoteListView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.data.remotes.is_empty() {
            writeln!(f, "No saved remotes. Add one with 'agsync remote add <HOST>'.")?;
            return Ok(());
        }

        writeln!(
            f,
            "{}",
            bold(self.style, &format!("{:<24} {:<20} {}", "HOST", "LABEL", "ADDED"))
        )?;
        for remote in &self.data.remotes {
            writeln!(
                f,
                "{:<24} {:<20} {}",
                remote.host,
                remote.label.as_deref().unwrap_or("-"),
                remote.added_at
            )?;
        }
        Ok(())
    }
}

pub struct RemoteChangeView<'a> {
    data: &'a RemoteChangeViewModel,
    style: Style,
}

impl<'a> RemoteChangeView<'a> {
    pub fn new(data: &'a RemoteChangeViewModel, style: Style) -> Self {
        Self { data, style }
    }
}

impl fmt::Display for RemoteChangeView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            "{} remote {}",
            self.data.change,
            bold(self.style, &self.data.remote.host)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::view_models::{FailedViewModel, MemberViewModel, AliasViewModel};

    #[test]
    fn test_run_result_lists_failures_and_warnings() {
        let data = RunResultViewModel {
            action: RunAction::Export,
            matched: 3,
            processed: 1,
            skipped: 1,
            failed: vec![FailedViewModel {
                session: "local /work/proj bad".into(),
                reason: "invalid JSON".into(),
            }],
            warnings: vec![WarningViewModel {
                source: "remote:vm02".into(),
                reason: "timed out".into(),
            }],
            no_sources_available: false,
            alias: None,
            destination: "out".into(),
        };
        let text = RunResultView::new(&data, Style::default()).to_string();

        assert!(text.starts_with("Exported 1 session to out (1 unchanged, 1 failed)\n"));
        assert!(text.contains("  local /work/proj bad: invalid JSON\n"));
        assert!(text.contains("  remote:vm02: timed out\n"));
    }

    #[test]
    fn test_empty_results_name_missing_sources() {
        let warnings = vec![WarningViewModel {
            source: "remote:vm01".into(),
            reason: "timed out".into(),
        }];
        let workspaces = WorkspaceListViewModel {
            workspaces: Vec::new(),
            warnings: warnings.clone(),
            no_sources_available: true,
            alias: None,
        };
        let text = WorkspaceListView::new(&workspaces, Style::default()).to_string();
        assert!(text.starts_with("No sources available.\n"));
        assert!(text.contains("  remote:vm01: timed out\n"));

        let sessions = SessionListViewModel {
            sessions: Vec::new(),
            warnings: Vec::new(),
            no_sources_available: false,
            alias: None,
        };
        let text = SessionListView::new(&sessions, Style::default()).to_string();
        assert_eq!(text, "No sessions in scope.\n");

        let run = RunResultViewModel {
            action: RunAction::Sync,
            matched: 0,
            processed: 0,
            skipped: 0,
            failed: Vec::new(),
            warnings,
            no_sources_available: true,
            alias: None,
            destination: "metrics.db".into(),
        };
        let text = RunResultView::new(&run, Style::default()).to_string();
        assert!(text.starts_with("No sources available.\n"));
    }

    #[test]
    fn test_alias_list_marks_empty_aliases() {
        let data = AliasListViewModel {
            aliases: vec![
                AliasViewModel {
                    name: "empty".into(),
                    members: Vec::new(),
                },
                AliasViewModel {
                    name: "proj".into(),
                    members: vec![MemberViewModel {
                        source: "remote:vm01".into(),
                        pattern: "proj".into(),
                    }],
                },
            ],
        };
        let text = AliasListView::new(&data, Style::default()).to_string();

        assert_eq!(
            text,
            "@empty\n  (no members)\n@proj\n  remote:vm01          proj\n"
        );
    }
}
