use agsync_index::MetricsSummary;
use agsync_runtime::{Alias, FailedItem, RunReport, SavedRemote, SourceWarning};
use agsync_types::{Session, Workspace};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::fmt;

use super::views::{
    AliasChangeView, AliasListView, RemoteChangeView, RemoteListView, RunResultView,
    SessionListView, StatsView, WorkspaceListView,
};
use super::{CreateView, Style};

// --------------------------------------------------------
// Shared pieces
// --------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct WarningViewModel {
    pub source: String,
    pub reason: String,
}

impl From<&SourceWarning> for WarningViewModel {
    fn from(warning: &SourceWarning) -> Self {
        Self {
            source: warning.scope.clone(),
            reason: warning.reason.clone(),
        }
    }
}

pub fn present_warnings(warnings: &[SourceWarning]) -> Vec<WarningViewModel> {
    warnings.iter().map(WarningViewModel::from).collect()
}

fn stamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// --------------------------------------------------------
// export / sync
// --------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunAction {
    Export,
    Sync,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedViewModel {
    pub session: String,
    pub reason: String,
}

impl From<&FailedItem> for FailedViewModel {
    fn from(item: &FailedItem) -> Self {
        Self {
            session: item.label.clone(),
            reason: item.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResultViewModel {
    pub action: RunAction,
    pub matched: usize,
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<FailedViewModel>,
    pub warnings: Vec<WarningViewModel>,
    pub no_sources_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Export directory, or the metrics store for sync
    pub destination: String,
}

impl RunResultViewModel {
    pub fn new(action: RunAction, report: &RunReport, destination: String) -> Self {
        Self {
            action,
            matched: report.matched,
            processed: report.summary.processed,
            skipped: report.summary.skipped,
            failed: report.summary.failed.iter().map(FailedViewModel::from).collect(),
            warnings: present_warnings(&report.warnings),
            no_sources_available: report.no_sources_available,
            alias: report.alias.clone(),
            destination,
        }
    }
}

impl CreateView for RunResultViewModel {
    fn create_view<'a>(&'a self, style: Style) -> Box<dyn fmt::Display + 'a> {
        Box::new(RunResultView::new(self, style))
    }
}

// --------------------------------------------------------
// list
// --------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceEntryViewModel {
    pub source: String,
    pub agent: String,
    pub display_path: String,
    pub encoded_name: String,
    pub sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceListViewModel {
    pub workspaces: Vec<WorkspaceEntryViewModel>,
    pub warnings: Vec<WarningViewModel>,
    pub no_sources_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl WorkspaceListViewModel {
    pub fn new<'a>(
        workspaces: impl IntoIterator<Item = (&'a Workspace, Vec<&'a Session>)>,
        warnings: &[SourceWarning],
        no_sources_available: bool,
        alias: Option<String>,
    ) -> Self {
        Self {
            workspaces: workspaces
                .into_iter()
                .map(|(w, sessions)| WorkspaceEntryViewModel {
                    source: w.source.key(),
                    agent: w.agent.to_string(),
                    display_path: w.display_path.to_string(),
                    encoded_name: w.encoded_name.clone(),
                    sessions: sessions.len(),
                    last_modified: sessions.iter().map(|s| s.mtime).max().map(stamp),
                })
                .collect(),
            warnings: present_warnings(warnings),
            no_sources_available,
            alias,
        }
    }
}

impl CreateView for WorkspaceListViewModel {
    fn create_view<'a>(&'a self, style: Style) -> Box<dyn fmt::Display + 'a> {
        Box::new(WorkspaceListView::new(self, style))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionEntryViewModel {
    pub source: String,
    pub agent: String,
    pub workspace: String,
    pub session_id: String,
    pub file_path: String,
    pub mtime: String,
    pub size_bytes: u64,
    pub messages: Option<u64>,
}

impl From<&Session> for SessionEntryViewModel {
    fn from(session: &Session) -> Self {
        Self {
            source: session.source().key(),
            agent: session.workspace.agent.to_string(),
            workspace: session.workspace.display_path.to_string(),
            session_id: session.session_id.clone(),
            file_path: session.file_path.display().to_string(),
            mtime: stamp(session.mtime),
            size_bytes: session.size_bytes,
            messages: session.message_count_hint,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionListViewModel {
    pub sessions: Vec<SessionEntryViewModel>,
    pub warnings: Vec<WarningViewModel>,
    pub no_sources_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl CreateView for SessionListViewModel {
    fn create_view<'a>(&'a self, style: Style) -> Box<dyn fmt::Display + 'a> {
        Box::new(SessionListView::new(self, style))
    }
}

// --------------------------------------------------------
// stats
// --------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatsViewModel {
    pub group_by: String,
    pub rows: Vec<MetricsSummary>,
}

impl CreateView for StatsViewModel {
    fn create_view<'a>(&'a self, style: Style) -> Box<dyn fmt::Display + 'a> {
        Box::new(StatsView::new(self, style))
    }
}

// --------------------------------------------------------
// alias
// --------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MemberViewModel {
    pub source: String,
    pub pattern: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AliasViewModel {
    pub name: String,
    pub members: Vec<MemberViewModel>,
}

impl From<&Alias> for AliasViewModel {
    fn from(alias: &Alias) -> Self {
        Self {
            name: alias.name.clone(),
            members: alias
                .members
                .iter()
                .map(|m| MemberViewModel {
                    source: m.source.key(),
                    pattern: m.pattern.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AliasListViewModel {
    pub aliases: Vec<AliasViewModel>,
}

impl CreateView for AliasListViewModel {
    fn create_view<'a>(&'a self, style: Style) -> Box<dyn fmt::Display + 'a> {
        Box::new(AliasListView::new(self, style))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Deleted,
    Added,
    Removed,
    Imported,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let word = match self {
            ChangeKind::Created => "Created",
            ChangeKind::Deleted => "Deleted",
            ChangeKind::Added => "Added",
            ChangeKind::Removed => "Removed",
            ChangeKind::Imported => "Imported",
        };
        f.write_str(word)
    }
}

/// Result of an alias mutation.
#[derive(Debug, Clone, Serialize)]
pub struct AliasChangeViewModel {
    pub change: ChangeKind,
    pub aliases: Vec<String>,
    pub members: Vec<MemberViewModel>,
}

impl CreateView for AliasChangeViewModel {
    fn create_view<'a>(&'a self, style: Style) -> Box<dyn fmt::Display + 'a> {
        Box::new(AliasChangeView::new(self, style))
    }
}

// --------------------------------------------------------
// remote
// --------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct RemoteViewModel {
    pub host: String,
    pub label: Option<String>,
    pub added_at: String,
}

impl From<&SavedRemote> for RemoteViewModel {
    fn from(remote: &SavedRemote) -> Self {
        Self {
            host: remote.host.clone(),
            label: remote.label.clone(),
            added_at: stamp(remote.added_at),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteListViewModel {
    pub remotes: Vec<RemoteViewModel>,
}

impl CreateView for RemoteListViewModel {
    fn create_view<'a>(&'a self, style: Style) -> Box<dyn fmt::Display + 'a> {
        Box::new(RemoteListView::new(self, style))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteChangeViewModel {
    pub change: ChangeKind,
    pub remote: RemoteViewModel,
}

impl CreateView for RemoteChangeViewModel {
    fn create_view<'a>(&'a self, style: Style) -> Box<dyn fmt::Display + 'a> {
        Box::new(RemoteChangeView::new(self, style))
    }
}
