use chrono::{DateTime, NaiveDate, Utc};
use std::path::PathBuf;

use super::{AgentKind, DisplayPath, SourceKind, Workspace};
use crate::util::project_hash_from_root;
use crate::{Error, Result};

/// Sigil marking an alias reference in a workspace pattern.
pub const ALIAS_SIGIL: char = '@';

/// How a workspace is selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum WorkspacePattern {
    /// Case-insensitive substring of the display path
    Substring(String),
    /// Exactly this project path (the current directory)
    Exact(String),
    /// `--aw`
    Everything,
}

impl WorkspacePattern {
    pub fn matches(&self, workspace: &Workspace) -> bool {
        match self {
            WorkspacePattern::Everything => true,
            WorkspacePattern::Substring(pattern) => {
                let needle = pattern.to_lowercase();
                match &workspace.display_path {
                    DisplayPath::Resolved(path) => path.to_lowercase().contains(&needle),
                    DisplayPath::Unresolved { .. } => {
                        workspace.encoded_name.to_lowercase().contains(&needle)
                    }
                }
            }
            WorkspacePattern::Exact(path) => match &workspace.display_path {
                DisplayPath::Resolved(display) => trim_separators(display) == trim_separators(path),
                DisplayPath::Unresolved { hash } => *hash == project_hash_from_root(path),
            },
        }
    }
}

fn trim_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() { path } else { trimmed }
}

/// Inclusive date window applied to session mtimes (UTC calendar days).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(since: Option<NaiveDate>, until: Option<NaiveDate>) -> Result<Self> {
        let range = Self { since, until };
        range.validate()?;
        Ok(range)
    }

    /// Parse `YYYY-MM-DD` bounds.
    pub fn parse(since: Option<&str>, until: Option<&str>) -> Result<Self> {
        Self::new(
            since.map(parse_date).transpose()?,
            until.map(parse_date).transpose()?,
        )
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(since), Some(until)) = (self.since, self.until)
            && since > until
        {
            return Err(Error::InvalidDateRange { since, until });
        }
        Ok(())
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        let day = ts.date_naive();
        self.since.is_none_or(|since| day >= since) && self.until.is_none_or(|until| day <= until)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Source-selection flags of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFlags {
    /// `--ah`
    pub all_hosts: bool,
    /// `--wsl[=DISTRO]`; `Some(None)` asks for auto-detection
    pub wsl: Option<Option<String>>,
    /// `--windows[=USER]`; `Some(None)` asks for auto-detection
    pub windows: Option<Option<String>>,
    /// `-r HOST`, in command-line order
    pub remotes: Vec<String>,
    /// `--no-<kind>`
    pub exclude: Vec<SourceKind>,
}

impl SourceFlags {
    /// True when no flag adds a source; the scope then defaults to local.
    pub fn is_default(&self) -> bool {
        !self.all_hosts && self.wsl.is_none() && self.windows.is_none() && self.remotes.is_empty()
    }

    pub fn excludes(&self, kind: SourceKind) -> bool {
        self.exclude.contains(&kind)
    }

    /// Number of sources named one by one on the command line.
    pub fn explicit_count(&self) -> usize {
        usize::from(self.wsl.is_some()) + usize::from(self.windows.is_some()) + self.remotes.len()
    }
}

/// Everything one invocation asks for. Built by the CLI, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRequest {
    /// Substring patterns and `@alias` references
    pub workspace_patterns: Vec<String>,
    pub source_flags: SourceFlags,
    pub date_range: DateRange,
    pub force: bool,
    /// `--this`: current workspace only, never its alias
    pub this_only: bool,
    /// `--aw`
    pub all_workspaces: bool,
    pub agents: Vec<AgentKind>,
    /// Directory the command runs from; used for the default workspace
    pub current_dir: Option<PathBuf>,
}

impl Default for ScopeRequest {
    fn default() -> Self {
        Self {
            workspace_patterns: Vec::new(),
            source_flags: SourceFlags::default(),
            date_range: DateRange::default(),
            force: false,
            this_only: false,
            all_workspaces: false,
            agents: AgentKind::ALL.to_vec(),
            current_dir: None,
        }
    }
}

impl ScopeRequest {
    /// Whether any pattern references an alias.
    pub fn use_alias(&self) -> bool {
        self.workspace_patterns
            .iter()
            .any(|p| p.starts_with(ALIAS_SIGIL))
    }

    pub fn validate(&self) -> Result<()> {
        self.date_range.validate()
    }
}
