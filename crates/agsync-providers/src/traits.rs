use agsync_types::{AgentKind, Session, Source, Workspace};
use std::path::{Path, PathBuf};

use crate::Result;

/// Listing and retrieval for one backend.
///
/// Listings are read live on every call; adapters never write into the
/// source they read.
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> &Source;

    /// Workspaces of the given agent layouts, sorted by encoded name per agent.
    ///
    /// Names in this tool's cache namespaces are never returned.
    fn list_workspaces(&self, agents: &[AgentKind]) -> Result<Vec<Workspace>>;

    fn list_sessions(&self, workspace: &Workspace) -> Result<Vec<Session>>;

    /// Make the session readable on this machine and return the local path.
    ///
    /// `cache_root` is the local home under which remote copies are stored.
    fn fetch(&self, session: &Session, cache_root: &Path) -> Result<PathBuf>;
}
