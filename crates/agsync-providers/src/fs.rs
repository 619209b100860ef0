use agsync_types::{AgentKind, DisplayPath, Session, Source, Workspace, decode_project_dir};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

use crate::claude::read_claude_cwd;
use crate::hash_index::HashIndex;
use crate::layout;
use crate::probe::{file_stamp, probe_session};
use crate::traits::SourceAdapter;
use crate::{Error, Result};

/// Adapter for any source whose files are reachable through the local filesystem.
///
/// Local, subsystem-mounted and host-mounted sources differ only in the home
/// directory the agent roots are resolved against.
pub struct FsAdapter {
    source: Source,
    home: PathBuf,
    hash_index: Arc<HashIndex>,
}

impl FsAdapter {
    pub fn new(source: Source, home: impl Into<PathBuf>, hash_index: Arc<HashIndex>) -> Self {
        Self {
            source,
            home: home.into(),
            hash_index,
        }
    }

    fn agent_root(&self, agent: AgentKind) -> PathBuf {
        self.home.join(agent.home_relative_root())
    }

    fn display_path(&self, agent: AgentKind, name: &str, dir: &Path) -> DisplayPath {
        match agent {
            AgentKind::Claude => DisplayPath::Resolved(
                read_claude_cwd(dir).unwrap_or_else(|| decode_project_dir(name)),
            ),
            AgentKind::Gemini => self.hash_index.resolve(name),
        }
    }

    fn session_from_file(&self, workspace: &Workspace, path: &Path, name: &str) -> Result<Session> {
        match probe_session(workspace.agent, path) {
            Ok(probe) => {
                return Ok(Session {
                    workspace: workspace.clone(),
                    session_id: probe.session_id,
                    file_path: path.to_path_buf(),
                    mtime: probe.mtime,
                    size_bytes: probe.size_bytes,
                    message_count_hint: Some(probe.message_count),
                });
            }
            Err(err) => {
                tracing::debug!(path = %path.display(), error = %err, "probe failed, using file metadata");
            }
        }

        let (mtime, size_bytes) = file_stamp(path)?;
        Ok(Session {
            workspace: workspace.clone(),
            session_id: layout::session_id_from_file_name(workspace.agent, name),
            file_path: path.to_path_buf(),
            mtime,
            size_bytes,
            message_count_hint: None,
        })
    }
}

impl SourceAdapter for FsAdapter {
    fn source(&self) -> &Source {
        &self.source
    }

    fn list_workspaces(&self, agents: &[AgentKind]) -> Result<Vec<Workspace>> {
        let mut workspaces = Vec::new();

        for &agent in agents {
            let root = self.agent_root(agent);
            if !root.is_dir() {
                tracing::debug!(source = %self.source, root = %root.display(), "agent root missing");
                continue;
            }

            for entry in WalkDir::new(&root)
                .min_depth(1)
                .max_depth(1)
                .sort_by_file_name()
            {
                let entry = entry.map_err(|err| {
                    Error::unavailable(
                        &self.source,
                        format!("cannot read {}: {}", root.display(), err),
                    )
                })?;
                if !entry.file_type().is_dir() {
                    continue;
                }

                let name = entry.file_name().to_string_lossy().to_string();
                if !layout::is_workspace_dir(agent, &name) {
                    continue;
                }

                workspaces.push(Workspace {
                    source: self.source.clone(),
                    agent,
                    display_path: self.display_path(agent, &name, entry.path()),
                    encoded_name: name,
                    root_dir: entry.path().to_path_buf(),
                });
            }
        }

        tracing::debug!(source = %self.source, count = workspaces.len(), "listed workspaces");
        Ok(workspaces)
    }

    fn list_sessions(&self, workspace: &Workspace) -> Result<Vec<Session>> {
        let dir = layout::sessions_dir(workspace.agent, &workspace.root_dir);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut sessions = Vec::new();
        for entry in WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if !layout::is_session_file(workspace.agent, &name) {
                continue;
            }
            sessions.push(self.session_from_file(workspace, entry.path(), &name)?);
        }

        Ok(sessions)
    }

    fn fetch(&self, session: &Session, _cache_root: &Path) -> Result<PathBuf> {
        Ok(session.file_path.clone())
    }
}
