mod listing;
mod transport;

pub use listing::{CWD_MARKER, RemoteEntry, RemoteListing, listing_command, parse_listing};
pub use transport::{SshTransport, Transport, TransportError, classify_failure};

use agsync_types::{AgentKind, DisplayPath, Session, Source, Workspace, decode_project_dir};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::hash_index::HashIndex;
use crate::layout;
use crate::traits::SourceAdapter;
use crate::{Error, Result};

/// Adapter for a host reached over SSH.
///
/// The remote is listed with one `find` per agent root, cached for the
/// lifetime of the adapter. Paths are kept home-relative (`~/...`) because
/// the remote home is never resolved locally. Claude workspaces take their
/// display path from the `cwd` the listing recovers, like local ones do.
pub struct RemoteAdapter {
    source: Source,
    host: String,
    transport: Arc<dyn Transport>,
    hash_index: Arc<HashIndex>,
    listings: Mutex<HashMap<AgentKind, Arc<RemoteListing>>>,
}

impl RemoteAdapter {
    pub fn new(
        host: impl Into<String>,
        transport: Arc<dyn Transport>,
        hash_index: Arc<HashIndex>,
    ) -> Self {
        let host = host.into();
        Self {
            source: Source::remote(&host),
            host,
            transport,
            hash_index,
            listings: Mutex::new(HashMap::new()),
        }
    }

    fn listing(&self, agent: AgentKind) -> Result<Arc<RemoteListing>> {
        let mut listings = self
            .listings
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(cached) = listings.get(&agent) {
            return Ok(cached.clone());
        }

        let output = self
            .transport
            .run(&self.host, &listing_command(agent))
            .map_err(|err| {
                tracing::warn!(host = %self.host, error = %err, "remote listing failed");
                Error::unavailable(&self.source, err.to_string())
            })?;

        let mut listing = parse_listing(&output);
        listing.entries.retain(|e| e.is_session(agent));
        tracing::debug!(
            host = %self.host,
            agent = %agent,
            files = listing.entries.len(),
            roots = listing.project_roots.len(),
            "listed remote files"
        );

        let listing = Arc::new(listing);
        listings.insert(agent, listing.clone());
        Ok(listing)
    }

    fn remote_path(agent: AgentKind, rel_path: &str) -> String {
        format!("~/{}/{}", agent.home_relative_root(), rel_path)
    }
}

impl SourceAdapter for RemoteAdapter {
    fn source(&self) -> &Source {
        &self.source
    }

    fn list_workspaces(&self, agents: &[AgentKind]) -> Result<Vec<Workspace>> {
        let mut workspaces = Vec::new();

        for &agent in agents {
            let listing = self.listing(agent)?;
            let names: BTreeSet<&str> = listing.entries.iter().map(|e| e.workspace_name()).collect();

            for name in names {
                let display_path = match agent {
                    AgentKind::Claude => DisplayPath::Resolved(
                        listing
                            .project_roots
                            .get(name)
                            .cloned()
                            .unwrap_or_else(|| decode_project_dir(name)),
                    ),
                    AgentKind::Gemini => self.hash_index.resolve(name),
                };
                workspaces.push(Workspace {
                    source: self.source.clone(),
                    agent,
                    encoded_name: name.to_string(),
                    display_path,
                    root_dir: PathBuf::from(Self::remote_path(agent, name)),
                });
            }
        }

        Ok(workspaces)
    }

    fn list_sessions(&self, workspace: &Workspace) -> Result<Vec<Session>> {
        let listing = self.listing(workspace.agent)?;

        let mut sessions: Vec<Session> = listing
            .entries
            .iter()
            .filter(|e| e.workspace_name() == workspace.encoded_name)
            .map(|e| Session {
                workspace: workspace.clone(),
                session_id: layout::session_id_from_file_name(workspace.agent, e.file_name()),
                file_path: PathBuf::from(Self::remote_path(workspace.agent, &e.rel_path)),
                mtime: e.mtime,
                size_bytes: e.size,
                message_count_hint: None,
            })
            .collect();
        sessions.sort_by(|a, b| a.file_path.cmp(&b.file_path));

        Ok(sessions)
    }

    /// Copy into `<cache_root>/<agent root>/remote_<host>_<workspace>/...`.
    ///
    /// A cached copy with the same size and a modification time at least as
    /// new as the listing is reused.
    fn fetch(&self, session: &Session, cache_root: &Path) -> Result<PathBuf> {
        let workspace = &session.workspace;
        let prefix = self.source.cache_prefix().unwrap_or_default();

        let mut local = cache_root
            .join(workspace.agent.home_relative_root())
            .join(format!("{}{}", prefix, workspace.encoded_name));
        if let Some(sub) = layout::sessions_subdir(workspace.agent) {
            local = local.join(sub);
        }
        let file_name = session
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        let local = local.join(file_name);

        if let Ok(meta) = std::fs::metadata(&local)
            && meta.len() == session.size_bytes
            && let Ok(modified) = meta.modified()
            && chrono::DateTime::<chrono::Utc>::from(modified) >= session.mtime
        {
            tracing::debug!(path = %local.display(), "remote copy is current");
            return Ok(local);
        }

        let remote = session.file_path.to_string_lossy();
        let remote_path = remote.strip_prefix("~/").unwrap_or(&remote).to_string();
        self.transport
            .copy(&self.host, &remote_path, &local)
            .map_err(|source| Error::Fetch {
                host: self.host.clone(),
                remote_path: remote_path.clone(),
                source,
            })?;

        Ok(local)
    }
}
