use agsync_types::{AgentKind, Session, Source, Workspace};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fs::FsAdapter;
use crate::hash_index::HashIndex;
use crate::mounts::MountConventions;
use crate::remote::{RemoteAdapter, Transport};
use crate::traits::SourceAdapter;
use crate::{Error, Result};

/// Everything needed to open an adapter for any source.
#[derive(Clone)]
pub struct AdapterEnv {
    /// Home directory of the local user
    pub local_home: PathBuf,
    pub mounts: MountConventions,
    pub transport: Arc<dyn Transport>,
    pub hash_index: Arc<HashIndex>,
}

impl AdapterEnv {
    /// Sources reachable through mounts on this machine.
    pub fn detect_mounted(&self) -> Vec<Source> {
        self.mounts.detect()
    }
}

/// One adapter per source kind. The set is closed.
pub enum Adapter {
    Local(FsAdapter),
    Subsystem(FsAdapter),
    HostMount(FsAdapter),
    Remote(RemoteAdapter),
}

impl Adapter {
    /// Open the adapter for `source`, translating mount roots as needed.
    ///
    /// Fails with `SourceUnavailable` when a mounted source has no matching
    /// mount. Remote sources are only contacted on first listing.
    pub fn connect(source: &Source, env: &AdapterEnv) -> Result<Self> {
        match source {
            Source::Local => Ok(Adapter::Local(FsAdapter::new(
                Source::Local,
                &env.local_home,
                env.hash_index.clone(),
            ))),
            Source::Subsystem { distro } => {
                let home = env.mounts.subsystem_home(distro).ok_or_else(|| {
                    Error::unavailable(
                        source,
                        format!(
                            "no mount found for distro '{}' (probed {})",
                            distro,
                            probed(&env.mounts.wsl_roots)
                        ),
                    )
                })?;
                tracing::debug!(distro, home = %home.display(), "subsystem mount");
                Ok(Adapter::Subsystem(FsAdapter::new(
                    source.clone(),
                    home,
                    env.hash_index.clone(),
                )))
            }
            Source::HostMount { user } => {
                let home = env.mounts.host_mount_home(user).ok_or_else(|| {
                    Error::unavailable(
                        source,
                        format!(
                            "no profile found for user '{}' (probed {})",
                            user,
                            probed(env.mounts.windows_users_root.as_slice())
                        ),
                    )
                })?;
                tracing::debug!(user, home = %home.display(), "host mount");
                Ok(Adapter::HostMount(FsAdapter::new(
                    source.clone(),
                    home,
                    env.hash_index.clone(),
                )))
            }
            Source::Remote { host } => Ok(Adapter::Remote(RemoteAdapter::new(
                host.clone(),
                env.transport.clone(),
                env.hash_index.clone(),
            ))),
        }
    }

    fn inner(&self) -> &dyn SourceAdapter {
        match self {
            Adapter::Local(a) | Adapter::Subsystem(a) | Adapter::HostMount(a) => a,
            Adapter::Remote(a) => a,
        }
    }
}

fn probed(roots: &[PathBuf]) -> String {
    if roots.is_empty() {
        return "nothing: no mount convention applies on this platform".to_string();
    }
    roots
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl SourceAdapter for Adapter {
    fn source(&self) -> &Source {
        self.inner().source()
    }

    fn list_workspaces(&self, agents: &[AgentKind]) -> Result<Vec<Workspace>> {
        self.inner().list_workspaces(agents)
    }

    fn list_sessions(&self, workspace: &Workspace) -> Result<Vec<Session>> {
        self.inner().list_sessions(workspace)
    }

    fn fetch(&self, session: &Session, cache_root: &Path) -> Result<PathBuf> {
        self.inner().fetch(session, cache_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::SshTransport;
    use tempfile::TempDir;

    fn env(home: &Path, mounts: MountConventions) -> AdapterEnv {
        AdapterEnv {
            local_home: home.to_path_buf(),
            mounts,
            transport: Arc::new(SshTransport::new()),
            hash_index: Arc::new(HashIndex::in_memory()),
        }
    }

    #[test]
    fn test_missing_mount_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let mounts = MountConventions {
            wsl_roots: vec![temp.path().join("nowhere")],
            windows_users_root: None,
        };
        let env = env(temp.path(), mounts);

        let err = Adapter::connect(&Source::subsystem("Ubuntu"), &env).err().unwrap();
        assert!(err.is_source_unavailable());

        let err = Adapter::connect(&Source::host_mount("me"), &env).err().unwrap();
        assert!(err.is_source_unavailable());
    }

    #[test]
    fn test_subsystem_lists_through_mount() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("wsl");
        let project = root.join("Ubuntu/home/me/.claude/projects/-home-me-proj");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("s.jsonl"), "").unwrap();

        let mounts = MountConventions {
            wsl_roots: vec![root],
            windows_users_root: None,
        };
        let env = env(temp.path(), mounts);
        let adapter = Adapter::connect(&Source::subsystem("Ubuntu"), &env).unwrap();

        let workspaces = adapter.list_workspaces(&[AgentKind::Claude]).unwrap();
        assert_eq!(workspaces.len(), 1);
        assert_eq!(workspaces[0].source, Source::subsystem("Ubuntu"));

        let sessions = adapter.list_sessions(&workspaces[0]).unwrap();
        assert_eq!(
            adapter.fetch(&sessions[0], temp.path()).unwrap(),
            sessions[0].file_path
        );
    }
}
