//! SSH-free stand-in for remote hosts.

use agsync_providers::remote::CWD_MARKER;
use agsync_providers::{Transport, TransportError};
use agsync_types::AgentKind;
use filetime::FileTime;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use walkdir::WalkDir;

/// Serves each known host from a local directory acting as its home.
///
/// Listing commands are answered the way the remote `find` would answer
/// them, including the `#cwd` lines for Claude project dirs; copies preserve the source mtime like `rsync -a`. Hosts marked
/// offline, and hosts never registered, fail like an unreachable SSH host.
#[derive(Debug, Default)]
pub struct FakeTransport {
    homes: Mutex<HashMap<String, PathBuf>>,
    offline: Mutex<HashSet<String>>,
    runs: AtomicUsize,
    copies: AtomicUsize,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(self, host: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        self.lock_homes().insert(host.into(), home.into());
        self
    }

    pub fn with_offline(self, host: impl Into<String>) -> Self {
        self.lock_offline().insert(host.into());
        self
    }

    pub fn set_offline(&self, host: &str, offline: bool) {
        let mut set = self.lock_offline();
        if offline {
            set.insert(host.to_string());
        } else {
            set.remove(host);
        }
    }

    /// Number of listing commands run so far.
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn copies(&self) -> usize {
        self.copies.load(Ordering::SeqCst)
    }

    fn lock_homes(&self) -> std::sync::MutexGuard<'_, HashMap<String, PathBuf>> {
        self.homes.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn lock_offline(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        self.offline.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn home(&self, host: &str) -> Result<PathBuf, TransportError> {
        if self.lock_offline().contains(host) {
            return Err(TransportError::Connection(format!(
                "ssh: connect to host {} port 22: Connection timed out",
                host
            )));
        }
        self.lock_homes().get(host).cloned().ok_or_else(|| {
            TransportError::Connection(format!("ssh: Could not resolve hostname {}", host))
        })
    }
}

impl Transport for FakeTransport {
    fn run(&self, host: &str, command: &str) -> Result<String, TransportError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let home = self.home(host)?;

        let Some(agent) = AgentKind::ALL
            .into_iter()
            .find(|a| command.contains(a.home_relative_root()))
        else {
            return Ok(String::new());
        };

        let root = home.join(agent.home_relative_root());
        let mut out = String::new();
        for entry in WalkDir::new(&root).sort_by_file_name().into_iter().flatten() {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(rel) = entry.path().strip_prefix(&root) else {
                continue;
            };
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            let mtime = FileTime::from_last_modification_time(&meta);
            let rel = rel.to_string_lossy().replace('\\', "/");
            out.push_str(&format!(
                "{}\t{}.{:09}\t{}\n",
                rel,
                mtime.unix_seconds(),
                mtime.nanoseconds(),
                meta.len()
            ));
        }
        if agent == AgentKind::Claude {
            out.push_str(&project_roots(&root));
        }
        Ok(out)
    }

    fn copy(&self, host: &str, remote_path: &str, local_path: &Path) -> Result<(), TransportError> {
        let home = self.home(host)?;
        let source = home.join(remote_path);
        if !source.is_file() {
            return Err(TransportError::Failed {
                program: "rsync".to_string(),
                stderr: format!("link_stat \"{}\" failed: No such file or directory", remote_path),
            });
        }

        if let Some(parent) = local_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(&source, local_path)?;
        let meta = std::fs::metadata(&source)?;
        filetime::set_file_mtime(local_path, FileTime::from_last_modification_time(&meta))?;

        self.copies.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// `#cwd` lines as `grep -m1 -o '"cwd":"[^"]*"'` on each dir's first session file prints them.
fn project_roots(root: &Path) -> String {
    let Ok(dirs) = std::fs::read_dir(root) else {
        return String::new();
    };
    let mut dirs: Vec<PathBuf> = dirs.flatten().map(|e| e.path()).filter(|p| p.is_dir()).collect();
    dirs.sort();

    let mut out = String::new();
    for dir in dirs {
        let Ok(files) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut files: Vec<PathBuf> = files
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "jsonl"))
            .collect();
        files.sort();
        let Some(first) = files.first() else {
            continue;
        };
        let text = std::fs::read_to_string(first).unwrap_or_default();
        let fragment = text.lines().take(10).find_map(cwd_fragment).unwrap_or_default();
        let name = dir.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        out.push_str(&format!("{}\t{}\t{}\n", CWD_MARKER, name, fragment));
    }
    out
}

fn cwd_fragment(line: &str) -> Option<&str> {
    const KEY: &str = "\"cwd\":\"";
    let start = line.find(KEY)?;
    let value_len = line[start + KEY.len()..].find('"')?;
    Some(&line[start..start + KEY.len() + value_len + 1])
}
