use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::{AgentKind, Source};
use crate::util::encode_project_path;

const UNRESOLVED_PREFIX: &str = "unresolved:";

/// Human-readable project path of a workspace.
///
/// Hash-indexed layouts cannot always recover the path; those workspaces keep
/// the hash and render as `unresolved:<hash>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DisplayPath {
    Resolved(String),
    Unresolved { hash: String },
}

impl DisplayPath {
    pub fn unresolved(hash: impl Into<String>) -> Self {
        DisplayPath::Unresolved { hash: hash.into() }
    }

    pub fn resolved(&self) -> Option<&str> {
        match self {
            DisplayPath::Resolved(path) => Some(path),
            DisplayPath::Unresolved { .. } => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, DisplayPath::Resolved(_))
    }
}

impl fmt::Display for DisplayPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayPath::Resolved(path) => f.write_str(path),
            DisplayPath::Unresolved { hash } => write!(f, "{}{}", UNRESOLVED_PREFIX, hash),
        }
    }
}

impl From<DisplayPath> for String {
    fn from(path: DisplayPath) -> Self {
        path.to_string()
    }
}

impl From<String> for DisplayPath {
    fn from(s: String) -> Self {
        match s.strip_prefix(UNRESOLVED_PREFIX) {
            Some(hash) => DisplayPath::unresolved(hash),
            None => DisplayPath::Resolved(s),
        }
    }
}

/// One project root as seen through one source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Workspace {
    pub source: Source,
    pub agent: AgentKind,
    /// On-disk directory name: path-encoded or a content hash
    pub encoded_name: String,
    pub display_path: DisplayPath,
    /// Directory holding the session files, as the source sees it
    pub root_dir: PathBuf,
}

/// Identity of a workspace; unique per source and agent layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkspaceKey {
    pub source: Source,
    pub agent: AgentKind,
    pub encoded_name: String,
}

impl Workspace {
    pub fn key(&self) -> WorkspaceKey {
        WorkspaceKey {
            source: self.source.clone(),
            agent: self.agent,
            encoded_name: self.encoded_name.clone(),
        }
    }

    /// Directory-safe name used for export output.
    pub fn slug(&self) -> String {
        match &self.display_path {
            DisplayPath::Resolved(path) => encode_project_path(path),
            DisplayPath::Unresolved { .. } => self.encoded_name.clone(),
        }
    }

    /// `slug` with the source's cache prefix, so outputs never collide across sources.
    pub fn namespaced_slug(&self) -> String {
        match self.source.cache_prefix() {
            Some(prefix) => format!("{}{}", prefix, self.slug()),
            None => self.slug(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claude_workspace(source: Source, path: &str) -> Workspace {
        Workspace {
            source,
            agent: AgentKind::Claude,
            encoded_name: encode_project_path(path),
            display_path: DisplayPath::Resolved(path.to_string()),
            root_dir: PathBuf::from("/tmp"),
        }
    }

    #[test]
    fn test_unresolved_display() {
        let path = DisplayPath::unresolved("abc123");
        assert_eq!(path.to_string(), "unresolved:abc123");
        assert_eq!(DisplayPath::from("unresolved:abc123".to_string()), path);
    }

    #[test]
    fn test_display_path_serializes_as_string() {
        let json = serde_json::to_string(&DisplayPath::unresolved("ff")).unwrap();
        assert_eq!(json, "\"unresolved:ff\"");
    }

    #[test]
    fn test_namespaced_slug() {
        let local = claude_workspace(Source::Local, "/home/me/proj");
        assert_eq!(local.namespaced_slug(), "-home-me-proj");

        let remote = claude_workspace(Source::remote("vm01"), "/home/me/proj");
        assert_eq!(remote.namespaced_slug(), "remote_vm01_-home-me-proj");
    }

    #[test]
    fn test_key_distinguishes_sources() {
        let a = claude_workspace(Source::Local, "/home/me/proj");
        let b = claude_workspace(Source::remote("vm01"), "/home/me/proj");
        assert_ne!(a.key(), b.key());
        assert_eq!(a.display_path, b.display_path);
    }
}
