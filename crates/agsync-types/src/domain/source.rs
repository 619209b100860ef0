use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::util::sanitize_component;
use crate::{Error, Result};

/// Directory-name prefixes reserved for this tool's own caches.
///
/// Workspaces whose encoded name starts with one of these are never listed,
/// otherwise a machine would re-import its own copies of remote data.
pub const CACHE_PREFIXES: &[&str] = &["remote_", "wsl_", "windows_"];

pub fn is_cache_namespace(encoded_name: &str) -> bool {
    CACHE_PREFIXES
        .iter()
        .any(|prefix| encoded_name.starts_with(prefix))
}

/// One backend origin of session data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Source {
    /// The machine agsync runs on
    Local,
    /// A Linux subsystem distro reached from Windows
    Subsystem { distro: String },
    /// A Windows user profile reached from a Linux subsystem
    HostMount { user: String },
    /// Any machine reachable over SSH
    Remote { host: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    Local,
    Subsystem,
    HostMount,
    Remote,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Local => "local",
            SourceKind::Subsystem => "wsl",
            SourceKind::HostMount => "windows",
            SourceKind::Remote => "remote",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Source {
    pub fn remote(host: impl Into<String>) -> Self {
        Source::Remote { host: host.into() }
    }

    pub fn subsystem(distro: impl Into<String>) -> Self {
        Source::Subsystem {
            distro: distro.into(),
        }
    }

    pub fn host_mount(user: impl Into<String>) -> Self {
        Source::HostMount { user: user.into() }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Local => SourceKind::Local,
            Source::Subsystem { .. } => SourceKind::Subsystem,
            Source::HostMount { .. } => SourceKind::HostMount,
            Source::Remote { .. } => SourceKind::Remote,
        }
    }

    /// Stable string key, used in the metrics store and in `--format json` output.
    pub fn key(&self) -> String {
        match self {
            Source::Local => "local".to_string(),
            Source::Subsystem { distro } => format!("wsl:{}", distro),
            Source::HostMount { user } => format!("windows:{}", user),
            Source::Remote { host } => format!("remote:{}", host),
        }
    }

    /// Directory prefix under which this source's cached or exported files live.
    ///
    /// Local data is never namespaced.
    pub fn cache_prefix(&self) -> Option<String> {
        match self {
            Source::Local => None,
            Source::Subsystem { distro } => Some(format!("wsl_{}_", sanitize_component(distro))),
            Source::HostMount { user } => Some(format!("windows_{}_", sanitize_component(user))),
            Source::Remote { host } => Some(format!("remote_{}_", sanitize_component(host))),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Source::Local)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for Source {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s == "local" {
            return Ok(Source::Local);
        }

        let (kind, payload) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidSource(s.to_string()))?;
        if payload.is_empty() {
            return Err(Error::InvalidSource(s.to_string()));
        }

        match kind {
            "wsl" => Ok(Source::subsystem(payload)),
            "windows" => Ok(Source::host_mount(payload)),
            "remote" => Ok(Source::remote(payload)),
            _ => Err(Error::InvalidSource(s.to_string())),
        }
    }
}
