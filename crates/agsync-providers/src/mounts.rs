use agsync_types::{AgentKind, Source};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Windows profile directories that never belong to a real user.
const SYSTEM_PROFILES: &[&str] = &["Default", "Public", "All Users", "Default User"];

/// Where cross-OS mounts are probed.
///
/// From Windows, Linux distros appear under `\\wsl.localhost\<distro>` (or the
/// older `\\wsl$\<distro>`); from inside WSL, Windows profiles live under
/// `/mnt/c/Users`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountConventions {
    #[serde(default)]
    pub wsl_roots: Vec<PathBuf>,
    #[serde(default)]
    pub windows_users_root: Option<PathBuf>,
}

impl Default for MountConventions {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl MountConventions {
    pub fn platform_default() -> Self {
        let wsl_roots = if cfg!(windows) {
            vec![
                PathBuf::from(r"\\wsl.localhost"),
                PathBuf::from(r"\\wsl$"),
            ]
        } else {
            Vec::new()
        };

        let windows_users_root = if is_wsl() {
            Some(PathBuf::from("/mnt/c/Users"))
        } else {
            None
        };

        Self {
            wsl_roots,
            windows_users_root,
        }
    }

    /// Home directory of the first user in `distro` that has agent logs.
    ///
    /// Mount roots are tried in order; the first hit wins.
    pub fn subsystem_home(&self, distro: &str) -> Option<PathBuf> {
        self.wsl_roots.iter().find_map(|root| {
            let homes = root.join(distro).join("home");
            sorted_dirs(&homes)
                .into_iter()
                .find(|(_, path)| has_agent_data(path))
                .map(|(_, path)| path)
        })
    }

    pub fn host_mount_home(&self, user: &str) -> Option<PathBuf> {
        let home = self.windows_users_root.as_ref()?.join(user);
        home.is_dir().then_some(home)
    }

    /// Distros reachable through any WSL mount root that hold agent logs.
    pub fn detect_subsystems(&self) -> Vec<Source> {
        let mut found: Vec<Source> = Vec::new();
        for root in &self.wsl_roots {
            for (name, _) in sorted_dirs(root) {
                let source = Source::subsystem(&name);
                if !found.contains(&source) && self.subsystem_home(&name).is_some() {
                    tracing::debug!(distro = %name, root = %root.display(), "detected subsystem");
                    found.push(source);
                }
            }
        }
        found
    }

    /// Windows users (seen from WSL) whose profile holds agent logs.
    pub fn detect_host_mounts(&self) -> Vec<Source> {
        let Some(root) = &self.windows_users_root else {
            return Vec::new();
        };

        sorted_dirs(root)
            .into_iter()
            .filter(|(name, _)| !SYSTEM_PROFILES.contains(&name.as_str()))
            .filter(|(_, path)| has_agent_data(path))
            .map(|(name, _)| {
                tracing::debug!(user = %name, "detected windows profile");
                Source::host_mount(name)
            })
            .collect()
    }

    pub fn detect(&self) -> Vec<Source> {
        let mut sources = self.detect_subsystems();
        sources.extend(self.detect_host_mounts());
        sources
    }
}

fn has_agent_data(home: &Path) -> bool {
    AgentKind::ALL
        .iter()
        .any(|agent| home.join(agent.home_relative_root()).is_dir())
}

fn sorted_dirs(dir: &Path) -> Vec<(String, PathBuf)> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut dirs: Vec<(String, PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| (e.file_name().to_string_lossy().to_string(), e.path()))
        .collect();
    dirs.sort();
    dirs
}

/// Check if running inside Windows Subsystem for Linux
#[cfg(target_os = "linux")]
pub fn is_wsl() -> bool {
    std::fs::read_to_string("/proc/version")
        .map(|v| v.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

#[cfg(not(target_os = "linux"))]
pub fn is_wsl() -> bool {
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mkdirs(path: &Path) {
        std::fs::create_dir_all(path).unwrap();
    }

    #[test]
    fn test_detects_first_existing_convention() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("wsl.localhost");
        let legacy = temp.path().join("wsl$");
        mkdirs(&legacy.join("Ubuntu/home/me/.claude/projects"));
        mkdirs(&legacy.join("Debian/home/me"));

        let mounts = MountConventions {
            wsl_roots: vec![missing, legacy.clone()],
            windows_users_root: None,
        };

        assert_eq!(mounts.detect_subsystems(), vec![Source::subsystem("Ubuntu")]);
        assert_eq!(
            mounts.subsystem_home("Ubuntu"),
            Some(legacy.join("Ubuntu/home/me"))
        );
        assert_eq!(mounts.subsystem_home("Debian"), None);
    }

    #[test]
    fn test_host_mounts_skip_system_profiles() {
        let temp = TempDir::new().unwrap();
        let users = temp.path().join("Users");
        mkdirs(&users.join("alice/.gemini/tmp"));
        mkdirs(&users.join("Public/.claude/projects"));
        mkdirs(&users.join("bob"));

        let mounts = MountConventions {
            wsl_roots: Vec::new(),
            windows_users_root: Some(users),
        };

        assert_eq!(mounts.detect_host_mounts(), vec![Source::host_mount("alice")]);
        assert!(mounts.host_mount_home("bob").is_some());
        assert!(mounts.host_mount_home("carol").is_none());
    }
}
