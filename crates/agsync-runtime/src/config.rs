use agsync_providers::MountConventions;
use agsync_types::Source;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A remote host saved with `remote add`; part of every `--ah` scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedRemote {
    pub host: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Contents of `config.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remotes: Vec<SavedRemote>,
    /// Overrides the platform's mount probing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mounts: Option<MountConventions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_jobs: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn add_remote(&mut self, host: &str, label: Option<String>) -> Result<&SavedRemote> {
        let host = host.trim();
        if host.is_empty() {
            return Err(Error::Config("remote host must not be empty".to_string()));
        }
        if self.remotes.iter().any(|r| r.host == host) {
            return Err(Error::already_exists("Remote", host));
        }

        self.remotes.push(SavedRemote {
            host: host.to_string(),
            label,
            added_at: Utc::now(),
        });
        Ok(&self.remotes[self.remotes.len() - 1])
    }

    pub fn remove_remote(&mut self, host: &str) -> Result<SavedRemote> {
        let index = self
            .remotes
            .iter()
            .position(|r| r.host == host)
            .ok_or_else(|| Error::not_found("Remote", host))?;
        Ok(self.remotes.remove(index))
    }

    /// Saved remotes in the order they were added.
    pub fn remote_sources(&self) -> Vec<Source> {
        self.remotes.iter().map(|r| Source::remote(&r.host)).collect()
    }

    pub fn mount_conventions(&self) -> MountConventions {
        self.mounts.clone().unwrap_or_default()
    }

    pub fn jobs(&self) -> usize {
        self.default_jobs.unwrap_or(1).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.remotes.is_empty());
        assert_eq!(config.jobs(), 1);
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.json");

        let mut config = Config::default();
        config.add_remote("vm01", Some("build box".to_string()))?;
        config.default_jobs = Some(4);
        config.save_to(&config_path)?;

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.remote_sources(), vec![Source::remote("vm01")]);
        assert_eq!(loaded.jobs(), 4);

        Ok(())
    }

    #[test]
    fn test_remote_registry_errors() {
        let mut config = Config::default();
        config.add_remote("vm01", None).unwrap();

        assert!(matches!(
            config.add_remote("vm01", None),
            Err(Error::AlreadyExists { .. })
        ));
        assert!(matches!(
            config.remove_remote("vm02"),
            Err(Error::NotFound { .. })
        ));
        assert_eq!(config.remove_remote("vm01").unwrap().host, "vm01");
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config = Config::load_from(&temp_dir.path().join("nonexistent.json"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_invalid_json_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("config.json"));
    }
}
