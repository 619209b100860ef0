use std::fs;
use std::path::{Path, PathBuf};

use crate::layout::{
    ALIASES_JSON, CONFIG_JSON, HASH_INDEX, LEGACY_ALIASES_JSON, METRICS_DB, StateLayout,
};
use crate::{Error, Result};

/// (file name in the legacy root, file name in the current root)
const MIGRATED_FILES: &[(&str, &str)] = &[
    (METRICS_DB, METRICS_DB),
    (CONFIG_JSON, CONFIG_JSON),
    (ALIASES_JSON, ALIASES_JSON),
    (LEGACY_ALIASES_JSON, ALIASES_JSON),
    (HASH_INDEX, HASH_INDEX),
];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Files left behind because the current root already had them
    pub kept: Vec<PathBuf>,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty() && self.kept.is_empty()
    }
}

/// Move state from a legacy root into the current layout.
///
/// Runs once: files are moved, so a second call finds nothing to do. Files
/// that already exist in the current root are never overwritten.
pub fn migrate_legacy_root(legacy: &Path, current: &StateLayout) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();

    if !legacy.is_dir() || same_dir(legacy, current.root()) {
        return Ok(report);
    }

    for (from_name, to_name) in MIGRATED_FILES {
        let from = legacy.join(from_name);
        if !from.is_file() {
            continue;
        }

        let to = current.root().join(to_name);
        if to.exists() {
            tracing::warn!(
                legacy = %from.display(),
                current = %to.display(),
                "legacy file not migrated: destination already exists"
            );
            report.kept.push(from);
            continue;
        }

        current.ensure_root()?;
        move_file(&from, &to).map_err(|source| Error::Migration {
            path: from.clone(),
            source,
        })?;
        tracing::info!(from = %from.display(), to = %to.display(), "migrated legacy state");
        report.moved.push((from, to));
    }

    // Only removes the directory when nothing else lives in it.
    let _ = fs::remove_dir(legacy);

    Ok(report)
}

fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(_) => {
            // Cross-device moves fall back to copy + delete.
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
    }
}

fn same_dir(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_moves_known_files() {
        let temp = TempDir::new().unwrap();
        let legacy = temp.path().join(".agsync");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("config.json"), "{}").unwrap();
        fs::write(legacy.join("projects.json"), "{\"aliases\":{}}").unwrap();

        let current = StateLayout::new(temp.path().join("config/agsync"));
        let report = migrate_legacy_root(&legacy, &current).unwrap();

        assert_eq!(report.moved.len(), 2);
        assert!(current.config_json().exists());
        assert!(current.aliases_json().exists());
        assert!(!legacy.exists());
    }

    #[test]
    fn test_second_run_is_noop() {
        let temp = TempDir::new().unwrap();
        let legacy = temp.path().join(".agsync");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("metrics.db"), "").unwrap();

        let current = StateLayout::new(temp.path().join("new"));
        migrate_legacy_root(&legacy, &current).unwrap();
        let second = migrate_legacy_root(&legacy, &current).unwrap();

        assert!(second.is_empty());
        assert!(current.metrics_db().exists());
    }

    #[test]
    fn test_never_overwrites_current_state() {
        let temp = TempDir::new().unwrap();
        let legacy = temp.path().join(".agsync");
        fs::create_dir_all(&legacy).unwrap();
        fs::write(legacy.join("config.json"), "old").unwrap();

        let current = StateLayout::new(temp.path().join("new"));
        current.ensure_root().unwrap();
        fs::write(current.config_json(), "new").unwrap();

        let report = migrate_legacy_root(&legacy, &current).unwrap();

        assert!(report.moved.is_empty());
        assert_eq!(report.kept.len(), 1);
        assert_eq!(fs::read_to_string(current.config_json()).unwrap(), "new");
    }

    #[test]
    fn test_same_root_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join(".agsync");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("config.json"), "{}").unwrap();

        let report = migrate_legacy_root(&root, &StateLayout::new(&root)).unwrap();
        assert!(report.is_empty());
        assert!(root.join("config.json").exists());
    }
}
