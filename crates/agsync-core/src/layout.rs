use std::path::{Path, PathBuf};

pub const METRICS_DB: &str = "metrics.db";
pub const CONFIG_JSON: &str = "config.json";
pub const ALIASES_JSON: &str = "aliases.json";
/// Older releases called aliases "projects"
pub const LEGACY_ALIASES_JSON: &str = "projects.json";
pub const HASH_INDEX: &str = "hash_index.jsonl";

/// Where each piece of persisted state lives under the config root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateLayout {
    root: PathBuf,
}

impl StateLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn metrics_db(&self) -> PathBuf {
        self.root.join(METRICS_DB)
    }

    pub fn config_json(&self) -> PathBuf {
        self.root.join(CONFIG_JSON)
    }

    pub fn aliases_json(&self) -> PathBuf {
        self.root.join(ALIASES_JSON)
    }

    pub fn hash_index(&self) -> PathBuf {
        self.root.join(HASH_INDEX)
    }

    pub fn ensure_root(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }
}
