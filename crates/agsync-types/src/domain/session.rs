use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{Source, Workspace};

/// One conversation log file, as discovered in a listing pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub workspace: Workspace,
    pub session_id: String,
    /// Path as the owning source sees it
    pub file_path: PathBuf,
    pub mtime: DateTime<Utc>,
    pub size_bytes: u64,
    /// `None` when the listing could not count messages cheaply (remote sources)
    pub message_count_hint: Option<u64>,
}

/// Dedup key: the same file seen through two sources is two sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionKey {
    pub source: Source,
    pub file_path: PathBuf,
}

impl Session {
    pub fn key(&self) -> SessionKey {
        SessionKey {
            source: self.workspace.source.clone(),
            file_path: self.file_path.clone(),
        }
    }

    pub fn source(&self) -> &Source {
        &self.workspace.source
    }

    /// Short label for progress and failure reports.
    pub fn label(&self) -> String {
        format!(
            "{} {} {}",
            self.workspace.source, self.workspace.display_path, self.session_id
        )
    }
}
