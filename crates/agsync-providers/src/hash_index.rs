use agsync_types::{DisplayPath, project_hash_from_root};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::Result;

// NOTE: hash index design
//
// Gemini names project directories by sha256(project path) and never stores the
// path itself. The only way back to a readable path is to remember every path
// we have seen hash to a given value. The file is JSON lines, one binding per
// line, appended and never rewritten: the first path recorded for a hash keeps
// it for good, including when a file holds duplicate lines.

#[derive(Debug, Serialize, Deserialize)]
struct HashIndexEntry {
    hash: String,
    path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recorded_at: Option<DateTime<Utc>>,
}

/// Append-only `hash -> project path` side table.
#[derive(Debug, Default)]
pub struct HashIndex {
    file: Option<PathBuf>,
    entries: RwLock<HashMap<String, String>>,
}

impl HashIndex {
    /// Load the index from a JSON-lines file. A missing file is an empty index.
    pub fn open(file: &Path) -> Result<Self> {
        let mut entries = HashMap::new();

        if file.exists() {
            let reader = BufReader::new(std::fs::File::open(file)?);
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<HashIndexEntry>(&line) {
                    Ok(entry) => {
                        entries.entry(entry.hash).or_insert(entry.path);
                    }
                    Err(err) => {
                        tracing::warn!(
                            file = %file.display(),
                            line = line_no + 1,
                            error = %err,
                            "skipping malformed hash index line"
                        );
                    }
                }
            }
        }

        Ok(Self {
            file: Some(file.to_path_buf()),
            entries: RwLock::new(entries),
        })
    }

    /// Index that lives only for this process.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn lookup(&self, hash: &str) -> Option<String> {
        self.read().get(hash).cloned()
    }

    /// Display path for a hash, or the explicit unresolved placeholder.
    pub fn resolve(&self, hash: &str) -> DisplayPath {
        match self.lookup(hash) {
            Some(path) => DisplayPath::Resolved(path),
            None => DisplayPath::unresolved(hash),
        }
    }

    /// Bind `hash` to `path` unless it is already bound. Returns whether a line was appended.
    pub fn record(&self, hash: &str, path: &str) -> Result<bool> {
        let mut entries = self.write();
        if entries.contains_key(hash) {
            return Ok(false);
        }

        if let Some(file) = &self.file {
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let entry = HashIndexEntry {
                hash: hash.to_string(),
                path: path.to_string(),
                recorded_at: Some(Utc::now()),
            };
            let line = serde_json::to_string(&entry).map_err(std::io::Error::other)?;
            let mut out = OpenOptions::new().create(true).append(true).open(file)?;
            writeln!(out, "{}", line)?;
        }

        entries.insert(hash.to_string(), path.to_string());
        tracing::debug!(hash, path, "recorded project hash");
        Ok(true)
    }

    /// Hash each candidate path and record those whose hash is present on disk.
    ///
    /// Hashes that no workspace uses are not recorded, so the file only grows
    /// with bindings that resolve something.
    pub fn learn<'a, I>(&self, present: &HashSet<String>, candidates: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut learned = 0;
        for candidate in candidates {
            let hash = project_hash_from_root(candidate);
            if present.contains(&hash) && self.record(&hash, candidate)? {
                learned += 1;
            }
        }
        Ok(learned)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, String>> {
        self.entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, String>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
