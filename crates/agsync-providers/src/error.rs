use agsync_types::Source;
use std::path::PathBuf;
use thiserror::Error;

use crate::remote::TransportError;

/// Result type for agsync-providers operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the provider layer
#[derive(Debug, Error)]
pub enum Error {
    /// A whole source could not be reached or read (mount missing, SSH failure)
    #[error("source {origin} unavailable: {reason}")]
    SourceUnavailable { origin: Source, reason: String },

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A session file could not be decoded
    #[error("Failed to parse {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Copying a remote file failed after the listing succeeded
    #[error("Failed to fetch {remote_path} from {host}: {source}")]
    Fetch {
        host: String,
        remote_path: String,
        #[source]
        source: TransportError,
    },
}

impl Error {
    pub fn unavailable(origin: &Source, reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            origin: origin.clone(),
            reason: reason.into(),
        }
    }

    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Error::SourceUnavailable { .. })
    }
}
