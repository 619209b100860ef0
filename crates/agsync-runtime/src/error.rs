use agsync_types::Source;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for agsync-runtime operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the runtime layer
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input detected before any source is queried
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// Import would overwrite these aliases
    #[error("Aliases already exist: {} (use --force to overwrite)", .0.join(", "))]
    Conflict(Vec<String>),

    /// A source named explicitly on the command line could not be read.
    ///
    /// `scope` is a source key (`remote:vm01`) or, when auto-detection found
    /// nothing, the bare kind (`wsl`).
    #[error("Source {scope} unavailable: {reason}")]
    SourceUnavailable { scope: String, reason: String },

    #[error("Index error: {0}")]
    Index(#[from] agsync_index::Error),

    #[error("Provider error: {0}")]
    Provider(#[from] agsync_providers::Error),

    #[error("{0}")]
    Core(#[from] agsync_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Metrics writer error: {0}")]
    Writer(String),

    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl From<agsync_types::Error> for Error {
    fn from(err: agsync_types::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl Error {
    pub(crate) fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Error::AlreadyExists {
            kind,
            name: name.into(),
        }
    }

    pub(crate) fn unavailable(origin: &Source, reason: impl Into<String>) -> Self {
        Error::SourceUnavailable {
            scope: origin.key(),
            reason: reason.into(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Promote a provider-level unavailability to the runtime variant.
    pub(crate) fn from_provider(err: agsync_providers::Error) -> Self {
        match err {
            agsync_providers::Error::SourceUnavailable { origin, reason } => {
                Error::unavailable(&origin, reason)
            }
            other => Error::Provider(other),
        }
    }
}
