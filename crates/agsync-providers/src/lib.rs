// Source adapters
// One closed enum over the four backends; every listing, fetch and naming
// decision matches it exhaustively.

pub mod adapter;
pub mod claude;
pub mod error;
mod fs;
pub mod gemini;
pub mod hash_index;
pub mod layout;
pub mod mounts;
pub mod probe;
pub mod remote;
pub mod traits;
pub mod transcript;

pub use adapter::{Adapter, AdapterEnv};
pub use error::{Error, Result};
pub use fs::FsAdapter;
pub use hash_index::HashIndex;
pub use mounts::MountConventions;
pub use probe::{SessionProbe, probe_session};
pub use remote::{RemoteAdapter, SshTransport, Transport, TransportError};
pub use traits::SourceAdapter;
pub use transcript::{Role, Transcript, TranscriptMessage, parse_transcript};
