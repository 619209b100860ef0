// Scope resolution and batch orchestration
// Resolves a scope request against live source listings, then exports or
// syncs the resulting sessions on a bounded worker pool.

pub mod config;
mod error;
pub mod ops;
pub mod oracle;
pub mod registry;
pub mod resolver;
pub mod runner;
mod workspace;

pub use config::{Config, SavedRemote};
pub use error::{Error, Result};
pub use ops::{ExportOptions, OutputLayout, OutputPolicy, SyncOptions};
pub use oracle::{Decision, decide};
pub use registry::{Alias, AliasDocument, AliasMember, AliasRegistry};
pub use resolver::{Resolution, ScopeResolver, SourceWarning};
pub use runner::{ActionOutcome, ActionRunner, FailedItem, ProgressEvent, RunSummary};
pub use workspace::{AgSync, RunReport};

// Re-exported for the CLI
pub use agsync_index::{GroupBy, MetricsSummary, SummaryFilter};
