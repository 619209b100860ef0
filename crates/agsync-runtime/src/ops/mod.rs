mod export;
mod render;
mod sync;

pub use export::{ExportOptions, OutputLayout, OutputPolicy, export_session, export_sessions};
pub use render::{MarkdownView, render_markdown};
pub use sync::{SyncOptions, compute_metrics, sync_metrics};
