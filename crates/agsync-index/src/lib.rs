// SQLite metrics store
// A derived cache keyed by (source, file path); the session files stay the source of truth.

mod db;
mod error;
mod queries;
mod records;
mod schema;

// Public API
pub use db::Database;
pub use error::{Error, Result};
pub use records::{GroupBy, MetricsSummary, SessionMetricsRecord, SummaryFilter, SyncedFile};
pub use schema::SCHEMA_VERSION;
