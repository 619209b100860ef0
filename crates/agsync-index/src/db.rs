use rusqlite::Connection;
use std::path::Path;

use crate::{
    Result, queries,
    records::{GroupBy, MetricsSummary, SessionMetricsRecord, SummaryFilter, SyncedFile},
    schema,
};

/// Handle to the metrics database.
///
/// Not `Sync`: writes go through a single owner, readers open their own handle.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn init_schema(&self) -> Result<()> {
        schema::init_schema(&self.conn)
    }

    // Metrics operations

    pub fn upsert_session_metrics(&self, record: &SessionMetricsRecord) -> Result<()> {
        queries::metrics::upsert(&self.conn, record)
    }

    pub fn get_session_metrics(
        &self,
        source_key: &str,
        file_path: &str,
    ) -> Result<Option<SessionMetricsRecord>> {
        queries::metrics::get(&self.conn, source_key, file_path)
    }

    pub fn synced_files(&self) -> Result<Vec<SyncedFile>> {
        queries::metrics::synced_files(&self.conn)
    }

    pub fn count_sessions(&self) -> Result<usize> {
        queries::metrics::count(&self.conn)
    }

    // Aggregation

    pub fn summarize(&self, group_by: GroupBy, filter: &SummaryFilter) -> Result<Vec<MetricsSummary>> {
        queries::summary::summarize(&self.conn, group_by, filter)
    }

    // Utility operations

    pub fn vacuum(&self) -> Result<()> {
        self.conn.execute("VACUUM", [])?;
        Ok(())
    }
}
