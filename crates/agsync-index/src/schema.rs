use rusqlite::Connection;

use crate::Result;

// Schema version (increment when changing table definitions)
pub const SCHEMA_VERSION: i32 = 1;

// Rows are derived from session files and can always be rebuilt by a forced
// sync, so a version mismatch drops everything instead of migrating.
//
// `synced_mtime` is stored as RFC 3339 with nanoseconds so that a round trip
// through the table compares equal to the listing's modification time.

pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != SCHEMA_VERSION {
        if current_version != 0 {
            tracing::info!(
                from = current_version,
                to = SCHEMA_VERSION,
                "metrics schema changed, rebuilding"
            );
        }
        drop_all_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS session_metrics (
            source_key TEXT NOT NULL,
            file_path TEXT NOT NULL,
            agent TEXT NOT NULL,
            session_id TEXT NOT NULL,
            workspace TEXT NOT NULL,
            encoded_name TEXT NOT NULL,
            synced_mtime TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            message_count INTEGER NOT NULL,
            user_messages INTEGER NOT NULL,
            assistant_messages INTEGER NOT NULL,
            tool_calls INTEGER NOT NULL,
            input_tokens INTEGER NOT NULL,
            output_tokens INTEGER NOT NULL,
            first_ts TEXT,
            last_ts TEXT,
            synced_at TEXT NOT NULL,
            PRIMARY KEY (source_key, file_path)
        );

        CREATE INDEX IF NOT EXISTS idx_metrics_workspace ON session_metrics(workspace);
        CREATE INDEX IF NOT EXISTS idx_metrics_last_ts ON session_metrics(last_ts DESC);
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;

    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS session_metrics;
        "#,
    )?;
    Ok(())
}
