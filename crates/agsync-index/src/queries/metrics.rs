use rusqlite::{Connection, OptionalExtension, params};

use crate::{
    Result,
    records::{SessionMetricsRecord, SyncedFile},
};

pub fn upsert(conn: &Connection, record: &SessionMetricsRecord) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO session_metrics (source_key, file_path, agent, session_id, workspace, encoded_name,
                                     synced_mtime, size_bytes, message_count, user_messages,
                                     assistant_messages, tool_calls, input_tokens, output_tokens,
                                     first_ts, last_ts, synced_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
        ON CONFLICT(source_key, file_path) DO UPDATE SET
            agent = ?3,
            session_id = ?4,
            workspace = ?5,
            encoded_name = ?6,
            synced_mtime = ?7,
            size_bytes = ?8,
            message_count = ?9,
            user_messages = ?10,
            assistant_messages = ?11,
            tool_calls = ?12,
            input_tokens = ?13,
            output_tokens = ?14,
            first_ts = ?15,
            last_ts = ?16,
            synced_at = ?17
        "#,
        params![
            &record.source_key,
            &record.file_path,
            &record.agent,
            &record.session_id,
            &record.workspace,
            &record.encoded_name,
            &record.synced_mtime,
            record.size_bytes,
            record.message_count,
            record.user_messages,
            record.assistant_messages,
            record.tool_calls,
            record.input_tokens,
            record.output_tokens,
            &record.first_ts,
            &record.last_ts,
            &record.synced_at,
        ],
    )?;

    Ok(())
}

pub fn get(
    conn: &Connection,
    source_key: &str,
    file_path: &str,
) -> Result<Option<SessionMetricsRecord>> {
    let record = conn
        .query_row(
            r#"
            SELECT source_key, file_path, agent, session_id, workspace, encoded_name, synced_mtime,
                   size_bytes, message_count, user_messages, assistant_messages, tool_calls,
                   input_tokens, output_tokens, first_ts, last_ts, synced_at
            FROM session_metrics
            WHERE source_key = ?1 AND file_path = ?2
            "#,
            params![source_key, file_path],
            |row| {
                Ok(SessionMetricsRecord {
                    source_key: row.get(0)?,
                    file_path: row.get(1)?,
                    agent: row.get(2)?,
                    session_id: row.get(3)?,
                    workspace: row.get(4)?,
                    encoded_name: row.get(5)?,
                    synced_mtime: row.get(6)?,
                    size_bytes: row.get(7)?,
                    message_count: row.get(8)?,
                    user_messages: row.get(9)?,
                    assistant_messages: row.get(10)?,
                    tool_calls: row.get(11)?,
                    input_tokens: row.get(12)?,
                    output_tokens: row.get(13)?,
                    first_ts: row.get(14)?,
                    last_ts: row.get(15)?,
                    synced_at: row.get(16)?,
                })
            },
        )
        .optional()?;

    Ok(record)
}

pub fn synced_files(conn: &Connection) -> Result<Vec<SyncedFile>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT source_key, file_path, synced_mtime
        FROM session_metrics
        ORDER BY source_key, file_path
        "#,
    )?;

    let files = stmt
        .query_map([], |row| {
            Ok(SyncedFile {
                source_key: row.get(0)?,
                file_path: row.get(1)?,
                synced_mtime: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(files)
}

pub fn count(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM session_metrics", [], |row| row.get(0))?;
    Ok(count as usize)
}
