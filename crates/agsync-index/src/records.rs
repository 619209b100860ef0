use serde::Serialize;

/// Metrics computed from one session file.
///
/// Keyed by `(source_key, file_path)`; the same session id seen through two
/// sources produces two rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMetricsRecord {
    /// Source key (`local`, `wsl:Ubuntu`, `remote:vm01`, ...).
    pub source_key: String,
    /// Path of the session file as listed by its source.
    pub file_path: String,
    /// Agent name (claude, gemini).
    pub agent: String,
    pub session_id: String,
    /// Display path of the workspace (`unresolved:<hash>` when unknown).
    pub workspace: String,
    pub encoded_name: String,
    /// Modification time the metrics were computed from (RFC 3339, nanoseconds).
    pub synced_mtime: String,
    pub size_bytes: i64,
    pub message_count: i64,
    pub user_messages: i64,
    pub assistant_messages: i64,
    pub tool_calls: i64,
    pub input_tokens: i64,
    pub output_tokens: i64,
    /// Timestamp of the first message (RFC 3339), if any message had one.
    pub first_ts: Option<String>,
    pub last_ts: Option<String>,
    pub synced_at: String,
}

/// The incrementality key and stamp of a stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedFile {
    pub source_key: String,
    pub file_path: String,
    pub synced_mtime: String,
}

/// Aggregation axis for [`MetricsSummary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Workspace,
    Source,
    Agent,
}

impl GroupBy {
    pub(crate) fn column(self) -> &'static str {
        match self {
            GroupBy::Workspace => "workspace",
            GroupBy::Source => "source_key",
            GroupBy::Agent => "agent",
        }
    }
}

/// Restricts which rows are aggregated.
///
/// `since`/`until` are `YYYY-MM-DD` and compared against the date of the last
/// activity, inclusively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryFilter {
    pub since: Option<String>,
    pub until: Option<String>,
    pub source_keys: Option<Vec<String>>,
}

/// Aggregated metrics for one group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSummary {
    pub group: String,
    pub sessions: i64,
    pub messages: i64,
    pub user_messages: i64,
    pub assistant_messages: i64,
    pub tool_calls: i64,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub first_activity: Option<String>,
    pub last_activity: Option<String>,
}
