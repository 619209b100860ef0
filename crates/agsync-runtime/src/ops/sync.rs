use agsync_index::{Database, SessionMetricsRecord};
use agsync_providers::{Role, Transcript};
use agsync_types::Session;
use chrono::{DateTime, SecondsFormat, Utc};
use crossbeam_channel::Sender;
use std::collections::HashMap;
use std::path::Path;

use super::export::load_transcript;
use crate::oracle::{Decision, decide, format_stamp, parse_stamp};
use crate::resolver::Resolution;
use crate::runner::{ActionOutcome, ActionRunner, ProgressEvent, RunSummary};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub force: bool,
    pub jobs: usize,
}

struct WriteRequest {
    record: SessionMetricsRecord,
    ack: Sender<std::result::Result<(), String>>,
}

/// Metrics row for one parsed session.
pub fn compute_metrics(
    session: &Session,
    transcript: &Transcript,
    synced_at: DateTime<Utc>,
) -> SessionMetricsRecord {
    let ts = |t: DateTime<Utc>| t.to_rfc3339_opts(SecondsFormat::Millis, true);

    SessionMetricsRecord {
        source_key: session.source().key(),
        file_path: session.file_path.to_string_lossy().to_string(),
        agent: session.workspace.agent.to_string(),
        session_id: session.session_id.clone(),
        workspace: session.workspace.display_path.to_string(),
        encoded_name: session.workspace.encoded_name.clone(),
        synced_mtime: format_stamp(session.mtime),
        size_bytes: session.size_bytes as i64,
        message_count: transcript.messages.len() as i64,
        user_messages: transcript.count(Role::User) as i64,
        assistant_messages: transcript.count(Role::Assistant) as i64,
        tool_calls: transcript.tool_call_count() as i64,
        input_tokens: transcript.input_tokens as i64,
        output_tokens: transcript.output_tokens as i64,
        first_ts: transcript.first_timestamp().map(ts),
        last_ts: transcript.last_timestamp().map(ts),
        synced_at: ts(synced_at),
    }
}

/// Upsert metrics for every resolved session whose file changed since it was
/// last synced.
///
/// Workers parse in parallel; a single writer thread owns the connection and
/// acknowledges each upsert so failures land on the right session.
pub fn sync_metrics<P>(
    db_path: &Path,
    resolution: &Resolution,
    options: &SyncOptions,
    cache_root: &Path,
    progress: P,
) -> Result<RunSummary>
where
    P: Fn(ProgressEvent<'_>) + Sync,
{
    let db = Database::open(db_path)?;
    let synced: HashMap<(String, String), DateTime<Utc>> = db
        .synced_files()?
        .into_iter()
        .filter_map(|f| {
            parse_stamp(&f.synced_mtime).map(|mtime| ((f.source_key, f.file_path), mtime))
        })
        .collect();
    tracing::debug!(rows = synced.len(), "loaded sync state");

    let runner = ActionRunner::new(options.jobs);
    let (tx, rx) = crossbeam_channel::unbounded::<WriteRequest>();
    let synced_at = Utc::now();

    std::thread::scope(|scope| {
        let tx = tx;
        let writer = scope.spawn(move || {
            let mut written = 0usize;
            for request in rx {
                let result = db
                    .upsert_session_metrics(&request.record)
                    .map_err(|e| e.to_string());
                if result.is_ok() {
                    written += 1;
                }
                let _ = request.ack.send(result);
            }
            tracing::debug!(written, "metrics writer finished");
        });

        let summary = runner.run(
            &resolution.sessions,
            Session::label,
            |session| {
                let key = (
                    session.source().key(),
                    session.file_path.to_string_lossy().to_string(),
                );
                if decide(session.mtime, synced.get(&key).copied(), options.force) == Decision::Skip {
                    return ActionOutcome::Skipped;
                }

                let transcript = match resolution.adapter(session.source()) {
                    Some(adapter) => load_transcript(adapter, session, cache_root),
                    None => Err(Error::unavailable(session.source(), "source was not listed")),
                };
                let record = match transcript {
                    Ok(transcript) => compute_metrics(session, &transcript, synced_at),
                    Err(err) => return ActionOutcome::Failure(err.to_string()),
                };

                let (ack_tx, ack_rx) = crossbeam_channel::bounded(1);
                if tx.send(WriteRequest { record, ack: ack_tx }).is_err() {
                    return ActionOutcome::Failure("metrics writer stopped".to_string());
                }
                match ack_rx.recv() {
                    Ok(Ok(())) => ActionOutcome::Success,
                    Ok(Err(reason)) => ActionOutcome::Failure(reason),
                    Err(_) => ActionOutcome::Failure("metrics writer stopped".to_string()),
                }
            },
            progress,
        );

        drop(tx);
        writer
            .join()
            .map_err(|_| Error::Writer("metrics writer panicked".to_string()))?;
        summary
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agsync_providers::TranscriptMessage;
    use agsync_types::{AgentKind, DisplayPath, Source, Workspace};
    use chrono::TimeZone;

    #[test]
    fn test_compute_metrics() {
        let t0 = Utc.with_ymd_and_hms(2025, 11, 15, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 11, 15, 9, 5, 0).unwrap();
        let session = Session {
            workspace: Workspace {
                source: Source::subsystem("Ubuntu"),
                agent: AgentKind::Gemini,
                encoded_name: "ab".repeat(32),
                display_path: DisplayPath::unresolved("ab".repeat(32)),
                root_dir: "/tmp".into(),
            },
            session_id: "g1".into(),
            file_path: "/mnt/x/session-1.json".into(),
            mtime: t1,
            size_bytes: 42,
            message_count_hint: Some(2),
        };
        let message = |role, ts, tools: &[&str]| TranscriptMessage {
            role,
            timestamp: Some(ts),
            text: "x".into(),
            tool_calls: tools.iter().map(|s| s.to_string()).collect(),
        };
        let transcript = Transcript {
            session_id: Some("g1".into()),
            cwd: None,
            messages: vec![
                message(Role::User, t0, &[]),
                message(Role::Assistant, t1, &["read_file", "shell"]),
            ],
            input_tokens: 5,
            output_tokens: 7,
        };

        let record = compute_metrics(&session, &transcript, t1);
        assert_eq!(record.source_key, "wsl:Ubuntu");
        assert_eq!(record.agent, "gemini");
        assert!(record.workspace.starts_with("unresolved:"));
        assert_eq!(record.message_count, 2);
        assert_eq!(record.user_messages, 1);
        assert_eq!(record.tool_calls, 2);
        assert_eq!(record.first_ts.as_deref(), Some("2025-11-15T09:00:00.000Z"));
        assert_eq!(parse_stamp(&record.synced_mtime), Some(t1));
    }
}
