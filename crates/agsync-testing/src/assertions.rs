//! Assertions over the CLI's `--format json` output.

use anyhow::{Context, Result};
use serde_json::Value;

/// Assert the processed/skipped/failed counts of an `export` or `sync` run.
pub fn assert_run_counts(json: &Value, processed: u64, skipped: u64, failed: usize) -> Result<()> {
    let actual_processed = json["processed"]
        .as_u64()
        .context("Expected 'processed' in JSON")?;
    let actual_skipped = json["skipped"].as_u64().context("Expected 'skipped' in JSON")?;
    let actual_failed = json["failed"]
        .as_array()
        .context("Expected 'failed' array in JSON")?
        .len();

    if (actual_processed, actual_skipped, actual_failed) != (processed, skipped, failed) {
        anyhow::bail!(
            "Expected processed={} skipped={} failed={}, got processed={} skipped={} failed={}",
            processed,
            skipped,
            failed,
            actual_processed,
            actual_skipped,
            actual_failed
        );
    }

    Ok(())
}

/// Session ids listed by `list --sessions`, in output order.
pub fn session_ids(json: &Value) -> Result<Vec<String>> {
    let sessions = json["sessions"]
        .as_array()
        .context("Expected 'sessions' array in JSON")?;

    sessions
        .iter()
        .enumerate()
        .map(|(i, s)| {
            s["session_id"]
                .as_str()
                .map(str::to_string)
                .with_context(|| format!("Session {} missing session_id", i))
        })
        .collect()
}

/// Assert `list --sessions` returned exactly these ids, in this order.
pub fn assert_session_ids(json: &Value, expected: &[&str]) -> Result<()> {
    let ids = session_ids(json)?;
    if ids != expected {
        anyhow::bail!("Expected sessions {:?}, got {:?}", expected, ids);
    }
    Ok(())
}

/// Assert a warning was reported for `source` (a source key such as `remote:vm01`).
pub fn assert_warning_for(json: &Value, source: &str) -> Result<()> {
    let warnings = json["warnings"]
        .as_array()
        .context("Expected 'warnings' array in JSON")?;

    if !warnings.iter().any(|w| w["source"].as_str() == Some(source)) {
        anyhow::bail!("Expected a warning for {}, got {:?}", source, warnings);
    }
    Ok(())
}
