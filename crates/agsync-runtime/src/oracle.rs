use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;

/// Whether a session needs work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Process,
}

/// The one incrementality rule shared by export and metrics sync.
///
/// Process when forced, when nothing was produced yet, or when the session
/// changed after the destination was last written.
pub fn decide(
    session_mtime: DateTime<Utc>,
    destination: Option<DateTime<Utc>>,
    force: bool,
) -> Decision {
    if force {
        return Decision::Process;
    }
    match destination {
        Some(recorded) if session_mtime <= recorded => Decision::Skip,
        _ => Decision::Process,
    }
}

/// Modification time of an output file, if it exists.
pub fn file_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

/// Lossless text form of an mtime, as stored in the metrics database.
pub fn format_stamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_stamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
