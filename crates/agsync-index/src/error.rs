use thiserror::Error;

/// Result type for agsync-index operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the index layer
#[derive(Debug, Error)]
pub enum Error {
    /// Database operation failed
    #[error("{}", database_message(.0))]
    Database(#[from] rusqlite::Error),

    /// IO operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Query-specific error (invalid input, not found, etc.)
    #[error("Query error: {0}")]
    Query(String),
}

fn database_message(err: &rusqlite::Error) -> String {
    let msg = err.to_string();
    // Detect schema mismatch errors and provide actionable hint
    if msg.contains("no such column") || msg.contains("no such table") {
        format!(
            "Database schema mismatch: {}. Please restart the CLI to auto-migrate.",
            msg
        )
    } else {
        format!("Database error: {}", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_mismatch_error_message() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(1),
            Some("no such column: synced_mtime".to_string()),
        );
        let msg = Error::Database(sqlite_err).to_string();

        assert!(msg.contains("Database schema mismatch"));
        assert!(msg.contains("Please restart the CLI to auto-migrate"));
    }

    #[test]
    fn test_regular_database_error_message() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(1),
            Some("UNIQUE constraint failed".to_string()),
        );
        let msg = Error::Database(sqlite_err).to_string();

        assert!(msg.starts_with("Database error:"));
        assert!(!msg.contains("restart"));
    }
}
