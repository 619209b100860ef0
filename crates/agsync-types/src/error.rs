use thiserror::Error;

/// Result type for agsync-types operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the types layer
#[derive(Debug, Error)]
pub enum Error {
    /// A source key such as `remote:vm01` could not be parsed
    #[error("Invalid source '{0}': expected local, wsl:<distro>, windows:<user> or remote:<host>")]
    InvalidSource(String),

    /// Date string was not YYYY-MM-DD
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// `since` falls after `until`
    #[error("--since {since} is after --until {until}")]
    InvalidDateRange {
        since: chrono::NaiveDate,
        until: chrono::NaiveDate,
    },
}
